//! Partition-only command

use super::{load_config, ConfigArgs};
use anyhow::{Context, Result};
use std::path::Path;
use terratile_terrain::{NoCheckpoints, TerrainSession};

pub fn run(config_path: &Path, overrides: &ConfigArgs) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let mut session = TerrainSession::new(config);
    session
        .create_tiles(&mut NoCheckpoints)
        .context("Failed to create tiles")?;

    println!("{} tile(s):", session.scene.len());
    for (_, tile) in session.scene.tiles() {
        let (min, max) = tile.world_bounds().unwrap_or_default();
        println!(
            "  {:<12} cell ({}, {})  x [{:.1}, {:.1}]  y [{:.1}, {:.1}]",
            tile.name, tile.cell.0, tile.cell.1, min.x, max.x, min.y, max.y
        );
    }
    Ok(())
}
