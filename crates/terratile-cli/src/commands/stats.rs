//! Diagnostics command

use super::{load_config, ConfigArgs};
use anyhow::Result;
use std::path::Path;

pub fn run(config_path: &Path, overrides: &ConfigArgs, json: bool) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let diagnostics = config.diagnostics();

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        return Ok(());
    }

    println!("{}", diagnostics);
    println!(
        "  grid {n}x{n}, subdivisions {pre}+{post}, mode {mode}",
        n = config.tiles,
        pre = config.subdivisions_pre,
        post = config.subdivisions_post,
        mode = config.height_mode,
    );
    match overrides.heightmap.as_ref().or(config.heightmap_path.as_ref()) {
        Some(path) => println!("  heightmap {}", path.display()),
        None => println!("  heightmap (none)"),
    }
    Ok(())
}
