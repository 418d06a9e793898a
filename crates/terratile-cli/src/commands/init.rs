//! Config initialization command

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use terratile_terrain::TerrainConfig;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = TerrainConfig::default().to_toml_string()?;
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;

    println!("Created {}", path.display());
    println!("Set heightmap_path, then run: terratile run");
    Ok(())
}
