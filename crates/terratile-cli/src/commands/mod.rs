//! CLI command implementations

pub mod init;
pub mod run;
pub mod stats;
pub mod tiles;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use terratile_terrain::{HeightMode, TerrainConfig};

/// Flags that override the loaded config
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Tiles per side (1-16)
    #[arg(long)]
    pub tiles: Option<i32>,

    /// Subdivision levels before displacement (1-13)
    #[arg(long = "pre")]
    pub subdivisions_pre: Option<i32>,

    /// Subdivision levels after displacement (1-13)
    #[arg(long = "post")]
    pub subdivisions_post: Option<i32>,

    /// Height mode: object-height or displacement
    #[arg(long, value_parser = parse_height_mode)]
    pub height_mode: Option<HeightMode>,

    /// Terrain size (comma-separated x,y,z)
    #[arg(long, value_parser = parse_size)]
    pub size: Option<[i32; 3]>,

    /// Heightmap image (jpg, jpeg, png, tif, tiff, bmp)
    #[arg(long)]
    pub heightmap: Option<PathBuf>,
}

impl ConfigArgs {
    /// Apply every flag except `--heightmap`, which goes through file selection
    pub fn apply(&self, config: &mut TerrainConfig) {
        if let Some(tiles) = self.tiles {
            config.tiles = tiles;
        }
        if let Some(pre) = self.subdivisions_pre {
            config.subdivisions_pre = pre;
        }
        if let Some(post) = self.subdivisions_post {
            config.subdivisions_post = post;
        }
        if let Some(mode) = self.height_mode {
            config.height_mode = mode;
        }
        if let Some(size) = self.size {
            config.size = size;
        }
    }
}

fn parse_height_mode(s: &str) -> Result<HeightMode, String> {
    s.parse::<HeightMode>().map_err(|e| e.to_string())
}

fn parse_size(s: &str) -> Result<[i32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: i32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: i32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: i32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok([x, y, z])
}

/// Defaults < config file < `TERRATILE_*` env < flags, then validate
pub fn load_config(path: &Path, overrides: &ConfigArgs) -> Result<TerrainConfig> {
    let mut config = TerrainConfig::load_or_default(path)
        .with_context(|| format!("Failed to load config '{}'", path.display()))?;
    overrides.apply(&mut config);
    config.validate().context("Invalid terrain configuration")?;
    Ok(config)
}
