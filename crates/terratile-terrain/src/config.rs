//! Terrain configuration, validation and derived diagnostics
//!
//! Config is layered, highest wins:
//! 1. Explicit overrides (CLI flags)
//! 2. Environment variables: `TERRATILE_*`
//! 3. A `terrain.toml` file
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use terratile_core::{Result, TerrainError, Vec3};

pub const TILES_RANGE: (i32, i32) = (1, 16);
pub const SUBDIVISION_RANGE: (i32, i32) = (1, 13);
pub const DEFAULT_SIZE: [i32; 3] = [2048, 2048, 1000];
pub const DEFAULT_MAX_TILE_POLYGONS: u64 = 1 << 24;
/// Mid-gray: darker pixels push the surface down, lighter ones up
pub const DEFAULT_MIDLEVEL: f32 = 0.5;

/// Where terrain height comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeightMode {
    /// Height is the object's Z scale; displacement strength is zero
    #[default]
    ObjectHeight,
    /// The quad stays flat (Z scale 1) and displacement provides all height
    Displacement,
}

impl HeightMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HeightMode::ObjectHeight => "object-height",
            HeightMode::Displacement => "displacement",
        }
    }
}

impl fmt::Display for HeightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeightMode {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "object-height" | "object_height" | "objectheight" => Ok(HeightMode::ObjectHeight),
            "displacement" => Ok(HeightMode::Displacement),
            other => Err(TerrainError::config(
                "height_mode",
                format!(
                    "'{}' is not one of [\"object-height\", \"displacement\"]",
                    other
                ),
            )),
        }
    }
}

/// Parameters for the whole terrain pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Tiles along one side of the terrain
    #[serde(default = "default_tiles")]
    pub tiles: i32,
    /// Simple subdivision levels before displacement
    #[serde(default = "default_subdivisions_pre")]
    pub subdivisions_pre: i32,
    /// Smoothing subdivision levels after displacement
    #[serde(default = "default_subdivisions_post")]
    pub subdivisions_post: i32,
    #[serde(default)]
    pub height_mode: HeightMode,
    /// Scale of the 2×2 base quad along X and Y (the terrain spans twice
    /// these values), and the height along Z
    #[serde(default = "default_size")]
    pub size: [i32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heightmap_path: Option<PathBuf>,
    /// Heightmap value that produces no displacement
    #[serde(default = "default_midlevel")]
    pub midlevel: f32,
    /// Refuse to bake a tile that would exceed this many polygons
    #[serde(default = "default_max_tile_polygons")]
    pub max_tile_polygons: u64,
}

fn default_tiles() -> i32 {
    4
}
fn default_subdivisions_pre() -> i32 {
    6
}
fn default_subdivisions_post() -> i32 {
    1
}
fn default_size() -> [i32; 3] {
    DEFAULT_SIZE
}
fn default_midlevel() -> f32 {
    DEFAULT_MIDLEVEL
}
fn default_max_tile_polygons() -> u64 {
    DEFAULT_MAX_TILE_POLYGONS
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tiles: default_tiles(),
            subdivisions_pre: default_subdivisions_pre(),
            subdivisions_post: default_subdivisions_post(),
            height_mode: HeightMode::default(),
            size: default_size(),
            heightmap_path: None,
            midlevel: default_midlevel(),
            max_tile_polygons: default_max_tile_polygons(),
        }
    }
}

fn check_range(field: &str, value: i32, (min, max): (i32, i32)) -> Result<()> {
    if value < min || value > max {
        return Err(TerrainError::ValueOutOfRange {
            field: field.to_string(),
            min: min as i64,
            max: max as i64,
            value: value as i64,
        });
    }
    Ok(())
}

impl TerrainConfig {
    /// Load from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load defaults plus environment overrides, using `path` only if it exists
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
    }

    /// Load a single TOML file with no overrides
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `TERRATILE_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TERRATILE_TILES") {
            self.tiles = parse_env_int("TERRATILE_TILES", &v)?;
        }
        if let Some(v) = lookup("TERRATILE_SUBDIVISIONS_PRE") {
            self.subdivisions_pre = parse_env_int("TERRATILE_SUBDIVISIONS_PRE", &v)?;
        }
        if let Some(v) = lookup("TERRATILE_SUBDIVISIONS_POST") {
            self.subdivisions_post = parse_env_int("TERRATILE_SUBDIVISIONS_POST", &v)?;
        }
        if let Some(v) = lookup("TERRATILE_HEIGHT_MODE") {
            self.height_mode = v.parse()?;
        }
        if let Some(v) = lookup("TERRATILE_HEIGHTMAP") {
            if !v.is_empty() {
                self.heightmap_path = Some(PathBuf::from(v));
            }
        }
        Ok(())
    }

    /// Check every parameter against its allowed range
    pub fn validate(&self) -> Result<()> {
        self.validate_tiles()?;
        check_range("subdivisions_pre", self.subdivisions_pre, SUBDIVISION_RANGE)?;
        check_range("subdivisions_post", self.subdivisions_post, SUBDIVISION_RANGE)?;
        for (axis, value) in ["size.x", "size.y", "size.z"].iter().zip(self.size) {
            check_range(axis, value, (1, i32::MAX))?;
        }
        if !self.midlevel.is_finite() {
            return Err(TerrainError::config("midlevel", "must be a finite number"));
        }
        if self.max_tile_polygons == 0 {
            return Err(TerrainError::config(
                "max_tile_polygons",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The part of validation the partitioner depends on
    pub fn validate_tiles(&self) -> Result<()> {
        check_range("tiles", self.tiles, TILES_RANGE)
    }

    /// Object scale given to the base quad
    pub fn base_scale(&self) -> Vec3 {
        let [x, y, z] = self.size.map(|v| v as f32);
        match self.height_mode {
            HeightMode::Displacement => Vec3::new(x, y, 1.0),
            HeightMode::ObjectHeight => Vec3::new(x, y, z),
        }
    }

    /// Displacement strength: the Z size in displacement mode, otherwise zero
    pub fn displacement_strength(&self) -> f32 {
        match self.height_mode {
            HeightMode::Displacement => self.size[2] as f32,
            HeightMode::ObjectHeight => 0.0,
        }
    }

    pub fn tile_count(&self) -> u64 {
        let side = self.tiles.max(0) as u64;
        side * side
    }

    /// Vertices after partitioning, before any subdivision
    pub fn predicted_vertex_count(&self) -> u64 {
        4 * self.tile_count()
    }

    /// Triangles after the full pipeline
    pub fn predicted_polygon_count(&self) -> u64 {
        let levels = (self.subdivisions_pre.max(0) + self.subdivisions_post.max(0)) as u32;
        4u64.saturating_pow(levels)
            .saturating_mul(self.tile_count())
            .saturating_mul(2)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            tiles: self.tile_count(),
            vertex_count: self.predicted_vertex_count(),
            polygon_count: self.predicted_polygon_count(),
        }
    }
}

fn parse_env_int(key: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|e| TerrainError::config(key, format!("'{}' is not an integer: {}", value, e)))
}

/// Read-only counts derived from a config, recomputed on every call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub tiles: u64,
    pub vertex_count: u64,
    pub polygon_count: u64,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tiles: {}  Vertex Count: {}  Poly Count: {}",
            self.tiles, self.vertex_count, self.polygon_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_panel() {
        let config = TerrainConfig::default();
        assert_eq!(config.tiles, 4);
        assert_eq!(config.subdivisions_pre, 6);
        assert_eq!(config.subdivisions_post, 1);
        assert_eq!(config.size, [2048, 2048, 1000]);
        assert_eq!(config.height_mode, HeightMode::ObjectHeight);
        assert_eq!(config.midlevel, 0.5);
        assert!(config.validate().is_ok());
        assert_eq!(TerrainConfig::from_toml_str("").unwrap().midlevel, 0.5);
    }

    #[test]
    fn scenario_a_diagnostics() {
        let config = TerrainConfig {
            tiles: 4,
            subdivisions_pre: 6,
            subdivisions_post: 1,
            height_mode: HeightMode::Displacement,
            ..TerrainConfig::default()
        };
        let d = config.diagnostics();
        assert_eq!(d.tiles, 16);
        assert_eq!(d.vertex_count, 64);
        assert_eq!(d.polygon_count, 524_288);
    }

    #[test]
    fn diagnostics_follow_edits() {
        let mut config = TerrainConfig::default();
        config.tiles = 1;
        assert_eq!(config.predicted_vertex_count(), 4);
        config.tiles = 16;
        assert_eq!(config.predicted_vertex_count(), 1024);
        config.subdivisions_pre = 13;
        config.subdivisions_post = 13;
        assert_eq!(config.predicted_polygon_count(), 2 * (1u64 << 52) * 256);
    }

    #[test]
    fn strength_and_scale_follow_height_mode() {
        let mut config = TerrainConfig {
            size: [10, 20, 30],
            ..TerrainConfig::default()
        };
        config.height_mode = HeightMode::Displacement;
        assert_eq!(config.displacement_strength(), 30.0);
        assert_eq!(config.base_scale(), Vec3::new(10.0, 20.0, 1.0));

        config.height_mode = HeightMode::ObjectHeight;
        assert_eq!(config.displacement_strength(), 0.0);
        assert_eq!(config.base_scale(), Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn out_of_range_values_are_config_errors() {
        for tiles in [0, -3, 17] {
            let config = TerrainConfig {
                tiles,
                ..TerrainConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), terratile_core::ErrorKind::Config);
            assert!(err.to_string().contains("tiles"));
        }

        let config = TerrainConfig {
            subdivisions_post: 14,
            ..TerrainConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("subdivisions_post"));

        let config = TerrainConfig {
            size: [1, 0, 1],
            ..TerrainConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("size.y"));
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let config = TerrainConfig::from_toml_str(
            r#"
tiles = 2
height_mode = "displacement"
heightmap_path = "maps/valley.png"
"#,
        )
        .unwrap();
        assert_eq!(config.tiles, 2);
        assert_eq!(config.height_mode, HeightMode::Displacement);
        assert_eq!(config.subdivisions_pre, 6);
        assert_eq!(config.heightmap_path, Some(PathBuf::from("maps/valley.png")));

        let round = TerrainConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(round, config);
    }

    #[test]
    fn bad_height_mode_in_toml_is_rejected() {
        let err = TerrainConfig::from_toml_str("height_mode = \"sideways\"").unwrap_err();
        assert_eq!(err.kind(), terratile_core::ErrorKind::Config);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = [
            ("TERRATILE_TILES", "8"),
            ("TERRATILE_HEIGHT_MODE", "Displacement"),
            ("TERRATILE_HEIGHTMAP", "/tmp/h.png"),
        ]
        .into_iter()
        .collect();

        let mut config = TerrainConfig::from_toml_str("tiles = 2").unwrap();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.tiles, 8);
        assert_eq!(config.height_mode, HeightMode::Displacement);
        assert_eq!(config.heightmap_path, Some(PathBuf::from("/tmp/h.png")));
    }

    #[test]
    fn malformed_env_override_names_the_variable() {
        let mut config = TerrainConfig::default();
        let err = config
            .apply_env_overrides(|key| (key == "TERRATILE_SUBDIVISIONS_PRE").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("TERRATILE_SUBDIVISIONS_PRE"));
    }
}
