//! Terratile Core - Foundational types for the terrain pipeline
//!
//! This crate provides the types every other Terratile crate depends on:
//! - `TileId` - Stable tile identifiers
//! - `Transform`, `Vec3` - Spatial types
//! - `Stage` - Pipeline stage names
//! - Error types and Result alias

mod error;
mod id;
mod stage;
mod types;

pub use error::{ErrorKind, Result, TerrainError};
pub use id::TileId;
pub use stage::Stage;
pub use types::{Transform, Vec3};
