//! Terratile Terrain - Heightmap-driven tiled terrain
//!
//! Cuts a base quad into an N×N grid of independent tile meshes, attaches a
//! subdivide/displace/subdivide modifier stack to each tile, bakes the
//! stacks into concrete geometry and moves every tile's pivot to its center
//! of mass. Each step is exposed as a command on [`TerrainSession`], and
//! [`Pipeline`] runs them in order.

pub mod bake;
pub mod browser;
pub mod commands;
pub mod config;
pub mod heightmap;
pub mod mesh;
pub mod modifier;
pub mod partition;
pub mod pipeline;
pub mod pivot;
pub mod progress;
pub mod scene;
pub mod subdivide;
pub mod tile;
pub mod undo;

#[cfg(test)]
mod test_support;

pub use browser::{FileBrowser, FixedPathBrowser};
pub use commands::{Command, CommandOutcome, TerrainSession};
pub use config::{Diagnostics, HeightMode, TerrainConfig};
pub use heightmap::HeightmapResource;
pub use mesh::Mesh;
pub use modifier::{Modifier, ModifierStack};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, TileSummary};
pub use progress::{Cancellable, LogProgress, NoProgress, ProgressReporter};
pub use scene::TerrainScene;
pub use tile::{TileMesh, TileState};
pub use undo::{Checkpoints, NoCheckpoints, UndoStack};
