//! Tile objects: a mesh, its transform and its modifier stack

use crate::mesh::{Mesh, MeshError};
use crate::modifier::{Modifier, ModifierStack};
use terratile_core::{Transform, Vec3};

/// Where a tile is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    /// Plain geometry, never given modifiers
    Plain,
    /// Carries a modifier stack that has not been baked
    Procedural,
    /// The stack has been collapsed into the mesh
    Baked,
}

/// One cell of the partitioned terrain, an independent mesh object
#[derive(Clone, Debug)]
pub struct TileMesh {
    pub name: String,
    /// Grid position (column, row)
    pub cell: (u32, u32),
    pub transform: Transform,
    pub mesh: Mesh,
    pub stack: ModifierStack,
    baked: bool,
}

impl TileMesh {
    pub fn new(cell: (u32, u32), transform: Transform, mesh: Mesh) -> Self {
        Self {
            name: format!("Tile_{}_{}", cell.0, cell.1),
            cell,
            transform,
            mesh,
            stack: ModifierStack::new(),
            baked: false,
        }
    }

    pub fn state(&self) -> TileState {
        if !self.stack.is_empty() {
            TileState::Procedural
        } else if self.baked {
            TileState::Baked
        } else {
            TileState::Plain
        }
    }

    /// Append one modifier to this tile's stack
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.stack.push(modifier);
    }

    /// The geometry this tile would have if baked now
    pub fn evaluated_mesh(&self) -> Result<Mesh, MeshError> {
        self.stack.evaluate(&self.mesh)
    }

    /// Replace the mesh with its evaluated result and drop the stack.
    /// A tile without a stack is left untouched, and so is a tile whose
    /// stack fails to evaluate.
    pub fn bake(&mut self) -> Result<bool, MeshError> {
        if self.stack.is_empty() {
            return Ok(false);
        }
        self.mesh = self.evaluated_mesh()?;
        self.stack.clear();
        self.baked = true;
        Ok(true)
    }

    /// World-space vertex positions of the stored mesh
    pub fn world_positions(&self) -> Vec<Vec3> {
        self.mesh
            .positions
            .iter()
            .map(|p| self.transform.transform_point(*p))
            .collect()
    }

    /// World-space bounds of the stored mesh
    pub fn world_bounds(&self) -> Option<(Vec3, Vec3)> {
        let (lo, hi) = self.mesh.bounds()?;
        let a = self.transform.transform_point(lo);
        let b = self.transform.transform_point(hi);
        Some((a.min(&b), a.max(&b)))
    }
}
