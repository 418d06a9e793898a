//! TerrainScene - tile storage with stable IDs and an explicit selection

use crate::tile::TileMesh;
use std::collections::{HashMap, HashSet};
use terratile_core::{Result, TerrainError, TileId};

/// The set of tile objects the pipeline works on.
///
/// Tiles keep their insertion order, which is also the order batch stages
/// visit them in.
#[derive(Clone, Debug, Default)]
pub struct TerrainScene {
    order: Vec<TileId>,
    tiles: HashMap<TileId, TileMesh>,
    selection: Vec<TileId>,
}

impl TerrainScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile and return its ID
    pub fn insert(&mut self, tile: TileMesh) -> TileId {
        let id = TileId::new();
        self.order.push(id);
        self.tiles.insert(id, tile);
        id
    }

    /// Remove a tile, also dropping it from the selection
    pub fn remove(&mut self, id: TileId) -> Result<TileMesh> {
        let tile = self
            .tiles
            .remove(&id)
            .ok_or_else(|| TerrainError::Selection(format!("tile {} does not exist", id)))?;
        self.order.retain(|t| *t != id);
        self.selection.retain(|t| *t != id);
        Ok(tile)
    }

    pub fn get(&self, id: TileId) -> Option<&TileMesh> {
        self.tiles.get(&id)
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut TileMesh> {
        self.tiles.get_mut(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All tile IDs in insertion order
    pub fn ids(&self) -> &[TileId] {
        &self.order
    }

    /// All tiles in insertion order
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &TileMesh)> {
        self.order.iter().map(move |id| (*id, &self.tiles[id]))
    }

    pub fn selection(&self) -> &[TileId] {
        &self.selection
    }

    /// Replace the selection. Unknown IDs are rejected.
    pub fn select(&mut self, ids: &[TileId]) -> Result<()> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(TerrainError::Selection(format!(
                "cannot select tile {}: it does not exist",
                missing
            )));
        }
        self.selection = dedup(ids);
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selection = self.order.clone();
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Validate a target set for a batch stage.
    ///
    /// Empty sets and unknown IDs are selection errors; duplicates are
    /// dropped so every tile is processed exactly once.
    pub fn resolve_targets(&self, targets: &[TileId]) -> Result<Vec<TileId>> {
        if targets.is_empty() {
            return Err(TerrainError::Selection(
                "no tiles selected; create tiles or select some first".to_string(),
            ));
        }
        if let Some(missing) = targets.iter().find(|id| !self.contains(**id)) {
            return Err(TerrainError::Selection(format!(
                "tile {} is not in the scene",
                missing
            )));
        }
        Ok(dedup(targets))
    }

    pub fn total_vertices(&self) -> usize {
        self.tiles.values().map(|t| t.mesh.vertex_count()).sum()
    }

    pub fn total_polygons(&self) -> usize {
        self.tiles.values().map(|t| t.mesh.polygon_count()).sum()
    }

    pub fn total_triangles(&self) -> usize {
        self.tiles.values().map(|t| t.mesh.triangle_count()).sum()
    }
}

fn dedup(ids: &[TileId]) -> Vec<TileId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
