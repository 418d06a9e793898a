//! The full terrain workflow as one sequential state machine
//!
//! `Partition -> BuildModifiers -> Bake -> Recenter -> Done`. A stage only
//! starts once the previous one succeeded. A failing stage halts the run;
//! stages that already finished keep their results, and the checkpoints
//! pushed for them are the way back.

use crate::commands::TerrainSession;
use crate::progress::ProgressReporter;
use crate::undo::Checkpoints;
use serde::Serialize;
use terratile_core::{Stage, TerrainError, TileId, Vec3};
use thiserror::Error;
use tracing::{info, warn};

/// A stage failure, tagged with the stage that failed
#[derive(Debug, Error)]
#[error("pipeline halted at '{stage}': {source}")]
pub struct PipelineError {
    pub stage: Stage,
    /// Stages that finished before the failure
    pub completed: Vec<Stage>,
    #[source]
    pub source: TerrainError,
}

/// Per-tile summary of the finished terrain
#[derive(Debug, Clone, Serialize)]
pub struct TileSummary {
    pub id: TileId,
    pub name: String,
    pub cell: (u32, u32),
    /// World-space pivot
    pub pivot: Vec3,
    pub vertices: usize,
    pub polygons: usize,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

/// What a complete run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<Stage>,
    pub tiles: Vec<TileSummary>,
    pub vertices: usize,
    pub polygons: usize,
    pub triangles: usize,
}

impl PipelineReport {
    fn from_session(session: &TerrainSession, stages: Vec<Stage>) -> Self {
        let tiles = session
            .scene
            .selection()
            .iter()
            .filter_map(|id| session.scene.get(*id).map(|tile| (*id, tile)))
            .map(|(id, tile)| {
                let (bounds_min, bounds_max) = tile.world_bounds().unwrap_or_default();
                TileSummary {
                    id,
                    name: tile.name.clone(),
                    cell: tile.cell,
                    pivot: tile.transform.position,
                    vertices: tile.mesh.vertex_count(),
                    polygons: tile.mesh.polygon_count(),
                    bounds_min,
                    bounds_max,
                }
            })
            .collect::<Vec<_>>();

        Self {
            stages,
            vertices: tiles.iter().map(|t| t.vertices).sum(),
            polygons: tiles.iter().map(|t| t.polygons).sum(),
            triangles: session
                .scene
                .selection()
                .iter()
                .filter_map(|id| session.scene.get(*id))
                .map(|t| t.mesh.triangle_count())
                .sum(),
            tiles,
        }
    }
}

/// Sequencer for the full workflow
#[derive(Debug)]
pub struct Pipeline {
    state: Stage,
    completed: Vec<Stage>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            state: Stage::Partition,
            completed: Vec::new(),
        }
    }

    /// The stage that runs next, or `Done`
    pub fn state(&self) -> Stage {
        self.state
    }

    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }

    /// Run one stage and advance on success
    pub fn step(
        &mut self,
        session: &mut TerrainSession,
        progress: &mut dyn ProgressReporter,
        checkpoints: &mut dyn Checkpoints,
    ) -> Result<Stage, PipelineError> {
        let stage = self.state;
        let result = match stage {
            Stage::Partition => session.create_tiles(checkpoints),
            Stage::BuildModifiers => session.add_modifiers(progress, checkpoints),
            Stage::Bake => session.apply_modifiers(progress, checkpoints),
            Stage::Recenter => session.recenter_pivots(progress, checkpoints),
            Stage::Done => return Ok(Stage::Done),
        };

        match result {
            Ok(outcome) => {
                info!(stage = %stage, tiles = outcome.affected, "Stage complete");
                self.completed.push(stage);
                self.state = stage.next().unwrap_or(Stage::Done);
                Ok(self.state)
            }
            Err(source) => {
                warn!(stage = %stage, error = %source, "Stage failed");
                Err(PipelineError {
                    stage,
                    completed: self.completed.clone(),
                    source,
                })
            }
        }
    }

    /// Run every remaining stage
    pub fn run(
        mut self,
        session: &mut TerrainSession,
        progress: &mut dyn ProgressReporter,
        checkpoints: &mut dyn Checkpoints,
    ) -> Result<PipelineReport, PipelineError> {
        while !self.state.is_terminal() {
            self.step(session, progress, checkpoints)?;
        }
        Ok(PipelineReport::from_session(session, self.completed))
    }
}
