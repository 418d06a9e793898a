//! Host-facing commands
//!
//! Each command maps to one pipeline component, works on the session's
//! current selection and pushes one checkpoint when it succeeds. Errors are
//! raised before any mutation whenever the problem is detectable up front.

use crate::bake::bake_tiles;
use crate::browser::FileBrowser;
use crate::config::{Diagnostics, TerrainConfig};
use crate::heightmap::{bind_heightmap, is_supported_heightmap, HEIGHTMAP_EXTENSIONS};
use crate::modifier::{build_modifier_stacks, StackParams};
use crate::partition::create_tiles;
use crate::pipeline::{Pipeline, PipelineError, PipelineReport};
use crate::pivot::recenter_pivots;
use crate::progress::ProgressReporter;
use crate::scene::TerrainScene;
use crate::undo::Checkpoints;
use std::fmt;
use terratile_core::{Result, Stage, TerrainError};
use tracing::info;

/// Commands a host UI can invoke
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    CreateTiles,
    AddModifiers,
    ApplyModifiers,
    DeleteSelected,
    RecenterPivots,
    SelectHeightmapFile,
    RunFullPipeline,
}

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::CreateTiles => Stage::Partition.label(),
            Command::AddModifiers => Stage::BuildModifiers.label(),
            Command::ApplyModifiers => Stage::Bake.label(),
            Command::DeleteSelected => "Delete",
            Command::RecenterPivots => Stage::Recenter.label(),
            Command::SelectHeightmapFile => "Select Heightmap",
            Command::RunFullPipeline => "Streamline",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a successful command did
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: Command,
    /// Tiles created, modified or removed
    pub affected: usize,
    /// False when the command ended without changing anything, e.g. the
    /// user closed the file browser
    pub changed: bool,
}

impl CommandOutcome {
    fn changed(command: Command, affected: usize) -> Self {
        Self {
            command,
            affected,
            changed: true,
        }
    }
}

/// Configuration plus the tiles it produced
#[derive(Clone, Debug, Default)]
pub struct TerrainSession {
    pub config: TerrainConfig,
    pub scene: TerrainScene,
}

impl TerrainSession {
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            scene: TerrainScene::new(),
        }
    }

    /// Predicted counts for the current config
    pub fn diagnostics(&self) -> Diagnostics {
        self.config.diagnostics()
    }

    /// Partition a new terrain and select its tiles
    pub fn create_tiles(&mut self, checkpoints: &mut dyn Checkpoints) -> Result<CommandOutcome> {
        checkpoints.record_baseline(&self.scene);
        let ids = create_tiles(&mut self.scene, &self.config)?;
        checkpoints.push_checkpoint(Command::CreateTiles.label(), &self.scene);
        Ok(CommandOutcome::changed(Command::CreateTiles, ids.len()))
    }

    /// Bind the configured heightmap and attach modifier stacks to the
    /// selected tiles
    pub fn add_modifiers(
        &mut self,
        progress: &mut dyn ProgressReporter,
        checkpoints: &mut dyn Checkpoints,
    ) -> Result<CommandOutcome> {
        checkpoints.record_baseline(&self.scene);
        let params = StackParams::from_config(&self.config)?;
        let targets = self.scene.resolve_targets(self.scene.selection())?;
        let source = bind_heightmap(self.config.heightmap_path.as_deref())?;

        let count = build_modifier_stacks(&mut self.scene, &targets, &params, &source, progress)?;
        checkpoints.push_checkpoint(Command::AddModifiers.label(), &self.scene);
        Ok(CommandOutcome::changed(Command::AddModifiers, count))
    }

    /// Bake the selected tiles' modifier stacks
    pub fn apply_modifiers(
        &mut self,
        progress: &mut dyn ProgressReporter,
        checkpoints: &mut dyn Checkpoints,
    ) -> Result<CommandOutcome> {
        checkpoints.record_baseline(&self.scene);
        let targets = self.scene.selection().to_vec();
        let baked = bake_tiles(
            &mut self.scene,
            &targets,
            self.config.max_tile_polygons,
            progress,
        )?;
        checkpoints.push_checkpoint(Command::ApplyModifiers.label(), &self.scene);
        Ok(CommandOutcome::changed(Command::ApplyModifiers, baked))
    }

    /// Remove the selected tiles from the scene
    pub fn delete_selected(&mut self, checkpoints: &mut dyn Checkpoints) -> Result<CommandOutcome> {
        checkpoints.record_baseline(&self.scene);
        let targets = self.scene.resolve_targets(self.scene.selection())?;
        for id in &targets {
            self.scene.remove(*id)?;
        }
        info!(tiles = targets.len(), "Deleted tiles");
        checkpoints.push_checkpoint(Command::DeleteSelected.label(), &self.scene);
        Ok(CommandOutcome::changed(Command::DeleteSelected, targets.len()))
    }

    /// Move each selected tile's origin to its own center of mass
    pub fn recenter_pivots(
        &mut self,
        progress: &mut dyn ProgressReporter,
        checkpoints: &mut dyn Checkpoints,
    ) -> Result<CommandOutcome> {
        checkpoints.record_baseline(&self.scene);
        let targets = self.scene.selection().to_vec();
        let count = recenter_pivots(&mut self.scene, &targets, progress)?;
        checkpoints.push_checkpoint(Command::RecenterPivots.label(), &self.scene);
        Ok(CommandOutcome::changed(Command::RecenterPivots, count))
    }

    /// Ask the browser for a heightmap and store it in the config.
    /// A cancelled dialog leaves the config untouched.
    pub fn select_heightmap_file(&mut self, browser: &mut dyn FileBrowser) -> Result<CommandOutcome> {
        let Some(path) = browser.pick_file("Select heightmap", &HEIGHTMAP_EXTENSIONS) else {
            return Ok(CommandOutcome {
                command: Command::SelectHeightmapFile,
                affected: 0,
                changed: false,
            });
        };
        if !is_supported_heightmap(&path) {
            return Err(TerrainError::resource(
                path.display().to_string(),
                format!(
                    "unsupported file type, expected one of: {}",
                    HEIGHTMAP_EXTENSIONS.join(", ")
                ),
            ));
        }
        info!(path = %path.display(), "Selected heightmap");
        self.config.heightmap_path = Some(path);
        Ok(CommandOutcome::changed(Command::SelectHeightmapFile, 0))
    }

    /// Run every stage in order on a fresh set of tiles
    pub fn run_full_pipeline(
        &mut self,
        progress: &mut dyn ProgressReporter,
        checkpoints: &mut dyn Checkpoints,
    ) -> std::result::Result<PipelineReport, PipelineError> {
        Pipeline::new().run(self, progress, checkpoints)
    }
}
