//! Checkpoints and a snapshot-based undo/redo stack

use crate::scene::TerrainScene;

/// Receives one checkpoint after each successful operation
pub trait Checkpoints {
    /// Offered the scene before an operation mutates it. Implementations
    /// keep it only when they have nothing earlier to return to.
    fn record_baseline(&mut self, _scene: &TerrainScene) {}

    fn push_checkpoint(&mut self, description: &str, scene: &TerrainScene);
}

/// Ignores checkpoints
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheckpoints;

impl Checkpoints for NoCheckpoints {
    fn push_checkpoint(&mut self, _description: &str, _scene: &TerrainScene) {}
}

/// Scene state recorded after an operation
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub description: String,
    pub scene: TerrainScene,
}

/// Undo/redo stack with bounded depth.
///
/// Each entry holds the scene as it was right after the described
/// operation, so undoing returns the entry below the top. Below the oldest
/// entry sits the baseline: the scene before the first recorded operation,
/// or the last entry dropped for depth.
pub struct UndoStack {
    baseline: Option<TerrainScene>,
    undo: Vec<Checkpoint>,
    redo: Vec<Checkpoint>,
    max_depth: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_depth(32)
    }

    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            baseline: None,
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Push a new checkpoint (clears redo)
    pub fn push(&mut self, checkpoint: Checkpoint) {
        self.undo.push(checkpoint);
        self.redo.clear();
        if self.undo.len() > self.max_depth {
            let dropped = self.undo.remove(0);
            self.baseline = Some(dropped.scene);
        }
    }

    /// Step back one checkpoint, returning the scene to restore
    pub fn undo(&mut self) -> Option<TerrainScene> {
        if !self.can_undo() {
            return None;
        }
        let top = self.undo.pop()?;
        self.redo.push(top);
        self.undo
            .last()
            .map(|c| &c.scene)
            .or(self.baseline.as_ref())
            .cloned()
    }

    /// Re-apply the last undone checkpoint, returning the scene to restore
    pub fn redo(&mut self) -> Option<TerrainScene> {
        let cmd = self.redo.pop()?;
        let scene = cmd.scene.clone();
        self.undo.push(cmd);
        Some(scene)
    }

    pub fn can_undo(&self) -> bool {
        match self.undo.len() {
            0 => false,
            1 => self.baseline.is_some(),
            _ => true,
        }
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Descriptions from oldest to newest
    pub fn descriptions(&self) -> Vec<&str> {
        self.undo.iter().map(|c| c.description.as_str()).collect()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo.last().map(|c| c.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo.last().map(|c| c.description.as_str())
    }

    pub fn clear(&mut self) {
        self.baseline = None;
        self.undo.clear();
        self.redo.clear();
    }
}

impl Checkpoints for UndoStack {
    fn record_baseline(&mut self, scene: &TerrainScene) {
        if self.undo.is_empty() && self.baseline.is_none() {
            self.baseline = Some(scene.clone());
        }
    }

    fn push_checkpoint(&mut self, description: &str, scene: &TerrainScene) {
        self.push(Checkpoint {
            description: description.to_string(),
            scene: scene.clone(),
        });
    }
}
