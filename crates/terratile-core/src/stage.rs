//! Pipeline stage names

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the terrain pipeline, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Partition,
    BuildModifiers,
    Bake,
    Recenter,
    Done,
}

impl Stage {
    /// Every stage in execution order
    pub const ORDER: [Stage; 5] = [
        Stage::Partition,
        Stage::BuildModifiers,
        Stage::Bake,
        Stage::Recenter,
        Stage::Done,
    ];

    /// The stage that follows this one. `Done` is terminal.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Partition => Some(Stage::BuildModifiers),
            Stage::BuildModifiers => Some(Stage::Bake),
            Stage::Bake => Some(Stage::Recenter),
            Stage::Recenter => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Done
    }

    /// Human readable label, also used for checkpoint descriptions
    pub fn label(self) -> &'static str {
        match self {
            Stage::Partition => "Create Tiles",
            Stage::BuildModifiers => "Add Modifiers",
            Stage::Bake => "Apply Modifiers",
            Stage::Recenter => "Recenter Pivots",
            Stage::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_chain_in_order() {
        let mut stage = Stage::Partition;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited, Stage::ORDER.to_vec());
        assert!(stage.is_terminal());
    }

    #[test]
    fn ordering_matches_execution() {
        assert!(Stage::Partition < Stage::BuildModifiers);
        assert!(Stage::Bake < Stage::Recenter);
    }
}
