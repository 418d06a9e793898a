//! Error types for Terratile

use crate::stage::Stage;
use thiserror::Error;

/// Broad category of a [`TerrainError`], used by hosts to decide how to
/// present a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Resource,
    Selection,
    Stage,
    Cancelled,
    Io,
}

/// The main error type for terrain operations
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("Config error: {field}: {message}")]
    Config { field: String, message: String },

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("Heightmap resource error for '{path}': {reason}")]
    Resource { path: String, reason: String },

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("{stage} failed{}: {message}", tile_suffix(.tile))]
    Stage {
        stage: Stage,
        /// Index within the processed batch and tile name
        tile: Option<(usize, String)>,
        message: String,
    },

    #[error("{stage} cancelled after {completed} of {total} tile(s)")]
    Cancelled {
        stage: Stage,
        completed: usize,
        total: usize,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

fn tile_suffix(tile: &Option<(usize, String)>) -> String {
    match tile {
        Some((index, name)) => format!(" on tile #{} '{}'", index, name),
        None => String::new(),
    }
}

impl TerrainError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        TerrainError::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn resource(path: impl Into<String>, reason: impl Into<String>) -> Self {
        TerrainError::Resource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// A stage failure attributed to one tile of the batch
    pub fn stage_on_tile(
        stage: Stage,
        index: usize,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TerrainError::Stage {
            stage,
            tile: Some((index, name.into())),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TerrainError::Config { .. }
            | TerrainError::ValueOutOfRange { .. }
            | TerrainError::TomlParseError(_)
            | TerrainError::TomlSerError(_) => ErrorKind::Config,
            TerrainError::Resource { .. } => ErrorKind::Resource,
            TerrainError::Selection(_) => ErrorKind::Selection,
            TerrainError::Stage { .. } => ErrorKind::Stage,
            TerrainError::Cancelled { .. } => ErrorKind::Cancelled,
            TerrainError::IoError(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;

impl From<toml::de::Error> for TerrainError {
    fn from(err: toml::de::Error) -> Self {
        TerrainError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for TerrainError {
    fn from(err: toml::ser::Error) -> Self {
        TerrainError::TomlSerError(err.to_string())
    }
}
