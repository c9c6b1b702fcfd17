//! Error type for the tools.

use thiserror::Error;
use warfront_core::error::GameError;

/// Anything that can stop a tool run.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Input file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// Offending file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A RON document failed to parse.
    #[error("Failed to parse '{path}': {source}")]
    Ron {
        /// Offending file.
        path: String,
        /// Parser error with position.
        source: ron::error::SpannedError,
    },

    /// A script line is not a valid intent.
    #[error("Invalid intent on line {line}: {source}")]
    Script {
        /// 1-based line number.
        line: usize,
        /// JSON error.
        source: serde_json::Error,
    },

    /// Output could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// The simulation refused the data.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Result alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
