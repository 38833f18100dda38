// src/error.rs
//! Error vocabulary for the export pipeline.
//!
//! Cell-level faults never appear here; they are absorbed inside the value
//! pipeline and replaced by sentinel text. `ExportError` covers only faults
//! that are fatal to a whole save call.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single save call.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No encoder registered for the requested filetype, and the global
    /// default filetype has no encoder either.
    #[error("no encoder available to save as type '{filetype}'")]
    NoEncoder { filetype: String },

    /// Fan-out save requested but the target exists and is not a directory.
    #[error("cannot save multiple sheets to non-directory {0}")]
    NotADirectory(PathBuf),

    /// The user declined the overwrite confirmation. A deliberate abort,
    /// not a failure: no tasks launched, nothing written.
    #[error("save to {0} cancelled")]
    Cancelled(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A malformed input file handed to the delimited loader.
    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

impl ExportError {
    /// Whether this outcome is a user-initiated abort rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Result type alias for convenience
pub type Result<T, E = ExportError> = std::result::Result<T, E>;
