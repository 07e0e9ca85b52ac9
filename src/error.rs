//! Error taxonomy shared by ingestion and the reporting views.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MindError {
    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("malformed input in {} at line {line}: {reason}", path.display())]
    MalformedInput {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("computation failed: {0}")]
    ComputationFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MindError {
    pub fn malformed(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        MindError::MalformedInput {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn computation(reason: impl Into<String>) -> Self {
        MindError::ComputationFailure(reason.into())
    }

    /// Copy of this error for reporting in more than one section. I/O, CSV
    /// and JSON sources are flattened into their message.
    pub fn for_report(&self) -> MindError {
        match self {
            MindError::MissingFile { path } => MindError::MissingFile { path: path.clone() },
            MindError::MalformedInput { path, line, reason } => MindError::MalformedInput {
                path: path.clone(),
                line: *line,
                reason: reason.clone(),
            },
            MindError::InvalidSelection(msg) => MindError::InvalidSelection(msg.clone()),
            other => MindError::ComputationFailure(other.to_string()),
        }
    }

    /// Short machine-readable tag used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MindError::MissingFile { .. } => "missing_file",
            MindError::MalformedInput { .. } => "malformed_input",
            MindError::InvalidSelection(_) => "invalid_selection",
            MindError::ComputationFailure(_) => "computation_failure",
            MindError::Io(_) => "io",
            MindError::Csv(_) => "csv",
            MindError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, MindError>;
