//! Sync error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::workspace::WorkspaceError;

/// Errors that can occur during import/export flows.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Workspace error.
    #[error("{0}")]
    Workspace(#[from] WorkspaceError),

    /// Remote catalog error.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// I/O error (prompting or reading local files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A numeric prompt answer did not parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// The given path is not a global event script.
    #[error("not a global event script: {0}")]
    NotAnEventScript(PathBuf),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
