//! Error types for twinsync-sync.

use std::fmt;

use thiserror::Error;

use twinsync_core::{ConfigError, RepositoryError};

/// The step of a copy that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStage {
    /// Opening the destination stream.
    Open,
    /// Streaming bytes from source to destination, including the final flush.
    Transfer,
    /// Reading the source timestamp or stamping it onto the destination.
    Touch,
}

impl fmt::Display for CopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyStage::Open => write!(f, "open"),
            CopyStage::Transfer => write!(f, "transfer"),
            CopyStage::Touch => write!(f, "touch"),
        }
    }
}

/// Fatal errors that end a sync run.
///
/// Files copied before the error stay where they are; nothing is rolled back.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The stored preferences are incomplete or point at unusable directories.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A repository could not be enumerated.
    #[error("cannot scan {repository}: {source}")]
    Scan {
        repository: String,
        #[source]
        source: RepositoryError,
    },

    /// Copying a file failed part-way.
    #[error("error when copy {path} to {destination} ({stage}): {source}")]
    Copy {
        path: String,
        destination: String,
        stage: CopyStage,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Relative path of the file being copied, when the error is a copy failure.
    pub fn path(&self) -> Option<&str> {
        match self {
            SyncError::Copy { path, .. } => Some(path),
            _ => None,
        }
    }
}
