//! Error types for twinsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while enumerating a repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The repository root exists but is not a directory.
    #[error("repository root {path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// Walking the tree failed at the root itself (permission denied, etc.).
    #[error("cannot scan repository at {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// All errors that can arise from loading, saving or validating preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the file or directory involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse preferences at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No preferences have been stored yet.
    #[error("no preferences found at {path}")]
    PreferencesNotFound { path: PathBuf },

    /// One of the two directories was never configured.
    #[error("the {side} directory is not configured")]
    MissingDirectory { side: &'static str },

    /// A configured directory is missing or is not a directory.
    #[error("the directory {path} is not ready")]
    DirectoryNotReady { path: PathBuf },

    /// A sync mode string did not name a known mode.
    #[error("unknown sync mode '{0}'; expected ONE_DIRECTIONAL or BI_DIRECTIONAL")]
    UnknownMode(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
