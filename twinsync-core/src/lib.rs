//! twinsync core library: repository abstraction, file handles, the
//! filesystem backend, sync mode and persisted preferences.
//!
//! - [`repository`]: [`Repository`] and [`SyncFile`] traits
//! - [`filesystem`]: [`FilesystemRepository`], the local-directory backend
//! - [`types`]: [`SyncMode`] and relative-path helpers
//! - [`preferences`]: load / save / validate the stored configuration
//! - [`error`]: [`RepositoryError`], [`ConfigError`]

pub mod error;
pub mod filesystem;
pub mod preferences;
pub mod repository;
pub mod types;

pub use error::{ConfigError, RepositoryError};
pub use filesystem::{FilesystemFile, FilesystemRepository};
pub use preferences::Preferences;
pub use repository::{Repository, Sink, SyncFile};
pub use types::SyncMode;
