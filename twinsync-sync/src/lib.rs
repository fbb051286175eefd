//! # twinsync-sync
//!
//! Two-way directory synchronization: newer timestamp wins, novel files are
//! copied across, nothing is ever deleted.
//!
//! Build a [`Synchronizer`] over two repositories and call
//! [`Synchronizer::sync`], or hand stored preferences to [`pipeline::run`].

pub mod error;
pub mod event;
pub mod pipeline;
pub mod progress;
pub mod synchronizer;

pub use error::{CopyStage, SyncError};
pub use event::{SyncEvent, SyncListener};
pub use progress::ProgressTracker;
pub use synchronizer::{SkippedPair, SyncReport, Synchronizer};
