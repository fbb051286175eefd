//! Progress events emitted by the [`Synchronizer`](crate::Synchronizer).
//!
//! Delivery is synchronous and ordered: one `Start`, then one `Visited` per
//! primary file, with a `Copied` after every completed copy.

use std::fmt;

use twinsync_core::{Repository, SyncFile};

/// One notification from a running sync.
pub enum SyncEvent<'a> {
    /// Emitted once before merging. `count` is the number of primary files
    /// about to be visited, not the number of copies.
    Start { count: usize },
    /// Emitted for every primary file, whether or not it ends up copied.
    Visited { file: &'a dyn SyncFile },
    /// Emitted after `file` has been copied into `destination`.
    Copied {
        file: &'a dyn SyncFile,
        destination: &'a dyn Repository,
    },
}

impl fmt::Debug for SyncEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::Start { count } => f.debug_struct("Start").field("count", count).finish(),
            SyncEvent::Visited { file } => {
                f.debug_struct("Visited").field("file", &file.path()).finish()
            }
            SyncEvent::Copied { file, destination } => f
                .debug_struct("Copied")
                .field("file", &file.path())
                .field("destination", &destination.name())
                .finish(),
        }
    }
}

/// Observer of sync events. Listeners only see shared references and cannot
/// influence the merge; a panic in a listener aborts the run.
pub trait SyncListener: Send {
    fn on_event(&mut self, event: &SyncEvent<'_>);
}

/// Adapts a closure into a [`SyncListener`].
pub(crate) struct FnListener<F>(pub(crate) F);

impl<F> SyncListener for FnListener<F>
where
    F: FnMut(&SyncEvent<'_>) + Send,
{
    fn on_event(&mut self, event: &SyncEvent<'_>) {
        (self.0)(event)
    }
}
