//! Repository and file-handle abstractions.
//!
//! A [`Repository`] is one file tree addressed by repository-relative,
//! `/`-separated paths. The synchronizer only ever talks to these traits, so
//! a new backend is a new implementation, never a change to the merge logic.

use std::fmt;
use std::io::{self, Write};

use crate::error::RepositoryError;
use crate::types::match_key;

/// Writable destination returned by [`Repository::open_stream`].
pub type Sink = Box<dyn Write + Send>;

/// One file inside a repository.
pub trait SyncFile: Send + Sync {
    /// Repository-relative path, `/`-separated, never including the root.
    fn path(&self) -> &str;

    /// Last-modified time in milliseconds since the Unix epoch.
    fn timestamp(&self) -> io::Result<i64>;

    /// Set the last-modified time of the underlying entry.
    fn touch(&self, timestamp: i64) -> io::Result<()>;

    /// Stream the whole file into `sink`, then flush and close it.
    ///
    /// The sink is consumed, so it is closed whether streaming succeeds or not.
    /// Returns the number of bytes written.
    ///
    /// Only errors up to the final `flush` are reported. Closing happens when
    /// the boxed sink is dropped, so a failure the OS defers to close time
    /// (delayed write-back, quota on some network filesystems) is not seen.
    fn copy_to(&self, sink: Sink) -> io::Result<u64>;

    /// Case-insensitive identity used to pair files across repositories.
    fn match_key(&self) -> String {
        match_key(self.path())
    }
}

impl fmt::Debug for dyn SyncFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A file tree that can be enumerated and written to.
pub trait Repository: Send + Sync {
    /// Human-readable location, used in logs and events.
    fn name(&self) -> String;

    /// Enumerate every regular file below the root, recursively.
    ///
    /// Order is unspecified. A root that does not exist yields no files.
    fn scan(&self) -> Result<Vec<Box<dyn SyncFile>>, RepositoryError>;

    /// Open `path` for writing from the start, creating parent directories
    /// and the file itself as needed and truncating existing content.
    fn open_stream(&self, path: &str) -> io::Result<Sink>;

    /// Resolve `path` to a handle; the file does not need to exist yet.
    fn get_file(&self, path: &str) -> Box<dyn SyncFile>;
}

impl fmt::Debug for dyn Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
