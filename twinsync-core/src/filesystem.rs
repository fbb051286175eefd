//! Local-directory repository backend.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use walkdir::WalkDir;

use crate::error::RepositoryError;
use crate::repository::{Repository, Sink, SyncFile};
use crate::types::normalize_relative;

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// A repository rooted at a directory on the local filesystem.
///
/// Construction never touches the disk; a root that is not a directory is
/// reported by the first [`Repository::scan`].
#[derive(Debug, Clone)]
pub struct FilesystemRepository {
    root: PathBuf,
}

impl FilesystemRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        if normalize_relative(relative).is_none() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("'{path}' is not a plain relative path"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl Repository for FilesystemRepository {
    fn name(&self) -> String {
        format!("file:{}", self.root.display())
    }

    fn scan(&self) -> Result<Vec<Box<dyn SyncFile>>, RepositoryError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(RepositoryError::NotADirectory {
                    path: self.root.clone(),
                })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(root = %self.root.display(), "repository root missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(RepositoryError::Scan {
                    path: self.root.clone(),
                    source,
                })
            }
        }

        let mut files: Vec<Box<dyn SyncFile>> = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(RepositoryError::Scan {
                        path: self.root.clone(),
                        source: err.into(),
                    });
                }
                Err(err) => {
                    tracing::warn!(root = %self.root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .ok()
                .and_then(normalize_relative);
            let Some(relative) = relative else {
                tracing::warn!(path = %entry.path().display(), "skipping file with non UTF-8 path");
                continue;
            };

            files.push(Box::new(FilesystemFile {
                absolute: entry.into_path(),
                relative,
            }));
        }

        tracing::debug!(root = %self.root.display(), files = files.len(), "scan complete");
        Ok(files)
    }

    fn open_stream(&self, path: &str) -> io::Result<Sink> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&target)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn get_file(&self, path: &str) -> Box<dyn SyncFile> {
        Box::new(FilesystemFile {
            absolute: self.root.join(path),
            relative: path.to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// File handle
// ---------------------------------------------------------------------------

/// A file inside a [`FilesystemRepository`].
#[derive(Debug, Clone)]
pub struct FilesystemFile {
    absolute: PathBuf,
    relative: String,
}

impl SyncFile for FilesystemFile {
    fn path(&self) -> &str {
        &self.relative
    }

    fn timestamp(&self) -> io::Result<i64> {
        let meta = fs::metadata(&self.absolute)?;
        Ok(to_millis(FileTime::from_last_modification_time(&meta)))
    }

    fn touch(&self, timestamp: i64) -> io::Result<()> {
        filetime::set_file_mtime(&self.absolute, from_millis(timestamp))
    }

    fn copy_to(&self, mut sink: Sink) -> io::Result<u64> {
        let mut source = File::open(&self.absolute)?;
        let copied = io::copy(&mut source, &mut sink)?;
        sink.flush()?;
        Ok(copied)
    }
}

fn to_millis(time: FileTime) -> i64 {
    time.unix_seconds() * 1000 + i64::from(time.nanoseconds() / 1_000_000)
}

fn from_millis(millis: i64) -> FileTime {
    let seconds = millis.div_euclid(1000);
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    FileTime::from_unix_time(seconds, nanos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
