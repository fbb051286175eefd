//! Scan, match-and-merge, propagate-remainder.
//!
//! ## Run phases
//!
//! 1. Scan both repositories.
//! 2. For every primary file, take its case-insensitive partner out of the
//!    secondary index. With a partner the newer timestamp wins (equal means
//!    in sync); without one the file is copied to secondary.
//! 3. In [`SyncMode::BiDirectional`] every secondary file left unmatched is
//!    copied to primary.
//!
//! Every copy streams the full content and then stamps the source timestamp
//! onto the destination, so the next run sees both sides as equal. A matched
//! pair is written under the partner's existing path, keeping its casing.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use twinsync_core::{FilesystemRepository, Repository, SyncFile, SyncMode};

use crate::error::{CopyStage, SyncError};
use crate::event::{FnListener, SyncEvent, SyncListener};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A pair that could not be merged because a timestamp was unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPair {
    pub path: String,
    pub reason: String,
}

/// Outcome of one completed [`Synchronizer::sync`] run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub mode: SyncMode,
    /// Primary files visited.
    pub visited: usize,
    pub copied_to_secondary: usize,
    pub copied_to_primary: usize,
    /// Pairs whose timestamps were already equal.
    pub unchanged: usize,
    pub skipped: Vec<SkippedPair>,
    pub duration_ms: u128,
}

impl SyncReport {
    fn new(mode: SyncMode) -> Self {
        Self {
            started_at: Utc::now(),
            mode,
            visited: 0,
            copied_to_secondary: 0,
            copied_to_primary: 0,
            unchanged: 0,
            skipped: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Total copies in both directions.
    pub fn copied(&self) -> usize {
        self.copied_to_secondary + self.copied_to_primary
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Keeps a primary and a secondary repository in sync.
pub struct Synchronizer {
    primary: Box<dyn Repository>,
    secondary: Box<dyn Repository>,
    mode: SyncMode,
    listeners: Vec<Box<dyn SyncListener>>,
}

impl Synchronizer {
    pub fn new(
        primary: Box<dyn Repository>,
        secondary: Box<dyn Repository>,
        mode: SyncMode,
    ) -> Self {
        Self {
            primary,
            secondary,
            mode,
            listeners: Vec::new(),
        }
    }

    /// Synchronizer over two local directories.
    pub fn for_filesystem(
        primary_dir: impl Into<PathBuf>,
        secondary_dir: impl Into<PathBuf>,
        mode: SyncMode,
    ) -> Self {
        Self::new(
            Box::new(FilesystemRepository::new(primary_dir)),
            Box::new(FilesystemRepository::new(secondary_dir)),
            mode,
        )
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SyncMode) {
        self.mode = mode;
    }

    /// Register a listener; listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: impl SyncListener + 'static) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn add_boxed_listener(&mut self, listener: Box<dyn SyncListener>) -> &mut Self {
        self.listeners.push(listener);
        self
    }

    /// Register a closure as a listener.
    pub fn on_event<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&SyncEvent<'_>) + Send + 'static,
    {
        self.add_listener(FnListener(callback))
    }

    /// Run one full synchronization pass.
    ///
    /// Per-pair timestamp failures are logged and reported in
    /// [`SyncReport::skipped`]; scan and copy failures abort the run.
    pub fn sync(&mut self) -> Result<SyncReport, SyncError> {
        let clock = Instant::now();
        let mut run = Run {
            primary: self.primary.as_ref(),
            secondary: self.secondary.as_ref(),
            listeners: &mut self.listeners,
            report: SyncReport::new(self.mode),
        };

        tracing::info!(
            primary = %run.primary.name(),
            secondary = %run.secondary.name(),
            mode = %self.mode,
            "sync started"
        );

        let primary_files = scan(run.primary)?;
        let secondary_files = scan(run.secondary)?;
        tracing::info!(
            primary = primary_files.len(),
            secondary = secondary_files.len(),
            "scan complete"
        );

        let mut index = SecondaryIndex::new(secondary_files);
        run.emit(&SyncEvent::Start {
            count: primary_files.len(),
        });

        for a in &primary_files {
            let a = a.as_ref();
            run.emit(&SyncEvent::Visited { file: a });
            run.report.visited += 1;
            match index.take(&a.match_key()) {
                Some(b) => run.merge(a, b.as_ref())?,
                None => run.copy(a, Side::Secondary, a.path())?,
            }
        }

        if self.mode == SyncMode::BiDirectional {
            tracing::debug!(remaining = index.len(), "propagating secondary-only files");
            for b in index.into_remaining() {
                run.copy(b.as_ref(), Side::Primary, b.path())?;
            }
        } else {
            tracing::debug!(
                remaining = index.len(),
                "one-directional mode, leaving secondary-only files untouched"
            );
        }

        let mut report = run.report;
        report.duration_ms = clock.elapsed().as_millis();
        tracing::info!(
            visited = report.visited,
            copied_to_secondary = report.copied_to_secondary,
            copied_to_primary = report.copied_to_primary,
            skipped = report.skipped.len(),
            duration_ms = report.duration_ms as u64,
            "sync finished"
        );
        Ok(report)
    }
}

fn scan(repo: &dyn Repository) -> Result<Vec<Box<dyn SyncFile>>, SyncError> {
    repo.scan().map_err(|source| SyncError::Scan {
        repository: repo.name(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Per-run state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Primary,
    Secondary,
}

struct Run<'s> {
    primary: &'s dyn Repository,
    secondary: &'s dyn Repository,
    listeners: &'s mut Vec<Box<dyn SyncListener>>,
    report: SyncReport,
}

impl<'s> Run<'s> {
    fn emit(&mut self, event: &SyncEvent<'_>) {
        for listener in self.listeners.iter_mut() {
            listener.on_event(event);
        }
    }

    fn merge(&mut self, a: &dyn SyncFile, b: &dyn SyncFile) -> Result<(), SyncError> {
        let Some(a_time) = self.read_timestamp(a, b) else {
            return Ok(());
        };
        let Some(b_time) = self.read_timestamp(b, a) else {
            return Ok(());
        };

        match a_time.cmp(&b_time) {
            Ordering::Greater => self.copy(a, Side::Secondary, b.path()),
            Ordering::Less => self.copy(b, Side::Primary, a.path()),
            Ordering::Equal => {
                tracing::debug!(path = a.path(), "in sync");
                self.report.unchanged += 1;
                Ok(())
            }
        }
    }

    /// Read `file`'s timestamp, recording the pair as skipped on failure.
    fn read_timestamp(&mut self, file: &dyn SyncFile, partner: &dyn SyncFile) -> Option<i64> {
        match file.timestamp() {
            Ok(timestamp) => Some(timestamp),
            Err(err) => {
                tracing::warn!(
                    path = file.path(),
                    partner = partner.path(),
                    error = %err,
                    "cannot read timestamp, skipping pair"
                );
                self.report.skipped.push(SkippedPair {
                    path: file.path().to_owned(),
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Copy `source` into the `to` repository at `target`.
    ///
    /// A matched pair passes the partner's path so a case-variant partner is
    /// overwritten in place instead of gaining a sibling.
    fn copy(&mut self, source: &dyn SyncFile, to: Side, target: &str) -> Result<(), SyncError> {
        let destination = match to {
            Side::Primary => self.primary,
            Side::Secondary => self.secondary,
        };
        let path = source.path();
        let fail = |stage: CopyStage, err: std::io::Error| SyncError::Copy {
            path: path.to_owned(),
            destination: destination.name(),
            stage,
            source: err,
        };

        let sink = destination
            .open_stream(target)
            .map_err(|e| fail(CopyStage::Open, e))?;
        let bytes = source
            .copy_to(sink)
            .map_err(|e| fail(CopyStage::Transfer, e))?;
        let timestamp = source.timestamp().map_err(|e| fail(CopyStage::Touch, e))?;
        destination
            .get_file(target)
            .touch(timestamp)
            .map_err(|e| fail(CopyStage::Touch, e))?;

        tracing::info!(path, target, destination = %destination.name(), bytes, "copied");
        match to {
            Side::Primary => self.report.copied_to_primary += 1,
            Side::Secondary => self.report.copied_to_secondary += 1,
        }
        self.emit(&SyncEvent::Copied {
            file: source,
            destination,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Secondary index
// ---------------------------------------------------------------------------

/// Secondary scan results keyed by match key.
///
/// Taking a file removes it, so a secondary file is merged at most once and
/// never also propagated as a leftover. Files whose keys collide (trees on a
/// case-sensitive filesystem) queue up in scan order.
struct SecondaryIndex {
    slots: Vec<Option<Box<dyn SyncFile>>>,
    by_key: HashMap<String, VecDeque<usize>>,
    remaining: usize,
}

impl SecondaryIndex {
    fn new(files: Vec<Box<dyn SyncFile>>) -> Self {
        let mut by_key: HashMap<String, VecDeque<usize>> = HashMap::with_capacity(files.len());
        for (slot, file) in files.iter().enumerate() {
            by_key.entry(file.match_key()).or_default().push_back(slot);
        }
        Self {
            remaining: files.len(),
            slots: files.into_iter().map(Some).collect(),
            by_key,
        }
    }

    fn take(&mut self, key: &str) -> Option<Box<dyn SyncFile>> {
        let queue = self.by_key.get_mut(key)?;
        let slot = queue.pop_front()?;
        if queue.is_empty() {
            self.by_key.remove(key);
        }
        self.remaining -= 1;
        self.slots[slot].take()
    }

    fn len(&self) -> usize {
        self.remaining
    }

    /// Unmatched files, in scan order.
    fn into_remaining(self) -> impl Iterator<Item = Box<dyn SyncFile>> {
        self.slots.into_iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
