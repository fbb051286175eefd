//! Turns sync events into a completion percentage.
//!
//! The denominator is the `Start` count (primary files only), so runs that
//! also push secondary-only files may report their last copies at 100%.

use crate::event::{SyncEvent, SyncListener};

/// Listener that tracks visited files and reports progress on every copy.
pub struct ProgressTracker<F> {
    files_sum: usize,
    file_index: usize,
    on_progress: F,
}

impl<F> ProgressTracker<F>
where
    F: FnMut(f64) + Send,
{
    /// `on_progress` receives the percentage each time a file is copied.
    pub fn new(on_progress: F) -> Self {
        Self {
            files_sum: 0,
            file_index: 0,
            on_progress,
        }
    }

    /// `file_index / files_sum * 100`; 100 when there is nothing to visit.
    pub fn percentage(&self) -> f64 {
        if self.files_sum == 0 {
            return 100.0;
        }
        (self.file_index as f64 * 100.0) / self.files_sum as f64
    }
}

impl<F> SyncListener for ProgressTracker<F>
where
    F: FnMut(f64) + Send,
{
    fn on_event(&mut self, event: &SyncEvent<'_>) {
        match event {
            SyncEvent::Start { count } => {
                self.files_sum = *count;
                self.file_index = 0;
            }
            SyncEvent::Visited { .. } => self.file_index += 1,
            SyncEvent::Copied { file, destination } => {
                tracing::info!("copy {} -> {}", file.path(), destination.name());
                let percentage = self.percentage();
                (self.on_progress)(percentage);
            }
        }
    }
}

/// Format a percentage the way progress labels show it: at most one decimal.
pub fn format_percentage(percentage: f64) -> String {
    let rounded = (percentage * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}
