//! `twinsync sync`: one synchronization pass over the configured directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use twinsync_core::{preferences, Preferences, SyncMode};
use twinsync_sync::{
    pipeline,
    progress::{format_percentage, ProgressTracker},
    SyncListener, SyncReport,
};

/// Arguments for `twinsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Primary directory (overrides the stored one).
    #[arg(long)]
    pub primary: Option<PathBuf>,

    /// Secondary directory (overrides the stored one).
    #[arg(long)]
    pub secondary: Option<PathBuf>,

    /// `one-directional` or `bi-directional` (overrides the stored mode).
    #[arg(long)]
    pub mode: Option<SyncMode>,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        let prefs = self.resolve_preferences(home)?;

        let mut listeners: Vec<Box<dyn SyncListener>> = Vec::new();
        if !self.json {
            listeners.push(Box::new(ProgressTracker::new(|percentage: f64| {
                println!("Synchronizing ({}%)", format_percentage(percentage));
            })));
        }

        let report = pipeline::run(&prefs, listeners).with_context(|| {
            format!(
                "sync failed between {} and {}",
                prefs.primary_dir_display(),
                prefs.secondary_dir_display()
            )
        })?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&report);
        }
        Ok(())
    }

    /// Stored preferences with command-line overrides applied.
    ///
    /// Nothing stored is only an error when the flags don't name both
    /// directories themselves.
    fn resolve_preferences(&self, home: &Path) -> Result<Preferences> {
        let stored = preferences::load_at(home).context("failed to load preferences")?;
        let mut prefs = match stored {
            Some(prefs) => prefs,
            None if self.primary.is_some() && self.secondary.is_some() => Preferences::default(),
            None => anyhow::bail!(
                "no preferences stored at {}; run `twinsync config set` first",
                preferences::preferences_path_at(home).display()
            ),
        };
        if let Some(primary) = &self.primary {
            prefs.primary_dir = Some(primary.clone());
        }
        if let Some(secondary) = &self.secondary {
            prefs.secondary_dir = Some(secondary.clone());
        }
        if let Some(mode) = self.mode {
            prefs.sync_mode = mode;
        }
        Ok(prefs)
    }
}

fn print_summary(report: &SyncReport) {
    println!(
        "{} {} visited, {} copied ({} to secondary, {} to primary), {} unchanged [{}]",
        "✓".green(),
        report.visited,
        report.copied(),
        report.copied_to_secondary,
        report.copied_to_primary,
        report.unchanged,
        report.mode
    );
    if !report.skipped.is_empty() {
        println!("{} {} skipped:", "!".yellow(), report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}  {}", skipped.path, skipped.reason.dimmed());
        }
    }
}
