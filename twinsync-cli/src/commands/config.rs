//! `twinsync config`: inspect and update stored preferences.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use twinsync_core::{preferences, SyncMode};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the stored directories and sync mode.
    Show {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Change one or more stored settings.
    Set(SetArgs),
}

/// Arguments for `twinsync config set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Primary directory; must exist.
    #[arg(long)]
    pub primary: Option<PathBuf>,

    /// Secondary directory; must exist.
    #[arg(long)]
    pub secondary: Option<PathBuf>,

    /// `one-directional` or `bi-directional`.
    #[arg(long)]
    pub mode: Option<SyncMode>,
}

pub fn run(command: ConfigCommand, home: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => show(home, json),
        ConfigCommand::Set(args) => args.run(home),
    }
}

fn show(home: &Path, json: bool) -> Result<()> {
    let prefs = preferences::load_at(home)
        .context("failed to load preferences")?
        .unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&prefs)?);
        return Ok(());
    }
    println!("{:<10} {}", "primary".bold(), prefs.primary_dir_display());
    println!("{:<10} {}", "secondary".bold(), prefs.secondary_dir_display());
    println!("{:<10} {}", "mode".bold(), prefs.sync_mode);
    Ok(())
}

impl SetArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        if self.primary.is_none() && self.secondary.is_none() && self.mode.is_none() {
            anyhow::bail!("nothing to set; pass --primary, --secondary or --mode");
        }

        let mut prefs = preferences::load_at(home)
            .context("failed to load preferences")?
            .unwrap_or_default();
        if let Some(dir) = &self.primary {
            prefs.primary_dir = Some(canonical_dir(dir)?);
        }
        if let Some(dir) = &self.secondary {
            prefs.secondary_dir = Some(canonical_dir(dir)?);
        }
        if let Some(mode) = self.mode {
            prefs.sync_mode = mode;
        }

        prefs
            .validate()
            .context("preferences not saved; both directories must be set and exist")?;
        preferences::save_at(home, &prefs).context("failed to save preferences")?;
        tracing::info!(
            primary = %prefs.primary_dir_display(),
            secondary = %prefs.secondary_dir_display(),
            mode = %prefs.sync_mode,
            "preferences saved"
        );

        println!("{} preferences saved", "✓".green());
        Ok(())
    }
}

fn canonical_dir(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize()
        .with_context(|| format!("directory {} does not exist", dir.display()))
}
