//! Log file setup and size-based rotation.
//!
//! Logs go to `~/.twinsync/logs/twinsync.log`. Before the file is opened it
//! is rotated once it reaches 10 MiB, keeping at most 5 backups:
//!   twinsync.log → twinsync.log.1 → … → twinsync.log.5

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use twinsync_core::preferences::config_dir_at;

/// Maximum log file size before rotation (10 MiB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated backups to keep.
pub const MAX_ROTATED_FILES: usize = 5;

/// `<home>/.twinsync/logs/twinsync.log`
pub fn log_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("logs").join("twinsync.log")
}

/// Install the global subscriber: the log file always, stderr when `verbose`.
///
/// `RUST_LOG` overrides the default `info` filter. Returns the log path.
pub fn init(home: &Path, verbose: bool) -> Result<PathBuf> {
    let path = log_path_at(home);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    let rotated = rotate_if_needed(&path, MAX_LOG_BYTES, MAX_ROTATED_FILES)
        .with_context(|| format!("cannot rotate {}", path.display()))?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);
    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
    });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    if rotated {
        tracing::info!(path = %path.display(), "log file rotated");
    }
    Ok(path)
}

/// Rotate `log_path` when it has reached `max_bytes`.
///
/// The oldest backup (`.<max_files>`) is dropped, the others shift up by one
/// and the live file becomes `.1`. Returns whether a rotation happened; a
/// missing log is not an error.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < max_bytes || max_files == 0 {
        return Ok(false);
    }

    let oldest = numbered_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }
    fs::rename(log_path, numbered_path(log_path, 1))?;
    Ok(true)
}

/// `twinsync.log` → `twinsync.log.<n>`
fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("twinsync.log");
    base.with_file_name(format!("{name}.{n}"))
}
