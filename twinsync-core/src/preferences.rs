//! Persisted user preferences: the two directories and the sync mode.
//!
//! # Storage layout
//!
//! ```text
//! ~/.twinsync/
//!   preferences.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function that touches disk has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::SyncMode;

/// The directories to keep in sync and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_dir: Option<PathBuf>,
    #[serde(default)]
    pub sync_mode: SyncMode,
}

impl Preferences {
    pub fn new(primary_dir: PathBuf, secondary_dir: PathBuf, sync_mode: SyncMode) -> Self {
        Self {
            primary_dir: Some(primary_dir),
            secondary_dir: Some(secondary_dir),
            sync_mode,
        }
    }

    pub fn primary_dir_display(&self) -> String {
        display_dir(self.primary_dir.as_deref())
    }

    pub fn secondary_dir_display(&self) -> String {
        display_dir(self.secondary_dir.as_deref())
    }

    /// Check that both directories are configured, exist and are directories.
    ///
    /// Returns the two directories on success so callers don't have to
    /// unwrap the options again.
    pub fn validate(&self) -> Result<(&Path, &Path), ConfigError> {
        let primary = self
            .primary_dir
            .as_deref()
            .ok_or(ConfigError::MissingDirectory { side: "primary" })?;
        let secondary = self
            .secondary_dir
            .as_deref()
            .ok_or(ConfigError::MissingDirectory { side: "secondary" })?;
        for dir in [primary, secondary] {
            if !dir.is_dir() {
                return Err(ConfigError::DirectoryNotReady {
                    path: dir.to_path_buf(),
                });
            }
        }
        Ok((primary, secondary))
    }
}

fn display_dir(dir: Option<&Path>) -> String {
    match dir {
        Some(dir) => dir.display().to_string(),
        None => "none".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.twinsync/`
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".twinsync")
}

/// `<home>/.twinsync/preferences.yaml`, no I/O.
pub fn preferences_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("preferences.yaml")
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load preferences from `<home>/.twinsync/preferences.yaml`.
///
/// Returns `Ok(None)` when nothing has been saved yet (first run).
pub fn load_at(home: &Path) -> Result<Option<Preferences>, ConfigError> {
    let path = preferences_path_at(home);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no preferences stored yet");
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let prefs: Preferences =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    tracing::debug!(?prefs, "preferences loaded");
    Ok(Some(prefs))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Option<Preferences>, ConfigError> {
    load_at(&home()?)
}

/// Load preferences, treating a missing file as an error.
pub fn load_required_at(home: &Path) -> Result<Preferences, ConfigError> {
    load_at(home)?.ok_or_else(|| ConfigError::PreferencesNotFound {
        path: preferences_path_at(home),
    })
}

/// Atomically save preferences to `<home>/.twinsync/preferences.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, prefs: &Preferences) -> Result<(), ConfigError> {
    let dir = config_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let path = preferences_path_at(home);
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(prefs)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(prefs: &Preferences) -> Result<(), ConfigError> {
    save_at(&home()?, prefs)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn preferences_path_is_correct() {
        let home = TempDir::new().unwrap();
        assert!(preferences_path_at(home.path()).ends_with(".twinsync/preferences.yaml"));
    }

    #[test]
    fn load_returns_none_on_first_run() {
        let home = TempDir::new().unwrap();
        assert!(load_at(home.path()).unwrap().is_none());
    }

    #[test]
    fn load_required_reports_missing_file() {
        let home = TempDir::new().unwrap();
        let err = load_required_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::PreferencesNotFound { .. }));
    }

    #[test]
    fn save_creates_private_dir_and_file() {
        let home = TempDir::new().unwrap();
        save_at(home.path(), &Preferences::default()).unwrap();
        let path = preferences_path_at(home.path());
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let dir_mode = std::fs::metadata(config_dir_at(home.path()))
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(dir_mode, 0o700);
            let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(file_mode, 0o600);
        }
    }

    #[test]
    fn display_uses_none_for_unset_dirs() {
        let prefs = Preferences::default();
        assert_eq!(prefs.primary_dir_display(), "none");
        assert_eq!(prefs.secondary_dir_display(), "none");
    }

    #[test]
    fn validate_requires_both_dirs() {
        let tmp = TempDir::new().unwrap();
        let prefs = Preferences {
            primary_dir: Some(tmp.path().to_path_buf()),
            ..Preferences::default()
        };
        let err = prefs.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingDirectory { side: "secondary" }));
    }

    #[test]
    fn validate_rejects_plain_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let prefs = Preferences::new(tmp.path().to_path_buf(), file.clone(), SyncMode::default());
        match prefs.validate().unwrap_err() {
            ConfigError::DirectoryNotReady { path } => assert_eq!(path, file),
            other => panic!("expected DirectoryNotReady, got {other:?}"),
        }
    }
}
