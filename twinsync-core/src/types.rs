//! Shared value types: the sync mode and relative-path helpers.

use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Sync mode
// ---------------------------------------------------------------------------

/// Which direction novel files are allowed to travel.
///
/// Files present on both sides are always merged by timestamp; the mode only
/// decides whether files found solely in the secondary tree are pushed back
/// into the primary tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMode {
    /// Secondary-only files stay where they are.
    OneDirectional,
    /// Secondary-only files are copied to primary.
    #[default]
    BiDirectional,
}

impl SyncMode {
    /// All modes, in display order.
    pub fn all() -> &'static [SyncMode] {
        &[SyncMode::OneDirectional, SyncMode::BiDirectional]
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::OneDirectional => write!(f, "ONE_DIRECTIONAL"),
            SyncMode::BiDirectional => write!(f, "BI_DIRECTIONAL"),
        }
    }
}

impl FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ONE_DIRECTIONAL" => Ok(SyncMode::OneDirectional),
            "BI_DIRECTIONAL" => Ok(SyncMode::BiDirectional),
            _ => Err(ConfigError::UnknownMode(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Relative paths
// ---------------------------------------------------------------------------

/// Render `relative` with `/` separators regardless of platform.
///
/// Returns `None` if any component is not valid UTF-8 or the path is not a
/// plain relative path (no root, prefix, `.` or `..`).
pub fn normalize_relative(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// The key two handles must share to be treated as the same logical file.
pub fn match_key(path: &str) -> String {
    path.to_lowercase()
}
