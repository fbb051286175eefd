//! Shared sync entrypoint used by the CLI.

use twinsync_core::Preferences;

use crate::{SyncError, SyncListener, SyncReport, Synchronizer};

/// Validate `prefs` and synchronize the two configured directories.
///
/// Listeners are registered in the order given.
pub fn run(
    prefs: &Preferences,
    listeners: Vec<Box<dyn SyncListener>>,
) -> Result<SyncReport, SyncError> {
    let (primary, secondary) = prefs.validate()?;
    tracing::debug!(
        primary = %primary.display(),
        secondary = %secondary.display(),
        mode = %prefs.sync_mode,
        "preferences valid"
    );

    let mut sync = Synchronizer::for_filesystem(primary, secondary, prefs.sync_mode);
    for listener in listeners {
        sync.add_boxed_listener(listener);
    }
    sync.sync()
}
