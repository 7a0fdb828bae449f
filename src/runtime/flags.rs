//! Feature flags shared with the sharing protocol.

use std::sync::atomic::{AtomicBool, Ordering};

/// Switches the sharing protocol reads on every edit.
#[derive(Debug, Default)]
pub struct FeatureFlags {
    /// Live diffing: sync edits as they happen
    granular_changes: AtomicBool,
}

impl FeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granular_changes(&self) -> bool {
        self.granular_changes.load(Ordering::SeqCst)
    }

    pub fn set_granular_changes(&self, enabled: bool) {
        let previous = self.granular_changes.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            log::info!("Granular changes toggled: enabled={enabled}");
        }
    }
}
