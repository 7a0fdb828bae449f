//! ClientHost trait: protocol client → bridge callback boundary.
//!
//! The external collaboration client only ever talks to the host through this
//! trait. It refers to commands by label and to settings by id; it never holds
//! a handle to a host registration or to the settings storage.

use std::sync::Arc;

use crate::api::types::{AppLog, Notification, NotificationId, OverlayRequest};

/// Action run when a command fires.
pub type CommandCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback interface the protocol client drives during its lifetime.
///
/// Implemented by `ClientAdapter` and passed to the client at setup.
pub trait ClientHost: Send + Sync {
    /// Name of the host application (e.g. "Obsidian").
    fn app(&self) -> &str;

    /// Name of the open workspace.
    fn workspace(&self) -> &str;

    /// Read a setting as a string. `None` for ids this notebook does not know.
    fn get_setting(&self, id: &str) -> Option<String>;

    /// Write a setting from its string form. Unknown ids are ignored.
    fn set_setting(&self, id: &str, value: &str);

    /// Expose a command under `label`, or re-enable it with a new callback.
    fn add_command(&self, label: &str, callback: CommandCallback);

    /// Disable the command registered under `label`.
    fn remove_command(&self, label: &str);

    /// Log sink. Non-debug events reach the user as notices.
    fn on_app_log(&self, event: AppLog);

    fn render_overlay(&self, overlay: OverlayRequest);

    fn notifications(&self) -> Vec<Notification>;

    fn save_notification(&self, notification: Notification) -> NotificationId;

    fn remove_notification(&self, id: &str);
}

/// A running protocol client.
pub trait ProtocolClient: Send + Sync {
    /// Stop the client and release what it set up.
    fn unload(&self);
}

/// Constructor of the external protocol client.
pub trait ProtocolClientFactory {
    fn setup(&self, host: Arc<dyn ClientHost>) -> Box<dyn ProtocolClient>;
}

impl<F> ProtocolClientFactory for F
where
    F: Fn(Arc<dyn ClientHost>) -> Box<dyn ProtocolClient>,
{
    fn setup(&self, host: Arc<dyn ClientHost>) -> Box<dyn ProtocolClient> {
        self(host)
    }
}
