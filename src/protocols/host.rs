//! Host traits: bridge → host application boundary.
//!
//! These traits describe the primitives the surrounding note-taking
//! application provides. They are implemented by the integrator and handed
//! to the bridge through `HostBindings`.
//!
//! Key design principle: the bridge never reaches a host global. Everything
//! it may touch is in the bindings it was built with.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::types::{BridgeError, CommandEligibility, CommandId, CommandMode, OverlayRequest};

/// Host-side entry point of a registered command.
///
/// Called with `CommandMode::Check` when the host asks whether the command is
/// applicable, and with `CommandMode::Execute` when the user runs it.
pub type CommandTrampoline = Arc<dyn Fn(CommandMode) -> CommandEligibility + Send + Sync>;

/// Registration request handed to the host command palette.
#[derive(Clone)]
pub struct HostCommand {
    /// Host-visible id, see `derive_command_id`
    pub id: CommandId,
    /// Display name (the original label)
    pub name: String,
    pub trampoline: CommandTrampoline,
}

impl std::fmt::Debug for HostCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCommand")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Host command API.
///
/// Registration is single-shot: the host allows one registration per id and
/// offers no way to unregister within a session.
pub trait HostCommands: Send + Sync {
    fn register_command(&self, command: HostCommand);
}

/// Host transient notice API (toasts).
pub trait HostNotices: Send + Sync {
    /// Show a message. Fire-and-forget.
    fn show(&self, message: &str);
}

/// Host persistence API for the plugin's data blob.
#[async_trait]
pub trait HostPersistence: Send + Sync {
    /// Load the persisted blob, `Ok(None)` if nothing was ever saved.
    async fn load(&self) -> Result<Option<Value>, BridgeError>;

    /// Replace the persisted blob.
    async fn save(&self, data: Value) -> Result<(), BridgeError>;
}

/// Host overlay renderer.
pub trait HostOverlays: Send + Sync {
    fn render(&self, overlay: OverlayRequest);
}

/// Everything the bridge needs from the host application.
#[derive(Clone)]
pub struct HostBindings {
    pub commands: Arc<dyn HostCommands>,
    pub notices: Arc<dyn HostNotices>,
    pub persistence: Arc<dyn HostPersistence>,
    /// `None` when the host cannot render overlays
    pub overlays: Option<Arc<dyn HostOverlays>>,
    /// Name of the open workspace (vault, notebook, graph...)
    pub workspace_name: String,
}
