//! Bridge between a host note-taking application and an external
//! collaboration-protocol client.
//!
//! The host provides commands, notices, persistence and overlays
//! (`protocols::host`). The client consumes a single `ClientHost` object
//! (`protocols::client`). In between sit the typed settings store and the
//! command registry.
//!
//! ```ignore
//! let adapter = ClientAdapter::build(bindings, BridgeConfig::default()).await?;
//! let teardown = adapter.connect(&setup_client, vec![setup_sharing]);
//! // on plugin unload
//! teardown.unload();
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod protocols;
pub mod runtime;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::types::{BridgeError, SettingKind, SettingValue};
pub use commands::registry::{derive_command_id, CommandRegistry};
pub use config::BridgeConfig;
pub use protocols::{ClientHost, HostBindings, ProtocolClient, ProtocolClientFactory};
pub use runtime::adapter::{ClientAdapter, ProtocolSetup};
pub use runtime::persistence::JsonFileStore;
pub use runtime::teardown::Teardown;
pub use settings::{default_schema, load_settings, SettingsMap, SettingsSchema, SettingsStore};
