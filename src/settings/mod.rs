//! Settings domain.
//!
//! Holds the setting schema, the typed store built from persisted data,
//! and the notifications persisted next to the settings.

pub mod notifications;
pub mod schema;
pub mod store;

pub use schema::{default_schema, SettingDescriptor, SettingsSchema};
pub use store::{load_settings, PluginData, SettingsMap, SettingsStore};
