//! Bridge configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```json
//! {
//!   "appName": "Obsidian",
//!   "ignoredLogIds": ["update-success"],
//!   "liveDiffSettingId": "granular-changes",
//!   "dataFileName": "data.json",
//!   "schema": []
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::api::types::BridgeError;
use crate::settings::schema::{default_schema, SettingDescriptor, SettingsSchema, SETTING_GRANULAR_CHANGES};

/// Default host application name reported to the protocol client
pub const DEFAULT_APP_NAME: &str = "Obsidian";

/// Default plugin data file name
pub const DEFAULT_DATA_FILE_NAME: &str = "data.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Host application name reported to the protocol client
    pub app_name: String,
    /// Client log ids never shown as notices, whatever their intent
    pub ignored_log_ids: Vec<String>,
    /// Boolean setting mirrored into `FeatureFlags::granular_changes`
    pub live_diff_setting_id: String,
    /// File name used by `JsonFileStore`
    pub data_file_name: String,
    /// Settings schema; empty means `default_schema()`
    pub schema: Vec<SettingDescriptor>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            ignored_log_ids: Vec::new(),
            live_diff_setting_id: SETTING_GRANULAR_CHANGES.to_string(),
            data_file_name: DEFAULT_DATA_FILE_NAME.to_string(),
            schema: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn from_json(value: serde_json::Value) -> Result<Self, BridgeError> {
        let config: BridgeConfig = serde_json::from_value(value)?;
        if config.app_name.trim().is_empty() {
            return Err(BridgeError::InvalidInput {
                message: "App name cannot be empty".to_string(),
            });
        }
        let file_name = config.data_file_name.trim();
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || config.data_file_name.contains('/')
            || config.data_file_name.contains('\\')
        {
            return Err(BridgeError::InvalidInput {
                message: "Data file name must be a plain file name".to_string(),
            });
        }
        Ok(config)
    }

    /// Builds and validates the settings schema this config selects.
    pub fn settings_schema(&self) -> Result<SettingsSchema, BridgeError> {
        if self.schema.is_empty() {
            Ok(default_schema())
        } else {
            SettingsSchema::new(self.schema.clone())
        }
    }
}
