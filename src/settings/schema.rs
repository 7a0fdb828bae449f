//! Setting descriptors and the schema they form.
//!
//! A schema is an ordered, immutable list of descriptors. Order is the order
//! a settings UI would present them in; ids are unique.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::api::types::{BridgeError, SettingKind, SettingValue};

/// Id of the notebook identity setting
pub const SETTING_UUID: &str = "uuid";
/// Id of the notebook token setting
pub const SETTING_TOKEN: &str = "token";
/// Id of the live-diffing toggle
pub const SETTING_GRANULAR_CHANGES: &str = "granular-changes";
/// Id of the connect-on-startup toggle
pub const SETTING_AUTO_CONNECT: &str = "auto-connect";

/// Static metadata describing one configurable setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDescriptor {
    pub id: String,
    /// Display name
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SettingKind,
    pub default: SettingValue,
}

impl SettingDescriptor {
    pub fn boolean(id: &str, name: &str, description: &str, default: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind: SettingKind::Boolean,
            default: SettingValue::Boolean(default),
        }
    }

    pub fn string(id: &str, name: &str, description: &str, default: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind: SettingKind::String,
            default: SettingValue::String(default.to_string()),
        }
    }
}

/// Ordered list of setting descriptors with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSchema {
    descriptors: Vec<SettingDescriptor>,
}

impl SettingsSchema {
    /// Builds a schema, validating it.
    ///
    /// # Errors
    ///
    /// - `DuplicateSetting` if two descriptors share an id
    /// - `SettingTypeMismatch` if a default does not match its declared kind
    /// - `InvalidInput` if an id is blank
    pub fn new(descriptors: Vec<SettingDescriptor>) -> Result<Self, BridgeError> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if descriptor.id.trim().is_empty() {
                return Err(BridgeError::InvalidInput {
                    message: "Setting id cannot be empty".to_string(),
                });
            }
            if !seen.insert(descriptor.id.as_str()) {
                return Err(BridgeError::DuplicateSetting {
                    id: descriptor.id.clone(),
                });
            }
            if descriptor.default.kind() != descriptor.kind {
                return Err(BridgeError::SettingTypeMismatch {
                    id: descriptor.id.clone(),
                    expected: descriptor.kind,
                    actual: descriptor.default.kind(),
                });
            }
        }
        Ok(Self { descriptors })
    }

    /// Parses a schema from its JSON form (`[{ id, name, description, type, default }]`).
    pub fn from_json(value: serde_json::Value) -> Result<Self, BridgeError> {
        let descriptors: Vec<SettingDescriptor> = serde_json::from_value(value)?;
        Self::new(descriptors)
    }

    pub fn get(&self, id: &str) -> Option<&SettingDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn kind_of(&self, id: &str) -> Option<SettingKind> {
        self.get(id).map(|d| d.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for SettingsSchema {
    fn default() -> Self {
        default_schema()
    }
}

/// The settings every notebook connected to the collaboration network has.
pub fn default_schema() -> SettingsSchema {
    SettingsSchema {
        descriptors: vec![
            SettingDescriptor::string(
                SETTING_UUID,
                "Notebook Universal ID",
                "Universal identifier assigned to this notebook on the network",
                "",
            ),
            SettingDescriptor::string(
                SETTING_TOKEN,
                "Notebook Token",
                "Token used to authenticate this notebook on the network",
                "",
            ),
            SettingDescriptor::boolean(
                SETTING_GRANULAR_CHANGES,
                "Granular Changes",
                "Sync edits as they happen instead of when a page is saved",
                false,
            ),
            SettingDescriptor::boolean(
                SETTING_AUTO_CONNECT,
                "Auto Connect",
                "Connect to the network automatically when the notebook opens",
                false,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_schema_is_valid() {
        let schema = default_schema();
        let rebuilt = SettingsSchema::new(schema.iter().cloned().collect());
        assert_eq!(rebuilt, Ok(schema));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = SettingsSchema::new(vec![
            SettingDescriptor::boolean("auto-connect", "A", "", false),
            SettingDescriptor::string("auto-connect", "B", "", ""),
        ]);
        assert!(matches!(result, Err(BridgeError::DuplicateSetting { id }) if id == "auto-connect"));
    }

    #[test]
    fn test_default_of_wrong_kind_rejected() {
        let mut descriptor = SettingDescriptor::boolean("auto-connect", "A", "", false);
        descriptor.default = SettingValue::String("no".to_string());

        let result = SettingsSchema::new(vec![descriptor]);

        assert!(matches!(
            result,
            Err(BridgeError::SettingTypeMismatch {
                expected: SettingKind::Boolean,
                actual: SettingKind::String,
                ..
            })
        ));
    }

    #[test]
    fn test_from_json() {
        let schema = SettingsSchema::from_json(json!([
            { "id": "auto-connect", "name": "Auto", "description": "", "type": "boolean", "default": false },
            { "id": "token", "name": "Token", "description": "", "type": "string", "default": "" }
        ]))
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.kind_of("auto-connect"), Some(SettingKind::Boolean));
        assert_eq!(schema.kind_of("token"), Some(SettingKind::String));
        assert_eq!(schema.kind_of("missing"), None);
    }

    #[test]
    fn test_from_json_default_mismatch() {
        let result = SettingsSchema::from_json(json!([
            { "id": "auto-connect", "name": "Auto", "description": "", "type": "boolean", "default": "no" }
        ]));
        assert!(matches!(result, Err(BridgeError::SettingTypeMismatch { .. })));
    }
}
