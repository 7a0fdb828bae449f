//! Bridge types shared between the host side and the protocol client side.
//!
//! These types provide a stable surface for both collaborators,
//! hiding how settings and commands are stored internally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a setting descriptor (e.g. "auto-connect")
pub type SettingId = String;

/// Host-visible command identifier derived from a command label
pub type CommandId = String;

/// Identifier of a stored notification (UUID v4 string when created locally)
pub type NotificationId = String;

/// Value type a setting is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Boolean,
    String,
}

impl std::fmt::Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingKind::Boolean => write!(f, "boolean"),
            SettingKind::String => write!(f, "string"),
        }
    }
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Boolean(bool),
    String(String),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Boolean(_) => SettingKind::Boolean,
            SettingValue::String(_) => SettingKind::String,
        }
    }

    /// Reads a persisted JSON value, returning `None` unless it has the expected kind.
    pub fn from_json(kind: SettingKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (SettingKind::Boolean, Value::Bool(b)) => Some(SettingValue::Boolean(*b)),
            (SettingKind::String, Value::String(s)) => Some(SettingValue::String(s.clone())),
            _ => None,
        }
    }

    /// Coerces an untyped string from the protocol client into `kind`.
    ///
    /// Boolean settings are true only for the exact text `"true"`.
    pub fn coerce(kind: SettingKind, raw: &str) -> Self {
        match kind {
            SettingKind::Boolean => SettingValue::Boolean(raw == "true"),
            SettingKind::String => SettingValue::String(raw.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SettingValue::Boolean(b) => Value::Bool(*b),
            SettingValue::String(s) => Value::String(s.clone()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            SettingValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            SettingValue::Boolean(_) => None,
        }
    }

    /// String form handed to the protocol client.
    pub fn to_raw(&self) -> String {
        match self {
            SettingValue::Boolean(b) => b.to_string(),
            SettingValue::String(s) => s.clone(),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Boolean(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

/// Severity of a log event emitted by the protocol client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogIntent {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

/// Log event emitted by the protocol client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppLog {
    /// Stable event identifier (e.g. "update-success")
    pub id: String,
    /// Human readable message
    pub content: String,
    pub intent: LogIntent,
}

/// Action button attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    pub label: String,
    /// Protocol method invoked when the action is chosen
    pub method: String,
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

/// Notification persisted on behalf of the protocol client
///
/// Only the fields the bridge reads are typed. Anything else the client
/// stores in the record lands in `extra` and is written back as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Empty until the notification is first saved
    #[serde(default)]
    pub uuid: NotificationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Overlay the protocol client asks the host to render
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRequest {
    /// Overlay identifier, unique per mounted overlay
    pub id: String,
    /// Optional anchor (page path or element selector) in the host
    pub target: Option<String>,
    /// Opaque props passed through to the renderer
    #[serde(default)]
    pub props: Value,
}

/// Why the host calls a command trampoline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMode {
    /// The host only asks whether the command is applicable right now
    Check,
    /// The user invoked the command
    Execute,
}

/// Answer a command trampoline gives the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEligibility {
    Eligible,
    Ineligible,
}

impl CommandEligibility {
    pub fn is_eligible(self) -> bool {
        self == CommandEligibility::Eligible
    }
}

/// Errors surfaced by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeError {
    /// Invalid input parameter
    InvalidInput { message: String },
    /// Two descriptors share an id
    DuplicateSetting { id: SettingId },
    /// A value does not have the kind its descriptor declares
    SettingTypeMismatch {
        id: SettingId,
        expected: SettingKind,
        actual: SettingKind,
    },
    /// Two labels derive the same host command id
    CommandIdConflict {
        command_id: CommandId,
        label: String,
        existing_label: String,
    },
    /// IO error during persistence
    IoError { message: String },
    /// Persisted data could not be (de)serialized
    SerializationError { message: String },
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::InvalidInput { message } => write!(f, "Invalid input: {message}"),
            BridgeError::DuplicateSetting { id } => write!(f, "Duplicate setting id: {id}"),
            BridgeError::SettingTypeMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "Setting '{id}' expects a {expected} value, got {actual}"
            ),
            BridgeError::CommandIdConflict {
                command_id,
                label,
                existing_label,
            } => write!(
                f,
                "Command '{label}' derives id '{command_id}' already used by '{existing_label}'"
            ),
            BridgeError::IoError { message } => write!(f, "IO error: {message}"),
            BridgeError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::SerializationError {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setting_value_from_json_checks_kind() {
        assert_eq!(
            SettingValue::from_json(SettingKind::Boolean, &json!(true)),
            Some(SettingValue::Boolean(true))
        );
        assert_eq!(SettingValue::from_json(SettingKind::Boolean, &json!("yes")), None);
        assert_eq!(SettingValue::from_json(SettingKind::String, &json!(1)), None);
    }

    #[test]
    fn test_coerce_boolean_only_accepts_exact_true() {
        assert_eq!(
            SettingValue::coerce(SettingKind::Boolean, "true"),
            SettingValue::Boolean(true)
        );
        assert_eq!(
            SettingValue::coerce(SettingKind::Boolean, "TRUE"),
            SettingValue::Boolean(false)
        );
        assert_eq!(
            SettingValue::coerce(SettingKind::String, "true"),
            SettingValue::String("true".to_string())
        );
    }

    #[test]
    fn test_bridge_error_serializes_with_type_tag() {
        let err = BridgeError::DuplicateSetting {
            id: "token".to_string(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["type"], "DuplicateSetting");
        assert_eq!(err.to_string(), "Duplicate setting id: token");
    }
}
