//! SettingsStore - typed settings merged from persisted data and schema defaults.
//!
//! The store owns the whole persisted plugin data (settings and notifications)
//! because the host persistence API only saves it wholesale. Every mutation
//! hands a fresh JSON snapshot to the injected save callback.
//!
//! # Persisted layout
//!
//! ```text
//! {
//!   "settings":      { "<id>": true | "text", ... },
//!   "notifications": { "<uuid>": { "uuid", "title", ... } },  records kept verbatim
//!   ...                 other keys are kept verbatim
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::api::types::{BridgeError, NotificationId, SettingValue};
use crate::runtime::lock_unpoisoned;
use crate::settings::schema::SettingsSchema;

const KEY_SETTINGS: &str = "settings";
const KEY_NOTIFICATIONS: &str = "notifications";

/// Callback receiving the full persisted blob after every mutation.
pub type SaveCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Side channel invoked synchronously when a watched setting changes.
pub type SettingWatcher = Arc<dyn Fn(&SettingValue) + Send + Sync>;

/// Complete map of setting values, one per schema descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsMap {
    values: BTreeMap<String, SettingValue>,
    /// Persisted entries with no descriptor, written back untouched
    unknown: Map<String, Value>,
}

impl SettingsMap {
    pub fn get(&self, id: &str) -> Option<&SettingValue> {
        self.values.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Persisted entries that no descriptor claims.
    pub fn unknown(&self) -> &Map<String, Value> {
        &self.unknown
    }

    pub fn to_json(&self) -> Value {
        let mut out = self.unknown.clone();
        for (id, value) in &self.values {
            out.insert(id.clone(), value.to_json());
        }
        Value::Object(out)
    }
}

/// Builds a complete settings map from a persisted blob.
///
/// For each descriptor the persisted value is used only when its JSON type
/// matches the descriptor kind; otherwise the descriptor default applies.
/// `persisted` may be absent, `null`, or not an object at all.
pub fn load_settings(schema: &SettingsSchema, persisted: Option<&Value>) -> SettingsMap {
    let stored = persisted
        .and_then(|blob| blob.get(KEY_SETTINGS))
        .and_then(Value::as_object);

    let mut values = BTreeMap::new();
    for descriptor in schema.iter() {
        let candidate = stored.and_then(|s| s.get(&descriptor.id));
        let value = match candidate.and_then(|v| SettingValue::from_json(descriptor.kind, v)) {
            Some(value) => value,
            None => {
                if let Some(raw) = candidate {
                    log::debug!(
                        "Ignoring persisted setting with wrong type: id={}, expected={}, value={raw}",
                        descriptor.id,
                        descriptor.kind
                    );
                }
                descriptor.default.clone()
            }
        };
        values.insert(descriptor.id.clone(), value);
    }

    let unknown = stored
        .map(|s| {
            s.iter()
                .filter(|(id, _)| schema.get(id).is_none())
                .map(|(id, v)| (id.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();

    SettingsMap { values, unknown }
}

/// Everything the bridge persists through the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginData {
    pub settings: SettingsMap,
    /// Raw notification records; only the ones rewritten through the store change
    pub notifications: BTreeMap<NotificationId, Value>,
    /// Top-level keys this crate does not interpret
    pub extra: Map<String, Value>,
}

impl PluginData {
    /// Loads plugin data, applying defaults for anything missing or mistyped.
    pub fn load(schema: &SettingsSchema, persisted: Option<&Value>) -> Self {
        let settings = load_settings(schema, persisted);

        let notifications = persisted
            .and_then(|blob| blob.get(KEY_NOTIFICATIONS))
            .and_then(Value::as_object)
            .map(|stored| stored.iter().map(|(id, raw)| (id.clone(), raw.clone())).collect())
            .unwrap_or_default();

        let extra = persisted
            .and_then(Value::as_object)
            .map(|blob| {
                blob.iter()
                    .filter(|(k, _)| k.as_str() != KEY_SETTINGS && k.as_str() != KEY_NOTIFICATIONS)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            settings,
            notifications,
            extra,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert(KEY_SETTINGS.to_string(), self.settings.to_json());
        let notifications: Map<String, Value> = self
            .notifications
            .iter()
            .map(|(id, raw)| (id.clone(), raw.clone()))
            .collect();
        out.insert(KEY_NOTIFICATIONS.to_string(), Value::Object(notifications));
        Value::Object(out)
    }
}

struct StoreInner {
    schema: SettingsSchema,
    data: Mutex<PluginData>,
    watchers: Mutex<HashMap<String, Vec<SettingWatcher>>>,
    save: SaveCallback,
}

/// Shared handle to the plugin's settings.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<StoreInner>,
}

impl SettingsStore {
    /// Creates a store from a persisted blob.
    ///
    /// # Arguments
    ///
    /// * `schema` - Descriptors defining the known settings
    /// * `persisted` - Blob returned by the host persistence API, if any
    /// * `save` - Invoked with the full blob after every mutation
    pub fn new(schema: SettingsSchema, persisted: Option<&Value>, save: SaveCallback) -> Self {
        let data = PluginData::load(&schema, persisted);
        log::debug!(
            "Settings loaded: known={}, unknown={}, notifications={}",
            data.settings.len(),
            data.settings.unknown().len(),
            data.notifications.len()
        );
        Self {
            inner: Arc::new(StoreInner {
                schema,
                data: Mutex::new(data),
                watchers: Mutex::new(HashMap::new()),
                save,
            }),
        }
    }

    pub fn schema(&self) -> &SettingsSchema {
        &self.inner.schema
    }

    /// Current value of a setting, `None` for ids outside the schema.
    pub fn get(&self, id: &str) -> Option<SettingValue> {
        lock_unpoisoned(&self.inner.data).settings.get(id).cloned()
    }

    /// Current value as the protocol client sees it (`"true"`/`"false"` for booleans).
    pub fn get_raw(&self, id: &str) -> Option<String> {
        self.get(id).map(|v| v.to_raw())
    }

    pub fn get_bool(&self, id: &str) -> Option<bool> {
        self.get(id).and_then(|v| v.as_bool())
    }

    /// Writes a typed value.
    ///
    /// Unknown ids are ignored so clients built against a newer or older
    /// schema keep working.
    ///
    /// # Errors
    ///
    /// `SettingTypeMismatch` if `value` does not match the descriptor kind.
    pub fn set(&self, id: &str, value: SettingValue) -> Result<(), BridgeError> {
        let Some(kind) = self.inner.schema.kind_of(id) else {
            log::debug!("Ignoring write to unknown setting: id={id}");
            return Ok(());
        };
        if value.kind() != kind {
            return Err(BridgeError::SettingTypeMismatch {
                id: id.to_string(),
                expected: kind,
                actual: value.kind(),
            });
        }
        self.write(id, value);
        Ok(())
    }

    /// Writes an untyped value coming from the protocol client.
    pub fn set_raw(&self, id: &str, raw: &str) {
        match self.inner.schema.kind_of(id) {
            Some(kind) => self.write(id, SettingValue::coerce(kind, raw)),
            None => log::debug!("Ignoring write to unknown setting: id={id}"),
        }
    }

    /// Registers a side channel run synchronously whenever `id` is written.
    pub fn watch(&self, id: &str, watcher: SettingWatcher) {
        lock_unpoisoned(&self.inner.watchers)
            .entry(id.to_string())
            .or_default()
            .push(watcher);
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> SettingsMap {
        lock_unpoisoned(&self.inner.data).settings.clone()
    }

    /// Full persisted blob as it would be saved now.
    pub fn to_json(&self) -> Value {
        lock_unpoisoned(&self.inner.data).to_json()
    }

    /// Applies `f` to the data, then saves.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut PluginData) -> R) -> R {
        let (result, blob) = {
            let mut data = lock_unpoisoned(&self.inner.data);
            let result = f(&mut data);
            (result, data.to_json())
        };
        (self.inner.save)(blob);
        result
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&PluginData) -> R) -> R {
        f(&lock_unpoisoned(&self.inner.data))
    }

    fn write(&self, id: &str, value: SettingValue) {
        debug_assert_eq!(self.inner.schema.kind_of(id), Some(value.kind()));

        lock_unpoisoned(&self.inner.data)
            .settings
            .values
            .insert(id.to_string(), value.clone());
        log::debug!("Setting changed: id={id}, kind={}", value.kind());

        let watchers = lock_unpoisoned(&self.inner.watchers)
            .get(id)
            .cloned()
            .unwrap_or_default();
        for watcher in watchers {
            watcher(&value);
        }

        // Watchers may write again; save whatever is current once they return.
        let blob = self.to_json();
        (self.inner.save)(blob);
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.snapshot())
            .finish()
    }
}
