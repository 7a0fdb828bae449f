//! Notifications persisted alongside settings.
//!
//! The protocol client keeps its pending notifications (share invitations and
//! the like) in the plugin data so they survive a restart. Records are stored
//! as raw JSON; the typed view is built on read and records it cannot read
//! are skipped there but still written back.

use serde_json::Value;
use uuid::Uuid;

use crate::api::types::{Notification, NotificationId};
use crate::settings::store::SettingsStore;

fn parse_record(id: &str, raw: &Value) -> Option<Notification> {
    match serde_json::from_value::<Notification>(raw.clone()) {
        Ok(mut notification) => {
            if notification.uuid.is_empty() {
                notification.uuid = id.to_string();
            }
            Some(notification)
        }
        Err(e) => {
            log::debug!("Skipping unreadable notification: id={id}, error={e}");
            None
        }
    }
}

impl SettingsStore {
    /// All readable notifications, ordered by id.
    pub fn notifications(&self) -> Vec<Notification> {
        self.read(|data| {
            data.notifications
                .iter()
                .filter_map(|(id, raw)| parse_record(id, raw))
                .collect()
        })
    }

    pub fn notification(&self, id: &str) -> Option<Notification> {
        self.read(|data| data.notifications.get(id).and_then(|raw| parse_record(id, raw)))
    }

    /// Inserts or replaces a notification and saves.
    ///
    /// A notification without a uuid gets a fresh UUID v4.
    pub fn save_notification(&self, mut notification: Notification) -> NotificationId {
        if notification.uuid.trim().is_empty() {
            notification.uuid = Uuid::new_v4().to_string();
        }
        let id = notification.uuid.clone();
        let record = match serde_json::to_value(&notification) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Failed to serialize notification: id={id}, error={e}");
                return id;
            }
        };
        self.mutate(|data| {
            data.notifications.insert(id.clone(), record);
        });
        log::debug!("Notification saved: id={id}");
        id
    }

    /// Removes a notification, saving only if one was removed.
    pub fn remove_notification(&self, id: &str) -> bool {
        let exists = self.read(|data| data.notifications.contains_key(id));
        if !exists {
            log::debug!("Notification remove for unknown id: id={id}");
            return false;
        }
        self.mutate(|data| data.notifications.remove(id).is_some())
    }
}
