//! ClientAdapter - runtime implementation of the ClientHost trait.
//!
//! This module wires the settings store and the command registry into the
//! callback object the external protocol client consumes, and returns the
//! teardown handle that undoes the wiring.
//!
//! Key design principle: the adapter only composes. Settings semantics live in
//! `SettingsStore`, command semantics in `CommandRegistry`.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::api::types::{
    AppLog, BridgeError, LogIntent, Notification, NotificationId, OverlayRequest, SettingValue,
};
use crate::commands::registry::CommandRegistry;
use crate::config::BridgeConfig;
use crate::protocols::client::{ClientHost, CommandCallback, ProtocolClientFactory};
use crate::protocols::host::{HostBindings, HostNotices, HostOverlays};
use crate::runtime::flags::FeatureFlags;
use crate::runtime::persistence::SaveQueue;
use crate::runtime::teardown::{Teardown, TeardownFn};
use crate::settings::schema::SettingsSchema;
use crate::settings::store::{SaveCallback, SettingsStore};

/// Extra protocol wired next to the client (e.g. page sharing).
///
/// Receives the adapter and returns its own teardown step.
pub type ProtocolSetup = Box<dyn FnOnce(Arc<dyn ClientHost>) -> TeardownFn>;

/// Host-side implementation of `ClientHost`.
pub struct ClientAdapter {
    /// Host application name, fixed at construction
    app_name: String,
    /// Workspace name, fixed at construction
    workspace_name: String,
    settings: SettingsStore,
    registry: Arc<CommandRegistry>,
    notices: Arc<dyn HostNotices>,
    overlays: Option<Arc<dyn HostOverlays>>,
    flags: Arc<FeatureFlags>,
    ignored_log_ids: HashSet<String>,
    /// Present when saves go through the host persistence API
    save_queue: Option<SaveQueue>,
}

impl ClientAdapter {
    /// Load persisted data through the host and build the adapter.
    ///
    /// Must run inside a tokio runtime: saves are queued on a background task.
    /// A failing load is logged and treated as "nothing persisted".
    ///
    /// # Errors
    ///
    /// Returns the schema validation error if `config.schema` is invalid.
    pub async fn build(
        bindings: HostBindings,
        config: BridgeConfig,
    ) -> Result<Arc<Self>, BridgeError> {
        let schema = config.settings_schema()?;

        let persisted = match bindings.persistence.load().await {
            Ok(persisted) => persisted,
            Err(e) => {
                log::warn!("Failed to load plugin data, using defaults: {e}");
                None
            }
        };

        let save_queue = SaveQueue::start(Arc::clone(&bindings.persistence));
        let save = save_queue.callback();
        Ok(Self::assemble(
            bindings,
            &config,
            schema,
            persisted.as_ref(),
            save,
            Some(save_queue),
        ))
    }

    /// Build the adapter from an already loaded blob and a custom save callback.
    ///
    /// `bindings.persistence` is not used; `save` receives every write.
    pub fn with_save_callback(
        bindings: HostBindings,
        config: &BridgeConfig,
        persisted: Option<&Value>,
        save: SaveCallback,
    ) -> Result<Arc<Self>, BridgeError> {
        let schema = config.settings_schema()?;
        Ok(Self::assemble(bindings, config, schema, persisted, save, None))
    }

    fn assemble(
        bindings: HostBindings,
        config: &BridgeConfig,
        schema: SettingsSchema,
        persisted: Option<&Value>,
        save: SaveCallback,
        save_queue: Option<SaveQueue>,
    ) -> Arc<Self> {
        let settings = SettingsStore::new(schema, persisted, save);
        let flags = Arc::new(FeatureFlags::new());

        let live_diff_id = config.live_diff_setting_id.as_str();
        if let Some(enabled) = settings.get_bool(live_diff_id) {
            flags.set_granular_changes(enabled);
        }
        let watched_flags = Arc::clone(&flags);
        settings.watch(
            live_diff_id,
            Arc::new(move |value: &SettingValue| {
                if let Some(enabled) = value.as_bool() {
                    watched_flags.set_granular_changes(enabled);
                }
            }),
        );

        log::info!(
            "Client adapter built: app={}, workspace={}",
            config.app_name,
            bindings.workspace_name
        );

        Arc::new(Self {
            app_name: config.app_name.clone(),
            workspace_name: bindings.workspace_name,
            settings,
            registry: Arc::new(CommandRegistry::new(bindings.commands)),
            notices: bindings.notices,
            overlays: bindings.overlays,
            flags,
            ignored_log_ids: config.ignored_log_ids.iter().cloned().collect(),
            save_queue,
        })
    }

    /// Start the protocol client and any extra protocols.
    ///
    /// Unloading the returned handle runs, in order: the extra protocols'
    /// teardowns, the client's `unload`, then disables every command.
    pub fn connect(
        self: &Arc<Self>,
        factory: &dyn ProtocolClientFactory,
        protocols: Vec<ProtocolSetup>,
    ) -> Teardown {
        let host: Arc<dyn ClientHost> = Arc::clone(self) as Arc<dyn ClientHost>;
        let client = factory.setup(Arc::clone(&host));

        let mut steps: Vec<TeardownFn> = protocols
            .into_iter()
            .map(|setup| setup(Arc::clone(&host)))
            .collect();
        steps.push(Box::new(move || client.unload()));
        let registry = Arc::clone(&self.registry);
        steps.push(Box::new(move || {
            log::debug!("Disabling client commands: labels={:?}", registry.labels());
            registry.disable_all();
        }));

        log::info!("Protocol client connected: workspace={}", self.workspace_name);
        Teardown::new(steps)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Flags shared with the sharing protocol.
    pub fn flags(&self) -> Arc<FeatureFlags> {
        Arc::clone(&self.flags)
    }

    /// Wait for queued saves to reach the host. No-op with a custom save callback.
    pub async fn flush(&self) {
        if let Some(queue) = &self.save_queue {
            queue.flush().await;
        }
    }
}

impl ClientHost for ClientAdapter {
    fn app(&self) -> &str {
        &self.app_name
    }

    fn workspace(&self) -> &str {
        &self.workspace_name
    }

    fn get_setting(&self, id: &str) -> Option<String> {
        self.settings.get_raw(id)
    }

    fn set_setting(&self, id: &str, value: &str) {
        self.settings.set_raw(id, value);
    }

    fn add_command(&self, label: &str, callback: CommandCallback) {
        if let Err(e) = self.registry.add(label, callback) {
            log::error!("Failed to add command: label={label}, error={e}");
        }
    }

    fn remove_command(&self, label: &str) {
        self.registry.remove(label);
    }

    fn on_app_log(&self, event: AppLog) {
        match event.intent {
            LogIntent::Debug => log::debug!("[{}] {}", event.id, event.content),
            LogIntent::Info | LogIntent::Success => log::info!("[{}] {}", event.id, event.content),
            LogIntent::Warning => log::warn!("[{}] {}", event.id, event.content),
            LogIntent::Error => log::error!("[{}] {}", event.id, event.content),
        }

        if event.intent == LogIntent::Debug || self.ignored_log_ids.contains(&event.id) {
            return;
        }
        self.notices.show(&event.content);
    }

    fn render_overlay(&self, overlay: OverlayRequest) {
        match &self.overlays {
            Some(overlays) => overlays.render(overlay),
            None => log::debug!("Host cannot render overlays, dropping: id={}", overlay.id),
        }
    }

    fn notifications(&self) -> Vec<Notification> {
        self.settings.notifications()
    }

    fn save_notification(&self, notification: Notification) -> NotificationId {
        self.settings.save_notification(notification)
    }

    fn remove_notification(&self, id: &str) {
        self.settings.remove_notification(id);
    }
}
