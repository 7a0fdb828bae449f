//! Command registry - idempotent command registration on an add-only host API.
//!
//! The host registers each command id once and cannot unregister or disable
//! it. The registry hides this behind an indirection table keyed by label:
//!
//! ```text
//! label ──► { command_id, enabled, callback }
//!              ▲
//! host trampoline (one per label) looks the label up on every call
//! ```
//!
//! Per label: `UNREGISTERED -> REGISTERED(enabled)` on first `add`, then
//! `add`/`remove` only flip `enabled` and swap the callback. A label never
//! returns to `UNREGISTERED`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::api::types::{BridgeError, CommandEligibility, CommandId, CommandMode};
use crate::protocols::client::CommandCallback;
use crate::protocols::host::{CommandTrampoline, HostCommand, HostCommands};
use crate::runtime::lock_unpoisoned;

/// Derives the host-visible command id from a label.
///
/// Lower-cases the label and replaces every space with `-`
/// (`"Copy Link"` → `"copy-link"`). Other characters are kept as they are.
pub fn derive_command_id(label: &str) -> CommandId {
    label.to_lowercase().replace(' ', "-")
}

struct CommandEntry {
    command_id: CommandId,
    enabled: bool,
    callback: CommandCallback,
}

#[derive(Default)]
struct CommandTable {
    entries: HashMap<String, CommandEntry>,
    labels_by_id: HashMap<CommandId, String>,
}

/// Registry of commands exposed to the host on behalf of the protocol client.
pub struct CommandRegistry {
    host: Arc<dyn HostCommands>,
    table: Arc<Mutex<CommandTable>>,
}

impl CommandRegistry {
    pub fn new(host: Arc<dyn HostCommands>) -> Self {
        Self {
            host,
            table: Arc::new(Mutex::new(CommandTable::default())),
        }
    }

    /// Enable a command under `label`, making `callback` its current action.
    ///
    /// The first call for a label registers it with the host. Later calls only
    /// re-enable it and swap the callback.
    ///
    /// # Errors
    ///
    /// `CommandIdConflict` if a different label already derived the same id.
    pub fn add(&self, label: &str, callback: CommandCallback) -> Result<(), BridgeError> {
        let command_id = derive_command_id(label);

        {
            let mut table = lock_unpoisoned(&self.table);
            if let Some(entry) = table.entries.get_mut(label) {
                entry.enabled = true;
                entry.callback = callback;
                log::debug!("Command re-enabled: label={label}, id={}", entry.command_id);
                return Ok(());
            }

            if let Some(existing_label) = table.labels_by_id.get(&command_id) {
                log::warn!(
                    "Command id conflict: label={label}, id={command_id}, existing_label={existing_label}"
                );
                return Err(BridgeError::CommandIdConflict {
                    command_id,
                    label: label.to_string(),
                    existing_label: existing_label.clone(),
                });
            }

            table.entries.insert(
                label.to_string(),
                CommandEntry {
                    command_id: command_id.clone(),
                    enabled: true,
                    callback,
                },
            );
            table
                .labels_by_id
                .insert(command_id.clone(), label.to_string());
        }

        // Registered outside the lock: the host may probe the trampoline right away.
        self.host.register_command(HostCommand {
            id: command_id.clone(),
            name: label.to_string(),
            trampoline: trampoline(Arc::downgrade(&self.table), label.to_string()),
        });
        log::info!("Command registered: label={label}, id={command_id}");

        Ok(())
    }

    /// Disable the command under `label`. The host registration stays but
    /// reports `Ineligible` until the label is added again.
    pub fn remove(&self, label: &str) {
        let mut table = lock_unpoisoned(&self.table);
        match table.entries.get_mut(label) {
            Some(entry) => {
                entry.enabled = false;
                log::debug!("Command disabled: label={label}, id={}", entry.command_id);
            }
            None => log::debug!("Command remove for unknown label: label={label}"),
        }
    }

    /// Disable every command. Used on teardown.
    pub fn disable_all(&self) {
        let mut table = lock_unpoisoned(&self.table);
        for entry in table.entries.values_mut() {
            entry.enabled = false;
        }
        log::debug!("All commands disabled: count={}", table.entries.len());
    }

    pub fn is_enabled(&self, label: &str) -> bool {
        lock_unpoisoned(&self.table)
            .entries
            .get(label)
            .is_some_and(|e| e.enabled)
    }

    pub fn is_registered(&self, label: &str) -> bool {
        lock_unpoisoned(&self.table).entries.contains_key(label)
    }

    /// Registered labels, sorted.
    pub(crate) fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = lock_unpoisoned(&self.table).entries.keys().cloned().collect();
        labels.sort();
        labels
    }
}

/// Builds the host-side entry point for `label`.
///
/// The trampoline holds only a weak handle to the table, so a dropped registry
/// leaves the host with commands that report `Ineligible`.
fn trampoline(table: Weak<Mutex<CommandTable>>, label: String) -> CommandTrampoline {
    Arc::new(move |mode| {
        let Some(table) = table.upgrade() else {
            return CommandEligibility::Ineligible;
        };
        let callback = {
            let table = lock_unpoisoned(&table);
            match table.entries.get(&label) {
                Some(entry) if entry.enabled => Arc::clone(&entry.callback),
                _ => return CommandEligibility::Ineligible,
            }
        };
        if mode == CommandMode::Execute {
            log::debug!("Command invoked: label={label}");
            callback();
        }
        CommandEligibility::Eligible
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{counter, FakeHostCommands};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_derive_command_id() {
        assert_eq!(derive_command_id("Copy Link"), "copy-link");
        assert_eq!(derive_command_id("Share Page With Notebook"), "share-page-with-notebook");
        assert_eq!(derive_command_id("connect"), "connect");
        assert_eq!(derive_command_id("Two  Spaces"), "two--spaces");
    }

    #[test]
    fn test_re_add_swaps_callback_without_second_registration() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());
        let (first, first_calls) = counter();
        let (second, second_calls) = counter();

        registry.add("Copy Link", first).unwrap();
        registry.add("Copy Link", second).unwrap();
        let result = host.invoke("copy-link", CommandMode::Execute);

        assert_eq!(host.registration_count(), 1);
        assert_eq!(result, Some(CommandEligibility::Eligible));
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_command_is_ineligible() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());
        let (callback, calls) = counter();

        registry.add("Copy Link", callback).unwrap();
        registry.remove("Copy Link");

        assert_eq!(host.registered_ids(), vec!["copy-link".to_string()]);
        assert_eq!(
            host.invoke("copy-link", CommandMode::Check),
            Some(CommandEligibility::Ineligible)
        );
        assert_eq!(
            host.invoke("copy-link", CommandMode::Execute),
            Some(CommandEligibility::Ineligible)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(registry.is_registered("Copy Link"));
        assert!(!registry.is_enabled("Copy Link"));
    }

    #[test]
    fn test_re_add_after_remove_restores_without_registration() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());
        let (callback, calls) = counter();

        registry.add("Copy Link", callback.clone()).unwrap();
        registry.remove("Copy Link");
        registry.add("Copy Link", callback).unwrap();
        host.invoke("copy-link", CommandMode::Execute);

        assert_eq!(host.registration_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_mode_does_not_run_callback() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());
        let (callback, calls) = counter();

        registry.add("Connect", callback).unwrap();

        assert_eq!(
            host.invoke("connect", CommandMode::Check),
            Some(CommandEligibility::Eligible)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_unknown_label_is_noop() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());

        registry.remove("Never Added");

        assert!(!registry.is_registered("Never Added"));
        assert_eq!(host.registration_count(), 0);
    }

    #[test]
    fn test_conflicting_labels_rejected() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());
        let (callback, _) = counter();

        registry.add("Copy Link", callback.clone()).unwrap();
        let result = registry.add("copy link", callback);

        assert!(matches!(
            result,
            Err(BridgeError::CommandIdConflict { ref command_id, .. }) if command_id == "copy-link"
        ));
        assert_eq!(host.registration_count(), 1);
        assert!(!registry.is_registered("copy link"));
    }

    #[test]
    fn test_disable_all() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = CommandRegistry::new(host.clone());
        let (callback, calls) = counter();
        registry.add("Connect", callback.clone()).unwrap();
        registry.add("Disconnect", callback).unwrap();

        registry.disable_all();
        host.invoke("connect", CommandMode::Execute);
        host.invoke("disconnect", CommandMode::Execute);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.labels(), vec!["Connect".to_string(), "Disconnect".to_string()]);
    }

    #[test]
    fn test_callback_may_reenter_registry() {
        let host = Arc::new(FakeHostCommands::default());
        let registry = Arc::new(CommandRegistry::new(host.clone()));

        let inner = Arc::clone(&registry);
        registry
            .add("Disconnect", Arc::new(move || inner.remove("Disconnect")))
            .unwrap();
        host.invoke("disconnect", CommandMode::Execute);

        assert!(!registry.is_enabled("Disconnect"));
    }

    #[test]
    fn test_dropped_registry_leaves_ineligible_commands() {
        let host = Arc::new(FakeHostCommands::default());
        let (callback, calls) = counter();
        {
            let registry = CommandRegistry::new(host.clone());
            registry.add("Connect", callback).unwrap();
        }

        assert_eq!(
            host.invoke("connect", CommandMode::Execute),
            Some(CommandEligibility::Ineligible)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
