//! Recording fakes of the host traits, shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::types::{BridgeError, CommandEligibility, CommandMode, OverlayRequest};
use crate::protocols::client::{CommandCallback, ProtocolClient};
use crate::protocols::host::{
    CommandTrampoline, HostCommand, HostCommands, HostNotices, HostOverlays, HostPersistence,
};
use crate::settings::store::SaveCallback;

/// Callback counting its invocations.
pub fn counter() -> (CommandCallback, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let callback: CommandCallback = Arc::new(move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });
    (callback, calls)
}

/// Host command palette that records registrations.
#[derive(Default)]
pub struct FakeHostCommands {
    registered: Mutex<Vec<String>>,
    trampolines: Mutex<HashMap<String, CommandTrampoline>>,
}

impl FakeHostCommands {
    pub fn registration_count(&self) -> usize {
        self.registered.lock().unwrap().len()
    }

    pub fn registered_ids(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    /// Calls the trampoline registered under `id`, `None` if nothing is registered.
    pub fn invoke(&self, id: &str, mode: CommandMode) -> Option<CommandEligibility> {
        let trampoline = self.trampolines.lock().unwrap().get(id).cloned()?;
        Some(trampoline(mode))
    }
}

impl HostCommands for FakeHostCommands {
    fn register_command(&self, command: HostCommand) {
        let mut trampolines = self.trampolines.lock().unwrap();
        assert!(
            !trampolines.contains_key(&command.id),
            "host id registered twice: {}",
            command.id
        );
        trampolines.insert(command.id.clone(), command.trampoline);
        self.registered.lock().unwrap().push(command.id);
    }
}

#[derive(Default)]
pub struct RecordingNotices {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotices {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl HostNotices for RecordingNotices {
    fn show(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingOverlays {
    rendered: Mutex<Vec<OverlayRequest>>,
}

impl RecordingOverlays {
    pub fn ids(&self) -> Vec<String> {
        self.rendered
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.id.clone())
            .collect()
    }
}

impl HostOverlays for RecordingOverlays {
    fn render(&self, overlay: OverlayRequest) {
        self.rendered.lock().unwrap().push(overlay);
    }
}

/// In-memory host persistence.
#[derive(Default)]
pub struct MemoryPersistence {
    stored: Mutex<Option<Value>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryPersistence {
    pub fn preload(&self, value: Value) {
        *self.stored.lock().unwrap() = Some(value);
    }

    pub fn stored(&self) -> Option<Value> {
        self.stored.lock().unwrap().clone()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HostPersistence for MemoryPersistence {
    async fn load(&self) -> Result<Option<Value>, BridgeError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(BridgeError::IoError {
                message: "load failed".to_string(),
            });
        }
        Ok(self.stored())
    }

    async fn save(&self, data: Value) -> Result<(), BridgeError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BridgeError::IoError {
                message: "save failed".to_string(),
            });
        }
        *self.stored.lock().unwrap() = Some(data);
        Ok(())
    }
}

/// Synchronous save callback that keeps every blob it receives.
#[derive(Clone, Default)]
pub struct RecordingSaver {
    saves: Arc<Mutex<Vec<Value>>>,
}

impl RecordingSaver {
    pub fn callback(&self) -> SaveCallback {
        let saves = Arc::clone(&self.saves);
        Arc::new(move |blob| saves.lock().unwrap().push(blob))
    }

    pub fn count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Value> {
        self.saves.lock().unwrap().last().cloned()
    }
}

/// Protocol client that only counts unloads.
#[derive(Clone, Default)]
pub struct FakeClient {
    unloads: Arc<AtomicUsize>,
}

impl FakeClient {
    pub fn unload_count(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }
}

impl ProtocolClient for FakeClient {
    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }
}
