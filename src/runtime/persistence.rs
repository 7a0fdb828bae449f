//! Persistence plumbing: the ordered save queue and a JSON file backend.
//!
//! Saves are fire-and-forget for the code that changes a setting. They go
//! through a single queue so a slow write can never land after a newer one.
//!
//! # File layout
//!
//! ```text
//! <plugin_dir>/
//! └── data.json    # settings + notifications, pretty-printed
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::api::types::BridgeError;
use crate::protocols::host::HostPersistence;
use crate::settings::store::SaveCallback;

enum SaveMessage {
    Save(Value),
    Flush(oneshot::Sender<()>),
}

/// Serializes saves onto the host persistence API.
///
/// Must be started inside a tokio runtime. The background task ends once the
/// queue and every callback it handed out are dropped.
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveMessage>,
}

impl SaveQueue {
    pub fn start(persistence: Arc<dyn HostPersistence>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_save_loop(persistence, rx));
        Self { tx }
    }

    /// Callback for `SettingsStore` that enqueues a save.
    pub fn callback(&self) -> SaveCallback {
        let tx = self.tx.clone();
        Arc::new(move |blob| {
            if tx.send(SaveMessage::Save(blob)).is_err() {
                log::warn!("Save queue closed, plugin data not saved");
            }
        })
    }

    /// Waits until every save enqueued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SaveMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_save_loop(
    persistence: Arc<dyn HostPersistence>,
    mut rx: mpsc::UnboundedReceiver<SaveMessage>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            SaveMessage::Save(mut blob) => {
                // Only the newest queued blob matters; stop at a flush marker.
                let mut flush = None;
                while let Ok(next) = rx.try_recv() {
                    match next {
                        SaveMessage::Save(newer) => blob = newer,
                        SaveMessage::Flush(done) => {
                            flush = Some(done);
                            break;
                        }
                    }
                }

                match persistence.save(blob).await {
                    Ok(()) => log::trace!("Plugin data saved"),
                    Err(e) => log::warn!("Failed to save plugin data: {e}"),
                }

                if let Some(done) = flush {
                    let _ = done.send(());
                }
            }
            SaveMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    log::debug!("Save queue closed");
}

/// Stores the plugin data blob as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// # Arguments
    ///
    /// * `dir` - Plugin directory, created on first save
    /// * `file_name` - Data file name (usually "data.json")
    pub fn new(dir: impl Into<PathBuf>, file_name: &str) -> Self {
        Self {
            path: dir.into().join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HostPersistence for JsonFileStore {
    async fn load(&self) -> Result<Option<Value>, BridgeError> {
        let path = self.path.clone();
        // std::fs inside spawn_blocking keeps the event loop free
        tokio::task::spawn_blocking(move || read_blob(&path))
            .await
            .map_err(|e| BridgeError::IoError {
                message: format!("Load task failed: {e}"),
            })?
    }

    async fn save(&self, data: Value) -> Result<(), BridgeError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_blob(&path, &data))
            .await
            .map_err(|e| BridgeError::IoError {
                message: format!("Save task failed: {e}"),
            })?
    }
}

fn read_blob(path: &Path) -> Result<Option<Value>, BridgeError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BridgeError::IoError {
                message: format!("Failed to read '{}': {e}", path.display()),
            })
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!(
                "Failed to parse plugin data, starting from defaults: path={}, error={e}",
                path.display()
            );
            Ok(None)
        }
    }
}

fn write_blob(path: &Path, data: &Value) -> Result<(), BridgeError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BridgeError::IoError {
            message: format!("Failed to create directory '{}': {e}", parent.display()),
        })?;
    }

    let bytes = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes).map_err(|e| BridgeError::IoError {
        message: format!("Failed to write '{}': {e}", tmp.display()),
    })?;
    std::fs::rename(&tmp, path).map_err(|e| BridgeError::IoError {
        message: format!("Failed to replace '{}': {e}", path.display()),
    })
}
