//! Teardown - the single handle that reverses setup.

use std::sync::Mutex;

use crate::runtime::lock_unpoisoned;

/// One step run on unload.
pub type TeardownFn = Box<dyn FnOnce() + Send>;

/// Runs its steps on the first `unload()`; later calls do nothing.
pub struct Teardown {
    steps: Mutex<Option<Vec<TeardownFn>>>,
}

impl Teardown {
    /// Steps run in the order given.
    pub fn new(steps: Vec<TeardownFn>) -> Self {
        Self {
            steps: Mutex::new(Some(steps)),
        }
    }

    pub fn unload(&self) {
        let steps = lock_unpoisoned(&self.steps).take();
        match steps {
            Some(steps) => {
                log::info!("Unloading bridge: steps={}", steps.len());
                for step in steps {
                    step();
                }
            }
            None => log::debug!("Bridge already unloaded"),
        }
    }

    pub fn is_unloaded(&self) -> bool {
        lock_unpoisoned(&self.steps).is_none()
    }
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Teardown")
            .field("unloaded", &self.is_unloaded())
            .finish()
    }
}
