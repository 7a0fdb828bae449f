//! Runtime modules for wiring the bridge into a running host.
//!
//! The runtime domain handles the composition: the client adapter, the
//! ordered save queue, feature flags, and teardown.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod adapter;
pub mod flags;
pub mod persistence;
pub mod teardown;

/// Locks a mutex, recovering the data if a callback panicked while holding it.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
