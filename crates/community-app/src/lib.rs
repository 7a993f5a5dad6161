pub mod appearance;
pub mod board;
pub mod chat;
pub mod commands;
pub mod config;
pub mod latest;
pub mod page;
pub mod poller;
pub mod state_file;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a view-state mutex. A panic elsewhere never leaves these in a state
/// worth refusing to read, so poisoning is ignored.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
