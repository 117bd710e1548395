//! Load-once resources shared read-only for the life of the process.

use crate::error::YieldError;
use std::sync::{Arc, OnceLock};

/// A resource initialized at most once, then served as an immutable snapshot.
///
/// Concurrent first callers block on the same initialization instead of
/// racing. The outcome, value or failure, is fixed for the process lifetime:
/// there is no invalidation and no retry.
pub struct ResourceCell<T> {
    name: &'static str,
    slot: OnceLock<Result<Arc<T>, YieldError>>,
}

impl<T> ResourceCell<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return the cached value, running `load` only if this is the first call.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<T>, YieldError>
    where
        F: FnOnce() -> Result<T, YieldError>,
    {
        let outcome = self.slot.get_or_init(|| {
            tracing::debug!(resource = self.name, "Initializing shared resource");
            load().map(Arc::new)
        });
        match outcome {
            Ok(value) => Ok(Arc::clone(value)),
            Err(e) => {
                tracing::debug!(resource = self.name, error = %e, "Shared resource unavailable");
                Err(e.replay())
            }
        }
    }

    /// The cached value, if initialization already succeeded.
    pub fn get(&self) -> Option<Arc<T>> {
        match self.slot.get() {
            Some(Ok(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }
}
