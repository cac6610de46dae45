//! Read-only views over controller state.
//!
//! A form controller owns its aggregate `valid`, `errors` and `dirty`
//! cells and is the only writer. Callers get a [`StateView`] instead: they
//! can read the current value and watch for changes, but cannot set it.

use std::fmt;

use super::observable::{Observable, Subscription};

/// Read side of an [`Observable`] owned by someone else.
pub struct StateView<T> {
    source: Observable<T>,
}

impl<T> Clone for StateView<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateView").field(&self.source).finish()
    }
}

impl<T: Clone + PartialEq + 'static> StateView<T> {
    #[must_use]
    pub fn of(source: &Observable<T>) -> Self {
        Self {
            source: source.clone(),
        }
    }

    /// Current value; never stale.
    #[must_use]
    pub fn get(&self) -> T {
        self.source.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.source.with(f)
    }

    /// Bumped once per change of the underlying value.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.source.version()
    }

    /// Whether the value changed after `version` was read.
    #[must_use]
    pub fn changed_since(&self, version: u64) -> bool {
        self.source.version() != version
    }

    /// Be told about every change until the guard drops.
    pub fn watch(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.source.subscribe(callback)
    }
}
