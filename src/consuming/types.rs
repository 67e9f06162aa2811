//! Effect-producing handler.

use std::fmt;

/// Performs a side effect for a matched key.
pub struct Action<K: ?Sized> {
    perform: Box<dyn Fn(&K) + Send + Sync>,
}

impl<K: ?Sized> Action<K> {
    /// Wraps a key-consuming procedure.
    pub fn new<F>(perform: F) -> Self
    where
        F: Fn(&K) + Send + Sync + 'static,
    {
        Self {
            perform: Box::new(perform),
        }
    }

    /// Runs the action against `key`.
    pub fn call(&self, key: &K) {
        (self.perform)(key);
    }
}

impl<K: ?Sized> fmt::Debug for Action<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").finish_non_exhaustive()
    }
}
