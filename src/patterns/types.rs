//! Value-producing handler.

use std::fmt;

/// Produces a value for a matched key.
///
/// A handler may produce nothing (`None`). [`Patterns::get`] reports that as
/// [`DispatchError::NullResult`]; the optional and default-bearing entry
/// points treat it like a miss.
///
/// Handlers are built with [`then`], [`then_supply`], [`then_apply`],
/// [`then_apply_optional`] or [`nothing`].
///
/// [`Patterns::get`]: super::Patterns::get
/// [`DispatchError::NullResult`]: crate::DispatchError::NullResult
/// [`then`]: super::then
/// [`then_supply`]: super::then_supply
/// [`then_apply`]: super::then_apply
/// [`then_apply_optional`]: super::then_apply_optional
/// [`nothing`]: super::nothing
pub struct Handler<K: ?Sized, V> {
    produce: Box<dyn Fn(&K) -> Option<V> + Send + Sync>,
}

impl<K: ?Sized, V> Handler<K, V> {
    /// Wraps a key-to-optional-value function.
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn(&K) -> Option<V> + Send + Sync + 'static,
    {
        Self {
            produce: Box::new(produce),
        }
    }

    /// Runs the handler against `key`.
    pub fn call(&self, key: &K) -> Option<V> {
        (self.produce)(key)
    }
}

impl<K: ?Sized, V> fmt::Debug for Handler<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
