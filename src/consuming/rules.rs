//! Rule and action constructors for [`ConsumingPatterns`](super::ConsumingPatterns).

use std::any::Any;

use super::types::Action;
use crate::guard::{always, is_type, is_type_and, narrow, Narrow};
use crate::rule::Rule;

/// Effect rule: a guard paired with an [`Action`].
pub type EffectRule<K> = Rule<K, Action<K>>;

/// Declares a rule: when `guard` accepts the key, `action` runs with it.
pub fn when<K, G>(guard: G, action: Action<K>) -> EffectRule<K>
where
    K: ?Sized,
    G: Fn(&K) -> bool + Send + Sync + 'static,
{
    Rule::new(guard, action)
}

/// Declares a rule accepting every key.
pub fn or_else<K>(action: Action<K>) -> EffectRule<K>
where
    K: ?Sized + 'static,
{
    Rule::new(always::<K>(), action)
}

/// Declares a rule matching keys whose runtime type is `T`; `action`
/// receives the key narrowed to `&T`.
pub fn when_type<T, K>(action: Action<T>) -> EffectRule<K>
where
    T: Any,
    K: Narrow + ?Sized + 'static,
{
    Rule::new(is_type::<T, K>(), narrowed(action))
}

/// Declares a rule matching keys whose runtime type is `T` and that then
/// satisfy `predicate`. The predicate never sees keys of other types.
pub fn when_type_if<T, K, P>(predicate: P, action: Action<T>) -> EffectRule<K>
where
    T: Any,
    K: Narrow + ?Sized + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Rule::new(is_type_and::<T, K, P>(predicate), narrowed(action))
}

fn narrowed<T, K>(action: Action<T>) -> Action<K>
where
    T: Any,
    K: Narrow + ?Sized + 'static,
{
    Action::new(move |key: &K| {
        if let Some(t) = narrow::<T, K>(key) {
            action.call(t);
        }
    })
}

/// Action running `consumer` with the key.
pub fn then_accept_with<K, F>(consumer: F) -> Action<K>
where
    K: ?Sized,
    F: Fn(&K) + Send + Sync + 'static,
{
    Action::new(consumer)
}

/// Action that does nothing. Useful as a trailing "ignore the rest" rule.
pub fn do_nothing<K>() -> Action<K>
where
    K: ?Sized + 'static,
{
    Action::new(|_: &K| {})
}
