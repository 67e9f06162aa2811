//! Rule and handler constructors for [`Patterns`](super::Patterns).

use std::any::Any;

use super::types::Handler;
use crate::guard::{always, is_type, is_type_and, narrow, Narrow};
use crate::rule::Rule;

/// Value rule: a guard paired with a [`Handler`].
pub type ValueRule<K, V> = Rule<K, Handler<K, V>>;

/// Declares a rule: when `guard` accepts the key, `handler` produces the value.
///
/// # Examples
///
/// ```
/// use u_patterns::guard::equals_to;
/// use u_patterns::patterns::{or_else, then, then_apply, when, Patterns};
///
/// let describe = Patterns::of(vec![
///     when(equals_to(0), then("zero".to_string())),
///     when(|n: &i32| *n < 0, then_apply(|n: &i32| format!("minus {}", -n))),
///     or_else(then_apply(|n: &i32| n.to_string())),
/// ]);
///
/// assert_eq!(describe.get(&-4).unwrap(), "minus 4");
/// assert_eq!(describe.get(&0).unwrap(), "zero");
/// assert_eq!(describe.get(&9).unwrap(), "9");
/// ```
pub fn when<K, V, G>(guard: G, handler: Handler<K, V>) -> ValueRule<K, V>
where
    K: ?Sized,
    G: Fn(&K) -> bool + Send + Sync + 'static,
{
    Rule::new(guard, handler)
}

/// Declares a rule accepting every key. Place it last to make the list
/// exhaustive.
pub fn or_else<K, V>(handler: Handler<K, V>) -> ValueRule<K, V>
where
    K: ?Sized + 'static,
{
    Rule::new(always::<K>(), handler)
}

/// Declares a catch-all rule that produces `Err(failure(key))`.
///
/// For rule lists whose value type is a `Result`, this ends the list with a
/// caller-typed failure instead of [`DispatchError::NoMatchingRule`].
///
/// [`DispatchError::NoMatchingRule`]: crate::DispatchError::NoMatchingRule
pub fn or_else_fail<K, T, E, F>(failure: F) -> ValueRule<K, Result<T, E>>
where
    K: ?Sized + 'static,
    T: 'static,
    E: 'static,
    F: Fn(&K) -> E + Send + Sync + 'static,
{
    Rule::new(always::<K>(), Handler::new(move |key: &K| Some(Err(failure(key)))))
}

/// Declares a rule matching keys whose runtime type is `T`.
///
/// `handler` receives the key narrowed to `&T`.
pub fn when_type<T, K, V>(handler: Handler<T, V>) -> ValueRule<K, V>
where
    T: Any,
    K: Narrow + ?Sized + 'static,
    V: 'static,
{
    Rule::new(is_type::<T, K>(), narrowed(handler))
}

/// Declares a rule matching keys whose runtime type is `T` and that then
/// satisfy `predicate`.
///
/// `predicate` is only called after the type check succeeds, so it may rely
/// on `T`'s shape.
pub fn when_type_if<T, K, V, P>(predicate: P, handler: Handler<T, V>) -> ValueRule<K, V>
where
    T: Any,
    K: Narrow + ?Sized + 'static,
    V: 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Rule::new(is_type_and::<T, K, P>(predicate), narrowed(handler))
}

fn narrowed<T, K, V>(handler: Handler<T, V>) -> Handler<K, V>
where
    T: Any,
    K: Narrow + ?Sized + 'static,
    V: 'static,
{
    Handler::new(move |key: &K| narrow::<T, K>(key).and_then(|t| handler.call(t)))
}

/// Handler returning a clone of `value` for every key.
pub fn then<K, V>(value: V) -> Handler<K, V>
where
    K: ?Sized + 'static,
    V: Clone + Send + Sync + 'static,
{
    Handler::new(move |_: &K| Some(value.clone()))
}

/// Handler ignoring the key and calling `supplier` on each match.
pub fn then_supply<K, V, S>(supplier: S) -> Handler<K, V>
where
    K: ?Sized + 'static,
    V: 'static,
    S: Fn() -> V + Send + Sync + 'static,
{
    Handler::new(move |_: &K| Some(supplier()))
}

/// Handler applying `function` to the key.
pub fn then_apply<K, V, F>(function: F) -> Handler<K, V>
where
    K: ?Sized + 'static,
    V: 'static,
    F: Fn(&K) -> V + Send + Sync + 'static,
{
    Handler::new(move |key: &K| Some(function(key)))
}

/// Handler applying a function that may produce nothing.
pub fn then_apply_optional<K, V, F>(function: F) -> Handler<K, V>
where
    K: ?Sized,
    F: Fn(&K) -> Option<V> + Send + Sync + 'static,
{
    Handler::new(function)
}

/// Handler that never produces a value.
pub fn nothing<K, V>() -> Handler<K, V>
where
    K: ?Sized + 'static,
    V: 'static,
{
    Handler::new(|_: &K| None)
}
