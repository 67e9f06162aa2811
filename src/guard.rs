//! Guard predicates and runtime type narrowing.
//!
//! A guard is any `Fn(&K) -> bool + Send + Sync`. The builders here cover
//! the common shapes: accept everything, accept one value, accept one
//! runtime type.

use std::any::Any;
use std::sync::Arc;

/// Runtime type narrowing for keys.
///
/// Implemented for the `dyn Any` family and forwarded through `Box`, `Arc`
/// and `&`. Key types behind a custom trait object opt in by making
/// `Narrow` a supertrait and returning `self` from each concrete type:
///
/// ```
/// use std::any::Any;
/// use u_patterns::guard::Narrow;
///
/// trait Shape: Narrow {}
///
/// struct Circle;
/// impl Shape for Circle {}
/// impl Narrow for Circle {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let key: Box<dyn Shape> = Box::new(Circle);
/// assert!(key.narrow::<Circle>().is_some());
/// ```
pub trait Narrow {
    /// Returns the concrete value as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns a `T`-typed view of the value if it is a `T`.
    fn narrow<T: Any>(&self) -> Option<&T>
    where
        Self: Sized,
    {
        self.as_any().downcast_ref::<T>()
    }
}

impl Narrow for dyn Any {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Narrow for dyn Any + Send {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Narrow for dyn Any + Send + Sync {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<N: Narrow + ?Sized> Narrow for Box<N> {
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
}

impl<N: Narrow + ?Sized> Narrow for Arc<N> {
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
}

impl<N: Narrow + ?Sized> Narrow for &N {
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
}

/// Narrows `key` to `T`, or returns `None` if it is some other type.
pub fn narrow<T: Any, K: Narrow + ?Sized>(key: &K) -> Option<&T> {
    key.as_any().downcast_ref::<T>()
}

/// Guard accepting every key. Used to declare a trailing default rule.
pub fn always<K: ?Sized + 'static>() -> impl Fn(&K) -> bool + Send + Sync + 'static {
    |_: &K| true
}

/// Guard accepting keys equal to `target`.
pub fn equals_to<K>(target: K) -> impl Fn(&K) -> bool + Send + Sync + 'static
where
    K: PartialEq + Send + Sync + 'static,
{
    move |key: &K| *key == target
}

/// Guard accepting keys that narrow to `T`.
pub fn is_type<T, K>() -> impl Fn(&K) -> bool + Send + Sync + 'static
where
    T: Any,
    K: Narrow + ?Sized + 'static,
{
    |key: &K| narrow::<T, K>(key).is_some()
}

/// Guard accepting keys that narrow to `T` and then satisfy `predicate`.
///
/// `predicate` only ever sees a narrowed `&T`; keys of other types are
/// rejected without calling it.
pub fn is_type_and<T, K, P>(predicate: P) -> impl Fn(&K) -> bool + Send + Sync + 'static
where
    T: Any,
    K: Narrow + ?Sized + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    move |key: &K| narrow::<T, K>(key).is_some_and(|t| predicate(t))
}
