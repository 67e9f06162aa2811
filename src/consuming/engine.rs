//! Effect-producing evaluator.

use std::fmt;

use super::rules::EffectRule;
use super::types::Action;
use crate::error::{DispatchError, DEFAULT_CONSUMER_HINT};
use crate::rule::{Rule, RuleSet};

/// Runs the action of the first rule whose guard accepts a key.
///
/// Same lookup as [`Patterns`](crate::patterns::Patterns), but actions
/// return nothing, so there is no optional form and no empty-result check.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
/// use u_patterns::consuming::{then_accept_with, when, ConsumingPatterns};
/// use u_patterns::guard::equals_to;
///
/// let last = Arc::new(AtomicI32::new(0));
/// let sink = Arc::clone(&last);
/// let patterns = ConsumingPatterns::of(vec![when(
///     equals_to(3),
///     then_accept_with(move |k: &i32| sink.store(*k, Ordering::SeqCst)),
/// )]);
///
/// patterns.handle(&3).unwrap();
/// assert_eq!(last.load(Ordering::SeqCst), 3);
/// assert!(patterns.handle(&2).is_err());
/// ```
pub struct ConsumingPatterns<K: ?Sized> {
    rules: RuleSet<K, Action<K>>,
}

impl<K: ?Sized> ConsumingPatterns<K> {
    /// Creates an evaluator over `rules`, evaluated in the given order.
    pub fn of(rules: Vec<EffectRule<K>>) -> Self {
        Self::from_rule_set(RuleSet::from_rules(rules))
    }

    /// Creates an evaluator over a shared rule list.
    pub fn from_rule_set(rules: RuleSet<K, Action<K>>) -> Self {
        Self { rules }
    }

    /// Returns the number of rules currently in the list.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Runs the matching action, or `fallback` if no rule matched.
    pub fn handle_or<F>(&self, key: &K, fallback: F)
    where
        F: FnOnce(&K),
    {
        match self.rules.find(key) {
            Some(rule) => rule.handler().call(key),
            None => fallback(key),
        }
    }

    /// Runs the matching action, or fails with `failure()` if no rule
    /// matched. `failure` is only called on a miss.
    ///
    /// Actions cannot fail, so there is no catch-all rule that raises an
    /// error; a caller-typed failure for unmatched keys comes from here.
    ///
    /// ```
    /// use u_patterns::consuming::{do_nothing, when, ConsumingPatterns};
    /// use u_patterns::guard::equals_to;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Unsupported(i32);
    ///
    /// let patterns = ConsumingPatterns::of(vec![when(equals_to(1), do_nothing())]);
    /// assert_eq!(patterns.handle_or_fail(&1, || Unsupported(1)), Ok(()));
    /// assert_eq!(patterns.handle_or_fail(&7, || Unsupported(7)), Err(Unsupported(7)));
    /// ```
    pub fn handle_or_fail<E, F>(&self, key: &K, failure: F) -> Result<(), E>
    where
        F: FnOnce() -> E,
    {
        let rule = self.rules.find(key).ok_or_else(failure)?;
        rule.handler().call(key);
        Ok(())
    }

    /// Returns a procedure handling keys with `fallback` for misses.
    pub fn or_else_do<'a, F>(&'a self, fallback: F) -> impl Fn(&K) + 'a
    where
        F: Fn(&K) + 'a,
    {
        move |key: &K| self.handle_or(key, &fallback)
    }

    /// Returns a procedure handling keys and failing with `failure()` on a
    /// miss.
    pub fn or_else_throw<'a, E, F>(&'a self, failure: F) -> impl Fn(&K) -> Result<(), E> + 'a
    where
        F: Fn() -> E + 'a,
    {
        move |key: &K| self.handle_or_fail(key, &failure)
    }
}

impl<K: fmt::Debug + ?Sized> ConsumingPatterns<K> {
    /// Runs the action of the first rule accepting `key`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NoMatchingRule`] if no guard accepts `key`. The key
    /// is rendered with `Debug`.
    pub fn handle(&self, key: &K) -> Result<(), DispatchError> {
        let result = self
            .handle_or_fail(key, || DispatchError::no_matching_rule(key, DEFAULT_CONSUMER_HINT));

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::debug!(error = %err, "required handling failed");
        }

        result
    }

    /// Direct invocation; same as [`handle`](Self::handle).
    pub fn accept(&self, key: &K) -> Result<(), DispatchError> {
        self.handle(key)
    }

    /// Returns a procedure equivalent to [`handle`](Self::handle).
    pub fn as_fn(&self) -> impl Fn(&K) -> Result<(), DispatchError> + '_ {
        move |key: &K| self.handle(key)
    }
}

impl<K: fmt::Debug> ConsumingPatterns<K> {
    /// Handles keys in order, stopping at the first key no rule accepts.
    ///
    /// Keys before the failing one have already been handled.
    pub fn handle_all(&self, keys: &[K]) -> Result<(), DispatchError> {
        keys.iter().try_for_each(|key| self.handle(key))
    }
}

impl<K: ?Sized> Clone for ConsumingPatterns<K> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<K: ?Sized> From<RuleSet<K, Action<K>>> for ConsumingPatterns<K> {
    fn from(rules: RuleSet<K, Action<K>>) -> Self {
        Self::from_rule_set(rules)
    }
}

impl<K: ?Sized> FromIterator<Rule<K, Action<K>>> for ConsumingPatterns<K> {
    fn from_iter<I: IntoIterator<Item = Rule<K, Action<K>>>>(iter: I) -> Self {
        Self::from_rule_set(iter.into_iter().collect())
    }
}

impl<K: ?Sized> fmt::Debug for ConsumingPatterns<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumingPatterns")
            .field("rules", &self.rules)
            .finish()
    }
}
