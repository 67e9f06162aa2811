//! Rules and the ordered rule list shared by both evaluators.
//!
//! # Ordering
//!
//! A [`RuleSet`] is evaluated strictly in declaration order. The first rule
//! whose guard accepts the key wins; the guards of later rules are never
//! called for that key. There is no indexing or caching: guards are
//! arbitrary predicates and rule lists are expected to be short.
//!
//! # Sharing
//!
//! A `RuleSet` is a handle. Cloning it yields another handle to the same
//! list, so rules pushed, inserted or removed through one handle are seen by
//! every evaluator built from another. An evaluator built with
//! [`Patterns::of`](crate::patterns::Patterns::of) owns the only handle and
//! is therefore frozen.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// An immutable `(guard, handler)` pair.
///
/// Built with the `when`/`or_else`/`when_type` constructors of
/// [`patterns`](crate::patterns) and [`consuming`](crate::consuming). Once
/// paired, the guard and handler are not individually reachable.
pub struct Rule<K: ?Sized, H> {
    guard: Box<dyn Fn(&K) -> bool + Send + Sync>,
    handler: H,
}

impl<K: ?Sized, H> Rule<K, H> {
    pub(crate) fn new<G>(guard: G, handler: H) -> Self
    where
        G: Fn(&K) -> bool + Send + Sync + 'static,
    {
        Self {
            guard: Box::new(guard),
            handler,
        }
    }

    /// Returns `true` if this rule applies to `key`.
    pub fn accepts(&self, key: &K) -> bool {
        (self.guard)(key)
    }

    pub(crate) fn handler(&self) -> &H {
        &self.handler
    }
}

impl<K: ?Sized, H> fmt::Debug for Rule<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").finish_non_exhaustive()
    }
}

/// Ordered, shareable list of rules.
///
/// # Locking
///
/// The guard scan runs under a recursive read lock and mutation takes the
/// write lock, so a list can be edited from one thread while another
/// evaluates it. Guards may evaluate the list again (a pending writer does
/// not block the nested read). The winning rule is cloned out before its
/// handler runs, which lets handlers edit the list. Guards must not edit the
/// list they are evaluated from: that deadlocks.
///
/// # Examples
///
/// ```
/// use u_patterns::patterns::{then, when, Patterns};
/// use u_patterns::guard::equals_to;
/// use u_patterns::RuleSet;
///
/// let rules = RuleSet::new();
/// let patterns: Patterns<i32, &str> = Patterns::from_rule_set(rules.clone());
/// assert_eq!(patterns.get_optionally(&1), None);
///
/// rules.push(when(equals_to(1), then("one")));
/// assert_eq!(patterns.get_optionally(&1), Some("one"));
/// ```
pub struct RuleSet<K: ?Sized, H> {
    rules: Arc<RwLock<Vec<Arc<Rule<K, H>>>>>,
}

impl<K: ?Sized, H> RuleSet<K, H> {
    /// Creates an empty rule list.
    pub fn new() -> Self {
        Self::from_rules(Vec::new())
    }

    /// Creates a rule list holding `rules` in order.
    pub fn from_rules(rules: Vec<Rule<K, H>>) -> Self {
        Self {
            rules: Arc::new(RwLock::new(rules.into_iter().map(Arc::new).collect())),
        }
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.read_recursive().len()
    }

    /// Returns `true` if the list holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.read_recursive().is_empty()
    }

    /// Appends a rule, evaluated after every existing one.
    pub fn push(&self, rule: Rule<K, H>) {
        self.rules.write().push(Arc::new(rule));
    }

    /// Inserts a rule at `index`, shifting later rules back.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, rule: Rule<K, H>) {
        self.rules.write().insert(index, Arc::new(rule));
    }

    /// Removes the rule at `index`, returning `false` if there is none.
    pub fn remove(&self, index: usize) -> bool {
        let mut rules = self.rules.write();
        if index < rules.len() {
            rules.remove(index);
            true
        } else {
            false
        }
    }

    /// Removes every rule.
    pub fn clear(&self) {
        self.rules.write().clear();
    }

    /// Returns `true` if `other` is a handle to the same list.
    pub fn shares_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rules, &other.rules)
    }

    /// Finds the first rule whose guard accepts `key`.
    pub(crate) fn find(&self, key: &K) -> Option<Arc<Rule<K, H>>> {
        let rules = self.rules.read_recursive();
        let found = rules.iter().position(|rule| rule.accepts(key));

        #[cfg(feature = "tracing")]
        match found {
            Some(index) => tracing::trace!(index, rules = rules.len(), "rule matched"),
            None => tracing::trace!(rules = rules.len(), "no rule matched"),
        }

        found.map(|index| Arc::clone(&rules[index]))
    }
}

impl<K: ?Sized, H> Clone for RuleSet<K, H> {
    fn clone(&self) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
        }
    }
}

impl<K: ?Sized, H> Default for RuleSet<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized, H> From<Vec<Rule<K, H>>> for RuleSet<K, H> {
    fn from(rules: Vec<Rule<K, H>>) -> Self {
        Self::from_rules(rules)
    }
}

impl<K: ?Sized, H> FromIterator<Rule<K, H>> for RuleSet<K, H> {
    fn from_iter<I: IntoIterator<Item = Rule<K, H>>>(iter: I) -> Self {
        Self::from_rules(iter.into_iter().collect())
    }
}

impl<K: ?Sized, H> fmt::Debug for RuleSet<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("len", &self.len())
            .finish()
    }
}
