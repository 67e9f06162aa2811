//! Value-producing evaluator.

use std::fmt;

use super::rules::ValueRule;
use super::types::Handler;
use crate::error::{DispatchError, OPTIONAL_HINT};
use crate::rule::{Rule, RuleSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps keys to values through an ordered list of rules.
///
/// Every entry point runs the same lookup: scan the rules in declaration
/// order and take the handler of the first rule whose guard accepts the key.
/// The entry points differ only in what they do when the lookup misses or
/// the handler produces nothing:
///
/// | entry point        | no rule matched        | handler produced nothing |
/// |--------------------|------------------------|--------------------------|
/// | [`get`]            | `NoMatchingRule`       | `NullResult`             |
/// | [`get_optionally`] | `None`                 | `None`                   |
/// | [`get_or`]         | default value          | default value            |
/// | [`get_or_else`]    | supplier result        | supplier result          |
/// | [`get_or_fail`]    | caller's error         | caller's error           |
///
/// # Examples
///
/// ```
/// use u_patterns::guard::equals_to;
/// use u_patterns::patterns::{or_else, then, then_apply, then_supply, when, Patterns};
///
/// let patterns = Patterns::of(vec![
///     when(equals_to(3), then("b".to_string())),
///     when(equals_to(4), then_supply(|| "c".to_string())),
///     when(|i: &i32| *i > 0, then_apply(|i: &i32| i.to_string())),
///     when(|i: &i32| *i < 0, then_apply(|i: &i32| (i + 1).to_string())),
///     or_else(then("a".to_string())),
/// ]);
///
/// let out: Vec<String> = [-1, 0, 1, 2, 3, 4]
///     .iter()
///     .map(|k| patterns.get(k).unwrap())
///     .collect();
/// assert_eq!(out, ["0", "a", "1", "2", "b", "c"]);
/// ```
///
/// [`get`]: Patterns::get
/// [`get_optionally`]: Patterns::get_optionally
/// [`get_or`]: Patterns::get_or
/// [`get_or_else`]: Patterns::get_or_else
/// [`get_or_fail`]: Patterns::get_or_fail
pub struct Patterns<K: ?Sized, V> {
    rules: RuleSet<K, Handler<K, V>>,
    parallel: bool,
}

impl<K: ?Sized, V> Patterns<K, V> {
    /// Creates an evaluator over `rules`, evaluated in the given order.
    ///
    /// The evaluator holds the only handle to the list, so its behaviour
    /// never changes after construction.
    pub fn of(rules: Vec<ValueRule<K, V>>) -> Self {
        Self::from_rule_set(RuleSet::from_rules(rules))
    }

    /// Creates an evaluator over a shared rule list.
    ///
    /// Rules later pushed to, inserted into or removed from `rules` through
    /// another handle are seen by subsequent evaluations.
    pub fn from_rule_set(rules: RuleSet<K, Handler<K, V>>) -> Self {
        Self {
            rules,
            parallel: false,
        }
    }

    /// Resolves batches with rayon. Ignored without the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns `true` if batch resolution runs in parallel.
    ///
    /// Always `false` without the `parallel` feature.
    pub fn is_parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }

    /// Returns the number of rules currently in the list.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Resolves `key`, returning `None` if no rule matched or the matched
    /// handler produced nothing. Never fails.
    pub fn get_optionally(&self, key: &K) -> Option<V> {
        self.rules
            .find(key)
            .and_then(|rule| rule.handler().call(key))
    }

    /// Resolves `key`, falling back to `default`.
    pub fn get_or(&self, key: &K, default: V) -> V {
        self.get_optionally(key).unwrap_or(default)
    }

    /// Resolves `key`, falling back to `supplier()`.
    ///
    /// `supplier` is only called when the resolution comes up empty.
    pub fn get_or_else<S>(&self, key: &K, supplier: S) -> V
    where
        S: FnOnce() -> V,
    {
        self.get_optionally(key).unwrap_or_else(supplier)
    }

    /// Resolves `key`, failing with `failure()` when the resolution comes up
    /// empty.
    ///
    /// `failure` is only called on the empty path.
    pub fn get_or_fail<E, F>(&self, key: &K, failure: F) -> Result<V, E>
    where
        F: FnOnce() -> E,
    {
        self.get_optionally(key).ok_or_else(failure)
    }

    /// Returns a function equivalent to [`get_optionally`](Self::get_optionally).
    pub fn optional(&self) -> impl Fn(&K) -> Option<V> + '_ {
        move |key: &K| self.get_optionally(key)
    }

    /// Returns a function resolving keys with `default` as fallback.
    pub fn or_default(&self, default: V) -> impl Fn(&K) -> V + '_
    where
        V: Clone,
    {
        move |key: &K| self.get_or(key, default.clone())
    }

    /// Returns a function resolving keys with `supplier()` as fallback.
    pub fn or_else_get<'a, S>(&'a self, supplier: S) -> impl Fn(&K) -> V + 'a
    where
        S: Fn() -> V + 'a,
    {
        move |key: &K| self.get_or_else(key, &supplier)
    }

    /// Returns a function resolving keys and failing with `failure()` when
    /// the resolution comes up empty.
    pub fn or_else_throw<'a, E, F>(&'a self, failure: F) -> impl Fn(&K) -> Result<V, E> + 'a
    where
        F: Fn() -> E + 'a,
    {
        move |key: &K| self.get_or_fail(key, &failure)
    }
}

impl<K: fmt::Debug + ?Sized, V> Patterns<K, V> {
    /// Resolves `key` to the value produced by the first matching rule.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoMatchingRule`] if no guard accepts `key`.
    /// - [`DispatchError::NullResult`] if the matched handler produced
    ///   nothing.
    ///
    /// The key is rendered in the error with `Debug`, so string keys appear
    /// quoted and `dyn Any` keys as `Any { .. }`.
    pub fn get(&self, key: &K) -> Result<V, DispatchError> {
        let result = self.resolve(key);

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::debug!(error = %err, "required resolution failed");
        }

        result
    }

    /// Direct invocation; same as [`get`](Self::get).
    pub fn apply(&self, key: &K) -> Result<V, DispatchError> {
        self.get(key)
    }

    /// Returns a function equivalent to [`get`](Self::get).
    pub fn as_fn(&self) -> impl Fn(&K) -> Result<V, DispatchError> + '_ {
        move |key: &K| self.get(key)
    }

    fn resolve(&self, key: &K) -> Result<V, DispatchError> {
        let rule = self
            .rules
            .find(key)
            .ok_or_else(|| DispatchError::no_matching_rule(key, OPTIONAL_HINT))?;
        rule.handler()
            .call(key)
            .ok_or_else(|| DispatchError::null_result(OPTIONAL_HINT))
    }
}

impl<K: fmt::Debug + Sync, V: Send> Patterns<K, V> {
    /// Resolves every key with [`get`](Self::get), preserving input order.
    ///
    /// Sequentially, this stops at the first failing key. In parallel mode
    /// every key may be attempted and the reported error is one of the
    /// failures, not necessarily the first.
    pub fn get_all(&self, keys: &[K]) -> Result<Vec<V>, DispatchError> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return keys.par_iter().map(|key| self.get(key)).collect();
        }

        keys.iter().map(|key| self.get(key)).collect()
    }
}

impl<K: ?Sized, V> Clone for Patterns<K, V> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            parallel: self.parallel,
        }
    }
}

impl<K: ?Sized, V> From<RuleSet<K, Handler<K, V>>> for Patterns<K, V> {
    fn from(rules: RuleSet<K, Handler<K, V>>) -> Self {
        Self::from_rule_set(rules)
    }
}

impl<K: ?Sized, V> FromIterator<Rule<K, Handler<K, V>>> for Patterns<K, V> {
    fn from_iter<I: IntoIterator<Item = Rule<K, Handler<K, V>>>>(iter: I) -> Self {
        Self::from_rule_set(iter.into_iter().collect())
    }
}

impl<K: ?Sized, V> fmt::Debug for Patterns<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patterns")
            .field("rules", &self.rules)
            .field("parallel", &self.parallel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{equals_to, Narrow};
    use crate::patterns::{
        nothing, or_else, or_else_fail, then, then_apply, then_apply_optional, then_supply, when,
        when_type, when_type_if,
    };
    use proptest::prelude::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn full_rules() -> Vec<ValueRule<i32, String>> {
        vec![
            when(equals_to(3), then("b".to_string())),
            when(equals_to(4), then_supply(|| "c".to_string())),
            when(|i: &i32| *i > 0, then_apply(|i: &i32| i.to_string())),
            when(|i: &i32| *i < 0, then_apply(|i: &i32| (i64::from(*i) + 1).to_string())),
        ]
    }

    fn with_default() -> Patterns<i32, String> {
        let mut rules = full_rules();
        rules.push(or_else(then("a".to_string())));
        Patterns::of(rules)
    }

    fn without_four() -> Patterns<i32, String> {
        Patterns::of(vec![
            when(equals_to(3), then("b".to_string())),
            when(|i: &i32| *i > 0, then_apply(|i: &i32| i.to_string())),
            when(|i: &i32| *i < 0, then_apply(|i: &i32| (i + 1).to_string())),
        ])
    }

    const KEYS: [i32; 6] = [-1, 0, 1, 2, 3, 4];

    #[test]
    fn test_get_first_match() {
        let patterns = with_default();
        let actual: Vec<String> = KEYS.iter().map(|k| patterns.get(k).unwrap()).collect();
        assert_eq!(actual, ["0", "a", "1", "2", "b", "c"]);
    }

    #[test]
    fn test_get_no_matching_rule() {
        let patterns = without_four();
        let err = patterns.get(&0).unwrap_err();
        assert!(err.is_no_matching_rule());
        assert_eq!(
            err.to_string(),
            "for key: 0. To allow this pattern to return nullable value, consider using Patterns::get_optionally or so."
        );
    }

    #[test]
    fn test_get_stops_at_first_failure_in_batch() {
        let patterns = without_four();
        let err = patterns.get_all(&[-1, 0, 1, 2, 3]).unwrap_err();
        assert_eq!(err, DispatchError::no_matching_rule(&0, OPTIONAL_HINT));
    }

    #[test]
    fn test_get_null_result() {
        let patterns = Patterns::of(vec![
            when(|i: &i32| *i == i32::MIN, then("min".to_string())),
            when(equals_to(3), then("b".to_string())),
            when(|i: &i32| *i > 0, then_apply(|i: &i32| i.to_string())),
            or_else(nothing()),
        ]);

        let err = patterns.get(&0).unwrap_err();
        assert!(err.is_null_result());
        assert_eq!(
            err.to_string(),
            "Pattern computed null result. To allow this pattern to return nullable value, consider using Patterns::get_optionally or so."
        );
        assert_eq!(patterns.get_optionally(&0), None);
    }

    #[test]
    fn test_apply_matches_get() {
        let patterns = with_default();
        for key in KEYS {
            assert_eq!(patterns.apply(&key), patterns.get(&key));
        }
        let f = patterns.as_fn();
        assert_eq!(f(&3).unwrap(), "b");
    }

    #[test]
    fn test_later_handlers_never_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let patterns = Patterns::of(vec![
            when(|i: &i32| *i > 0, then("first")),
            when(
                |i: &i32| *i > 0,
                then_apply(move |_: &i32| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "second"
                }),
            ),
        ]);

        for key in 1..10 {
            assert_eq!(patterns.get(&key), Ok("first"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_get_optionally() {
        let patterns = with_default();
        let actual: Vec<String> = KEYS
            .iter()
            .map(|k| patterns.get_optionally(k).unwrap())
            .collect();
        assert_eq!(actual, ["0", "a", "1", "2", "b", "c"]);

        assert_eq!(without_four().get_optionally(&0), None);
    }

    #[test]
    fn test_optional_fn() {
        let patterns = without_four();
        let optional = patterns.optional();
        let actual: Vec<Option<String>> = [0, 3].iter().map(optional).collect();
        assert_eq!(actual, [None, Some("b".to_string())]);
    }

    #[test]
    fn test_get_or_default_value() {
        let patterns = Patterns::of(full_rules());
        let actual: Vec<String> = KEYS
            .iter()
            .map(|k| patterns.get_or(k, "x".to_string()))
            .collect();
        assert_eq!(actual, ["0", "x", "1", "2", "b", "c"]);

        let or_default = patterns.or_default("x".to_string());
        assert_eq!(or_default(&0), "x");
        assert_eq!(or_default(&4), "c");
    }

    #[test]
    fn test_get_or_else_supplier_is_lazy() {
        let calls = AtomicUsize::new(0);
        let patterns = Patterns::of(full_rules());
        let supplier = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "x".to_string()
        };

        let or_else_get = patterns.or_else_get(supplier);
        let actual: Vec<String> = KEYS.iter().map(&or_else_get).collect();
        assert_eq!(actual, ["0", "x", "1", "2", "b", "c"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(patterns.get_or_else(&5, || unreachable!()), "5");
    }

    #[test]
    fn test_get_or_else_covers_null_result() {
        let patterns = Patterns::of(vec![when(
            |i: &i32| *i % 2 == 0,
            then_apply_optional(|i: &i32| (*i > 0).then(|| i.to_string())),
        )]);
        assert_eq!(patterns.get_or_else(&-2, || "empty".to_string()), "empty");
        assert_eq!(patterns.get_or_else(&2, || "empty".to_string()), "2");
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Unexpected(&'static str);

    #[test]
    fn test_get_or_fail_passes_matches_through() {
        let patterns = Patterns::of(full_rules());
        let throwing = patterns.or_else_throw(|| Unexpected("unplanned"));
        let actual: Result<Vec<String>, Unexpected> = [-1, 1, 2, 3, 4].iter().map(throwing).collect();
        assert_eq!(actual.unwrap(), ["0", "1", "2", "b", "c"]);
    }

    #[test]
    fn test_get_or_fail_raises_custom_failure() {
        let patterns = Patterns::of(full_rules());
        let throwing = patterns.or_else_throw(|| Unexpected("planned"));
        let actual: Result<Vec<String>, Unexpected> = KEYS.iter().map(throwing).collect();
        assert_eq!(actual.unwrap_err(), Unexpected("planned"));

        assert_eq!(patterns.get_or_fail(&0, || Unexpected("direct")), Err(Unexpected("direct")));
    }

    #[test]
    fn test_or_else_fail_rule() {
        let patterns: Patterns<i32, Result<String, Unexpected>> = Patterns::of(vec![
            when(equals_to(3), then(Ok("b".to_string()))),
            or_else_fail(|_: &i32| Unexpected("rule")),
        ]);

        assert_eq!(patterns.get(&3).unwrap(), Ok("b".to_string()));
        assert_eq!(patterns.get(&-1).unwrap(), Err(Unexpected("rule")));
        assert_eq!(patterns.get_optionally(&2), Some(Err(Unexpected("rule"))));
    }

    #[test]
    fn test_shared_rule_set_sees_mutation() {
        let rules: RuleSet<i32, Handler<i32, String>> = full_rules().into_iter().collect();
        let patterns = Patterns::from_rule_set(rules.clone());

        // Dropping the `equals(3)` rule hands 3 to the `> 0` rule.
        assert!(rules.remove(0));

        let actual: Vec<String> = KEYS
            .iter()
            .map(|k| patterns.get_or_else(k, || "x".to_string()))
            .collect();
        assert_eq!(actual, ["0", "x", "1", "2", "3", "c"]);
        assert_eq!(patterns.rule_count(), 3);
    }

    #[test]
    fn test_clone_evaluates_same_rules() {
        let patterns = with_default();
        let copy = patterns.clone();
        assert_eq!(copy.get(&3).unwrap(), "b");
        assert_eq!(copy.rule_count(), patterns.rule_count());
    }

    #[test]
    fn test_handler_may_edit_its_rule_list() {
        let rules: RuleSet<i32, Handler<i32, usize>> = RuleSet::new();
        let inner = rules.clone();
        rules.push(when(
            |k: &i32| *k > 0,
            then_apply(move |k: &i32| {
                inner.insert(0, when(equals_to(*k), then(0)));
                inner.len()
            }),
        ));
        let patterns = Patterns::from_rule_set(rules.clone());

        assert_eq!(patterns.get(&5), Ok(2));
        assert_eq!(patterns.get(&5), Ok(0));
        assert_eq!(patterns.get(&6), Ok(3));
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_concurrent_push_keeps_first_match() {
        let rules: RuleSet<i32, Handler<i32, String>> = full_rules().into_iter().collect();
        let patterns = Patterns::from_rule_set(rules.clone());
        let expected = ["0", "1", "2", "b", "c"];

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..200 {
                    rules.push(when(equals_to(0), then("zero".to_string())));
                }
            });
            for _ in 0..200 {
                let matched: Vec<String> = [-1, 1, 2, 3, 4]
                    .iter()
                    .map(|k| patterns.get(k).unwrap())
                    .collect();
                assert_eq!(matched, expected);

                let zero = patterns.get_optionally(&0);
                assert!(zero.is_none() || zero.as_deref() == Some("zero"));
            }
        });

        assert_eq!(patterns.rule_count(), 204);
        assert_eq!(patterns.get(&0).unwrap(), "zero");
    }

    #[test]
    fn test_str_key_rendered_quoted() {
        let patterns: Patterns<str, usize> = Patterns::of(vec![when(
            |s: &str| s.is_empty(),
            then(0),
        )]);
        let err = patterns.get("zero").unwrap_err();
        assert!(err.to_string().starts_with("for key: \"zero\"."));
    }

    #[test]
    fn test_collect_into_patterns() {
        let patterns: Patterns<i32, i32> = (0..3)
            .map(|i| when(equals_to(i), then(i * 10)))
            .collect();
        assert_eq!(patterns.get_all(&[2, 1, 0]).unwrap(), [20, 10, 0]);
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let patterns = with_default().with_parallel(true);
        assert_eq!(patterns.is_parallel(), cfg!(feature = "parallel"));
        assert!(!with_default().is_parallel());
        let keys: Vec<i32> = (-50..50).collect();
        let parallel = patterns.get_all(&keys).unwrap();
        let sequential: Vec<String> = keys.iter().map(|k| with_default().get(k).unwrap()).collect();
        assert_eq!(parallel, sequential);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_failures_with_tracing_enabled() {
        assert!(without_four().get(&0).unwrap_err().is_no_matching_rule());
        assert!(Patterns::of(vec![or_else(nothing::<i32, String>())])
            .get(&0)
            .unwrap_err()
            .is_null_result());
    }

    // ---- Type narrowing ----

    trait Named: Narrow + Send + Sync + fmt::Debug {
        fn value(&self) -> &str;
    }

    #[derive(Debug)]
    struct Plain(String);
    #[derive(Debug)]
    struct Bee(String);
    #[derive(Debug)]
    struct Cee(String);

    impl Cee {
        fn say(&self) -> String {
            format!("C here. I've got {}.", self.0)
        }
    }

    macro_rules! named {
        ($($ty:ident),*) => {$(
            impl Named for $ty {
                fn value(&self) -> &str {
                    &self.0
                }
            }
            impl Narrow for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*};
    }

    named!(Plain, Bee, Cee);

    fn shapes() -> Vec<Box<dyn Named>> {
        vec![
            Box::new(Plain("aaa".into())),
            Box::new(Bee("bbb".into())),
            Box::new(Cee("ccc".into())),
        ]
    }

    #[test]
    fn test_when_type() {
        let patterns: Patterns<Box<dyn Named>, String> = Patterns::of(vec![
            when_type(then_apply(|b: &Bee| format!("it's a B. value: {}.", b.value()))),
            when_type(then_apply(Cee::say)),
            when_type_if(|c: &Cee| c.value().is_empty(), then_apply(Cee::say)),
            or_else(then("it's a plain A.".to_string())),
        ]);

        let actual: Vec<String> = shapes().iter().map(|s| patterns.get(s).unwrap()).collect();
        assert_eq!(
            actual,
            ["it's a plain A.", "it's a B. value: bbb.", "C here. I've got ccc."]
        );
    }

    #[test]
    fn test_when_type_if_predicate_sees_only_narrowed_keys() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let patterns: Patterns<Box<dyn Named>, String> = Patterns::of(vec![
            when_type_if(
                move |c: &Cee| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    c.value() == "ccc"
                },
                then_apply(Cee::say),
            ),
            or_else(then_apply(|n: &Box<dyn Named>| n.value().to_string())),
        ]);

        let actual: Vec<String> = shapes().iter().map(|s| patterns.get(s).unwrap()).collect();
        assert_eq!(actual, ["aaa", "bbb", "C here. I've got ccc."]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_when_type_over_dyn_any() {
        let patterns: Patterns<Box<dyn Any + Send + Sync>, String> = Patterns::of(vec![
            when_type(then_apply(|n: &i32| format!("int {n}"))),
            when_type(then_apply(|s: &String| format!("string {s}"))),
        ]);

        assert_eq!(
            patterns.get_optionally(&(Box::new(5) as Box<dyn Any + Send + Sync>)),
            Some("int 5".to_string())
        );
        assert_eq!(
            patterns.get_optionally(&(Box::new("x".to_string()) as Box<dyn Any + Send + Sync>)),
            Some("string x".to_string())
        );
        assert_eq!(patterns.get_optionally(&(Box::new(1.5_f64) as Box<dyn Any + Send + Sync>)), None);
    }

    proptest! {
        #[test]
        fn prop_trailing_default_never_misses(key in any::<i32>()) {
            let patterns = with_default();
            prop_assert!(patterns.get(&key).is_ok());
        }

        #[test]
        fn prop_optional_agrees_with_required(key in -100i32..100) {
            let patterns = without_four();
            match patterns.get(&key) {
                Ok(value) => prop_assert_eq!(patterns.get_optionally(&key), Some(value)),
                Err(err) => {
                    prop_assert!(err.is_no_matching_rule());
                    prop_assert_eq!(patterns.get_optionally(&key), None);
                    prop_assert_eq!(patterns.get_or(&key, "x".to_string()), "x");
                }
            }
        }
    }
}
