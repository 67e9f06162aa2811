//! Failures surfaced by the required resolution entry points.

use std::fmt;

/// Error returned by [`Patterns::get`](crate::patterns::Patterns::get) and
/// [`ConsumingPatterns::handle`](crate::consuming::ConsumingPatterns::handle).
///
/// A [`NoMatchingRule`](DispatchError::NoMatchingRule) is a coverage gap in
/// the rule list. A [`NullResult`](DispatchError::NullResult) is a handler
/// that matched but produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// No guard accepted the key.
    #[error("for key: {key}. {hint}")]
    NoMatchingRule {
        /// `Debug` rendering of the unmatched key.
        key: String,
        /// Remediation hint pointing at a fallback-bearing entry point.
        hint: &'static str,
    },

    /// A rule matched but its handler produced no value.
    #[error("Pattern computed null result. {hint}")]
    NullResult {
        /// Remediation hint pointing at the optional entry point.
        hint: &'static str,
    },
}

/// Hint attached to value-evaluator failures.
pub(crate) const OPTIONAL_HINT: &str =
    "To allow this pattern to return nullable value, consider using Patterns::get_optionally or so.";

/// Hint attached to effect-evaluator failures.
pub(crate) const DEFAULT_CONSUMER_HINT: &str =
    "To allow this pattern to accept value that match no defined pattern, consider setting default consumer.";

impl DispatchError {
    /// Builds a [`DispatchError::NoMatchingRule`] for `key`.
    pub fn no_matching_rule<K: fmt::Debug + ?Sized>(key: &K, hint: &'static str) -> Self {
        DispatchError::NoMatchingRule {
            key: format!("{key:?}"),
            hint,
        }
    }

    /// Builds a [`DispatchError::NullResult`].
    pub fn null_result(hint: &'static str) -> Self {
        DispatchError::NullResult { hint }
    }

    /// Returns `true` for [`DispatchError::NoMatchingRule`].
    pub fn is_no_matching_rule(&self) -> bool {
        matches!(self, DispatchError::NoMatchingRule { .. })
    }

    /// Returns `true` for [`DispatchError::NullResult`].
    pub fn is_null_result(&self) -> bool {
        matches!(self, DispatchError::NullResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_rule_message() {
        let err = DispatchError::no_matching_rule(&2, DEFAULT_CONSUMER_HINT);
        assert_eq!(
            err.to_string(),
            "for key: 2. To allow this pattern to accept value that match no defined pattern, consider setting default consumer."
        );
        assert!(err.is_no_matching_rule());
        assert!(!err.is_null_result());
    }

    #[test]
    fn test_no_matching_rule_uses_debug_form() {
        let err = DispatchError::no_matching_rule("zero", OPTIONAL_HINT);
        assert!(err.to_string().starts_with("for key: \"zero\"."));
    }

    #[test]
    fn test_null_result_message() {
        let err = DispatchError::null_result(OPTIONAL_HINT);
        assert_eq!(
            err.to_string(),
            "Pattern computed null result. To allow this pattern to return nullable value, consider using Patterns::get_optionally or so."
        );
        assert!(err.is_null_result());
    }
}
