//! Ordered, predicate-based dispatch.
//!
//! Replaces nested conditionals with a declarative list of
//! `(guard, handler)` rules evaluated in declaration order. The first rule
//! whose guard accepts a key wins.
//!
//! - **Patterns**: value-producing evaluator with required, optional,
//!   default-value, default-supplier and custom-failure resolution.
//! - **ConsumingPatterns**: effect-producing evaluator with required,
//!   default-action and custom-failure handling.
//! - **Guards**: match-anything, equality and runtime type narrowing
//!   (optionally followed by a predicate over the narrowed value).
//!
//! # Architecture
//!
//! Both evaluators share one [`RuleSet`] type and one lookup. The rule list
//! is a shareable handle: evaluators built with `of` own it outright, while
//! evaluators built with `from_rule_set` see later edits made through other
//! handles.
//!
//! # Features
//!
//! - `parallel`: batch resolution with rayon ([`Patterns::get_all`]).
//! - `tracing`: trace/debug events for lookups and required-mode failures.
//!
//! [`Patterns::get_all`]: patterns::Patterns::get_all

pub mod consuming;
pub mod error;
pub mod guard;
pub mod patterns;
pub mod rule;

pub use error::DispatchError;
pub use rule::{Rule, RuleSet};
