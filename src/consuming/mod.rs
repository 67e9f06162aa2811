//! Effect-producing dispatch.
//!
//! A [`ConsumingPatterns`] runs the action of the first rule whose guard
//! accepts a key:
//!
//! - **Required**: [`ConsumingPatterns::handle`] fails when no rule matches.
//! - **Fallbacks**: [`ConsumingPatterns::handle_or`] runs a default action,
//!   [`ConsumingPatterns::handle_or_fail`] returns a caller error.

mod engine;
mod rules;
mod types;

pub use engine::ConsumingPatterns;
pub use rules::{do_nothing, or_else, then_accept_with, when, when_type, when_type_if, EffectRule};
pub use types::Action;
