//! Value-producing dispatch.
//!
//! A [`Patterns`] maps a key to a value by running the handler of the first
//! rule whose guard accepts the key. It replaces chains of `if`/`else if`
//! with a declarative rule list:
//!
//! - **Required**: [`Patterns::get`] fails on a miss or an empty handler.
//! - **Optional**: [`Patterns::get_optionally`] never fails.
//! - **Fallbacks**: [`Patterns::get_or`], [`Patterns::get_or_else`] and
//!   [`Patterns::get_or_fail`] substitute a value, a supplied value or a
//!   caller error.
//!
//! Rules are built with [`when`], [`or_else`], [`or_else_fail`],
//! [`when_type`] and [`when_type_if`]; handlers with [`then`],
//! [`then_supply`], [`then_apply`], [`then_apply_optional`] and
//! [`nothing`].

mod engine;
mod rules;
mod types;

pub use engine::Patterns;
pub use rules::{
    nothing, or_else, or_else_fail, then, then_apply, then_apply_optional, then_supply, when,
    when_type, when_type_if, ValueRule,
};
pub use types::Handler;
