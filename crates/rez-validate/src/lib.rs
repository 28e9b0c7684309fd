// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Validation for parsed Rez games.
//!
//! This crate walks a [`Game`](rez_ast::Game) after the process pass and
//! checks every node against its declarative validator list. Errors are
//! collected, never thrown; validation always runs to completion.

pub mod validate;

pub use validate::driver::{validate, validate_subtree, Validation, ValidationError};
pub use validate::{checks, Chain, NodeView, Outcome, Validator};
