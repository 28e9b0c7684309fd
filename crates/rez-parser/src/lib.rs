// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Structural block parser for the Rez authoring language.
//!
//! Takes the preprocessor's [`LogicalFile`](rez_ast::LogicalFile), parses
//! the `@game` block and everything inside it, and hands back a populated
//! [`Game`](rez_ast::Game), identifier map and type hierarchy included.

pub mod parser;

pub use parser::{parse, ParseError};
