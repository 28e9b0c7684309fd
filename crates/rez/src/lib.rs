// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Rez: a compiler for an interactive fiction authoring language.
//!
//! Authors write `.rez` sources declaring typed entities (scenes, cards,
//! items, inventories, slots, assets, groups, helpers, tasks) with
//! attributes, children, and embedded script fragments. This crate ties
//! the pieces together:
//!
//! - [`rez_ast`] — node model, identifier map, type hierarchy
//! - [`rez_parser`] — combinator-built structural block parser
//! - [`rez_validate`] — declarative attribute validation
//!
//! [`compile`] runs the whole pipeline over a
//! [`LogicalFile`](rez_ast::LogicalFile) produced by the preprocessor.

pub mod pipeline;
pub mod report;

pub use pipeline::{compile, Compilation};

// Re-export the subsystem crates under their conventional names
pub use rez_ast as ast;
pub use rez_parser as parser;
pub use rez_validate as validation;

pub use rez_ast::{Game, LogicalFile};
pub use rez_parser::ParseError;
pub use rez_validate::{Validation, ValidationError};
