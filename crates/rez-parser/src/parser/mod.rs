//! Combinator-built structural parser for `.rez` source.
//!
//! Layered bottom-up:
//!
//! - `context` — the state every parser runs over: input cursor, value
//!   stack, entry-point stack, committed flag, side-band id map and type
//!   hierarchy
//! - `primitives` — character-level matchers (whitespace, literals,
//!   identifiers)
//! - `combinators` — sequence, choice, many, optional, negative
//!   lookahead, ignore, commit
//! - `values` — attribute-value literal parsers (numbers through
//!   behaviour trees)
//! - `blocks` — the seven parameterized block shapes and the shared
//!   post-match procedure (position resolution, attribute folding, id
//!   registration)
//! - `elements` — the concrete game grammar and the public [`parse`]
//!   entry point

pub mod blocks;
pub mod combinators;
pub mod context;
pub mod elements;
pub mod error;
pub mod primitives;
pub mod values;

pub use context::{Context, Cursor, Failure, ParseState, Step, Value};
pub use elements::parse;
pub use error::ParseError;
