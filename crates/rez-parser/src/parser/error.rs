//! Parse error types.

use rez_ast::foundation::ResolveError;
use rez_ast::SourcePos;
use thiserror::Error;

/// A fatal parse failure. Pre-commit misses never surface here; they are
/// consumed by backtracking combinators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A committed block failed to match its remaining grammar.
    #[error("@{label} block at {position} did not match")]
    BlockNotMatched { label: String, position: SourcePos },

    /// Top-level input that no block parser accepted.
    #[error("expected {expected} at line {line}, column {col}")]
    UnexpectedInput {
        expected: String,
        line: u32,
        col: u32,
    },

    /// Input left over after the game block closed.
    #[error("unexpected input after the game block at line {line}, column {col}")]
    TrailingInput { line: u32, col: u32 },

    /// A `@derive` edge that would make the type hierarchy cyclic.
    #[error("@derive at {position}: deriving :{tag} from :{parent} would create a cycle")]
    HierarchyCycle {
        tag: String,
        parent: String,
        position: SourcePos,
    },

    /// A logical line the source map could not resolve: an invariant
    /// violation in the preprocessor hand-off.
    #[error("internal error: {0}")]
    UnresolvedLine(#[from] ResolveError),

    /// Parser bookkeeping produced an impossible state.
    #[error("internal error: {0}")]
    Internal(String),
}
