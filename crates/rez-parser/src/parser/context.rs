//! Parse context: cursor, value stack, entry points, and side-band state.
//!
//! A parser is a function over [`Context`]: it consumes input, pushes
//! values onto the `ast` stack, and either succeeds or fails with a
//! [`Failure`]. Backtracking combinators snapshot the cursor and stack
//! length and restore both on a miss; committed failures are never
//! backtracked past.

use crate::parser::error::ParseError;
use rez_ast::{Attribute, AttrValue, Fragment, Game, IdMap, LogicalFile, Node, SourcePos, TypeHierarchy};

/// Snapshot of the input position. Line and column are 1-based; the line
/// is a *logical* line, resolved to a physical file only when a block is
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

/// A value produced onto the parse stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Matched raw text (identifiers, delimited content)
    Text(String),
    /// A parsed attribute value literal
    Scalar(AttrValue),
    /// A parsed `name: value` attribute
    Attr(Attribute),
    /// A finished structural block
    Node(Box<Node>),
    /// The finished root block
    Game(Box<Game>),
    /// Anonymous delimited content plus the key it is stored under
    Fragment { key: String, fragment: Fragment },
    /// Values accumulated by a sequence or repetition, in source order
    List(Vec<Value>),
}

impl Value {
    /// True for values the block layer treats as structural children
    /// rather than attributes.
    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }
}

/// Parse failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Backtrackable: the enclosing `choice`/`many`/`optional` selects an
    /// alternative or stops
    Miss {
        expected: String,
        line: u32,
        col: u32,
    },
    /// Committed: aborts the parse with a block-level error
    Fatal(ParseError),
}

/// Result of running one parser.
pub type Step = Result<(), Failure>;

/// Side-band parse state, threaded through the context rather than held
/// globally so multi-source parses stay reentrant.
#[derive(Debug, Default)]
pub struct ParseState {
    /// Every id registered so far, in source order
    pub id_map: IdMap,
    /// Type hierarchy accumulated from `@derive` statements
    pub hierarchy: TypeHierarchy,
}

/// Everything a parser sees: the input, the value stack, the entry-point
/// stack, the committed flag, and the side-band state.
pub struct Context<'src> {
    source: &'src LogicalFile,
    text: &'src str,
    cursor: Cursor,
    /// Values produced for the current subsequence
    pub ast: Vec<Value>,
    /// `(line, col)` captured at each in-flight parser's entry
    entry_points: Vec<(u32, u32)>,
    committed: bool,
    pub state: ParseState,
}

impl<'src> Context<'src> {
    pub fn new(source: &'src LogicalFile) -> Self {
        Self {
            source,
            text: source.text(),
            cursor: Cursor {
                offset: 0,
                line: 1,
                col: 1,
            },
            ast: Vec::new(),
            entry_points: Vec::new(),
            committed: false,
            state: ParseState::default(),
        }
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'src str {
        &self.text[self.cursor.offset..]
    }

    pub fn at_end(&self) -> bool {
        self.cursor.offset >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Consume `n` bytes, updating line and column. `n` must land on a
    /// char boundary of the remaining input.
    pub fn advance(&mut self, n: usize) {
        let consumed = &self.text[self.cursor.offset..self.cursor.offset + n];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.cursor.line += 1;
                self.cursor.col = 1;
            } else {
                self.cursor.col += 1;
            }
        }
        self.cursor.offset += n;
    }

    /// Rewind to a snapshot, dropping values produced since `ast_len`.
    pub fn restore(&mut self, cursor: Cursor, ast_len: usize) {
        self.cursor = cursor;
        self.ast.truncate(ast_len);
    }

    /// A backtrackable miss at the current position.
    pub fn miss(&self, expected: impl Into<String>) -> Failure {
        Failure::Miss {
            expected: expected.into(),
            line: self.cursor.line,
            col: self.cursor.col,
        }
    }

    // --- entry points -----------------------------------------------------

    pub(crate) fn push_entry(&mut self) {
        self.entry_points.push((self.cursor.line, self.cursor.col));
    }

    pub(crate) fn pop_entry(&mut self) {
        self.entry_points.pop();
    }

    /// The entry point of the innermost in-flight parser. For a block
    /// sequence's post-match action this is the position of its `@`.
    pub fn entry_point(&self) -> (u32, u32) {
        *self.entry_points.last().unwrap_or(&(1, 1))
    }

    // --- committed flag ---------------------------------------------------

    /// Save the enclosing sequence's flag and reset for a new sequence.
    pub(crate) fn begin_sequence(&mut self) -> bool {
        std::mem::replace(&mut self.committed, false)
    }

    pub(crate) fn end_sequence(&mut self, saved: bool) {
        self.committed = saved;
    }

    pub(crate) fn is_committed(&self) -> bool {
        self.committed
    }

    pub(crate) fn set_committed(&mut self) {
        self.committed = true;
    }

    // --- position resolution ----------------------------------------------

    /// Resolve a logical `(line, col)` to a physical source position.
    ///
    /// # Errors
    ///
    /// The logical file is total over parsed lines, so a failure here is
    /// an internal error and is reported as one.
    pub fn resolve(&self, line: u32, col: u32) -> Result<SourcePos, ParseError> {
        let (file, physical_line) = self.source.resolve_line(line)?;
        Ok(SourcePos::new(file, physical_line, col))
    }
}
