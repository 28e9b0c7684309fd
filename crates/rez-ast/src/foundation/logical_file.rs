//! Logical files: the preprocessor's concatenation of included sources.
//!
//! The lexical preprocessor inlines `%(include ...)` directives before the
//! structural parser runs, so the parser only ever sees one combined text.
//! `LogicalFile` keeps enough bookkeeping to map a line of that combined
//! text back to the physical `(file, line)` it came from, which is what
//! block positions are reported in.
//!
//! # Examples
//!
//! ```
//! # use rez_ast::foundation::LogicalFile;
//! let source = LogicalFile::builder()
//!     .push("main.rez", "@game {\n")
//!     .push("items.rez", "@item sword { size: 3 }\n")
//!     .push("main.rez", "}\n")
//!     .build();
//!
//! assert_eq!(source.resolve_line(2).unwrap(), ("items.rez", 1));
//! assert_eq!(source.resolve_line(3).unwrap(), ("main.rez", 2));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous run of lines contributed by a single physical file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Segment {
    /// Physical file path
    path: String,
    /// First combined line covered by this segment (1-based)
    start_line: u32,
    /// Number of lines the segment contributes
    line_count: u32,
    /// Line within the physical file at which the segment starts (1-based)
    origin_line: u32,
}

/// Line resolution failure.
///
/// The preprocessor guarantees `resolve_line` is total over the lines of
/// the combined text, so hitting this is an internal error in the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("logical line {line} is outside the combined source ({line_count} lines)")]
pub struct ResolveError {
    pub line: u32,
    pub line_count: u32,
}

/// The combined source text plus the segment table mapping combined line
/// numbers back to physical files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalFile {
    text: String,
    segments: Vec<Segment>,
}

/// Incremental constructor used by the preprocessor as it inlines files.
#[derive(Debug, Default)]
pub struct LogicalFileBuilder {
    text: String,
    segments: Vec<Segment>,
    next_line: u32,
}

impl LogicalFile {
    /// A logical file backed by one physical file, starting at its line 1.
    pub fn single(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::builder().push(path, text).build()
    }

    /// Start building a multi-segment logical file.
    pub fn builder() -> LogicalFileBuilder {
        LogicalFileBuilder {
            text: String::new(),
            segments: Vec::new(),
            next_line: 1,
        }
    }

    /// The combined source text handed to the parser.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total number of lines in the combined text.
    pub fn line_count(&self) -> u32 {
        self.segments
            .last()
            .map(|s| s.start_line + s.line_count - 1)
            .unwrap_or(0)
    }

    /// Map a combined line number (1-based) to `(physical file, line)`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when `line` falls outside the combined
    /// text; callers treat that as an internal invariant failure.
    pub fn resolve_line(&self, line: u32) -> Result<(&str, u32), ResolveError> {
        let idx = self
            .segments
            .partition_point(|s| s.start_line + s.line_count <= line);
        match self.segments.get(idx) {
            Some(seg) if line >= seg.start_line => {
                Ok((&seg.path, seg.origin_line + (line - seg.start_line)))
            }
            _ => Err(ResolveError {
                line,
                line_count: self.line_count(),
            }),
        }
    }
}

impl LogicalFileBuilder {
    /// Append a chunk of a physical file starting at its line 1.
    pub fn push(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.push_from(path, text, 1)
    }

    /// Append a chunk of a physical file starting at `origin_line` within
    /// that file. Chunks without a trailing newline still count as one line.
    pub fn push_from(
        mut self,
        path: impl Into<String>,
        text: impl Into<String>,
        origin_line: u32,
    ) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        let mut line_count = text.matches('\n').count() as u32;
        if !text.ends_with('\n') {
            line_count += 1;
        }
        self.segments.push(Segment {
            path: path.into(),
            start_line: self.next_line,
            line_count,
            origin_line,
        });
        self.next_line += line_count;
        self.text.push_str(&text);
        self
    }

    /// Finish, producing the immutable logical file.
    pub fn build(self) -> LogicalFile {
        LogicalFile {
            text: self.text,
            segments: self.segments,
        }
    }
}
