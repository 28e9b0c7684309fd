//! Physical source positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical source location of a block: file path plus 1-based line and
/// column.
///
/// Produced by resolving a logical line offset through [`LogicalFile`]
/// at block construction time; every node except the root carries one.
///
/// [`LogicalFile`]: super::LogicalFile
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePos {
    /// Path of the physical file the block was written in
    pub file: String,
    /// 1-based line within that file
    pub line: u32,
    /// 1-based column of the `@` introducing the block
    pub col: u32,
}

impl SourcePos {
    /// Create a new source position.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            line,
            col,
        }
    }

    /// Placeholder position for the root game node, which aggregates the
    /// whole source rather than starting at one block.
    pub fn root() -> Self {
        Self::new("", 0, 0)
    }

    /// True when this is the root placeholder.
    pub fn is_root(&self) -> bool {
        self.file.is_empty() && self.line == 0
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let pos = SourcePos::new("game/main.rez", 12, 3);
        assert_eq!(pos.to_string(), "game/main.rez:12:3");
    }

    #[test]
    fn test_root_placeholder() {
        assert!(SourcePos::root().is_root());
        assert!(!SourcePos::new("a.rez", 1, 1).is_root());
    }
}
