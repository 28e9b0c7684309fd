//! Foundation types shared by the parser and validator.
//!
//! - `SourcePos` — physical source location of a block
//! - `LogicalFile` — the preprocessor's view of concatenated sources, with
//!   line resolution back to physical files

mod logical_file;
mod position;

pub use logical_file::{LogicalFile, LogicalFileBuilder, ResolveError};
pub use position::SourcePos;
