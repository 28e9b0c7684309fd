// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for the Rez authoring language.
//!
//! This crate holds everything the parser produces and the validator
//! consumes: the node model, attribute values, the identifier map, the
//! keyword type hierarchy, and foundation types (source positions and the
//! logical-file line resolver).

pub mod attribute;
pub mod btree;
pub mod foundation;
pub mod hierarchy;
pub mod id_map;
pub mod node;
pub mod template;

// Re-export commonly used types
pub use attribute::{AttrType, AttrValue, Attribute};
pub use btree::BehaviourTree;
pub use foundation::{LogicalFile, SourcePos};
pub use hierarchy::{CycleError, TypeHierarchy};
pub use id_map::{IdEntry, IdMap, IdRecord};
pub use node::{Fragment, Game, Node, NodeKind, NodeStatus};
pub use template::{Chunk, CompiledTemplate, TemplateEnvelope};
