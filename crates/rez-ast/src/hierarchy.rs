//! The type hierarchy: a DAG of keyword → parent keyword edges.
//!
//! Built from `@derive` statements during parsing, read during item tag
//! expansion and slot-compatibility checks. An edge that would close a
//! cycle is rejected at insertion; `fan_out` therefore always terminates.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attempt to add an edge that would make the hierarchy cyclic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("deriving :{tag} from :{parent} would create a cycle")]
pub struct CycleError {
    pub tag: String,
    pub parent: String,
}

/// Keyword subtype relationships, e.g. `:sword` is-a `:weapon`.
///
/// A tag may have several parents; edges are kept in insertion order so
/// `fan_out` output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeHierarchy {
    parents: IndexMap<String, IndexSet<String>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tag` is-a `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when `tag` is already a transitive ancestor
    /// of `parent`; the hierarchy is left unchanged.
    pub fn add(&mut self, tag: impl Into<String>, parent: impl Into<String>) -> Result<(), CycleError> {
        let tag = tag.into();
        let parent = parent.into();
        if tag == parent || self.fan_out(&parent).contains(&tag) {
            return Err(CycleError { tag, parent });
        }
        self.parents.entry(tag).or_default().insert(parent);
        Ok(())
    }

    /// Direct parents of `tag`, in declaration order.
    pub fn parents_of(&self, tag: &str) -> impl Iterator<Item = &str> {
        self.parents
            .get(tag)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// All transitive ancestors of `tag`, breadth-first from the tag, in
    /// deterministic order. Does not include `tag` itself.
    pub fn fan_out(&self, tag: &str) -> IndexSet<String> {
        let mut ancestors = IndexSet::new();
        let mut frontier = vec![tag.to_string()];
        while let Some(current) = frontier.pop() {
            for parent in self.parents_of(&current) {
                if ancestors.insert(parent.to_string()) {
                    frontier.push(parent.to_string());
                }
            }
        }
        ancestors
    }

    /// True when `tag` is `ancestor` or transitively derives from it.
    pub fn is_a(&self, tag: &str, ancestor: &str) -> bool {
        tag == ancestor || self.fan_out(tag).contains(ancestor)
    }

    /// Number of tags with at least one parent edge.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
