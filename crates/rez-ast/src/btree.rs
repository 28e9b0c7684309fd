//! Behaviour trees: recursive task compositions used as attribute values.

use crate::attribute::AttrValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of a behaviour tree.
///
/// `task` names a `@task` block by id; the referenced task declares how
/// many children are legal and which options are required. Validation of
/// those constraints happens against the game's task collection, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourTree {
    /// Id of the `@task` block this node invokes
    pub task: String,
    /// Configuration options, in source order
    pub options: IndexMap<String, AttrValue>,
    /// Child subtrees, in source order
    pub children: Vec<BehaviourTree>,
}

impl BehaviourTree {
    /// A leaf node invoking `task` with no options.
    pub fn leaf(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            options: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(BehaviourTree::node_count)
            .sum::<usize>()
    }
}
