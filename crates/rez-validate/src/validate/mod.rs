//! The validator DSL and the validation driver.
//!
//! A validator is a value: a closure from `(node, game)` to ok-or-error.
//! Builders in [`checks`] compose validators by chaining (run the next
//! check only on local success), alternation, and conditional
//! application. Per-element validator lists live in [`specs`]; the
//! [`driver`] walks the tree and accumulates the error ledger.
//!
//! Nothing here mutates the game: validation runs strictly after the
//! parse and process phases and only borrows.

pub mod behaviour;
pub mod checks;
pub mod driver;
pub mod specs;

use rez_ast::{Attribute, Game, Node, NodeStatus, SourcePos};
use indexmap::IndexMap;
use std::rc::Rc;

/// Result of one check: `Ok` or a human-readable message.
pub type Outcome = Result<(), String>;

/// Read-only projection of a node (or the game root) that validators run
/// against.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    pub node_type: &'a str,
    pub id: Option<&'a str>,
    pub position: &'a SourcePos,
    pub status: &'a NodeStatus,
    pub attributes: &'a IndexMap<String, Attribute>,
    pub children: &'a [Node],
}

impl<'a> NodeView<'a> {
    pub fn of_node(node: &'a Node) -> Self {
        Self {
            node_type: node.node_type(),
            id: node.id.as_deref(),
            position: &node.position,
            status: &node.status,
            attributes: &node.attributes,
            children: node.children(),
        }
    }

    pub fn of_game(game: &'a Game) -> Self {
        Self {
            node_type: game.node_type(),
            id: Some(&game.id),
            position: &game.position,
            status: &game.status,
            attributes: &game.attributes,
            children: &[],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&'a Attribute> {
        self.attributes.get(name)
    }

    pub fn describe(&self) -> String {
        match self.id {
            Some(id) => format!("{} '{}'", self.node_type, id),
            None => format!("anonymous {}", self.node_type),
        }
    }
}

type CheckFn = dyn Fn(&NodeView, &Game) -> Outcome;

/// A node-level validator: a description plus the check itself.
#[derive(Clone)]
pub struct Validator {
    description: String,
    check: Rc<CheckFn>,
}

impl Validator {
    pub fn new(
        description: impl Into<String>,
        check: impl Fn(&NodeView, &Game) -> Outcome + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            check: Rc::new(check),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn run(&self, node: &NodeView, game: &Game) -> Outcome {
        (self.check)(node, game)
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("description", &self.description)
            .finish()
    }
}

/// A chained validator: runs against an attribute only after the
/// upstream check succeeded.
pub type Chain = Rc<dyn Fn(&Attribute, &NodeView, &Game) -> Outcome>;
