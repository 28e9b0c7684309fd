//! The validation driver: walks the game tree and accumulates the error
//! ledger.
//!
//! Determinism contract: errors within one node follow declared validator
//! order, children are visited after their parent's own checks, and
//! siblings follow `children()` order. Subtree results merge
//! associatively, so validating subtrees independently and concatenating
//! yields the same ledger as validating the whole.

use crate::validate::specs::{game_validators, validators_for};
use crate::validate::{NodeView, Validator};
use rez_ast::{Game, Node, NodeStatus, SourcePos};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One validation failure, tied to the node that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Description of the offending node, e.g. `item 'sword'`
    pub node: String,
    /// The node's source position
    pub position: SourcePos,
    /// What went wrong, with expected/actual detail
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.is_root() {
            write!(f, "{}: {}", self.node, self.message)
        } else {
            write!(f, "{} at {}: {}", self.node, self.position, self.message)
        }
    }
}

/// The outcome of validating a game or subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Every failure, in deterministic traversal order
    pub errors: Vec<ValidationError>,
    /// Descriptions of the nodes validated, children before their parent's
    /// ledger entry
    pub validated: Vec<String>,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Concatenate another record onto this one. Merging is associative:
    /// subtree ledgers concatenated in traversal order equal the ledger
    /// of a whole-tree run.
    pub fn merge(&mut self, other: Validation) {
        self.errors.extend(other.errors);
        self.validated.extend(other.validated);
    }
}

/// Validate the whole game: root checks first, then every node depth-first.
pub fn validate(game: &Game) -> Validation {
    let mut out = Validation::default();

    let view = NodeView::of_game(game);
    if let NodeStatus::Error(message) = &game.status {
        out.errors.push(ValidationError {
            node: view.describe(),
            position: game.position.clone(),
            message: message.clone(),
        });
    }
    run_validators(&view, &game.position, game_validators(), game, &mut out);

    for child in game.children() {
        let subtree = validate_subtree(child, game);
        out.merge(subtree);
    }

    out.validated.push(view.describe());
    debug!(
        errors = out.errors.len(),
        nodes = out.validated.len(),
        "validation finished"
    );
    out
}

/// Validate one node and its descendants, producing an independent
/// record.
pub fn validate_subtree(node: &Node, game: &Game) -> Validation {
    let mut out = Validation::default();
    validate_node(node, game, &mut out);
    out
}

fn validate_node(node: &Node, game: &Game, out: &mut Validation) {
    let view = NodeView::of_node(node);

    // processing failures surface in the same ledger
    if let NodeStatus::Error(message) = &node.status {
        out.errors.push(ValidationError {
            node: view.describe(),
            position: node.position.clone(),
            message: message.clone(),
        });
    }

    run_validators(&view, &node.position, validators_for(node), game, out);

    for child in node.children() {
        validate_node(child, game, out);
    }
    out.validated.push(view.describe());
}

fn run_validators(
    view: &NodeView,
    position: &SourcePos,
    validators: Vec<Validator>,
    game: &Game,
    out: &mut Validation,
) {
    for validator in validators {
        if let Err(message) = validator.run(view, game) {
            out.errors.push(ValidationError {
                node: view.describe(),
                position: position.clone(),
                message,
            });
        }
    }
}
