//! Behaviour-tree validation.
//!
//! A behaviour tree is valid when every node references a defined
//! `@task`, respects that task's declared child-count bounds, and
//! supplies every option the task requires. Child errors roll up into
//! the parent's message; a parent only passes when every child does.

use crate::validate::Outcome;
use rez_ast::{BehaviourTree, Game, Node};

/// Child-count bounds declared on a task. `min_children` defaults to −1
/// (no minimum); `max_children` defaults to unbounded.
fn child_bounds(task: &Node) -> (i64, Option<i64>) {
    let min = task
        .attribute("min_children")
        .and_then(|attr| attr.value.as_number())
        .map(|n| n as i64)
        .unwrap_or(-1);
    let max = task
        .attribute("max_children")
        .and_then(|attr| attr.value.as_number())
        .map(|n| n as i64);
    (min, max)
}

/// Validate one tree node and, recursively, its children. All failures
/// for this node (bounds, options, children) are concatenated into one
/// comma-separated message.
pub fn validate_task(tree: &BehaviourTree, game: &Game) -> Outcome {
    let mut errors: Vec<String> = Vec::new();

    match game.task(&tree.task) {
        None => errors.push(format!("task '{}' is not defined", tree.task)),
        Some(task) => {
            let (min, max) = child_bounds(task);
            let count = tree.children.len() as i64;
            if min >= 0 && count < min {
                errors.push(format!(
                    "task '{}' expects at least {} child(ren), found {}",
                    tree.task, min, count
                ));
            }
            if let Some(max) = max {
                if count > max {
                    errors.push(format!(
                        "task '{}' accepts at most {} child(ren), found {}",
                        tree.task, max, count
                    ));
                }
            }
            if let Some(required) = task.attribute("options").and_then(|a| a.value.elements()) {
                for option in required {
                    if let Some(name) = option.as_text() {
                        if !tree.options.contains_key(name) {
                            errors.push(format!(
                                "task '{}' requires option '{}'",
                                tree.task, name
                            ));
                        }
                    }
                }
            }
        }
    }

    for child in &tree.children {
        if let Err(child_err) = validate_task(child, game) {
            errors.push(child_err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join(", "))
    }
}
