//! Per-element validator specifications.
//!
//! `validators_for` yields the declarative validator list for a node,
//! specialized where needed by closing over node state (a helper's
//! declared arg list, for instance). Order matters: the driver reports
//! errors in the order validators are declared here.

use crate::validate::checks::{
    coll_of, expects_params, has_params, has_type, if_present, is_btree, list_references,
    node_passes, not_empty, one_of_present, other_attrs_present, present, refers_to,
    validate_if_value, value_one_of, value_passes,
};
use crate::validate::{Chain, Validator};
use rez_ast::{AttrType, AttrValue, Game, Node, NodeKind};
use std::rc::Rc;

/// Validators for the root game node.
pub fn game_validators() -> Vec<Validator> {
    vec![
        present("name", Some(has_type(AttrType::String, None))),
        present("initial_scene", Some(refers_to("scene", None))),
        if_present("layout", has_type(AttrType::String, None)),
        duplicate_ids(),
    ]
}

/// The validator list for a parsed node.
pub fn validators_for(node: &Node) -> Vec<Validator> {
    match &node.kind {
        NodeKind::Scene { .. } => scene_validators(),
        NodeKind::Card { .. } => card_validators(),
        NodeKind::Item => item_validators(),
        NodeKind::Inventory { .. } => inventory_validators(),
        NodeKind::Slot => slot_validators(),
        NodeKind::Asset => asset_validators(),
        NodeKind::Group => group_validators(),
        NodeKind::Helper => helper_validators(node),
        NodeKind::Task => task_validators(),
        NodeKind::Actor => actor_validators(),
    }
}

fn scene_validators() -> Vec<Validator> {
    vec![
        present("initial_card", Some(refers_to("card", None))),
        if_present("layout", has_type(AttrType::String, None)),
        if_present("on_start", has_type(AttrType::Function, Some(has_params(2, None)))),
        if_present("on_finish", has_type(AttrType::Function, Some(has_params(2, None)))),
    ]
}

fn card_validators() -> Vec<Validator> {
    vec![
        present("content", Some(has_type(AttrType::String, None))),
        if_present("bindings", coll_of(vec![AttrType::ElemRef], None)),
        // cards embedded into this one by the layout runtime
        if_present("blocks", list_references("card", None)),
        if_present("on_render", has_type(AttrType::Function, Some(has_params(1, None)))),
    ]
}

fn item_validators() -> Vec<Validator> {
    vec![
        if_present("name", has_type(AttrType::String, None)),
        if_present("type", has_type(AttrType::Keyword, Some(slot_accepts_type()))),
        if_present("size", has_type(AttrType::Number, Some(positive("a positive size")))),
        // consumable items must say how many uses they start with
        if_present(
            "consumable",
            has_type(
                AttrType::Boolean,
                Some(validate_if_value(
                    AttrValue::Boolean(true),
                    other_attrs_present(&["uses"], None),
                )),
            ),
        ),
        if_present("uses", has_type(AttrType::Number, Some(positive("a positive count")))),
        if_present("tags", coll_of(vec![AttrType::Keyword], None)),
        if_present("container", refers_to("inventory", None)),
    ]
}

fn inventory_validators() -> Vec<Validator> {
    vec![
        // pre_process defaults this, so it is always present and boolean
        present("apply_effects", Some(has_type(AttrType::Boolean, None))),
        if_present("owner", refers_to("actor", None)),
    ]
}

fn slot_validators() -> Vec<Validator> {
    vec![
        present("accepts", Some(has_type(AttrType::Keyword, None))),
        if_present(
            "capacity",
            has_type(AttrType::Number, Some(positive("a positive capacity"))),
        ),
    ]
}

fn asset_validators() -> Vec<Validator> {
    vec![
        present(
            "file_name",
            Some(has_type(
                AttrType::String,
                Some(value_passes(
                    |v| v.as_text().is_some_and(|s| !s.is_empty()),
                    "a non-empty file name",
                    None,
                )),
            )),
        ),
        if_present("tags", coll_of(vec![AttrType::Keyword], None)),
    ]
}

fn group_validators() -> Vec<Validator> {
    vec![
        one_of_present(&["include_tags", "exclude_tags"], false),
        if_present(
            "include_tags",
            has_type(AttrType::Set, Some(not_empty(Some(coll_of(vec![AttrType::Keyword], None))))),
        ),
        if_present(
            "exclude_tags",
            has_type(AttrType::Set, Some(not_empty(Some(coll_of(vec![AttrType::Keyword], None))))),
        ),
        if_present(
            "type",
            value_one_of(
                vec![
                    AttrValue::String("image".into()),
                    AttrValue::String("audio".into()),
                    AttrValue::String("video".into()),
                ],
                None,
            ),
        ),
    ]
}

/// Helper validators close over the node's declared `args` list: when
/// present, the handler's parameter names must match it.
fn helper_validators(node: &Node) -> Vec<Validator> {
    let handler_chain: Chain = match node.attribute("args").and_then(|a| a.value.elements()) {
        Some(args) => {
            let names: Vec<String> = args
                .iter()
                .filter_map(|arg| arg.as_text().map(str::to_string))
                .collect();
            has_type(AttrType::Function, Some(expects_params(names, None)))
        }
        None => has_type(AttrType::Function, None),
    };
    vec![
        present("name", Some(has_type(AttrType::String, None))),
        present("handler", Some(handler_chain)),
        if_present("args", coll_of(vec![AttrType::String], None)),
    ]
}

fn task_validators() -> Vec<Validator> {
    vec![
        present("execute", Some(has_type(AttrType::Function, Some(has_params(2, None))))),
        if_present("options", coll_of(vec![AttrType::Keyword, AttrType::String], None)),
        if_present("min_children", has_type(AttrType::Number, None)),
        if_present("max_children", has_type(AttrType::Number, None)),
    ]
}

fn actor_validators() -> Vec<Validator> {
    vec![
        if_present("name", has_type(AttrType::String, None)),
        if_present("behaviours", is_btree(None)),
        if_present("container", refers_to("inventory", None)),
    ]
}

// --- bespoke checks ---------------------------------------------------------

fn positive(expected: &str) -> Chain {
    value_passes(|v| v.as_number().is_some_and(|n| n > 0.0), expected, None)
}

/// An item's `type` keyword must be accepted by some slot, directly or
/// through the type hierarchy.
fn slot_accepts_type() -> Chain {
    Rc::new(|attr, node, game: &Game| {
        let AttrValue::Keyword(tag) = &attr.value else {
            // has_type upstream guarantees a keyword
            return Ok(());
        };
        let accepted = game.all_slots().any(|slot| {
            slot.attribute("accepts")
                .map(|a| &a.value)
                .and_then(|v| match v {
                    AttrValue::Keyword(accepts) => Some(accepts),
                    _ => None,
                })
                .is_some_and(|accepts| game.hierarchy.is_a(tag, accepts))
        });
        if accepted {
            Ok(())
        } else {
            Err(format!(
                "No slot found accepting type {} for item {}",
                tag,
                node.id.unwrap_or("(anonymous)")
            ))
        }
    })
}

/// Surface id-map collisions: every id defined more than once is listed
/// with each definition site, newest first.
fn duplicate_ids() -> Validator {
    node_passes("no duplicate ids", |_, game| {
        let mut reports = Vec::new();
        for (id, records) in game.id_map.collisions() {
            let sites = records
                .iter()
                .map(|r| format!("{} at {}:{}", r.kind, r.file, r.line))
                .collect::<Vec<_>>()
                .join(", ");
            reports.push(format!(
                "id '{}' is defined {} times ({})",
                id,
                records.len(),
                sites
            ));
        }
        if reports.is_empty() {
            Ok(())
        } else {
            Err(reports.join("; "))
        }
    })
}
