//! Validator builders.
//!
//! Node-level builders return a [`Validator`]; attribute-level builders
//! return a [`Chain`] to be hung off an upstream check. A chain runs only
//! when its upstream check passed, so a mis-typed attribute produces one
//! error, not a cascade.

use crate::validate::behaviour::validate_task;
use crate::validate::{Chain, NodeView, Outcome, Validator};
use rez_ast::{AttrType, AttrValue, Attribute, Game};
use std::rc::Rc;

fn run_chain(chain: &Option<Chain>, attr: &Attribute, node: &NodeView, game: &Game) -> Outcome {
    match chain {
        Some(chain) => chain(attr, node, game),
        None => Ok(()),
    }
}

// --- node-level builders ----------------------------------------------------

/// Passes iff `key` is present; then chains on the attribute.
pub fn present(key: &str, chain: Option<Chain>) -> Validator {
    let key = key.to_string();
    Validator::new(format!("'{}' is present", key), move |node, game| {
        match node.attribute(&key) {
            Some(attr) => run_chain(&chain, attr, node, game),
            None => Err(format!("required attribute '{}' is missing", key)),
        }
    })
}

/// Absent is fine; present chains.
pub fn if_present(key: &str, chain: Chain) -> Validator {
    let key = key.to_string();
    Validator::new(format!("'{}' if present", key), move |node, game| {
        match node.attribute(&key) {
            Some(attr) => chain(attr, node, game),
            None => Ok(()),
        }
    })
}

/// Passes iff either validator passes; both failures are merged.
pub fn either(first: Validator, second: Validator) -> Validator {
    let description = format!("{} or {}", first.description(), second.description());
    Validator::new(description, move |node, game| {
        match first.run(node, game) {
            Ok(()) => Ok(()),
            Err(first_err) => match second.run(node, game) {
                Ok(()) => Ok(()),
                Err(second_err) => Err(format!("{}; {}", first_err, second_err)),
            },
        }
    })
}

/// At least one of `keys` present; with `exclusive`, at most one.
pub fn one_of_present(keys: &[&str], exclusive: bool) -> Validator {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    let listed = keys
        .iter()
        .map(|k| format!("'{}'", k))
        .collect::<Vec<_>>()
        .join(", ");
    Validator::new(format!("one of {} is present", listed), move |node, _| {
        let found: Vec<&String> = keys.iter().filter(|k| node.attribute(k).is_some()).collect();
        if found.is_empty() {
            return Err(format!("expected one of {} to be present", listed));
        }
        if exclusive && found.len() > 1 {
            let found = found
                .iter()
                .map(|k| format!("'{}'", k))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(format!(
                "attributes {} are mutually exclusive, found {} together",
                listed, found
            ));
        }
        Ok(())
    })
}

/// Free-form predicate over the whole node and game.
pub fn node_passes(
    description: impl Into<String>,
    check: impl Fn(&NodeView, &Game) -> Outcome + 'static,
) -> Validator {
    Validator::new(description, check)
}

// --- chained builders -------------------------------------------------------

/// All of `keys` must also be present on the node. Used inside
/// `if_present` to express "if A is set, B and C are required".
pub fn other_attrs_present(keys: &[&str], chain: Option<Chain>) -> Chain {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    Rc::new(move |attr, node, game| {
        for key in &keys {
            if node.attribute(key).is_none() {
                return Err(format!(
                    "Attribute '{}' requires '{}' to be present",
                    attr.name, key
                ));
            }
        }
        run_chain(&chain, attr, node, game)
    })
}

/// The attribute's type tag equals `expected`.
pub fn has_type(expected: AttrType, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        if attr.kind() == expected {
            run_chain(&chain, attr, node, game)
        } else {
            Err(format!(
                "attribute '{}' expected type {}, found {}",
                attr.name,
                expected,
                attr.kind()
            ))
        }
    })
}

/// The attribute's value is one of `allowed`.
pub fn value_one_of(allowed: Vec<AttrValue>, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        if allowed.contains(&attr.value) {
            run_chain(&chain, attr, node, game)
        } else {
            let listed = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(format!(
                "attribute '{}' expected one of {}, found {}",
                attr.name, listed, attr.value
            ))
        }
    })
}

/// The attribute is a collection with at least one element.
pub fn not_empty(chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| match attr.value.elements() {
        Some([]) => Err(format!("attribute '{}' must not be empty", attr.name)),
        Some(_) => run_chain(&chain, attr, node, game),
        None => Err(format!(
            "attribute '{}' expected a collection, found {}",
            attr.name,
            attr.kind()
        )),
    })
}

/// Every element's type tag is one of `types`.
pub fn coll_of(types: Vec<AttrType>, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        let elements = attr.value.elements().ok_or_else(|| {
            format!(
                "attribute '{}' expected a collection, found {}",
                attr.name,
                attr.kind()
            )
        })?;
        for element in elements {
            if !types.contains(&element.kind()) {
                let listed = types
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(format!(
                    "attribute '{}' expected elements of type {}, found {}",
                    attr.name,
                    listed,
                    element.kind()
                ));
            }
        }
        run_chain(&chain, attr, node, game)
    })
}

/// Every element is an elem-ref resolving in the id map to `kind`.
pub fn list_references(kind: &'static str, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        let elements = attr.value.elements().ok_or_else(|| {
            format!(
                "attribute '{}' expected a collection, found {}",
                attr.name,
                attr.kind()
            )
        })?;
        for element in elements {
            let AttrValue::ElemRef(id) = element else {
                return Err(format!(
                    "attribute '{}' expected element references, found {}",
                    attr.name,
                    element.kind()
                ));
            };
            check_reference(&attr.name, id, kind, game)?;
        }
        run_chain(&chain, attr, node, game)
    })
}

/// A scalar elem-ref resolving in the id map to `kind`.
pub fn refers_to(kind: &'static str, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        let AttrValue::ElemRef(id) = &attr.value else {
            return Err(format!(
                "attribute '{}' expected an element reference, found {}",
                attr.name,
                attr.kind()
            ));
        };
        check_reference(&attr.name, id, kind, game)?;
        run_chain(&chain, attr, node, game)
    })
}

fn check_reference(attr_name: &str, id: &str, kind: &str, game: &Game) -> Outcome {
    match game.id_map.kind_of(id) {
        None => Err(format!(
            "attribute '{}' references '#{}' which is not defined",
            attr_name, id
        )),
        Some(found) if found != kind => Err(format!(
            "attribute '{}' expected a reference to a {}, but '#{}' is a {}",
            attr_name, kind, id, found
        )),
        Some(_) => Ok(()),
    }
}

/// The value satisfies `predicate`, described as `expected`.
pub fn value_passes(
    predicate: impl Fn(&AttrValue) -> bool + 'static,
    expected: &str,
    chain: Option<Chain>,
) -> Chain {
    let expected = expected.to_string();
    Rc::new(move |attr, node, game| {
        if predicate(&attr.value) {
            run_chain(&chain, attr, node, game)
        } else {
            Err(format!(
                "attribute '{}' expected {}, found {}",
                attr.name, expected, attr.value
            ))
        }
    })
}

/// Chains only when the value equals `test`; any other value is fine.
pub fn validate_if_value(test: AttrValue, chain: Chain) -> Chain {
    Rc::new(move |attr, node, game| {
        if attr.value == test {
            chain(attr, node, game)
        } else {
            Ok(())
        }
    })
}

/// The attribute is a structurally valid behaviour tree: every task
/// resolves, child counts are legal, required options are supplied.
pub fn is_btree(chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        let AttrValue::BTree(tree) = &attr.value else {
            return Err(format!(
                "attribute '{}' expected a behaviour tree, found {}",
                attr.name,
                attr.kind()
            ));
        };
        validate_task(tree, game)
            .map_err(|err| format!("attribute '{}': {}", attr.name, err))?;
        run_chain(&chain, attr, node, game)
    })
}

/// The function attribute takes exactly `count` parameters.
pub fn has_params(count: usize, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        let AttrValue::Function { params, .. } = &attr.value else {
            return Err(format!(
                "attribute '{}' expected a function, found {}",
                attr.name,
                attr.kind()
            ));
        };
        if params.len() != count {
            return Err(format!(
                "attribute '{}' expected a function of {} parameter(s), found {}",
                attr.name,
                count,
                params.len()
            ));
        }
        run_chain(&chain, attr, node, game)
    })
}

/// The function attribute's parameter names equal `expected`, in order.
pub fn expects_params(expected: Vec<String>, chain: Option<Chain>) -> Chain {
    Rc::new(move |attr, node, game| {
        let AttrValue::Function { params, .. } = &attr.value else {
            return Err(format!(
                "attribute '{}' expected a function, found {}",
                attr.name,
                attr.kind()
            ));
        };
        if *params != expected {
            return Err(format!(
                "attribute '{}' expected parameters ({}), found ({})",
                attr.name,
                expected.join(", "),
                params.join(", ")
            ));
        }
        run_chain(&chain, attr, node, game)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use rez_ast::{Node, NodeKind, SourcePos};

    fn game() -> Game {
        Game::new(SourcePos::root(), IndexMap::new())
    }

    fn item(pairs: Vec<(&str, AttrValue)>) -> Node {
        let attributes = pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), Attribute::new(name, value)))
            .collect();
        Node::new(
            NodeKind::Item,
            Some("sword".into()),
            SourcePos::new("main.rez", 1, 1),
            attributes,
        )
    }

    #[test]
    fn test_present_and_chain() {
        let game = game();
        let node = item(vec![("size", AttrValue::Number(3.0))]);
        let view = NodeView::of_node(&node);

        assert!(present("size", None).run(&view, &game).is_ok());
        assert!(present("weight", None).run(&view, &game).is_err());

        // chain runs on the attribute
        let typed = present("size", Some(has_type(AttrType::Number, None)));
        assert!(typed.run(&view, &game).is_ok());
        let mistyped = present("size", Some(has_type(AttrType::String, None)));
        let err = mistyped.run(&view, &game).unwrap_err();
        assert!(err.contains("expected type string"));
        assert!(err.contains("found number"));
    }

    #[test]
    fn test_chain_not_invoked_on_failure() {
        // law: a(chain=b) emits only b's errors when a passes; when a
        // fails, b never runs
        use std::cell::Cell;
        use std::rc::Rc as StdRc;

        let ran = StdRc::new(Cell::new(false));
        let ran_probe = ran.clone();
        let probe: Chain = Rc::new(move |_, _, _| {
            ran_probe.set(true);
            Ok(())
        });

        let game = game();
        let node = item(vec![("size", AttrValue::Number(3.0))]);
        let view = NodeView::of_node(&node);

        let mistyped = present("size", Some(has_type(AttrType::String, Some(probe))));
        assert!(mistyped.run(&view, &game).is_err());
        assert!(!ran.get(), "chain must not run after a failed check");
    }

    #[test]
    fn test_if_present_skips_absent() {
        let game = game();
        let node = item(vec![]);
        let view = NodeView::of_node(&node);
        let validator = if_present("size", has_type(AttrType::Number, None));
        assert!(validator.run(&view, &game).is_ok());
    }

    #[test]
    fn test_either_merges_errors() {
        let game = game();
        let node = item(vec![]);
        let view = NodeView::of_node(&node);
        let validator = either(present("a", None), present("b", None));
        let err = validator.run(&view, &game).unwrap_err();
        assert!(err.contains("'a'"));
        assert!(err.contains("'b'"));
    }

    #[test]
    fn test_one_of_present_exclusive() {
        let game = game();
        let node = item(vec![
            ("a", AttrValue::Number(1.0)),
            ("b", AttrValue::Number(2.0)),
        ]);
        let view = NodeView::of_node(&node);

        assert!(one_of_present(&["a", "b"], false).run(&view, &game).is_ok());
        assert!(one_of_present(&["a", "b"], true).run(&view, &game).is_err());
        assert!(one_of_present(&["x", "y"], false).run(&view, &game).is_err());
    }

    #[test]
    fn test_other_attrs_present() {
        let game = game();
        let node = item(vec![("consumable", AttrValue::Boolean(true))]);
        let view = NodeView::of_node(&node);

        let validator = if_present(
            "consumable",
            has_type(
                AttrType::Boolean,
                Some(validate_if_value(
                    AttrValue::Boolean(true),
                    other_attrs_present(&["uses"], None),
                )),
            ),
        );
        let err = validator.run(&view, &game).unwrap_err();
        assert_eq!(err, "Attribute 'consumable' requires 'uses' to be present");

        // consumable: false does not require uses
        let node = item(vec![("consumable", AttrValue::Boolean(false))]);
        let view = NodeView::of_node(&node);
        assert!(validator.run(&view, &game).is_ok());
    }

    #[test]
    fn test_collection_checks() {
        let game = game();
        let node = item(vec![
            (
                "tags",
                AttrValue::Set(vec![
                    AttrValue::Keyword("a".into()),
                    AttrValue::Keyword("b".into()),
                ]),
            ),
            ("empty", AttrValue::List(vec![])),
            (
                "mixed",
                AttrValue::List(vec![AttrValue::Keyword("a".into()), AttrValue::Number(1.0)]),
            ),
        ]);
        let view = NodeView::of_node(&node);

        let keywords_only = present("tags", Some(coll_of(vec![AttrType::Keyword], None)));
        assert!(keywords_only.run(&view, &game).is_ok());

        let mixed = present("mixed", Some(coll_of(vec![AttrType::Keyword], None)));
        assert!(mixed.run(&view, &game).unwrap_err().contains("found number"));

        assert!(present("empty", Some(not_empty(None)))
            .run(&view, &game)
            .unwrap_err()
            .contains("must not be empty"));
        assert!(present("tags", Some(not_empty(None))).run(&view, &game).is_ok());
    }

    #[test]
    fn test_reference_checks() {
        let mut game = game();
        game.id_map
            .register("intro", rez_ast::IdRecord::new("card", "main.rez", 2));

        let node = item(vec![
            ("good", AttrValue::ElemRef("intro".into())),
            ("missing", AttrValue::ElemRef("ghost".into())),
            (
                "refs",
                AttrValue::List(vec![AttrValue::ElemRef("intro".into())]),
            ),
        ]);
        let view = NodeView::of_node(&node);

        assert!(present("good", Some(refers_to("card", None)))
            .run(&view, &game)
            .is_ok());
        let wrong_kind = present("good", Some(refers_to("scene", None)))
            .run(&view, &game)
            .unwrap_err();
        assert!(wrong_kind.contains("'#intro' is a card"));
        let unresolved = present("missing", Some(refers_to("card", None)))
            .run(&view, &game)
            .unwrap_err();
        assert!(unresolved.contains("not defined"));

        assert!(present("refs", Some(list_references("card", None)))
            .run(&view, &game)
            .is_ok());
        assert!(present("refs", Some(list_references("scene", None)))
            .run(&view, &game)
            .is_err());
    }

    #[test]
    fn test_function_checks() {
        let game = game();
        let node = item(vec![(
            "handler",
            AttrValue::Function {
                params: vec!["event".into(), "state".into()],
                body: "return state;".into(),
            },
        )]);
        let view = NodeView::of_node(&node);

        assert!(present("handler", Some(has_params(2, None)))
            .run(&view, &game)
            .is_ok());
        assert!(present("handler", Some(has_params(1, None)))
            .run(&view, &game)
            .is_err());
        assert!(present(
            "handler",
            Some(expects_params(vec!["event".into(), "state".into()], None))
        )
        .run(&view, &game)
        .is_ok());
        let err = present(
            "handler",
            Some(expects_params(vec!["evt".into()], None)),
        )
        .run(&view, &game)
        .unwrap_err();
        assert!(err.contains("expected parameters (evt)"));
    }

    #[test]
    fn test_value_one_of_and_passes() {
        let game = game();
        let node = item(vec![("type", AttrValue::String("image".into()))]);
        let view = NodeView::of_node(&node);

        let allowed = present(
            "type",
            Some(value_one_of(
                vec![
                    AttrValue::String("image".into()),
                    AttrValue::String("audio".into()),
                ],
                None,
            )),
        );
        assert!(allowed.run(&view, &game).is_ok());

        let node = item(vec![("type", AttrValue::String("movie".into()))]);
        let view = NodeView::of_node(&node);
        assert!(allowed.run(&view, &game).is_err());

        let positive = present(
            "size",
            Some(value_passes(
                |v| v.as_number().is_some_and(|n| n > 0.0),
                "a positive number",
                None,
            )),
        );
        let node = item(vec![("size", AttrValue::Number(-1.0))]);
        let view = NodeView::of_node(&node);
        assert!(positive.run(&view, &game).unwrap_err().contains("positive"));
    }
}
