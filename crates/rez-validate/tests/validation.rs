// End-to-end validation tests: parse a complete source, run the process
// pass, validate, and check the ledger.

use rez_ast::LogicalFile;
use rez_validate::{validate, validate_subtree, Validation};

fn compile(text: &str) -> (rez_ast::Game, Validation) {
    let source = LogicalFile::single("main.rez", text.to_string());
    let mut game = rez_parser::parse(&source).expect("source should parse");
    game.process();
    let validation = validate(&game);
    (game, validation)
}

const WELL_FORMED: &str = r#"
@game {
    name: "Trial of the Sword"
    initial_scene: #forest

    @scene forest {
        initial_card: #clearing
        @card clearing {
            content: "You stand in a clearing holding {{ player.weapon }}."
        }
    }

    @derive :sword :weapon

    @item sword {
        name: "Sword"
        type: :weapon
        size: 3
    }

    @inventory pack {
        @slot hands { accepts: :weapon }
    }
}
"#;

#[test]
fn test_well_formed_game_validates_clean() {
    let (_, validation) = compile(WELL_FORMED);
    assert!(
        validation.is_ok(),
        "expected no errors, got: {:?}",
        validation.errors
    );
    // every node appears in the ledger, the root last
    assert_eq!(validation.validated.last().map(String::as_str), Some("game 'game'"));
    assert!(validation.validated.contains(&"item 'sword'".to_string()));
    assert!(validation.validated.contains(&"card 'clearing'".to_string()));
}

#[test]
fn test_item_type_accepted_through_hierarchy() {
    // the slot accepts :weapon and the item is a :sword, which derives
    // from :weapon
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @derive :sword :weapon
            @item blade { type: :sword }
            @slot hands { accepts: :weapon }
        }
        "#,
    );
    assert!(
        validation.is_ok(),
        "expected no errors, got: {:?}",
        validation.errors
    );
}

#[test]
fn test_item_with_no_accepting_slot() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item sword { type: :weapon }
            @slot belt { accepts: :potion }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(
        messages.contains(&"No slot found accepting type weapon for item sword"),
        "got: {:?}",
        messages
    );
}

#[test]
fn test_consumable_requires_uses() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item potion { type: :potion consumable: true }
            @slot belt { accepts: :potion }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(
        messages.contains(&"Attribute 'consumable' requires 'uses' to be present"),
        "got: {:?}",
        messages
    );

    // with uses supplied the same item is fine
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item potion { type: :potion consumable: true uses: 3 }
            @slot belt { accepts: :potion }
        }
        "#,
    );
    assert!(validation.is_ok(), "got: {:?}", validation.errors);
}

#[test]
fn test_group_needs_include_or_exclude_tags() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @group g { type: "image" }
        }
        "#,
    );
    let group_errors: Vec<&str> = validation
        .errors
        .iter()
        .filter(|e| e.node == "group 'g'")
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        group_errors,
        vec!["expected one of 'include_tags', 'exclude_tags' to be present"]
    );
}

#[test]
fn test_unresolved_and_resolved_scene_refs() {
    // initial_card points at a card that does not exist
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #intro
                @card other { content: "x" }
            }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(
        messages
            .iter()
            .any(|m| m.contains("'#intro' which is not defined")),
        "got: {:?}",
        messages
    );

    // defining the card fixes it
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #intro
                @card intro { content: "x" }
            }
        }
        "#,
    );
    assert!(validation.is_ok(), "got: {:?}", validation.errors);
}

#[test]
fn test_duplicate_ids_surface_at_validation() {
    let (game, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item a { type: :misc }
            @item a { type: :misc }
            @slot any { accepts: :misc }
        }
        "#,
    );
    // the parse itself succeeded and recorded the collision
    assert_eq!(game.id_map.entry("a").unwrap().definition_count(), 2);

    let dup: Vec<&str> = validation
        .errors
        .iter()
        .filter(|e| e.message.contains("defined 2 times"))
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(dup.len(), 1);
    assert!(dup[0].contains("id 'a'"), "got: {}", dup[0]);
}

#[test]
fn test_wrong_ref_kind_is_reported() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #sword
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item sword { type: :misc }
            @slot any { accepts: :misc }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(
        messages
            .iter()
            .any(|m| m.contains("expected a reference to a scene, but '#sword' is a item")),
        "got: {:?}",
        messages
    );
}

#[test]
fn test_behaviour_tree_validation_through_actor() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @task select {
                execute: (task, wmem) => { return task.children; }
                min_children: 1
            }
            @task patrol {
                execute: (task, wmem) => { return wmem; }
                options: [:speed]
            }
            @actor guard {
                behaviours: ^[select ^[patrol]]
            }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(
        messages
            .iter()
            .any(|m| m.contains("task 'patrol' requires option 'speed'")),
        "got: {:?}",
        messages
    );
}

#[test]
fn test_template_failure_surfaces_as_validation_error() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "broken {{ tail" }
            }
        }
        "#,
    );
    let card_errors: Vec<&str> = validation
        .errors
        .iter()
        .filter(|e| e.node == "card 'c'")
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(card_errors.len(), 1);
    assert!(card_errors[0].contains("template 'content'"));
}

#[test]
fn test_error_order_is_deterministic() {
    // two errors on one node follow validator declaration order; sibling
    // errors follow children() order
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item one { type: :ghost size: -2 }
            @item two { type: :phantom }
            @slot any { accepts: :misc }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "No slot found accepting type ghost for item one",
            "attribute 'size' expected a positive size, found -2",
            "No slot found accepting type phantom for item two",
        ]
    );
}

#[test]
fn test_subtree_validation_merges_associatively() {
    let (game, whole) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
            @item one { type: :ghost }
            @item two { type: :phantom }
            @slot any { accepts: :misc }
        }
        "#,
    );

    // validate each child independently and concatenate
    let mut pieces = Validation::default();
    for child in game.children() {
        pieces.merge(validate_subtree(child, &game));
    }

    let child_errors: Vec<_> = whole
        .errors
        .iter()
        .filter(|e| e.node != "game 'game'")
        .cloned()
        .collect();
    assert_eq!(pieces.errors, child_errors);
}

#[test]
fn test_card_blocks_must_reference_cards() {
    let (_, validation) = compile(
        r#"
        @game {
            name: "T"
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c {
                    content: "x"
                    blocks: [#sidebar #sword]
                }
                @card sidebar { content: "aside" }
            }
            @item sword { type: :misc }
            @slot any { accepts: :misc }
        }
        "#,
    );
    let messages: Vec<&str> = validation.errors.iter().map(|e| e.message.as_str()).collect();
    assert!(
        messages
            .iter()
            .any(|m| m.contains("expected a reference to a card, but '#sword' is a item")),
        "got: {:?}",
        messages
    );
}

#[test]
fn test_missing_game_name_reported() {
    let (_, validation) = compile(
        r#"
        @game {
            initial_scene: #s
            @scene s {
                initial_card: #c
                @card c { content: "x" }
            }
        }
        "#,
    );
    let game_errors: Vec<&str> = validation
        .errors
        .iter()
        .filter(|e| e.node == "game 'game'")
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(game_errors, vec!["required attribute 'name' is missing"]);
}
