// Integration tests that parse complete inline sources, covering each
// block shape, position tracking through included files, id registration,
// and commit behaviour.

use rez_ast::{AttrValue, IdEntry, LogicalFile, NodeKind};
use rez_parser::{parse, ParseError};

fn parse_str(text: &str) -> rez_ast::Game {
    let source = LogicalFile::single("main.rez", text.to_string());
    parse(&source).expect("source should parse")
}

#[test]
fn test_item_block_attributes() {
    let game = parse_str(
        r#"
        @game {
            name: "Test"
            @item sword {
                name: "Sword"
                type: :weapon
                size: 3
                magical: true
            }
        }
        "#,
    );

    assert_eq!(game.items.len(), 1);
    let sword = &game.items[0];
    assert_eq!(sword.id.as_deref(), Some("sword"));
    assert_eq!(sword.node_type(), "item");
    assert_eq!(
        sword.attribute("name").unwrap().value,
        AttrValue::String("Sword".into())
    );
    assert_eq!(
        sword.attribute("type").unwrap().value,
        AttrValue::Keyword("weapon".into())
    );
    assert_eq!(
        sword.attribute("size").unwrap().value,
        AttrValue::Number(3.0)
    );
    assert_eq!(
        sword.attribute("magical").unwrap().value,
        AttrValue::Boolean(true)
    );
}

#[test]
fn test_block_positions_follow_the_logical_file() {
    // two physical files spliced by the preprocessor
    let source = LogicalFile::builder()
        .push("main.rez", "@game {\n  name: \"T\"\n")
        .push("items.rez", "  @item sword { size: 1 }\n")
        .push_from("main.rez", "}\n", 3)
        .build();
    let game = parse(&source).unwrap();

    let sword = &game.items[0];
    assert_eq!(sword.position.file, "items.rez");
    assert_eq!(sword.position.line, 1);
    assert_eq!(sword.position.col, 3);

    // the id map records the same physical location
    let record = game.id_map.lookup("sword").unwrap();
    assert_eq!(record.kind, "item");
    assert_eq!(record.file, "items.rez");
    assert_eq!(record.line, 1);
}

#[test]
fn test_duplicate_ids_collect_newest_first() {
    let game = parse_str(
        r#"
        @game {
            @item a { size: 1 }
            @item a { size: 2 }
        }
        "#,
    );

    match game.id_map.entry("a").unwrap() {
        IdEntry::Collision(records) => {
            assert_eq!(records.len(), 2);
            // newest first
            assert_eq!(records[0].line, 4);
            assert_eq!(records[1].line, 3);
        }
        other => panic!("expected collision, got {:?}", other),
    }
}

#[test]
fn test_scene_owns_cards_and_registers_their_ids() {
    let game = parse_str(
        r#"
        @game {
            @scene forest {
                initial_card: #clearing
                @card clearing {
                    content: "A quiet clearing."
                }
                @card thicket {
                    content: "Dense thicket."
                }
            }
        }
        "#,
    );

    let forest = &game.scenes[0];
    let NodeKind::Scene { cards, .. } = &forest.kind else {
        panic!("expected scene payload");
    };
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id.as_deref(), Some("clearing"));
    assert_eq!(game.id_map.kind_of("clearing"), Some("card"));
    assert_eq!(game.id_map.kind_of("thicket"), Some("card"));
    assert_eq!(game.id_map.kind_of("forest"), Some("scene"));
}

#[test]
fn test_inventory_slots_and_optional_attrs() {
    let game = parse_str(
        r#"
        @game {
            @inventory pack {
                @slot main { accepts: :weapon capacity: 2 }
                @slot spare
            }
        }
        "#,
    );

    let pack = &game.inventories[0];
    let NodeKind::Inventory { slots } = &pack.kind else {
        panic!("expected inventory payload");
    };
    assert_eq!(slots.len(), 2);
    // bare slot parses with an empty attribute map
    assert_eq!(slots[1].id.as_deref(), Some("spare"));
    assert!(slots[1].attribute("accepts").is_none());
    // inventory pre_process defaulted apply_effects during the parse
    assert_eq!(
        pack.attribute("apply_effects").unwrap().value,
        AttrValue::Boolean(false)
    );
}

#[test]
fn test_helper_gets_auto_id_from_name() {
    let game = parse_str(
        r#"
        @game {
            @helper {
                name: "shout"
                handler: (s) => { return s.toUpperCase(); }
            }
        }
        "#,
    );

    assert_eq!(game.helpers[0].id.as_deref(), Some("shout"));
    assert_eq!(game.id_map.kind_of("shout"), Some("helper"));
}

#[test]
fn test_helper_without_name_stays_anonymous() {
    let game = parse_str(
        r#"
        @game {
            @helper {
                handler: (s) => { return s; }
            }
        }
        "#,
    );
    assert!(game.helpers[0].id.is_none());
}

#[test]
fn test_delimited_script_block() {
    let game = parse_str(
        "@game {\n  @script begin\n    function setup() { return 42; }\n  end\n}\n",
    );

    assert_eq!(game.scripts.len(), 1);
    let script = &game.scripts[0];
    assert_eq!(script.content, "function setup() { return 42; }");
    assert_eq!(script.position.line, 2);
    assert_eq!(script.position.col, 3);
    // anonymous: nothing registered
    assert_eq!(game.id_map.len(), 1); // just "game"
}

#[test]
fn test_delimited_block_closes_at_first_end_keyword() {
    // no nesting: the first word-boundary `end` closes the block, but
    // `ending` does not
    let game = parse_str("@game {\n  @styles begin\n.ending { color: red }\n  end\n}\n");
    assert_eq!(game.stylesheets[0].content, ".ending { color: red }");
}

#[test]
fn test_derive_feeds_the_hierarchy() {
    let game = parse_str(
        r#"
        @game {
            @derive :sword :weapon
            @derive :weapon :equipment
            @item blade { type: :sword }
        }
        "#,
    );

    assert!(game.hierarchy.is_a("sword", "equipment"));
    let tags = game.items[0].attribute("tags");
    // tag expansion ran during the parse with the hierarchy seen so far
    assert!(tags.is_some());
}

#[test]
fn test_derive_cycle_is_a_parse_error() {
    let source = LogicalFile::single(
        "main.rez",
        r#"
        @game {
            @derive :a :b
            @derive :b :a
        }
        "#
        .to_string(),
    );
    match parse(&source) {
        Err(ParseError::HierarchyCycle { tag, parent, .. }) => {
            assert_eq!(tag, "b");
            assert_eq!(parent, "a");
        }
        other => panic!("expected cycle error, got {:?}", other),
    }
}

#[test]
fn test_committed_block_failure_is_block_level() {
    let source = LogicalFile::single(
        "main.rez",
        r#"
        @game {
            @item broken { size }
        }
        "#
        .to_string(),
    );
    match parse(&source) {
        Err(ParseError::BlockNotMatched { label, position }) => {
            assert_eq!(label, "item");
            assert_eq!(position.file, "main.rez");
            assert_eq!(position.line, 3);
            assert_eq!(position.col, 13);
        }
        other => panic!("expected block error, got {:?}", other),
    }
}

#[test]
fn test_trailing_input_is_an_error() {
    let source = LogicalFile::single("main.rez", "@game { }\nleftover".to_string());
    assert!(matches!(
        parse(&source),
        Err(ParseError::TrailingInput { line: 2, .. })
    ));
}

#[test]
fn test_comments_are_skipped() {
    let game = parse_str(
        r#"
        @game {
            %% the hero's blade
            @item sword { size: 1 }
        }
        "#,
    );
    assert_eq!(game.items.len(), 1);
}

#[test]
fn test_duplicate_attribute_last_wins() {
    let game = parse_str(
        r#"
        @game {
            @item sword { size: 1 size: 2 }
        }
        "#,
    );
    assert_eq!(
        game.items[0].attribute("size").unwrap().value,
        AttrValue::Number(2.0)
    );
}

#[test]
fn test_actor_with_behaviour_tree() {
    let game = parse_str(
        r#"
        @game {
            @actor guard {
                behaviours: ^[select ^[patrol speed: 2] ^[idle]]
            }
        }
        "#,
    );
    let AttrValue::BTree(tree) = &game.actors[0].attribute("behaviours").unwrap().value else {
        panic!("expected behaviour tree");
    };
    assert_eq!(tree.task, "select");
    assert_eq!(tree.children.len(), 2);
}
