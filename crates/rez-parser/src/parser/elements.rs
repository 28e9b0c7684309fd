//! The element grammar: one parser per game element, plus the top-level
//! entry point.

use crate::parser::blocks::{
    auto_id_block, children_block, delimited_block, derive_statement, finish_game, id_block,
    id_children_block, optional_attrs_block,
};
use crate::parser::combinators::{choice, traced, Parser};
use crate::parser::context::{Context, Failure, Value};
use crate::parser::error::ParseError;
use crate::parser::primitives::skip_ws;
use indexmap::IndexMap;
use rez_ast::{Attribute, Game, LogicalFile, NodeKind};

fn card() -> Parser {
    id_block("card", || NodeKind::Card { content: None })
}

fn scene() -> Parser {
    id_children_block(
        "scene",
        || NodeKind::Scene {
            cards: Vec::new(),
            layout: None,
        },
        card(),
    )
}

fn item() -> Parser {
    id_block("item", || NodeKind::Item)
}

fn slot() -> Parser {
    optional_attrs_block("slot", || NodeKind::Slot)
}

fn inventory() -> Parser {
    id_children_block("inventory", || NodeKind::Inventory { slots: Vec::new() }, slot())
}

fn asset() -> Parser {
    id_block("asset", || NodeKind::Asset)
}

fn group() -> Parser {
    id_block("group", || NodeKind::Group)
}

fn actor() -> Parser {
    id_block("actor", || NodeKind::Actor)
}

fn task() -> Parser {
    id_block("task", || NodeKind::Task)
}

/// Helpers are auto-id blocks: the id comes from the `name` attribute.
/// Without one the node stays anonymous and validation reports it.
fn helper() -> Parser {
    auto_id_block("helper", || NodeKind::Helper, helper_id)
}

fn helper_id(attributes: &IndexMap<String, Attribute>) -> Option<String> {
    attributes
        .get("name")
        .and_then(|attr| attr.value.as_text())
        .map(str::to_string)
}

fn script() -> Parser {
    delimited_block("script", "script", true)
}

fn styles() -> Parser {
    delimited_block("styles", "styles", true)
}

/// Everything legal inside the game body.
fn top_level() -> Parser {
    choice(vec![
        derive_statement(),
        scene(),
        card(),
        item(),
        inventory(),
        slot(),
        asset(),
        group(),
        actor(),
        task(),
        helper(),
        script(),
        styles(),
    ])
}

/// The root parser: `@game { … }`.
pub fn game() -> Parser {
    traced(children_block("game", top_level(), finish_game))
}

/// Parse a complete logical file into a [`Game`].
///
/// The identifier map and type hierarchy populated during the parse move
/// into the returned game; that hand-off is the phase boundary between
/// parsing and validation.
///
/// # Errors
///
/// Any committed block failure, unrecognized top-level input, or trailing
/// input after the game block.
pub fn parse(source: &LogicalFile) -> Result<Game, ParseError> {
    let mut ctx = Context::new(source);
    let parser = game();

    skip_ws(&mut ctx);
    match parser.parse(&mut ctx) {
        Ok(()) => {}
        Err(Failure::Miss { expected, line, col }) => {
            return Err(ParseError::UnexpectedInput {
                expected,
                line,
                col,
            })
        }
        Err(Failure::Fatal(err)) => return Err(err),
    }

    skip_ws(&mut ctx);
    if !ctx.at_end() {
        let at = ctx.cursor();
        return Err(ParseError::TrailingInput {
            line: at.line,
            col: at.col,
        });
    }

    match ctx.ast.pop() {
        Some(Value::Game(mut game)) => {
            game.id_map = std::mem::take(&mut ctx.state.id_map);
            game.hierarchy = std::mem::take(&mut ctx.state.hierarchy);
            Ok(*game)
        }
        _ => Err(ParseError::Internal(
            "parser finished without producing a game".into(),
        )),
    }
}
