//! The block schema layer: one parameterized parser per block shape.
//!
//! Every `@label` construct is one of seven shapes: bare auto-id block,
//! required-id block, id block with optional attributes, children block,
//! id block with children, delimited text block, or the `@derive`
//! statement. Each shape shares the same post-match procedure: read the
//! entry point, resolve it through the logical file, fold the attribute
//! list into a map (last duplicate wins), construct the node, run its
//! `pre_process`, and register its id.
//!
//! Commit discipline: `commit()` sits immediately after the `@label`
//! match, so an `@item` block that fails past that point is a block-level
//! error rather than an invitation to try `@inventory`.

use crate::parser::combinators::{
    choice, commit, many, not_lookahead, optional, sequence_with, Parser, SequenceOpts,
};
use crate::parser::context::{Context, Failure, Step, Value};
use crate::parser::error::ParseError;
use crate::parser::primitives::{
    any, ident, ident_char, iliteral, lead_ws, scan_identifier, skip_ws, word,
};
use crate::parser::values::scan_value;
use indexmap::IndexMap;
use rez_ast::{AttrValue, Attribute, Fragment, Game, IdRecord, Node, NodeKind, SourcePos};
use std::rc::Rc;

/// Constructor for a shape's fresh node payload.
pub type KindFn = fn() -> NodeKind;

/// Id derivation for auto-id blocks, e.g. a helper's id from its `name`
/// attribute. `None` leaves the block anonymous; the validator reports
/// the missing attribute.
pub type IdFn = fn(&IndexMap<String, Attribute>) -> Option<String>;

// --- building blocks --------------------------------------------------------

/// `@label` with a word boundary, so `@item` never matches `@items`.
fn block_open(label: &'static str) -> Parser {
    Parser::new(label, move |ctx| {
        let rest = ctx.rest();
        if let Some(after) = rest.strip_prefix('@') {
            if after.starts_with(label)
                && !after[label.len()..].chars().next().is_some_and(ident_char)
            {
                ctx.advance(1 + label.len());
                return Ok(());
            }
        }
        Err(ctx.miss(format!("'@{}'", label)))
    })
}

/// `name : value` — one attribute. Leading whitespace is the caller's
/// concern so that block positions stay accurate.
pub fn attribute() -> Parser {
    Parser::new("attribute", |ctx| {
        let name = match scan_identifier(ctx) {
            Some(name) => name,
            None => return Err(ctx.miss("attribute name")),
        };
        skip_ws(ctx);
        if ctx.peek() != Some(':') {
            return Err(ctx.miss("':'"));
        }
        ctx.advance(1);
        skip_ws(ctx);
        let value = scan_value(ctx)?;
        ctx.ast.push(Value::Attr(Attribute::new(name, value)));
        Ok(())
    })
}

/// `:keyword` produced as a scalar; used by `@derive`.
fn keyword_literal() -> Parser {
    Parser::new("keyword", |ctx| {
        skip_ws(ctx);
        if ctx.peek() != Some(':') {
            return Err(ctx.miss("keyword"));
        }
        ctx.advance(1);
        match scan_identifier(ctx) {
            Some(name) => {
                ctx.ast.push(Value::Scalar(AttrValue::Keyword(name)));
                Ok(())
            }
            None => Err(ctx.miss("keyword")),
        }
    })
}

/// `{ attribute* }`
fn attrs_body() -> Parser {
    sequence_with(
        vec![iliteral("{"), many(lead_ws(attribute())), iliteral("}")],
        SequenceOpts::default(),
    )
}

/// `{ (child | attribute)* }`
fn mixed_body(child: Parser) -> Parser {
    sequence_with(
        vec![
            iliteral("{"),
            many(lead_ws(choice(vec![child, attribute()]))),
            iliteral("}"),
        ],
        SequenceOpts::default(),
    )
}

/// Longest span strictly before the first word-boundary `close` keyword:
/// keep consuming single characters while the closer is not next, then
/// consume the closer itself. The whole span collapses into one text
/// value via the sequence's `ast` transform.
fn delimited_text(close: &'static str) -> Parser {
    fn gather(values: &[Value], out: &mut String) {
        for value in values {
            match value {
                Value::List(inner) => gather(inner, out),
                Value::Text(text) => out.push_str(text),
                _ => {}
            }
        }
    }
    sequence_with(
        vec![
            many(sequence_with(
                vec![not_lookahead(word(close)), any()],
                SequenceOpts::default(),
            )),
            word(close),
        ],
        SequenceOpts {
            ast: Some(Rc::new(|values| {
                let mut text = String::new();
                gather(&values, &mut text);
                vec![Value::Text(text)]
            })),
            ..Default::default()
        },
    )
}

// --- shared post-match ------------------------------------------------------

/// Everything a block sequence produced, flattened out of the nested
/// sequence/repetition lists.
#[derive(Default)]
struct BlockParts {
    texts: Vec<String>,
    attributes: IndexMap<String, Attribute>,
    children: Vec<Node>,
    fragments: Vec<(String, Fragment)>,
    scalars: Vec<AttrValue>,
}

fn collect_parts(values: Vec<Value>, parts: &mut BlockParts) {
    for value in values {
        match value {
            Value::List(inner) => collect_parts(inner, parts),
            Value::Text(text) => parts.texts.push(text),
            // duplicate attribute names: last occurrence wins
            Value::Attr(attr) => {
                parts.attributes.insert(attr.name.clone(), attr);
            }
            Value::Node(node) => parts.children.push(*node),
            Value::Fragment { key, fragment } => parts.fragments.push((key, fragment)),
            Value::Scalar(scalar) => parts.scalars.push(scalar),
            // the root block has no enclosing block
            Value::Game(_) => {}
        }
    }
}

fn pop_parts(ctx: &mut Context) -> Result<BlockParts, Failure> {
    match ctx.ast.pop() {
        Some(Value::List(values)) => {
            let mut parts = BlockParts::default();
            collect_parts(values, &mut parts);
            Ok(parts)
        }
        other => Err(Failure::Fatal(ParseError::Internal(format!(
            "block builder expected a value list, found {:?}",
            other
        )))),
    }
}

/// Resolve the enclosing block sequence's entry point to a physical
/// position.
fn block_position(ctx: &Context) -> Result<SourcePos, Failure> {
    let (line, col) = ctx.entry_point();
    ctx.resolve(line, col).map_err(Failure::Fatal)
}

/// Construct the node, normalize it, and register its id.
fn finish_node(ctx: &mut Context, kind: NodeKind, id: Option<String>, parts: BlockParts) -> Step {
    let position = block_position(ctx)?;
    let mut node = Node::new(kind, id, position.clone(), parts.attributes);
    for child in parts.children {
        node.add_child(child);
    }
    node.pre_process(&ctx.state.hierarchy);
    if let Some(id) = node.id.clone() {
        ctx.state.id_map.register(
            id,
            IdRecord::new(node.node_type(), position.file.clone(), position.line),
        );
    }
    ctx.ast.push(Value::Node(Box::new(node)));
    Ok(())
}

fn block_sequence<A>(label: &'static str, parsers: Vec<Parser>, action: A) -> Parser
where
    A: for<'s> Fn(&mut Context<'s>) -> Step + 'static,
{
    sequence_with(
        parsers,
        SequenceOpts {
            label: Some(label.into()),
            ast: None,
            action: Some(Rc::new(action)),
        },
    )
}

// --- the seven shapes -------------------------------------------------------

/// Shape 1: `@label { attrs }`, id derived from the attributes.
pub fn auto_id_block(label: &'static str, kind: KindFn, id_fn: IdFn) -> Parser {
    block_sequence(
        label,
        vec![block_open(label), commit(), attrs_body()],
        move |ctx| {
            let parts = pop_parts(ctx)?;
            let id = id_fn(&parts.attributes);
            finish_node(ctx, kind(), id, parts)
        },
    )
}

/// Shape 2: `@label ident { attrs }`.
pub fn id_block(label: &'static str, kind: KindFn) -> Parser {
    block_sequence(
        label,
        vec![block_open(label), commit(), ident(), attrs_body()],
        move |ctx| {
            let mut parts = pop_parts(ctx)?;
            let id = first_text(&mut parts);
            finish_node(ctx, kind(), id, parts)
        },
    )
}

/// Shape 3: `@label ident [ { attrs } ]` — absent attrs mean an empty map.
pub fn optional_attrs_block(label: &'static str, kind: KindFn) -> Parser {
    block_sequence(
        label,
        vec![block_open(label), commit(), ident(), optional(attrs_body())],
        move |ctx| {
            let mut parts = pop_parts(ctx)?;
            let id = first_text(&mut parts);
            finish_node(ctx, kind(), id, parts)
        },
    )
}

/// Shape 4: `@label { (child | attr)* }` with a caller-supplied finisher;
/// the root game block is the instance.
pub fn children_block<A>(label: &'static str, child: Parser, finish: A) -> Parser
where
    A: for<'s> Fn(&mut Context<'s>) -> Step + 'static,
{
    block_sequence(
        label,
        vec![block_open(label), commit(), mixed_body(child)],
        finish,
    )
}

/// Shape 5: `@label ident { (child | attr)* }`.
pub fn id_children_block(label: &'static str, kind: KindFn, child: Parser) -> Parser {
    block_sequence(
        label,
        vec![block_open(label), commit(), ident(), mixed_body(child)],
        move |ctx| {
            let mut parts = pop_parts(ctx)?;
            let id = first_text(&mut parts);
            finish_node(ctx, kind(), id, parts)
        },
    )
}

/// Shape 6: `@label begin … end`. Anonymous: position is recorded but no
/// id is registered.
pub fn delimited_block(label: &'static str, key: &'static str, trim: bool) -> Parser {
    block_sequence(
        label,
        vec![
            block_open(label),
            commit(),
            word("begin"),
            delimited_text("end"),
        ],
        move |ctx| {
            let mut parts = pop_parts(ctx)?;
            let position = block_position(ctx)?;
            let mut content = parts.texts.pop().unwrap_or_default();
            if trim {
                content = content.trim().to_string();
            }
            ctx.ast.push(Value::Fragment {
                key: key.to_string(),
                fragment: Fragment { position, content },
            });
            Ok(())
        },
    )
}

/// Shape 7: `@derive :tag :parent` — feeds the type hierarchy, produces
/// nothing.
pub fn derive_statement() -> Parser {
    block_sequence(
        "derive",
        vec![
            block_open("derive"),
            commit(),
            keyword_literal(),
            keyword_literal(),
        ],
        move |ctx| {
            let mut parts = pop_parts(ctx)?;
            let position = block_position(ctx)?;
            let mut scalars = parts.scalars.drain(..);
            let (Some(AttrValue::Keyword(tag)), Some(AttrValue::Keyword(parent))) =
                (scalars.next(), scalars.next())
            else {
                return Err(Failure::Fatal(ParseError::Internal(
                    "malformed @derive capture".into(),
                )));
            };
            drop(scalars);
            ctx.state
                .hierarchy
                .add(tag.as_str(), parent.as_str())
                .map_err(|_| {
                    Failure::Fatal(ParseError::HierarchyCycle {
                        tag: tag.clone(),
                        parent: parent.clone(),
                        position,
                    })
                })?;
            Ok(())
        },
    )
}

/// The game-block finisher used with [`children_block`]: builds the root,
/// files children by kind, and registers the fixed `game` id.
pub fn finish_game(ctx: &mut Context) -> Step {
    let parts = pop_parts(ctx)?;
    let position = block_position(ctx)?;
    let mut game = Game::new(position.clone(), parts.attributes);
    for node in parts.children {
        game.add_node(node);
    }
    for (key, fragment) in parts.fragments {
        game.add_fragment(&key, fragment);
    }
    ctx.state.id_map.register(
        Game::ID,
        IdRecord::new("game", position.file.clone(), position.line),
    );
    ctx.ast.push(Value::Game(Box::new(game)));
    Ok(())
}

fn first_text(parts: &mut BlockParts) -> Option<String> {
    if parts.texts.is_empty() {
        None
    } else {
        Some(parts.texts.remove(0))
    }
}
