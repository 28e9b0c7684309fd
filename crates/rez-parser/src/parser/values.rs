//! Attribute-value literal parsers.
//!
//! The block layer receives values pre-parsed and tagged; this module is
//! the lower layer doing that work. Dispatch is by leading character, so
//! the grammar stays LL(2) (`#{` vs `#ref` needs the second char).

use crate::parser::combinators::Parser;
use crate::parser::context::{Context, Failure, Value};
use crate::parser::primitives::{ident_char, scan_identifier, skip_ws};
use indexmap::IndexMap;
use rez_ast::{AttrValue, BehaviourTree};

/// Parse one attribute value literal, producing a tagged [`AttrValue`].
pub fn value() -> Parser {
    Parser::new("value", |ctx| {
        skip_ws(ctx);
        let parsed = scan_value(ctx)?;
        ctx.ast.push(Value::Scalar(parsed));
        Ok(())
    })
}

/// Scan a value at the cursor. Misses are backtrackable; the caller
/// decides whether the enclosing block has committed.
pub(crate) fn scan_value(ctx: &mut Context) -> Result<AttrValue, Failure> {
    match ctx.peek() {
        Some('"') => scan_string(ctx),
        Some(':') => scan_keyword(ctx),
        Some('#') if ctx.rest().starts_with("#{") => scan_set(ctx),
        Some('#') => scan_elem_ref(ctx),
        Some('[') => scan_list(ctx),
        Some('^') => scan_btree(ctx).map(AttrValue::BTree),
        Some('(') => scan_function(ctx),
        Some(c) if c == '-' || c.is_ascii_digit() => scan_number(ctx),
        Some('t') | Some('f') => scan_boolean(ctx),
        _ => Err(ctx.miss("value")),
    }
}

fn scan_number(ctx: &mut Context) -> Result<AttrValue, Failure> {
    let rest = ctx.rest();
    let bytes = rest.as_bytes();
    let mut len = 0;
    if bytes.first() == Some(&b'-') {
        len = 1;
    }
    let int_start = len;
    while bytes.get(len).is_some_and(u8::is_ascii_digit) {
        len += 1;
    }
    if len == int_start {
        return Err(ctx.miss("number"));
    }
    if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
        len += 1;
        while bytes.get(len).is_some_and(u8::is_ascii_digit) {
            len += 1;
        }
    }
    // `3fish` is not a number followed by an identifier
    if rest[len..].chars().next().is_some_and(ident_char) {
        return Err(ctx.miss("number"));
    }
    let parsed: f64 = rest[..len]
        .parse()
        .map_err(|_| ctx.miss("number"))?;
    ctx.advance(len);
    Ok(AttrValue::Number(parsed))
}

fn scan_boolean(ctx: &mut Context) -> Result<AttrValue, Failure> {
    for (text, parsed) in [("true", true), ("false", false)] {
        let rest = ctx.rest();
        if rest.starts_with(text) && !rest[text.len()..].chars().next().is_some_and(ident_char) {
            ctx.advance(text.len());
            return Ok(AttrValue::Boolean(parsed));
        }
    }
    Err(ctx.miss("value"))
}

fn scan_string(ctx: &mut Context) -> Result<AttrValue, Failure> {
    let rest = ctx.rest();
    let mut out = String::new();
    let mut iter = rest.char_indices();
    iter.next(); // opening quote
    while let Some((i, c)) = iter.next() {
        match c {
            '"' => {
                ctx.advance(i + 1);
                return Ok(AttrValue::String(out));
            }
            '\\' => match iter.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            _ => out.push(c),
        }
    }
    Err(ctx.miss("closing '\"'"))
}

fn scan_keyword(ctx: &mut Context) -> Result<AttrValue, Failure> {
    ctx.advance(1); // ':'
    match scan_identifier(ctx) {
        Some(name) => Ok(AttrValue::Keyword(name)),
        None => Err(ctx.miss("keyword")),
    }
}

fn scan_elem_ref(ctx: &mut Context) -> Result<AttrValue, Failure> {
    ctx.advance(1); // '#'
    match scan_identifier(ctx) {
        Some(id) => Ok(AttrValue::ElemRef(id)),
        None => Err(ctx.miss("element reference")),
    }
}

fn scan_list(ctx: &mut Context) -> Result<AttrValue, Failure> {
    ctx.advance(1); // '['
    let items = scan_members(ctx, ']')?;
    Ok(AttrValue::List(items))
}

fn scan_set(ctx: &mut Context) -> Result<AttrValue, Failure> {
    ctx.advance(2); // '#{'
    let items = scan_members(ctx, '}')?;
    Ok(AttrValue::Set(items))
}

fn scan_members(ctx: &mut Context, close: char) -> Result<Vec<AttrValue>, Failure> {
    let mut items = Vec::new();
    loop {
        skip_ws(ctx);
        match ctx.peek() {
            Some(c) if c == close => {
                ctx.advance(close.len_utf8());
                return Ok(items);
            }
            Some(_) => items.push(scan_value(ctx)?),
            None => return Err(ctx.miss(format!("'{}'", close))),
        }
    }
}

fn scan_function(ctx: &mut Context) -> Result<AttrValue, Failure> {
    ctx.advance(1); // '('
    let mut params = Vec::new();
    skip_ws(ctx);
    if let Some(first) = scan_identifier(ctx) {
        params.push(first);
        loop {
            skip_ws(ctx);
            if ctx.peek() != Some(',') {
                break;
            }
            ctx.advance(1);
            skip_ws(ctx);
            match scan_identifier(ctx) {
                Some(param) => params.push(param),
                None => return Err(ctx.miss("parameter name")),
            }
        }
    }
    skip_ws(ctx);
    if ctx.peek() != Some(')') {
        return Err(ctx.miss("')'"));
    }
    ctx.advance(1);
    skip_ws(ctx);
    if !ctx.rest().starts_with("=>") {
        return Err(ctx.miss("'=>'"));
    }
    ctx.advance(2);
    skip_ws(ctx);
    if ctx.peek() != Some('{') {
        return Err(ctx.miss("'{'"));
    }
    ctx.advance(1);
    let body = scan_balanced_body(ctx)?;
    Ok(AttrValue::Function { params, body })
}

/// Scan up to the `}` matching an already-consumed `{`, honouring nested
/// braces and skipping over string literals so braces inside them don't
/// count.
fn scan_balanced_body(ctx: &mut Context) -> Result<String, Failure> {
    let rest = ctx.rest();
    let mut depth = 1u32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let body = rest[..i].trim().to_string();
                    ctx.advance(i + 1);
                    return Ok(body);
                }
            }
            _ => {}
        }
    }
    Err(ctx.miss("'}' closing function body"))
}

/// Scan a behaviour tree: `^[task option: value … ^[child …] …]`.
fn scan_btree(ctx: &mut Context) -> Result<BehaviourTree, Failure> {
    ctx.advance(1); // '^'
    if ctx.peek() != Some('[') {
        return Err(ctx.miss("'[' after '^'"));
    }
    ctx.advance(1);
    skip_ws(ctx);
    let task = scan_identifier(ctx).ok_or_else(|| ctx.miss("task name"))?;

    let mut options = IndexMap::new();
    let mut children = Vec::new();
    loop {
        skip_ws(ctx);
        match ctx.peek() {
            Some(']') => {
                ctx.advance(1);
                return Ok(BehaviourTree {
                    task,
                    options,
                    children,
                });
            }
            Some('^') => children.push(scan_btree(ctx)?),
            Some(_) => {
                let name = scan_identifier(ctx).ok_or_else(|| ctx.miss("option name"))?;
                skip_ws(ctx);
                if ctx.peek() != Some(':') {
                    return Err(ctx.miss("':' after option name"));
                }
                ctx.advance(1);
                skip_ws(ctx);
                let option_value = scan_value(ctx)?;
                options.insert(name, option_value);
            }
            None => return Err(ctx.miss("']' closing behaviour tree")),
        }
    }
}
