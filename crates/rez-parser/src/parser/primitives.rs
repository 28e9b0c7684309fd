//! Primitive parsers: whitespace, literals, identifiers, single chars.

use crate::parser::combinators::Parser;
use crate::parser::context::{Context, Value};

/// True for characters that may appear in an identifier.
pub(crate) fn ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

/// Consume whitespace and `%%` line comments at the cursor.
pub(crate) fn skip_ws(ctx: &mut Context) {
    loop {
        let rest = ctx.rest();
        let ws = rest.len()
            - rest
                .trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))
                .len();
        if ws > 0 {
            ctx.advance(ws);
            continue;
        }
        if rest.starts_with("%%") {
            let line_len = rest.find('\n').unwrap_or(rest.len());
            ctx.advance(line_len);
            continue;
        }
        break;
    }
}

/// Read an identifier at the cursor without consuming leading whitespace.
/// Returns `None` when the cursor is not at an identifier start.
pub(crate) fn scan_identifier(ctx: &mut Context) -> Option<String> {
    let rest = ctx.rest();
    if !rest.chars().next().is_some_and(ident_start) {
        return None;
    }
    let len = rest
        .char_indices()
        .find(|(_, c)| !ident_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let text = rest[..len].to_string();
    ctx.advance(len);
    Some(text)
}

/// Whitespace-and-comment skip; always succeeds, produces nothing.
pub fn iws() -> Parser {
    Parser::new("iws", |ctx| {
        skip_ws(ctx);
        Ok(())
    })
}

/// Skip whitespace, then match `expected` exactly. Produces nothing.
pub fn iliteral(expected: &'static str) -> Parser {
    Parser::new(expected, move |ctx| {
        skip_ws(ctx);
        if ctx.rest().starts_with(expected) {
            ctx.advance(expected.len());
            Ok(())
        } else {
            Err(ctx.miss(format!("'{}'", expected)))
        }
    })
}

/// Skip whitespace, then match `expected` as a whole word: the next
/// character must not continue an identifier. Produces nothing.
pub fn word(expected: &'static str) -> Parser {
    Parser::new(expected, move |ctx| {
        skip_ws(ctx);
        let rest = ctx.rest();
        if rest.starts_with(expected)
            && !rest[expected.len()..].chars().next().is_some_and(ident_char)
        {
            ctx.advance(expected.len());
            Ok(())
        } else {
            Err(ctx.miss(format!("'{}'", expected)))
        }
    })
}

/// Match an identifier (`[A-Za-z_$][A-Za-z0-9_$]*`) at the cursor and
/// produce its text. Does not skip leading whitespace.
pub fn js_identifier() -> Parser {
    Parser::new("identifier", |ctx| match scan_identifier(ctx) {
        Some(text) => {
            ctx.ast.push(Value::Text(text));
            Ok(())
        }
        None => Err(ctx.miss("identifier")),
    })
}

/// Skip whitespace, then match an identifier.
pub fn ident() -> Parser {
    Parser::new("identifier", |ctx| {
        skip_ws(ctx);
        match scan_identifier(ctx) {
            Some(text) => {
                ctx.ast.push(Value::Text(text));
                Ok(())
            }
            None => Err(ctx.miss("identifier")),
        }
    })
}

/// Consume a single character and produce it as text.
pub fn any() -> Parser {
    Parser::new("any", |ctx| match ctx.peek() {
        Some(c) => {
            ctx.advance(c.len_utf8());
            ctx.ast.push(Value::Text(c.to_string()));
            Ok(())
        }
        None => Err(ctx.miss("any character")),
    })
}

/// Skip whitespace, then run `parser`. The wrapped parser's entry point,
/// and therefore any block position it records, starts after the
/// whitespace.
pub fn lead_ws(parser: Parser) -> Parser {
    let ws = iws();
    Parser::new("lead_ws", move |ctx| {
        ws.parse(ctx)?;
        parser.parse(ctx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::context::Failure;
    use rez_ast::LogicalFile;

    #[test]
    fn test_skip_ws_handles_comments() {
        let source = LogicalFile::single("t.rez", "  %% note\n\t x");
        let mut ctx = Context::new(&source);
        skip_ws(&mut ctx);
        assert_eq!(ctx.rest(), "x");
        assert_eq!(ctx.cursor().line, 2);
    }

    #[test]
    fn test_word_requires_boundary() {
        let source = LogicalFile::single("t.rez", "endgame");
        let mut ctx = Context::new(&source);
        assert!(matches!(
            word("end").parse(&mut ctx),
            Err(Failure::Miss { .. })
        ));

        let source = LogicalFile::single("t.rez", "end game");
        let mut ctx = Context::new(&source);
        assert!(word("end").parse(&mut ctx).is_ok());
    }

    #[test]
    fn test_js_identifier() {
        let source = LogicalFile::single("t.rez", "$state_2 rest");
        let mut ctx = Context::new(&source);
        js_identifier().parse(&mut ctx).unwrap();
        assert_eq!(ctx.ast.pop(), Some(Value::Text("$state_2".into())));

        let source = LogicalFile::single("t.rez", "9lives");
        let mut ctx = Context::new(&source);
        assert!(js_identifier().parse(&mut ctx).is_err());
    }

    #[test]
    fn test_any_consumes_one_char() {
        let source = LogicalFile::single("t.rez", "ok");
        let mut ctx = Context::new(&source);
        any().parse(&mut ctx).unwrap();
        assert_eq!(ctx.ast.pop(), Some(Value::Text("o".into())));
        assert_eq!(ctx.rest(), "k");
    }
}
