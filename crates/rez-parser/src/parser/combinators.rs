//! The combinator layer: parsers as composable values.
//!
//! A [`Parser`] wraps a function over [`Context`]. Combinators build new
//! parsers out of old ones; none of them suspend, perform I/O, or throw.
//! Every failure is a [`Failure`] value.
//!
//! Backtracking discipline: `choice`, `many`, and `optional` snapshot the
//! cursor and value stack and restore both on a miss. A [`commit`] parser
//! inside a sequence flips that sequence's committed flag; once set, a
//! later miss inside the same sequence is converted into a fatal
//! block-level error instead of backtracking.

use crate::parser::context::{Context, Failure, Step, Value};
use crate::parser::error::ParseError;
use std::rc::Rc;
use tracing::trace;

type RunFn = dyn for<'s> Fn(&mut Context<'s>) -> Step;

/// A parser value: cheap to clone, composed by the functions below.
#[derive(Clone)]
pub struct Parser {
    label: Rc<str>,
    run: Rc<RunFn>,
}

impl Parser {
    pub fn new<F>(label: impl Into<Rc<str>>, run: F) -> Self
    where
        F: for<'s> Fn(&mut Context<'s>) -> Step + 'static,
    {
        Self {
            label: label.into(),
            run: Rc::new(run),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run this parser. The current `(line, col)` is pushed onto the
    /// entry-point stack for the duration, so post-match actions can read
    /// where their own parser began.
    pub fn parse(&self, ctx: &mut Context) -> Step {
        ctx.push_entry();
        let result = (self.run)(ctx);
        ctx.pop_entry();
        result
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").field("label", &self.label).finish()
    }
}

/// Options for [`sequence_with`].
#[derive(Clone, Default)]
pub struct SequenceOpts {
    /// Label used for block-level errors when a committed sequence fails
    pub label: Option<Rc<str>>,
    /// Transform applied to the collected child values; the returned
    /// values are pushed verbatim instead of a single list
    #[allow(clippy::type_complexity)]
    pub ast: Option<Rc<dyn Fn(Vec<Value>) -> Vec<Value>>>,
    /// Context-rewriting action run after the sequence (and `ast`
    /// transform) succeed; the block layer builds nodes here
    #[allow(clippy::type_complexity)]
    pub action: Option<Rc<dyn for<'s> Fn(&mut Context<'s>) -> Step>>,
}

/// Run `parsers` in order; the produced value is the list of child values
/// in source order.
pub fn sequence(parsers: Vec<Parser>) -> Parser {
    sequence_with(parsers, SequenceOpts::default())
}

/// [`sequence`] with an `ast` transform and/or post-match `action`.
pub fn sequence_with(parsers: Vec<Parser>, opts: SequenceOpts) -> Parser {
    let label: Rc<str> = opts.label.clone().unwrap_or_else(|| "sequence".into());
    let seq_label = label.clone();
    Parser::new(label, move |ctx| {
        let start = ctx.cursor();
        let mark = ctx.ast.len();
        let saved = ctx.begin_sequence();

        for parser in &parsers {
            match parser.parse(ctx) {
                Ok(()) => {}
                Err(Failure::Miss { expected, line, col }) => {
                    let committed = ctx.is_committed();
                    ctx.end_sequence(saved);
                    if committed {
                        let (entry_line, entry_col) = ctx.entry_point();
                        trace!(
                            block = %seq_label,
                            line = entry_line,
                            expected = %expected,
                            "committed sequence failed"
                        );
                        let position = ctx
                            .resolve(entry_line, entry_col)
                            .map_err(Failure::Fatal)?;
                        return Err(Failure::Fatal(ParseError::BlockNotMatched {
                            label: seq_label.to_string(),
                            position,
                        }));
                    }
                    ctx.restore(start, mark);
                    return Err(Failure::Miss { expected, line, col });
                }
                Err(fatal) => {
                    ctx.end_sequence(saved);
                    return Err(fatal);
                }
            }
        }
        ctx.end_sequence(saved);

        let produced: Vec<Value> = ctx.ast.drain(mark..).collect();
        match &opts.ast {
            Some(transform) => ctx.ast.extend(transform(produced)),
            None => ctx.ast.push(Value::List(produced)),
        }
        match &opts.action {
            Some(action) => action(ctx),
            None => Ok(()),
        }
    })
}

/// First match wins. A fatal failure from any branch is propagated:
/// `choice` never backtracks past a commit.
pub fn choice(parsers: Vec<Parser>) -> Parser {
    Parser::new("choice", move |ctx| {
        let start = ctx.cursor();
        let mark = ctx.ast.len();
        let mut expectations = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            match parser.parse(ctx) {
                Ok(()) => return Ok(()),
                Err(Failure::Miss { expected, .. }) => {
                    expectations.push(expected);
                    ctx.restore(start, mark);
                }
                Err(fatal) => return Err(fatal),
            }
        }
        Err(ctx.miss(expectations.join(" or ")))
    })
}

/// Zero or more repetitions; the produced value is the (possibly empty)
/// list of iteration values.
pub fn many(parser: Parser) -> Parser {
    Parser::new("many", move |ctx| {
        let mark = ctx.ast.len();
        loop {
            let snapshot = ctx.cursor();
            let iter_mark = ctx.ast.len();
            match parser.parse(ctx) {
                Ok(()) => {
                    // A successful zero-width match would loop forever
                    if ctx.cursor() == snapshot {
                        ctx.restore(snapshot, iter_mark);
                        break;
                    }
                }
                Err(Failure::Miss { .. }) => {
                    ctx.restore(snapshot, iter_mark);
                    break;
                }
                Err(fatal) => return Err(fatal),
            }
        }
        let produced: Vec<Value> = ctx.ast.drain(mark..).collect();
        ctx.ast.push(Value::List(produced));
        Ok(())
    })
}

/// One or zero; on a miss, consumes nothing and produces nothing.
pub fn optional(parser: Parser) -> Parser {
    Parser::new("optional", move |ctx| {
        let snapshot = ctx.cursor();
        let mark = ctx.ast.len();
        match parser.parse(ctx) {
            Ok(()) => Ok(()),
            Err(Failure::Miss { .. }) => {
                ctx.restore(snapshot, mark);
                Ok(())
            }
            Err(fatal) => Err(fatal),
        }
    })
}

/// Succeeds iff `parser` would fail here; consumes nothing either way.
/// A committed failure inside the lookahead counts as "would fail".
pub fn not_lookahead(parser: Parser) -> Parser {
    Parser::new("not_lookahead", move |ctx| {
        let snapshot = ctx.cursor();
        let mark = ctx.ast.len();
        let saved = ctx.begin_sequence();
        let result = parser.parse(ctx);
        ctx.restore(snapshot, mark);
        ctx.end_sequence(saved);
        match result {
            Ok(()) => Err(ctx.miss(format!("anything but {}", parser.label()))),
            Err(_) => Ok(()),
        }
    })
}

/// Run `parser` and discard whatever it produced.
pub fn ignore(parser: Parser) -> Parser {
    Parser::new("ignore", move |ctx| {
        let mark = ctx.ast.len();
        parser.parse(ctx)?;
        ctx.ast.truncate(mark);
        Ok(())
    })
}

/// Mark the enclosing sequence as committed: from here on, a miss inside
/// it is a block-level error, not a backtrack.
pub fn commit() -> Parser {
    Parser::new("commit", |ctx| {
        ctx.set_committed();
        Ok(())
    })
}

/// Tracing wrapper: logs entry and outcome at `trace` level. Applied to
/// element parsers; the combinator layer itself stays silent.
pub fn traced(parser: Parser) -> Parser {
    let label = parser.label().to_string();
    Parser::new("traced", move |ctx| {
        let at = ctx.cursor();
        trace!(parser = %label, line = at.line, col = at.col, "enter");
        let result = parser.parse(ctx);
        match &result {
            Ok(()) => trace!(parser = %label, "ok"),
            Err(Failure::Miss { expected, .. }) => {
                trace!(parser = %label, expected = %expected, "miss")
            }
            Err(Failure::Fatal(err)) => trace!(parser = %label, error = %err, "fatal"),
        }
        result
    })
}
