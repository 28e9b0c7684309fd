//! Template compilation: `{{ expr }}` interpolation over literal text.
//!
//! The real rendering pipeline lives downstream; the model keeps the
//! compiled chunk form so `process` has a concrete, idempotent artifact and
//! malformed templates are caught at compile time rather than at render
//! time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A compiled template: the original source plus its literal/expression
/// chunks in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTemplate {
    pub source: String,
    pub envelope: TemplateEnvelope,
    pub chunks: Vec<Chunk>,
}

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chunk {
    /// Literal text, emitted verbatim
    Text(String),
    /// The trimmed expression between `{{` and `}}`
    Expr(String),
}

/// The HTML wrapper the renderer puts around a compiled template. Which
/// envelope applies is decided by the owning node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateEnvelope {
    /// `@game` layout: outermost wrapper
    GameLayout,
    /// `@scene` layout: wraps the current card
    SceneLayout,
    /// `@card` content: innermost fragment
    CardContent,
}

/// Template compilation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated '{{{{' at offset {offset}")]
    Unterminated { offset: usize },
    #[error("empty expression at offset {offset}")]
    EmptyExpr { offset: usize },
}

impl CompiledTemplate {
    /// Compile `source`, splitting on `{{ ... }}` pairs.
    ///
    /// # Errors
    ///
    /// Fails on an unterminated `{{` or an empty expression; the caller
    /// records the failure on the node's status.
    pub fn compile(source: &str, envelope: TemplateEnvelope) -> Result<Self, TemplateError> {
        let mut chunks = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                chunks.push(Chunk::Text(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::Unterminated { offset: offset + open })?;
            let expr = after_open[..close].trim();
            if expr.is_empty() {
                return Err(TemplateError::EmptyExpr { offset: offset + open });
            }
            chunks.push(Chunk::Expr(expr.to_string()));
            offset += open + 2 + close + 2;
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            chunks.push(Chunk::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            envelope,
            chunks,
        })
    }

    /// Expressions referenced by the template, in order of appearance.
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            Chunk::Expr(expr) => Some(expr.as_str()),
            Chunk::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let t = CompiledTemplate::compile("hello", TemplateEnvelope::CardContent).unwrap();
        assert_eq!(t.chunks, vec![Chunk::Text("hello".into())]);
    }

    #[test]
    fn test_interpolation() {
        let t = CompiledTemplate::compile(
            "You have {{ player.gold }} gold.",
            TemplateEnvelope::CardContent,
        )
        .unwrap();
        assert_eq!(
            t.chunks,
            vec![
                Chunk::Text("You have ".into()),
                Chunk::Expr("player.gold".into()),
                Chunk::Text(" gold.".into()),
            ]
        );
        assert_eq!(t.expressions().collect::<Vec<_>>(), vec!["player.gold"]);
    }

    #[test]
    fn test_adjacent_expressions() {
        let t = CompiledTemplate::compile("{{a}}{{b}}", TemplateEnvelope::SceneLayout).unwrap();
        assert_eq!(
            t.chunks,
            vec![Chunk::Expr("a".into()), Chunk::Expr("b".into())]
        );
    }

    #[test]
    fn test_unterminated() {
        let err =
            CompiledTemplate::compile("bad {{ oops", TemplateEnvelope::CardContent).unwrap_err();
        assert_eq!(err, TemplateError::Unterminated { offset: 4 });
    }

    #[test]
    fn test_empty_expression() {
        let err = CompiledTemplate::compile("{{  }}", TemplateEnvelope::CardContent).unwrap_err();
        assert!(matches!(err, TemplateError::EmptyExpr { offset: 0 }));
    }
}
