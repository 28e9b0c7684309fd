//! Human-readable rendering of compile results.

use crate::pipeline::Compilation;
use rez_parser::ParseError;
use rez_validate::ValidationError;

/// Render one validation error as a single report line.
fn format_error(error: &ValidationError) -> String {
    format!("error: {}", error)
}

/// Render a full validation report: one line per error, then a summary.
pub fn format_validation(compilation: &Compilation) -> String {
    let errors = &compilation.validation.errors;
    let mut out = String::new();
    for error in errors {
        out.push_str(&format_error(error));
        out.push('\n');
    }
    out.push_str(&format!(
        "{} node(s) validated, {} error(s)\n",
        compilation.validation.validated.len(),
        errors.len()
    ));
    out
}

/// Render a fatal parse error.
pub fn format_parse_error(error: &ParseError) -> String {
    format!("error: {}\n", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rez_ast::SourcePos;

    #[test]
    fn test_format_error_includes_position() {
        let error = ValidationError {
            node: "item 'sword'".into(),
            position: SourcePos::new("main.rez", 4, 13),
            message: "required attribute 'type' is missing".into(),
        };
        assert_eq!(
            format_error(&error),
            "error: item 'sword' at main.rez:4:13: required attribute 'type' is missing"
        );
    }
}
