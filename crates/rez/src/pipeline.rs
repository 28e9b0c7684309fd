//! The compile pipeline: parse → process → validate.
//!
//! The phases are strictly sequential. Parsing owns the identifier map
//! and type hierarchy while it runs and hands both to the game at the
//! end; the process pass mutates the tree; validation only borrows it.
//! No validator ever runs before the whole source has parsed.

use rez_ast::{Game, LogicalFile};
use rez_parser::ParseError;
use rez_validate::{validate, Validation};
use tracing::debug;

/// A compiled game: the processed tree plus its validation ledger.
///
/// Parse failures abort compilation; validation failures do not: the
/// caller decides whether a game with errors is usable (editors want the
/// partial result, builds do not).
#[derive(Debug)]
pub struct Compilation {
    pub game: Game,
    pub validation: Validation,
}

impl Compilation {
    /// True when validation produced no errors.
    pub fn is_valid(&self) -> bool {
        self.validation.is_ok()
    }
}

/// Compile a logical file.
///
/// # Errors
///
/// Returns the first fatal parse error. Validation errors are collected
/// in the returned [`Compilation`] instead.
pub fn compile(source: &LogicalFile) -> Result<Compilation, ParseError> {
    debug!(lines = source.line_count(), "parse phase");
    let mut game = rez_parser::parse(source)?;

    debug!(ids = game.id_map.len(), "process phase");
    game.process();

    debug!("validate phase");
    let validation = validate(&game);

    Ok(Compilation { game, validation })
}
