//! Validate expression syntax without running it

use super::CliError;
use crate::{Expr, Lexer, Parser};

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Expression has no tokens; it would leave a table unchanged
    Empty,
    /// Expression parsed; carries the tree
    Valid(Expr),
}

/// Tokenize strictly and parse a filter expression.
pub fn execute_check(expr: &str) -> Result<CheckResult, CliError> {
    let tokens = Lexer::new(expr).tokenize_strict()?;
    match Parser::new(tokens).parse_where()? {
        Some(expr) => Ok(CheckResult::Valid(expr)),
        None => Ok(CheckResult::Empty),
    }
}
