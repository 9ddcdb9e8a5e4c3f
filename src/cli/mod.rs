//! CLI support for tabql
//!
//! Provides programmatic access to the `tabql` commands so the query
//! pipeline can be driven from other tools without spawning a process.

mod check;
mod convert;
mod query;

pub use check::{CheckResult, execute_check};
pub use convert::{rows_from_json, value_from_json};
pub use query::{QueryOptions, execute_query};

use std::io;

use crate::{LexError, ParseError};

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Syntax error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Input must be a JSON array of objects: {0}")]
    NotRows(String),

    #[error("Only one of --where, --like and --find may be given")]
    ConflictingFilters,
}
