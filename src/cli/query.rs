//! Run filter / group / order against JSON rows

use tracing::debug;

use super::{CliError, rows_from_json};
use crate::{MatchMode, Table, output};

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// JSON array of row objects
    pub input: Option<String>,
    /// Filter expression and the mode to apply it in
    pub filter: Option<(String, MatchMode)>,
    /// `GROUP BY` column list
    pub group_by: Option<String>,
    /// `ORDER BY` column list
    pub order_by: Option<String>,
    /// Drop `$GroupKey$` / `$GroupCount$` from the output
    pub strip_annotations: bool,
    /// Pretty-print the output
    pub pretty: bool,
    /// Fail on malformed filters instead of returning rows unfiltered
    pub strict: bool,
}

/// Execute the pipeline filter -> group -> order and render the result.
pub fn execute_query(options: &QueryOptions) -> Result<String, CliError> {
    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(json_str)?;

    let mut table = rows_from_json("input", json)?;
    debug!(rows = table.count(), columns = table.columns().len(), "loaded input");

    if let Some((expr, mode)) = &options.filter {
        table = if options.strict {
            table.try_filter(expr, *mode)?
        } else {
            table.filter(expr, *mode)
        };
    }
    if let Some(columns) = &options.group_by {
        table = table.group_by(columns);
    }
    if let Some(columns) = &options.order_by {
        table = table.order_by(columns);
    }
    if options.strip_annotations {
        table = table.strip_annotations();
    }

    Ok(render(&table, options.pretty))
}

fn render(table: &Table, pretty: bool) -> String {
    if pretty {
        output::to_json_pretty(table)
    } else {
        output::to_json(table)
    }
}
