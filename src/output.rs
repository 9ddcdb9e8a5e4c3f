//! JSON rendering of tables.
//!
//! A table prints as an array of row objects. Keys follow the table's column
//! order; keys a row carries beyond its table's columns (the grouping
//! annotations) come after, sorted. Output is deterministic.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use tabql::{Column, Table, Value};
//! use tabql::output::to_json;
//!
//! let table = Table::with_rows(
//!     "t",
//!     vec![Column::new("name"), Column::new("id")],
//!     vec![HashMap::from([
//!         ("id".to_string(), Value::Integer(5)),
//!         ("name".to_string(), Value::from("CN")),
//!     ])],
//! );
//! assert_eq!(to_json(&table), r#"[{"name":"CN","id":5}]"#);
//! ```

use crate::table::{Row, Table};
use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, table: &Table) -> String {
        let rows: Vec<String> = table
            .rows()
            .iter()
            .map(|row| self.print_row(table, row))
            .collect();

        if rows.is_empty() {
            "[]".to_string()
        } else if self.pretty {
            let items: Vec<String> = rows.iter().map(|r| format!("  {r}")).collect();
            format!("[\n{}\n]", items.join(",\n"))
        } else {
            format!("[{}]", rows.join(","))
        }
    }

    fn print_row(&self, table: &Table, row: &Row) -> String {
        let mut keys: Vec<&String> = table
            .columns()
            .iter()
            .filter_map(|c| row.get_key_value(&c.name).map(|(k, _)| k))
            .collect();
        let mut extra: Vec<&String> = row
            .keys()
            .filter(|k| !table.columns().iter().any(|c| &c.name == *k))
            .collect();
        extra.sort();
        keys.extend(extra);

        if keys.is_empty() {
            return "{}".to_string();
        }

        let separator = if self.pretty { ": " } else { ":" };
        let items: Vec<String> = keys
            .iter()
            .map(|k| {
                format!(
                    "\"{}\"{}{}",
                    self.escape_string(k),
                    separator,
                    self.print_value(&row[*k])
                )
            })
            .collect();

        if self.pretty {
            let inner: Vec<String> = items.iter().map(|i| format!("    {i}")).collect();
            format!("{{\n{}\n  }}", inner.join(",\n"))
        } else {
            format!("{{{}}}", items.join(","))
        }
    }

    fn print_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            Value::Float(_) => "null".to_string(),
            Value::String(_) | Value::Bytes(_) | Value::Timestamp(_) => {
                format!("\"{}\"", self.escape_string(&value.as_string()))
            }
        }
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '"' => vec!['\\', '"'],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
                c => vec![c],
            })
            .collect()
    }
}

/// Compact JSON, no whitespace.
pub fn to_json(table: &Table) -> String {
    JsonPrinter::new(false).print(table)
}

/// Pretty JSON, one row per line group with 2-space indentation.
pub fn to_json_pretty(table: &Table) -> String {
    JsonPrinter::new(true).print(table)
}
