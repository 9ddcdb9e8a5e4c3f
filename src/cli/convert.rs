//! JSON <-> row value conversion utilities

use serde_json::Value as Json;

use super::CliError;
use crate::{Column, Row, Table, Value};

/// Convert a JSON scalar to a row value.
///
/// Arrays and objects have no scalar counterpart and are kept as their JSON
/// text.
pub fn value_from_json(v: Json) -> Value {
    match v {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        Json::String(s) => Value::String(s),
        nested @ (Json::Array(_) | Json::Object(_)) => Value::String(nested.to_string()),
    }
}

/// Build a table from a JSON array of flat objects.
///
/// The column list is the union of object keys in first-seen order.
pub fn rows_from_json(name: &str, input: Json) -> Result<Table, CliError> {
    let Json::Array(items) = input else {
        return Err(CliError::NotRows(format!("got {}", kind(&input))));
    };

    let mut columns: Vec<Column> = Vec::new();
    let mut rows: Vec<Row> = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let Json::Object(object) = item else {
            return Err(CliError::NotRows(format!("element {idx} is {}", kind(&item))));
        };
        let mut row = Row::with_capacity(object.len());
        for (key, value) in object {
            if !columns.iter().any(|c| c.name == key) {
                columns.push(Column::new(key.clone()));
            }
            row.insert(key, value_from_json(value));
        }
        rows.push(row);
    }

    Ok(Table::with_rows(name, columns, rows))
}

fn kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
