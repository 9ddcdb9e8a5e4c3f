use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::{
    ast::GroupKey,
    table::{Column, GROUP_COUNT, GROUP_KEY, Row, Table},
    value::Value,
};

/// Partition rows by the values of `keys`.
///
/// Emits one row per distinct key, in order of first appearance. Each output
/// row holds the grouped columns of the first source row with that key, plus
/// [`GROUP_KEY`] and [`GROUP_COUNT`]. Only requested columns that exist in the
/// table are used; if none exist, or the table has fewer than two rows, the
/// table is returned unchanged.
pub fn group_by(table: &Table, keys: &[GroupKey]) -> Table {
    if table.count() <= 1 || keys.is_empty() {
        return table.clone();
    }

    let mut columns: Vec<Column> = Vec::new();
    for key in keys {
        if columns.iter().any(|c| c.name == key.column) {
            continue;
        }
        if let Some(column) = table.columns().iter().find(|c| c.name == key.column) {
            columns.push(column.clone());
        }
    }
    if columns.is_empty() {
        debug!(table = table.name(), ?keys, "no group columns exist, leaving rows ungrouped");
        return table.clone();
    }

    // Keyed on the components so values containing `$` cannot collide
    let mut positions: HashMap<Vec<String>, usize> = HashMap::new();
    let mut rows: Vec<Row> = Vec::new();
    let mut sizes: Vec<i64> = Vec::new();

    for source in table.rows() {
        let components = key_components(source, &columns);
        match positions.entry(components) {
            Entry::Occupied(entry) => sizes[*entry.get()] += 1,
            Entry::Vacant(entry) => {
                let mut row: Row = columns
                    .iter()
                    .map(|c| (c.name.clone(), source.get(&c.name).cloned().unwrap_or(Value::Null)))
                    .collect();
                row.insert(GROUP_KEY.to_string(), Value::String(render_key(entry.key())));
                entry.insert(rows.len());
                rows.push(row);
                sizes.push(1);
            }
        }
    }

    for (row, size) in rows.iter_mut().zip(sizes) {
        row.insert(GROUP_COUNT.to_string(), Value::Integer(size));
    }

    debug!(table = table.name(), groups = rows.len(), "grouped");
    table.derive(columns, rows)
}

/// Stringified values of `columns`; absent columns contribute an empty
/// component.
fn key_components(row: &Row, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|c| row.get(&c.name).map(Value::as_string).unwrap_or_default())
        .collect()
}

/// `$v1$$v2$...`, the form stored under [`GROUP_KEY`].
fn render_key(components: &[String]) -> String {
    components.iter().map(|c| format!("${c}$")).collect()
}
