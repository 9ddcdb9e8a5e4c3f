use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{ast::Expr, evaluator::Matcher, group, parser, parser::ParseError, sort, value::Value};

/// A single row: column name to value.
pub type Row = HashMap<String, Value>;

/// Key added to grouped rows holding the composite group key.
pub const GROUP_KEY: &str = "$GroupKey$";

/// Key added to grouped rows holding the number of rows in the group.
pub const GROUP_COUNT: &str = "$GroupCount$";

/// Column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column { name: name.into() }
    }
}

/// How comparison operators treat literals during filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Literal text comparison
    #[default]
    Exact,
    /// `%` in a literal matches any run of characters
    Wildcard,
    /// Literals are regular expressions (`%` stands for `.`)
    Regex,
}

/// An ordered set of rows with column descriptors.
///
/// Filtering and grouping return new tables and leave the source untouched;
/// ordering consumes the table and sorts its rows in place.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use tabql::{Column, MatchMode, Table, Value};
///
/// let mut table = Table::new("cities", vec![Column::new("id"), Column::new("name")]);
/// for (id, name) in [(5, "CN"), (2, "CN"), (4, "US")] {
///     table.push_row(HashMap::from([
///         ("id".to_string(), Value::Integer(id)),
///         ("name".to_string(), Value::from(name)),
///     ]));
/// }
///
/// let result = table.filter("name='CN'", MatchMode::Exact).order_by("id");
/// let ids: Vec<String> = result.rows().iter().map(|r| r["id"].as_string()).collect();
/// assert_eq!(ids, ["2", "5"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    mode: MatchMode,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows: Vec::new(),
            mode: MatchMode::default(),
        }
    }

    pub fn with_rows(name: impl Into<String>, columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Table {
            rows,
            ..Table::new(name, columns)
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mode used by the filter that produced this table.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Same name, columns and mode, different rows.
    pub(crate) fn derive(&self, columns: Vec<Column>, rows: Vec<Row>) -> Table {
        Table {
            name: self.name.clone(),
            columns,
            rows,
            mode: self.mode,
        }
    }

    /// Keep the rows satisfying `expr`.
    ///
    /// A malformed expression does not filter at all: the failure is logged
    /// at `warn` level and a copy of this table is returned, so chained calls
    /// keep working on bad input. Use [`Table::try_filter`] to observe the
    /// error instead. An empty expression also returns the table unchanged.
    /// A comparison with an unknown operator (`id=>3`) matches no row.
    pub fn filter(&self, expr: &str, mode: MatchMode) -> Table {
        match parser::parse_tree(expr) {
            Ok(tree) => {
                if let Some(op) = tree.as_ref().and_then(Expr::unknown_operator) {
                    warn!(op, expr, "unknown operator, its comparison matches nothing");
                }
                self.apply(tree, mode)
            }
            Err(err) => {
                warn!(%err, expr, "ignoring filter, returning rows unfiltered");
                self.clone()
            }
        }
    }

    /// Keep the rows satisfying `expr`, reporting malformed expressions and
    /// unknown operators.
    pub fn try_filter(&self, expr: &str, mode: MatchMode) -> Result<Table, ParseError> {
        Ok(self.apply(parser::parse_where(expr)?, mode))
    }

    fn apply(&self, expr: Option<Expr>, mode: MatchMode) -> Table {
        let Some(expr) = expr else {
            return self.clone();
        };

        let matched = Matcher::new(&self.rows, mode).evaluate(&expr);
        debug!(table = %self.name, %expr, ?mode, matched = matched.len(), "filtered");

        let rows = matched.into_iter().map(|idx| self.rows[idx].clone()).collect();
        let mut table = self.derive(self.columns.clone(), rows);
        table.mode = mode;
        table
    }

    /// Exact matching, e.g. `(a=1 and b=2) or (c=2 and d=3)`.
    pub fn matching(&self, expr: &str) -> Table {
        self.filter(expr, MatchMode::Exact)
    }

    /// Wildcard matching, e.g. `name='fred%'`.
    pub fn like(&self, expr: &str) -> Table {
        self.filter(expr, MatchMode::Wildcard)
    }

    /// Regular expression matching, e.g. `name='^fred.{1,3}$'`.
    pub fn find(&self, expr: &str) -> Table {
        self.filter(expr, MatchMode::Regex)
    }

    /// One row per distinct combination of `columns`, see [`group::group_by`].
    pub fn group_by(&self, columns: &str) -> Table {
        group::group_by(self, &parser::parse_group_by(columns))
    }

    /// Sort rows by a list such as `id desc, name`, see [`sort::order_by`].
    pub fn order_by(mut self, columns: &str) -> Table {
        sort::order_by(&mut self.rows, &parser::parse_order_by(columns));
        self
    }

    /// Remove the grouping annotations from every row.
    pub fn strip_annotations(mut self) -> Table {
        for row in &mut self.rows {
            row.remove(GROUP_KEY);
            row.remove(GROUP_COUNT);
        }
        self
    }
}
