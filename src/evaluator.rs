use std::cmp::Ordering;

use regex::Regex;
use tracing::{debug, trace};

use crate::{
    ast::{CompareOp, Connective, Expr},
    table::{MatchMode, Row},
    value::Value,
};

/// Evaluates an [`Expr`] against a slice of rows.
///
/// Children are evaluated before their parent, left subtree first. Every
/// comparison scans all rows, so the result of a subtree never depends on
/// its siblings except through the match annotations described below.
///
/// # Match annotations
///
/// When a comparison matches a row it records its column as the row's
/// annotation, overwriting whatever an earlier comparison recorded. An `and`
/// node keeps the rows of its left child whose annotation differs from the
/// left child's leading column, i.e. rows that a later comparison on another
/// column re-matched. This is narrower than a set intersection: two
/// conditions on the same column joined by `and` match nothing, and in
/// `a and b and c` the outer `and` only checks against `a`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use tabql::{MatchMode, Matcher, Value, parser::parse_where};
///
/// let rows: Vec<HashMap<String, Value>> = vec![
///     HashMap::from([("code".to_string(), Value::from("BJS"))]),
///     HashMap::from([("code".to_string(), Value::from("SHA"))]),
/// ];
/// let expr = parse_where("code='SHA'").unwrap().unwrap();
/// assert_eq!(Matcher::new(&rows, MatchMode::Exact).evaluate(&expr), vec![1]);
/// ```
pub struct Matcher<'a> {
    rows: &'a [Row],
    mode: MatchMode,
    /// Column of the last comparison that matched each row
    matched_by: Vec<Option<&'a str>>,
}

/// How a single comparison node tests a row value.
enum Test {
    /// Literal compared as text, or numerically for ordering operators
    Literal(Value),
    /// Wildcard or regex pattern decides equality
    Pattern(Regex),
    /// Pattern failed to compile; nothing matches
    Never,
}

impl<'a> Matcher<'a> {
    pub fn new(rows: &'a [Row], mode: MatchMode) -> Self {
        Matcher {
            rows,
            mode,
            matched_by: vec![None; rows.len()],
        }
    }

    /// Indices of the rows satisfying `expr`, in result order.
    ///
    /// `or` concatenates its children's results, so a row satisfying both
    /// sides appears twice.
    pub fn evaluate(&mut self, expr: &'a Expr) -> Vec<usize> {
        match expr {
            Expr::Comparison {
                column,
                op,
                literal,
            } => self.compare(column, *op, literal),
            Expr::Unresolved { column, op, .. } => {
                trace!(
                    column = column.as_str(),
                    op = op.as_str(),
                    "unknown operator, matching nothing"
                );
                Vec::new()
            }
            Expr::Logical { op, left, right } => {
                let left_rows = self.evaluate(left);
                let right_rows = self.evaluate(right);
                match op {
                    Connective::And => {
                        let leading = left.leading_column();
                        left_rows
                            .into_iter()
                            .filter(|&idx| self.matched_by[idx] != Some(leading))
                            .collect()
                    }
                    Connective::Or => {
                        let mut rows = left_rows;
                        rows.extend(right_rows);
                        rows
                    }
                }
            }
        }
    }

    fn compare(&mut self, column: &'a str, op: CompareOp, literal: &str) -> Vec<usize> {
        let test = self.prepare(op, literal);
        let mut matched = Vec::new();

        for (idx, row) in self.rows.iter().enumerate() {
            // Rows without the column never match, not even `!=`
            let Some(value) = row.get(column) else {
                continue;
            };
            if test.matches(op, value) {
                self.matched_by[idx] = Some(column);
                matched.push(idx);
            }
        }

        trace!(column, %op, literal, matched = matched.len(), "compared");
        matched
    }

    fn prepare(&self, op: CompareOp, literal: &str) -> Test {
        // Ordering operators always compare numbers against the literal
        if op.is_ordering() {
            return Test::Literal(Value::String(literal.to_string()));
        }
        let pattern = match self.mode {
            MatchMode::Exact => None,
            MatchMode::Wildcard if literal.contains('%') => Some(like_pattern(literal)),
            MatchMode::Wildcard => None,
            MatchMode::Regex => Some(literal.replace('%', ".")),
        };
        match pattern {
            None => Test::Literal(Value::String(literal.to_string())),
            Some(pattern) => match Regex::new(&pattern) {
                Ok(re) => Test::Pattern(re),
                Err(err) => {
                    debug!(%pattern, %err, "pattern does not compile, matching nothing");
                    Test::Never
                }
            },
        }
    }
}

impl Test {
    fn matches(&self, op: CompareOp, value: &Value) -> bool {
        match self {
            Test::Literal(literal) => match op {
                CompareOp::Eq => literal.as_string() == value.as_string(),
                CompareOp::NotEq => literal.as_string() != value.as_string(),
                CompareOp::Gt => value.numeric_cmp(literal) == Some(Ordering::Greater),
                CompareOp::Lt => value.numeric_cmp(literal) == Some(Ordering::Less),
                CompareOp::GtEq => matches!(
                    value.numeric_cmp(literal),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                CompareOp::LtEq => matches!(
                    value.numeric_cmp(literal),
                    Some(Ordering::Less | Ordering::Equal)
                ),
            },
            Test::Pattern(re) => {
                let found = re.is_match(&value.as_string());
                match op {
                    CompareOp::NotEq => !found,
                    _ => found,
                }
            }
            Test::Never => false,
        }
    }
}

/// Translate a `%` wildcard literal into an anchored regular expression.
///
/// `CN%` matches values starting with `CN`, `%CN` values ending with it and
/// `%CN%` values containing it. Everything between the `%` markers is
/// matched literally.
pub fn like_pattern(literal: &str) -> String {
    let body = literal
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("(?s)^{body}$")
}

#[test]
fn test_like_pattern_shapes() {
    let prefix = Regex::new(&like_pattern("CN%")).unwrap();
    assert!(prefix.is_match("CN"));
    assert!(prefix.is_match("CNX"));
    assert!(!prefix.is_match("XCN"));

    let suffix = Regex::new(&like_pattern("%CN")).unwrap();
    assert!(suffix.is_match("XCN"));
    assert!(!suffix.is_match("CNX"));

    let contains = Regex::new(&like_pattern("%CN%")).unwrap();
    assert!(contains.is_match("ACNB"));
    assert!(!contains.is_match("CXN"));

    let dotted = Regex::new(&like_pattern("1.2%")).unwrap();
    assert!(dotted.is_match("1.23"));
    assert!(!dotted.is_match("1x23"));
}
