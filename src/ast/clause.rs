use std::fmt;

use crate::ast::{CompareOp, Connective};
use crate::parser::ParseError;

/// One slot of a [`ClauseBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Column name or literal text
    Text(String),
    /// A nested clause (parenthesized group or an earlier chain)
    Clause(Box<ClauseBuilder>),
}

impl Operand {
    /// A nested clause with neither slot filled carries no information and is
    /// never placed into a slot.
    fn is_vacant(&self) -> bool {
        match self {
            Operand::Text(_) => false,
            Operand::Clause(clause) => clause.is_empty(),
        }
    }
}

/// Positional left/right slot filler used while reading tokens.
///
/// Operands fill the left slot, then the right slot. Pushing into a node
/// whose slots are both taken grows the tree: the full node becomes the left
/// child of a new parent and the operand lands in the parent's right slot.
/// This is what makes `a=1 and b=2 or c=3` group as `((a=1 and b=2) or c=3)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseBuilder {
    pub lhs: Option<Operand>,
    pub op: String,
    pub rhs: Option<Operand>,
    /// Levels of nested clauses below and including this node
    height: usize,
}

impl ClauseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lhs.is_none() && self.rhs.is_none()
    }

    /// Depth of the clause tree rooted here. A node holding only text has
    /// height 1.
    pub fn height(&self) -> usize {
        self.height
    }

    fn with_height(mut self) -> Self {
        let below = |slot: &Option<Operand>| match slot {
            Some(Operand::Clause(clause)) => clause.height,
            _ => 0,
        };
        self.height = 1 + below(&self.lhs).max(below(&self.rhs));
        self
    }

    /// Append a symbol character to the operator text (`>` then `=` builds `>=`).
    pub fn append_op(&mut self, symbol: char) {
        self.op.push(symbol);
    }

    /// Place an operand without a connective. Returns the (possibly new) root.
    pub fn push(self, operand: Operand) -> ClauseBuilder {
        self.fill(operand, None)
    }

    /// Place an operand and record the connective that follows it.
    ///
    /// If this node already carries an operator, the connective cannot be
    /// stored here and a new parent is created for it.
    pub fn push_connective(self, operand: Operand, connective: Connective) -> ClauseBuilder {
        self.fill(operand, Some(connective))
    }

    fn fill(mut self, operand: Operand, connective: Option<Connective>) -> ClauseBuilder {
        let mut pending = None;
        if let Some(connective) = connective {
            if self.op.is_empty() {
                self.op = connective.as_str().to_string();
            } else {
                pending = Some(connective);
            }
        }

        let operand = (!operand.is_vacant()).then_some(operand);
        if self.lhs.is_none() {
            if operand.is_some() {
                self.lhs = operand;
            }
        } else if self.rhs.is_none() {
            if operand.is_some() {
                self.rhs = operand;
            }
        } else {
            return ClauseBuilder {
                lhs: Some(Operand::Clause(Box::new(self.with_height()))),
                op: pending.map(|c| c.as_str().to_string()).unwrap_or_default(),
                rhs: operand,
                height: 0,
            }
            .with_height();
        }

        match pending {
            Some(connective) => ClauseBuilder {
                lhs: Some(Operand::Clause(Box::new(self.with_height()))),
                op: connective.as_str().to_string(),
                rhs: None,
                height: 0,
            }
            .with_height(),
            None => self.with_height(),
        }
    }

    /// Validate the slot tree and turn it into an [`Expr`].
    ///
    /// A node whose only content is a nested clause in its left slot is a
    /// wrapper (a parenthesized group, or a chain ending in a dangling
    /// connective) and is replaced by that clause. A comparison whose
    /// operator text is not a known operator becomes [`Expr::Unresolved`].
    pub fn build(self) -> Result<Expr, ParseError> {
        let ClauseBuilder { lhs, op, rhs, .. } = self;
        match (lhs, rhs) {
            (Some(Operand::Clause(inner)), None) => inner.build(),
            (Some(lhs), Some(rhs)) => {
                if let Some(connective) = Connective::from_keyword(&op) {
                    return match (lhs, rhs) {
                        (Operand::Clause(left), Operand::Clause(right)) => Ok(Expr::Logical {
                            op: connective,
                            left: Box::new(left.build()?),
                            right: Box::new(right.build()?),
                        }),
                        _ => Err(ParseError::Malformed(format!(
                            "`{connective}` must join two conditions"
                        ))),
                    };
                }
                if op.is_empty() {
                    return Err(ParseError::Malformed(
                        "missing operator between operands".to_string(),
                    ));
                }
                match (lhs, rhs) {
                    (Operand::Text(column), Operand::Text(literal)) => {
                        Ok(match CompareOp::parse(&op) {
                            Some(op) => Expr::Comparison {
                                column,
                                op,
                                literal,
                            },
                            None => Expr::Unresolved {
                                column,
                                op,
                                literal,
                            },
                        })
                    }
                    _ => Err(ParseError::Malformed(format!(
                        "`{op}` must compare a column with a literal"
                    ))),
                }
            }
            (Some(Operand::Text(text)), None) => Err(ParseError::Malformed(format!(
                "condition on `{text}` has no right-hand side"
            ))),
            (None, _) => Err(ParseError::Malformed("empty condition".to_string())),
        }
    }
}

/// A validated boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column op literal`
    ///
    /// # Example
    /// ```text
    /// code = 'BJS'
    /// ```
    Comparison {
        column: String,
        op: CompareOp,
        literal: String,
    },

    /// Two expressions joined by `and` / `or`
    Logical {
        op: Connective,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `column op literal` with operator text outside the operator set,
    /// e.g. `id => 3`. Matches no row.
    Unresolved {
        column: String,
        op: String,
        literal: String,
    },
}

impl Expr {
    /// The column of the left-most comparison in this subtree.
    pub fn leading_column(&self) -> &str {
        match self {
            Expr::Comparison { column, .. } | Expr::Unresolved { column, .. } => column,
            Expr::Logical { left, .. } => left.leading_column(),
        }
    }

    /// Operator text of the left-most [`Expr::Unresolved`] node, if any.
    pub fn unknown_operator(&self) -> Option<&str> {
        match self {
            Expr::Comparison { .. } => None,
            Expr::Unresolved { op, .. } => Some(op),
            Expr::Logical { left, right, .. } => {
                left.unknown_operator().or_else(|| right.unknown_operator())
            }
        }
    }
}

fn is_plain(text: &str) -> bool {
    !text.is_empty()
        && Connective::from_keyword(text).is_none()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '%' | '-'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("'")
}

fn write_comparison(
    f: &mut fmt::Formatter<'_>,
    column: &str,
    op: &str,
    literal: &str,
) -> fmt::Result {
    if is_plain(column) {
        f.write_str(column)?;
    } else {
        write_quoted(f, column)?;
    }
    write!(f, " {op} ")?;
    write_quoted(f, literal)
}

impl fmt::Display for Expr {
    /// Fully parenthesized form that parses back to the same tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Comparison {
                column,
                op,
                literal,
            } => write_comparison(f, column, op.as_str(), literal),
            Expr::Unresolved {
                column,
                op,
                literal,
            } => write_comparison(f, column, op, literal),
            Expr::Logical { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}
