use std::mem;

use tracing::{debug, trace};

use crate::{
    ast::{ClauseBuilder, Connective, Direction, Expr, GroupKey, Operand, OrderKey, Token},
    lexer::Lexer,
};

/// Deepest expression tree accepted, counting both parentheses and
/// `and`/`or` chain links.
pub const MAX_DEPTH: usize = 256;

fn too_deep() -> ParseError {
    ParseError::Malformed(format!("expression nests deeper than {MAX_DEPTH} levels"))
}

/// Errors produced while building an expression tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// A node is missing an operand or its operator
    #[error("malformed expression: {0}")]
    Malformed(String),

    /// Operator text outside `= == != <> > < >= <=`
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
}

/// Builds expression trees and column lists from a token sequence.
///
/// Boolean expressions are read in a single pass with a cursor shared by the
/// recursive calls for parenthesized groups. There is no precedence table:
/// connectives combine strictly left to right within one nesting level.
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, cursor: 0 }
    }

    /// Parse a `WHERE`-style expression. An expression without tokens
    /// yields `Ok(None)`; an operator outside the operator set is
    /// [`ParseError::UnknownOperator`].
    pub fn parse_where(&mut self) -> Result<Option<Expr>, ParseError> {
        let expr = self.parse_tree()?;
        if let Some(op) = expr.as_ref().and_then(Expr::unknown_operator) {
            return Err(ParseError::UnknownOperator(op.to_string()));
        }
        Ok(expr)
    }

    /// Like [`Parser::parse_where`], but comparisons with an unknown
    /// operator are kept as [`Expr::Unresolved`] nodes.
    pub fn parse_tree(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }
        self.cursor = 0;

        let root = self.parse_level(0)?;
        trace!(?root, "clause slots");
        let expr = root.build()?;
        debug!(%expr, "parsed expression");
        Ok(Some(expr))
    }

    /// Read one nesting level. Returns at the matching `)` (consumed) or when
    /// the tokens run out; a missing `)` is tolerated. An unbalanced `)` at
    /// the top level ends the expression.
    fn parse_level(&mut self, depth: usize) -> Result<ClauseBuilder, ParseError> {
        let mut root = ClauseBuilder::new();
        let mut current = ClauseBuilder::new();

        while let Some(token) = self.tokens.get(self.cursor).cloned() {
            self.cursor += 1;
            match token {
                Token::Symbol('(') => {
                    if depth >= MAX_DEPTH {
                        return Err(too_deep());
                    }
                    let group = self.parse_level(depth + 1)?;
                    root = root.push(Operand::Clause(Box::new(group)));
                }
                Token::Symbol(')') => {
                    if depth == 0 {
                        debug!(
                            position = self.cursor - 1,
                            "unbalanced `)`, ignoring the rest of the expression"
                        );
                    }
                    break;
                }
                Token::Symbol(c) => current.append_op(c),
                Token::Value { text, quoted } => {
                    let connective = (!quoted)
                        .then(|| Connective::from_keyword(&text))
                        .flatten();
                    match connective {
                        Some(connective) => {
                            let finished = mem::take(&mut current);
                            root = root.push_connective(Operand::Clause(Box::new(finished)), connective);
                        }
                        None => current = current.push(Operand::Text(text)),
                    }
                }
            }
            if root.height() > MAX_DEPTH || current.height() > MAX_DEPTH {
                return Err(too_deep());
            }
        }

        if !current.is_empty() {
            root = root.push(Operand::Clause(Box::new(current)));
        }
        Ok(root)
    }

    /// Parse an `ORDER BY` list such as `id desc, name`.
    ///
    /// Any symbol closes the entry being built. A later value replaces the
    /// column name of the entry; unquoted `asc`/`desc` set its direction.
    pub fn parse_order_by(&mut self) -> Vec<OrderKey> {
        let mut keys = Vec::new();
        let mut current = OrderKey::default();
        let mut close = |key: OrderKey| {
            // Entries closed before receiving a column name are dropped
            if !key.column.is_empty() {
                keys.push(key);
            }
        };

        for token in &self.tokens {
            match token {
                Token::Symbol(_) => close(mem::take(&mut current)),
                Token::Value { text, quoted } => {
                    match (!quoted).then(|| Direction::from_keyword(text)).flatten() {
                        Some(direction) => current.direction = direction,
                        None => current.column = text.clone(),
                    }
                }
            }
        }
        close(current);
        keys
    }

    /// Parse a `GROUP BY` list such as `name, code`.
    pub fn parse_group_by(&mut self) -> Vec<GroupKey> {
        let mut keys = Vec::new();
        let mut current = GroupKey::default();
        let mut close = |key: GroupKey| {
            if !key.column.is_empty() {
                keys.push(key);
            }
        };

        for token in &self.tokens {
            match token {
                Token::Symbol(_) => close(mem::take(&mut current)),
                Token::Value { text, .. } => current.column = text.clone(),
            }
        }
        close(current);
        keys
    }
}

/// Tokenize and parse a `WHERE`-style expression.
///
/// ```
/// use tabql::parser::parse_where;
///
/// let expr = parse_where("name='CN' and (code='BJS' or id=3)").unwrap().unwrap();
/// assert_eq!(
///     expr.to_string(),
///     "(name = 'CN' and (code = 'BJS' or id = '3'))"
/// );
/// ```
pub fn parse_where(input: &str) -> Result<Option<Expr>, ParseError> {
    Parser::new(Lexer::new(input).tokenize()).parse_where()
}

/// Tokenize and parse a `WHERE`-style expression, keeping comparisons with
/// unknown operators as [`Expr::Unresolved`].
pub fn parse_tree(input: &str) -> Result<Option<Expr>, ParseError> {
    Parser::new(Lexer::new(input).tokenize()).parse_tree()
}

/// Tokenize and parse an `ORDER BY` list.
pub fn parse_order_by(input: &str) -> Vec<OrderKey> {
    Parser::new(Lexer::new(input).tokenize()).parse_order_by()
}

/// Tokenize and parse a `GROUP BY` list.
pub fn parse_group_by(input: &str) -> Vec<GroupKey> {
    Parser::new(Lexer::new(input).tokenize()).parse_group_by()
}
