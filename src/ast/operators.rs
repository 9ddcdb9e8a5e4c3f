use std::fmt;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=` or `==`)
    Eq,
    /// Not equal (`!=` or `<>`)
    NotEq,
    /// Greater than (`>`)
    Gt,
    /// Less than (`<`)
    Lt,
    /// Greater than or equal (`>=`)
    GtEq,
    /// Less than or equal (`<=`)
    LtEq,
}

impl CompareOp {
    /// Parse the operator text assembled from consecutive symbol tokens.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "=" | "==" => Some(CompareOp::Eq),
            "!=" | "<>" => Some(CompareOp::NotEq),
            ">" => Some(CompareOp::Gt),
            "<" => Some(CompareOp::Lt),
            ">=" => Some(CompareOp::GtEq),
            "<=" => Some(CompareOp::LtEq),
            _ => None,
        }
    }

    /// Ordering operators only match when both sides are numeric.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Lt | CompareOp::GtEq | CompareOp::LtEq
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::GtEq => ">=",
            CompareOp::LtEq => "<=",
        }
    }
}

/// Logical connectives (`and`, `or`). Both share one binding rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// Case-insensitive keyword lookup.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("and") {
            Some(Connective::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Connective::Or)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
