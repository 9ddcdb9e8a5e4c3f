/// Sort direction of an [`OrderKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive `asc` / `desc` lookup.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if word.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// One `ORDER BY` entry.
///
/// # Examples
/// ```text
/// id desc
/// name
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderKey {
    pub column: String,
    pub direction: Direction,
}

impl OrderKey {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        OrderKey {
            column: column.into(),
            direction,
        }
    }
}

/// One `GROUP BY` column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupKey {
    pub column: String,
}

impl GroupKey {
    pub fn new(column: impl Into<String>) -> Self {
        GroupKey {
            column: column.into(),
        }
    }
}
