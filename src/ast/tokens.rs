/// A lexical token.
///
/// The tokenizer only distinguishes runs of text from structural
/// characters; whether a value names a column, a literal or a keyword is
/// decided by the expression builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of non-boundary characters
    ///
    /// `quoted` is set when any part of the run came from a quoted literal.
    /// Quoted values are never keywords, so `name='or'` compares against the
    /// text `or`. An empty quoted literal (`''`) produces a quoted value with
    /// empty text.
    ///
    /// # Examples
    /// ```text
    /// name
    /// 'BJS'
    /// 1.2%
    /// ```
    Value { text: String, quoted: bool },

    /// One of the structural characters `( ) , = > < !`
    Symbol(char),
}

impl Token {
    /// Shorthand for an unquoted value token.
    pub fn value(text: impl Into<String>) -> Self {
        Token::Value {
            text: text.into(),
            quoted: false,
        }
    }

    /// Shorthand for a quoted value token.
    pub fn quoted(text: impl Into<String>) -> Self {
        Token::Value {
            text: text.into(),
            quoted: true,
        }
    }

    /// The value text when this token is an unquoted keyword candidate.
    pub fn bare_word(&self) -> Option<&str> {
        match self {
            Token::Value {
                text,
                quoted: false,
            } => Some(text),
            _ => None,
        }
    }

    pub fn is_symbol(&self, c: char) -> bool {
        matches!(self, Token::Symbol(s) if *s == c)
    }
}

/// Characters that end a value run and become [`Token::Symbol`]s.
pub const SYMBOLS: [char; 7] = ['(', ')', '=', '>', '<', '!', ','];
