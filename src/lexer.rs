use crate::ast::Token;
use crate::ast::tokens::SYMBOLS;

/// Errors reported by [`Lexer::tokenize_strict`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated quoted literal starting at position {position}")]
    UnterminatedQuote { position: usize },
}

/// Splits a condition, `GROUP BY` or `ORDER BY` string into tokens.
///
/// Whitespace (newlines included) separates tokens. Each of `( ) = > < ! ,`
/// is a token on its own. Single or double quotes start a literal that runs
/// until the same quote character; inside it a backslash escapes the next
/// character, and boundary characters are plain text. `%` is never a
/// boundary.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

#[derive(Default)]
struct Pending {
    text: String,
    started: bool,
    quoted: bool,
}

impl Pending {
    fn push(&mut self, ch: char) {
        self.text.push(ch);
        self.started = true;
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) {
        if self.started {
            let pending = std::mem::take(self);
            tokens.push(Token::Value {
                text: pending.text,
                quoted: pending.quoted,
            });
        }
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Tokenize without failing. An unterminated quote keeps whatever was
    /// read so far as the final token.
    pub fn tokenize(self) -> Vec<Token> {
        self.scan().0
    }

    /// Tokenize, reporting an unterminated quote as an error.
    pub fn tokenize_strict(self) -> Result<Vec<Token>, LexError> {
        match self.scan() {
            (_, Some(position)) => Err(LexError::UnterminatedQuote { position }),
            (tokens, None) => Ok(tokens),
        }
    }

    fn scan(mut self) -> (Vec<Token>, Option<usize>) {
        let mut tokens = Vec::new();
        let mut current = Pending::default();
        // Opening quote character and where it was seen
        let mut quote: Option<(char, usize)> = None;

        while let Some(ch) = self.current_char() {
            match quote {
                Some((open, _)) => match ch {
                    '\\' => {
                        self.advance();
                        if let Some(escaped) = self.current_char() {
                            current.push(escaped);
                        }
                    }
                    c if c == open => quote = None,
                    c => current.push(c),
                },
                None => match ch {
                    '\'' | '"' => {
                        quote = Some((ch, self.position));
                        current.started = true;
                        current.quoted = true;
                    }
                    c if c.is_whitespace() => current.flush(&mut tokens),
                    c if SYMBOLS.contains(&c) => {
                        current.flush(&mut tokens);
                        tokens.push(Token::Symbol(c));
                    }
                    c => current.push(c),
                },
            }
            self.advance();
        }
        current.flush(&mut tokens);

        (tokens, quote.map(|(_, position)| position))
    }
}

#[test]
fn test_operators_split_values() {
    let tokens = Lexer::new("money>=1.2").tokenize();
    assert_eq!(
        tokens,
        vec![
            Token::value("money"),
            Token::Symbol('>'),
            Token::Symbol('='),
            Token::value("1.2"),
        ]
    );
}

#[test]
fn test_empty_quotes_are_a_value() {
    let tokens = Lexer::new("name=''").tokenize();
    assert_eq!(
        tokens,
        vec![Token::value("name"), Token::Symbol('='), Token::quoted("")]
    );
}
