//! Formula lexer.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::FormulaError;

/// Formula tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decimal literal.
    Number(Decimal),
    /// Section key: a letter or underscore followed by letters, digits or underscores.
    Ident(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {n}"),
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Star => f.write_str("'*'"),
            Self::Slash => f.write_str("'/'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

/// A token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte offset of the first character.
    pub position: usize,
}

/// Splits a formula into tokens.
///
/// Identifiers are read whole, so a key never matches inside a longer key
/// that contains it (`kas` versus `kas_position`).
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let literal = take_while(source, &mut chars, |c| c.is_ascii_digit() || c == '.');
                let number = Decimal::from_str(literal).map_err(|_| FormulaError::InvalidNumber {
                    literal: literal.to_string(),
                    position,
                })?;
                tokens.push(Spanned {
                    token: Token::Number(number),
                    position,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let name =
                    take_while(source, &mut chars, |c| c.is_ascii_alphanumeric() || c == '_');
                tokens.push(Spanned {
                    token: Token::Ident(name.to_string()),
                    position,
                });
                continue;
            }
            other => {
                return Err(FormulaError::UnexpectedCharacter {
                    ch: other,
                    position,
                });
            }
        };

        chars.next();
        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

fn take_while<'a>(
    source: &'a str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'a>>,
    accept: impl Fn(char) -> bool,
) -> &'a str {
    let start = chars.peek().map_or(source.len(), |&(i, _)| i);
    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if !accept(c) {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }
    &source[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_identifiers_are_read_whole() {
        assert_eq!(
            kinds("kas_position + kas"),
            vec![
                Token::Ident("kas_position".into()),
                Token::Plus,
                Token::Ident("kas".into()),
            ]
        );
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            kinds("(1.5*2)-3/0.5"),
            vec![
                Token::LParen,
                Token::Number(dec!(1.5)),
                Token::Star,
                Token::Number(dec!(2)),
                Token::RParen,
                Token::Minus,
                Token::Number(dec!(3)),
                Token::Slash,
                Token::Number(dec!(0.5)),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  a +b").unwrap();
        assert_eq!(tokens[0].position, 2);
        assert_eq!(tokens[1].position, 4);
        assert_eq!(tokens[2].position, 5);
    }

    #[test]
    fn test_rejects_foreign_characters() {
        assert_eq!(
            tokenize("a; b").unwrap_err(),
            FormulaError::UnexpectedCharacter { ch: ';', position: 1 }
        );
        assert!(tokenize("price^2").is_err());
        assert!(tokenize("`rm`").is_err());
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        assert!(matches!(
            tokenize("1.2.3").unwrap_err(),
            FormulaError::InvalidNumber { .. }
        ));
    }
}
