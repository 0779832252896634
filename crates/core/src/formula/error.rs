//! Formula error types.

use thiserror::Error;

/// Errors raised while lexing, parsing or evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula is blank.
    #[error("Formula is empty")]
    Empty,

    /// A character outside the formula alphabet.
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Byte offset in the source.
        position: usize,
    },

    /// A numeric literal that is not a valid decimal.
    #[error("Invalid number '{literal}' at position {position}")]
    InvalidNumber {
        /// The literal as written.
        literal: String,
        /// Byte offset in the source.
        position: usize,
    },

    /// A token in a place the grammar does not allow.
    #[error("Unexpected {found} at position {position}")]
    UnexpectedToken {
        /// Description of the token found.
        found: String,
        /// Byte offset in the source.
        position: usize,
    },

    /// Input ended in the middle of an expression.
    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    /// Parentheses or unary operators nested beyond the supported depth.
    #[error("Formula nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    /// A referenced key has no bound amounts.
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// The result does not fit in a decimal.
    #[error("Arithmetic overflow")]
    Overflow,
}
