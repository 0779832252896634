//! Arithmetic formulas over named section results.
//!
//! Calculations in the mapping definition are flat arithmetic: `+ - * /`,
//! parentheses, decimal literals and references to section keys. A formula is
//! lexed and parsed once into an [`Expr`] tree, then evaluated per month
//! against whatever amounts are bound at that point.
//!
//! There is no dynamic code execution. Input that does not lex or parse,
//! references a key that is not bound, divides by zero or overflows is
//! rejected; [`Formula::evaluate_or_zero`] turns any such rejection into `0`
//! with a warning.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, BinaryOperator, Expr};
pub use error::FormulaError;
pub use eval::{Bindings, Formula, evaluate};
