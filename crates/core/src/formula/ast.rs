//! Formula syntax tree.

use rust_decimal::Decimal;

/// A formula expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Decimal literal.
    Number(Decimal),
    /// Reference to a section key.
    Reference(String),
    /// Unary minus.
    Negate(Box<Self>),
    /// Binary operation.
    Binary(Box<BinaryOp>),
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOp {
    /// Left operand.
    pub left: Expr,
    /// Operator.
    pub op: BinaryOperator,
    /// Right operand.
    pub right: Expr,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition (+).
    Add,
    /// Subtraction (-).
    Sub,
    /// Multiplication (*).
    Mul,
    /// Division (/).
    Div,
}

impl Expr {
    /// Builds a binary expression.
    #[must_use]
    pub fn binary(left: Self, op: BinaryOperator, right: Self) -> Self {
        Self::Binary(Box::new(BinaryOp { left, op, right }))
    }

    /// Builds a reference expression.
    #[must_use]
    pub fn reference(key: impl Into<String>) -> Self {
        Self::Reference(key.into())
    }

    /// Collects every referenced key, in source order, duplicates included.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Number(_) => {}
            Self::Reference(key) => out.push(key),
            Self::Negate(inner) => inner.collect_references(out),
            Self::Binary(op) => {
                op.left.collect_references(out);
                op.right.collect_references(out);
            }
        }
    }
}
