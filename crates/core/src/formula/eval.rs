//! Formula evaluation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::warn;

use super::ast::{BinaryOperator, Expr};
use super::error::FormulaError;
use super::parser::parse;

/// Named monthly amounts a formula can reference.
pub trait Bindings {
    /// Returns the amounts bound to `key`, if any.
    fn amounts(&self, key: &str) -> Option<&[Decimal]>;
}

impl Bindings for HashMap<String, Vec<Decimal>> {
    fn amounts(&self, key: &str) -> Option<&[Decimal]> {
        self.get(key).map(Vec::as_slice)
    }
}

/// A parsed formula, ready to evaluate for any month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parses `source`.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            source: source.trim().to_string(),
            expr: parse(source)?,
        })
    }

    /// Keys referenced by this formula, in source order.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        self.expr.references()
    }

    /// Evaluates the formula for the month at `month_index`.
    ///
    /// A bound key whose amounts are shorter than `month_index` contributes `0`.
    /// A key with no binding at all is an error.
    pub fn evaluate<B: Bindings + ?Sized>(
        &self,
        bindings: &B,
        month_index: usize,
    ) -> Result<Decimal, FormulaError> {
        eval_expr(&self.expr, bindings, month_index)
    }

    /// Evaluates the formula, logging and returning `0` on any failure.
    pub fn evaluate_or_zero<B: Bindings + ?Sized>(
        &self,
        bindings: &B,
        month_index: usize,
    ) -> Decimal {
        self.evaluate(bindings, month_index).unwrap_or_else(|err| {
            warn!(
                formula = %self.source,
                month_index,
                error = %err,
                "Formula evaluation failed, using 0"
            );
            Decimal::ZERO
        })
    }
}

/// Parses and evaluates `expression` in one step.
///
/// Never fails: malformed or unsafe input, unknown references, division by
/// zero and overflow all yield `0` and a warning.
pub fn evaluate<B: Bindings + ?Sized>(
    expression: &str,
    bindings: &B,
    month_index: usize,
) -> Decimal {
    match Formula::parse(expression) {
        Ok(formula) => formula.evaluate_or_zero(bindings, month_index),
        Err(err) => {
            warn!(formula = %expression, error = %err, "Rejected formula, using 0");
            Decimal::ZERO
        }
    }
}

fn eval_expr<B: Bindings + ?Sized>(
    expr: &Expr,
    bindings: &B,
    month_index: usize,
) -> Result<Decimal, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Reference(key) => bindings
            .amounts(key)
            .map(|amounts| amounts.get(month_index).copied().unwrap_or(Decimal::ZERO))
            .ok_or_else(|| FormulaError::UnknownReference(key.clone())),
        Expr::Negate(inner) => Ok(-eval_expr(inner, bindings, month_index)?),
        Expr::Binary(op) => {
            let left = eval_expr(&op.left, bindings, month_index)?;
            let right = eval_expr(&op.right, bindings, month_index)?;
            apply(op.op, left, right)
        }
    }
}

fn apply(op: BinaryOperator, left: Decimal, right: Decimal) -> Result<Decimal, FormulaError> {
    match op {
        BinaryOperator::Add => left.checked_add(right).ok_or(FormulaError::Overflow),
        BinaryOperator::Sub => left.checked_sub(right).ok_or(FormulaError::Overflow),
        BinaryOperator::Mul => left.checked_mul(right).ok_or(FormulaError::Overflow),
        BinaryOperator::Div => {
            if right.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            left.checked_div(right).ok_or(FormulaError::Overflow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn bindings(pairs: &[(&str, &[Decimal])]) -> HashMap<String, Vec<Decimal>> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_longest_key_is_not_corrupted_by_shorter_key() {
        let ctx = bindings(&[("kas", &[dec!(5)]), ("kas_position", &[dec!(100)])]);
        assert_eq!(evaluate("kas_position + kas", &ctx, 0), dec!(105));
    }

    #[test]
    fn test_negative_values_do_not_fuse_operators() {
        let ctx = bindings(&[("a", &[dec!(5)]), ("b", &[dec!(-3)])]);
        assert_eq!(evaluate("a - b", &ctx, 0), dec!(8));
        assert_eq!(evaluate("a--3", &ctx, 0), dec!(8));
    }

    #[test]
    fn test_missing_month_index_counts_as_zero() {
        let ctx = bindings(&[("a", &[dec!(5)]), ("b", &[dec!(1), dec!(2)])]);
        assert_eq!(evaluate("a + b", &ctx, 1), dec!(2));
    }

    #[test]
    fn test_unknown_reference_yields_zero() {
        let ctx = bindings(&[("a", &[dec!(5)])]);
        assert_eq!(evaluate("a + ghost", &ctx, 0), Decimal::ZERO);

        let formula = Formula::parse("a + ghost").unwrap();
        assert_eq!(
            formula.evaluate(&ctx, 0).unwrap_err(),
            FormulaError::UnknownReference("ghost".to_string())
        );
    }

    #[rstest]
    #[case("10 / 0")]
    #[case("a / (a - a)")]
    #[case("a; drop_table")]
    #[case("process.exit(1)")]
    #[case("a ^ 2")]
    #[case("a +")]
    #[case("")]
    fn test_rejected_formulas_yield_zero(#[case] expression: &str) {
        let ctx = bindings(&[("a", &[dec!(5)])]);
        assert_eq!(evaluate(expression, &ctx, 0), Decimal::ZERO);
    }

    #[rstest]
    #[case("2 + 3 * 4", dec!(14))]
    #[case("(2 + 3) * 4", dec!(20))]
    #[case("10 - 4 - 3", dec!(3))]
    #[case("100 / 8", dec!(12.5))]
    #[case("-a * 2", dec!(-10))]
    #[case("+a", dec!(5))]
    #[case("a * 0.1", dec!(0.5))]
    fn test_arithmetic(#[case] expression: &str, #[case] expected: Decimal) {
        let ctx = bindings(&[("a", &[dec!(5)])]);
        assert_eq!(evaluate(expression, &ctx, 0), expected);
    }

    #[test]
    fn test_overflow_yields_zero() {
        let ctx = bindings(&[("big", &[Decimal::MAX])]);
        assert_eq!(evaluate("big * 10", &ctx, 0), Decimal::ZERO);
        assert_eq!(
            Formula::parse("big + big").unwrap().evaluate(&ctx, 0).unwrap_err(),
            FormulaError::Overflow
        );
    }

    proptest! {
        /// Same expression, context and month always yield the same value.
        #[test]
        fn prop_evaluation_is_deterministic(
            a in -1_000_000i64..1_000_000,
            b in -1_000_000i64..1_000_000,
            c in 1i64..1_000,
        ) {
            let ctx = bindings(&[
                ("a", &[Decimal::from(a)]),
                ("b", &[Decimal::from(b)]),
                ("c", &[Decimal::from(c)]),
            ]);
            let first = evaluate("(a - b) * c / (c + 1) - -b", &ctx, 0);
            for _ in 0..3 {
                prop_assert_eq!(evaluate("(a - b) * c / (c + 1) - -b", &ctx, 0), first);
            }
        }

        /// Any character outside the formula alphabet makes the result 0.
        #[test]
        fn prop_foreign_characters_yield_zero(
            prefix in "[a-z ]{0,6}",
            bad in "[;:!@#$%^&=<>?,\"'`\\[\\]{}|~]",
            suffix in "[0-9 +]{0,6}",
        ) {
            let ctx = bindings(&[("a", &[dec!(7)])]);
            let expression = format!("a + 1 {prefix}{bad}{suffix}");
            prop_assert_eq!(evaluate(&expression, &ctx, 0), Decimal::ZERO);
        }

        /// Addition of bound keys matches decimal addition.
        #[test]
        fn prop_sum_of_bound_keys(
            x in -1_000_000_000i64..1_000_000_000,
            y in -1_000_000_000i64..1_000_000_000,
        ) {
            let ctx = bindings(&[("x", &[Decimal::from(x)]), ("y", &[Decimal::from(y)])]);
            prop_assert_eq!(evaluate("x + y", &ctx, 0), Decimal::from(x) + Decimal::from(y));
        }
    }
}
