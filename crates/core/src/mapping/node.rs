//! Section nodes.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::definition::StatementKind;
use crate::ledger::{BalanceQuery, MonthlyBalance};

/// One node of a statement tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    /// Identifier used as a formula variable and context key.
    pub key: String,
    /// Display name.
    pub label: String,
    /// Marks one half of two siblings sharing `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<SectionRole>,
    /// Where the node's own value comes from.
    pub source: SectionSource,
    /// Subsections, resolved before the node itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectionNode>,
}

impl SectionNode {
    /// Key this node's amounts are bound under in its parent's context.
    ///
    /// Role-tagged nodes bind `<key>_income` or `<key>_expense` only. The
    /// shared `<key>` is never bound, so formulas must name one half.
    #[must_use]
    pub fn context_key(&self) -> Cow<'_, str> {
        match self.role {
            Some(role) => Cow::Owned(format!("{}_{role}", self.key)),
            None => Cow::Borrowed(&self.key),
        }
    }

    /// Builds the aggregator query for a ledger leaf.
    ///
    /// Returns `None` for non-ledger nodes and for leaves without selectors.
    #[must_use]
    pub fn balance_query(&self, start: NaiveDate, end: NaiveDate) -> Option<BalanceQuery> {
        let SectionSource::Ledger { selectors, .. } = &self.source else {
            return None;
        };

        let mut query = BalanceQuery {
            start,
            end,
            category_type_codes: Vec::new(),
            category_numbers: Vec::new(),
        };
        for selector in selectors {
            match selector {
                CategorySelector::Type(code) => query.category_type_codes.push(code.clone()),
                CategorySelector::Number(number) => query.category_numbers.push(number.clone()),
            }
        }

        (!query.is_empty()).then_some(query)
    }

    /// Visits this node and all of its descendants depth-first, children first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        for child in &self.children {
            child.walk(visit);
        }
        visit(self);
    }
}

/// How a node's own value is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionSource {
    /// Sum of ledger balances for the selected categories.
    Ledger {
        /// Categories read by this leaf.
        #[serde(default)]
        selectors: Vec<CategorySelector>,
        /// Sign convention of the leaf.
        #[serde(default)]
        normal_balance: NormalBalance,
    },
    /// Arithmetic over previously resolved keys.
    Formula {
        /// Expression text.
        calculation: String,
    },
    /// A value computed by another statement.
    Import {
        /// Statement the value comes from.
        statement: StatementKind,
        /// Context key in that statement.
        key: String,
    },
    /// Structural node. Its own amounts are zero.
    Group,
}

/// Ledger category selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySelector {
    /// Every category of a type code.
    Type(String),
    /// One category number.
    Number(String),
}

/// Role of one of two siblings sharing a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionRole {
    /// The income half.
    Income,
    /// The expense half.
    Expense,
}

impl SectionRole {
    /// Suffix used in context keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for SectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign convention applied to a ledger leaf.
///
/// `Credit` reports income minus expense, `Debit` reports expense minus
/// income, so cost and asset leaves read as positive figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    /// Income minus expense.
    #[default]
    Credit,
    /// Expense minus income.
    Debit,
}

impl NormalBalance {
    /// Signed amount of a monthly balance under this convention, or `None`
    /// if the net balance overflows.
    #[must_use]
    pub fn amount(self, balance: &MonthlyBalance) -> Option<Decimal> {
        let net = balance.balance()?;
        match self {
            Self::Credit => Some(net),
            Self::Debit => Some(-net),
        }
    }
}
