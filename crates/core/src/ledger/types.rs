//! Ledger data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fiscal::MonthKey;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money in.
    Income,
    /// Money out.
    Expense,
}

/// A dated, categorized ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Transaction date.
    pub date: NaiveDate,
    /// Broad category type code (e.g. "4" for revenue).
    pub category_type_code: String,
    /// Specific category number (e.g. "4-100").
    pub category_number: String,
    /// Income or expense.
    pub kind: EntryKind,
    /// Unsigned amount.
    pub amount: Decimal,
}

/// Selection passed to a ledger aggregator.
///
/// An entry matches when its category type code is in `category_type_codes`
/// or its category number is in `category_numbers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceQuery {
    /// Start of the range (inclusive).
    pub start: NaiveDate,
    /// End of the range (inclusive).
    pub end: NaiveDate,
    /// Category type codes to include.
    pub category_type_codes: Vec<String>,
    /// Specific category numbers to include.
    pub category_numbers: Vec<String>,
}

impl BalanceQuery {
    /// Returns true when the query selects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category_type_codes.is_empty() && self.category_numbers.is_empty()
    }

    /// Returns true if `entry` is selected by this query.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if entry.date < self.start || entry.date > self.end {
            return false;
        }
        self.category_type_codes.contains(&entry.category_type_code)
            || self.category_numbers.contains(&entry.category_number)
    }
}

/// Income and expense sums for one category type in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBalance {
    /// Category type code.
    pub category_type_code: String,
    /// Month the sums belong to.
    pub month: MonthKey,
    /// Sum of income entries.
    pub income_sum: Decimal,
    /// Sum of expense entries.
    pub expense_sum: Decimal,
}

impl MonthlyBalance {
    /// Net balance: income minus expense. `None` on overflow.
    #[must_use]
    pub fn balance(&self) -> Option<Decimal> {
        self.income_sum.checked_sub(self.expense_sum)
    }
}
