//! In-memory ledger aggregator.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::aggregator::LedgerAggregator;
use super::error::AggregatorError;
use super::types::{BalanceQuery, EntryKind, LedgerEntry, MonthlyBalance};
use crate::fiscal::MonthKey;

/// A ledger held entirely in memory.
///
/// Backs file-based report runs and tests. Aggregation mirrors the database
/// implementation: entries are grouped by category type code and month.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl InMemoryLedger {
    /// Creates a ledger from a list of entries.
    #[must_use]
    pub const fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// Parses a JSON array of ledger entries.
    ///
    /// # Errors
    ///
    /// Returns `AggregatorError::InvalidData` if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, AggregatorError> {
        let entries: Vec<LedgerEntry> =
            serde_json::from_str(json).map_err(|e| AggregatorError::InvalidData(e.to_string()))?;
        Ok(Self::new(entries))
    }

    /// Reads a JSON ledger file.
    ///
    /// # Errors
    ///
    /// Returns `AggregatorError::InvalidData` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AggregatorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AggregatorError::InvalidData(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// All entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the ledger holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups matching entries by (category type code, month).
    ///
    /// # Errors
    ///
    /// Returns `AggregatorError::InvalidData` if a monthly sum overflows.
    pub fn aggregate(
        &self,
        query: &BalanceQuery,
    ) -> Result<Vec<MonthlyBalance>, AggregatorError> {
        let mut sums: BTreeMap<(String, MonthKey), (Decimal, Decimal)> = BTreeMap::new();

        for entry in self.entries.iter().filter(|e| query.matches(e)) {
            let month = MonthKey::of(entry.date);
            let slot = sums.entry((entry.category_type_code.clone(), month)).or_default();
            let sum = match entry.kind {
                EntryKind::Income => &mut slot.0,
                EntryKind::Expense => &mut slot.1,
            };
            *sum = sum.checked_add(entry.amount).ok_or_else(|| {
                AggregatorError::InvalidData(format!(
                    "sum of category type {} overflows in {month}",
                    entry.category_type_code
                ))
            })?;
        }

        Ok(sums
            .into_iter()
            .map(
                |((category_type_code, month), (income_sum, expense_sum))| MonthlyBalance {
                    category_type_code,
                    month,
                    income_sum,
                    expense_sum,
                },
            )
            .collect())
    }
}

#[async_trait]
impl LedgerAggregator for InMemoryLedger {
    async fn monthly_balances(
        &self,
        query: &BalanceQuery,
    ) -> Result<Vec<MonthlyBalance>, AggregatorError> {
        self.aggregate(query)
    }
}
