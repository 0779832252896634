//! The ledger aggregator contract.

use async_trait::async_trait;

use super::error::AggregatorError;
use super::types::{BalanceQuery, MonthlyBalance};

/// Source of monthly balances per category.
///
/// Implementations return one entry per (matched category type, month) that
/// actually has transactions inside the query range. Months without matching
/// transactions are simply absent; callers treat them as zero.
#[async_trait]
pub trait LedgerAggregator: Send + Sync {
    /// Returns monthly income/expense sums for every category matching `query`.
    async fn monthly_balances(
        &self,
        query: &BalanceQuery,
    ) -> Result<Vec<MonthlyBalance>, AggregatorError>;
}
