//! Leaf balance fetching.

use std::collections::HashMap;

use futures::{StreamExt, TryStreamExt, stream};
use rust_decimal::Decimal;
use tracing::debug;

use crate::fiscal::ReportPeriod;
use crate::ledger::{AggregatorError, LedgerAggregator, MonthlyBalance};
use crate::mapping::{NormalBalance, SectionNode, SectionSource};

/// Monthly amounts of every ledger leaf of one statement, by context key.
pub type LeafAmounts = HashMap<String, Vec<Decimal>>;

/// Fetches the balances of every ledger leaf under `roots`.
///
/// Each leaf with selectors costs exactly one aggregator call covering the
/// whole period. At most `max_concurrent` calls are in flight. Leaves without
/// selectors are skipped and resolve to zeros.
///
/// # Errors
///
/// Returns the first aggregator failure. Remaining calls are dropped.
pub async fn fetch_leaf_amounts(
    roots: &[SectionNode],
    period: &ReportPeriod,
    aggregator: &dyn LedgerAggregator,
    max_concurrent: usize,
) -> Result<LeafAmounts, AggregatorError> {
    let mut leaves = Vec::new();
    for root in roots {
        root.walk(&mut |node| {
            if let SectionSource::Ledger { normal_balance, .. } = &node.source {
                match node.balance_query(period.start_date, period.end_date) {
                    Some(query) => {
                        leaves.push((node.context_key().into_owned(), *normal_balance, query));
                    }
                    None => debug!(key = %node.key, "Ledger leaf has no selectors, skipping"),
                }
            }
        });
    }

    stream::iter(leaves)
        .map(|(key, normal_balance, query)| async move {
            debug!(
                key = %key,
                types = ?query.category_type_codes,
                numbers = ?query.category_numbers,
                "Querying monthly balances"
            );
            let balances = aggregator.monthly_balances(&query).await?;
            let amounts = bucket(&balances, period, normal_balance)?;
            Ok::<_, AggregatorError>((key, amounts))
        })
        .buffer_unordered(max_concurrent.max(1))
        .try_collect()
        .await
}

/// Sums balances into the period's month columns. Months outside the
/// columns are dropped.
///
/// # Errors
///
/// Returns `AggregatorError::InvalidData` if a month's total overflows.
pub fn bucket(
    balances: &[MonthlyBalance],
    period: &ReportPeriod,
    normal_balance: NormalBalance,
) -> Result<Vec<Decimal>, AggregatorError> {
    let mut amounts = vec![Decimal::ZERO; period.len()];
    for balance in balances {
        let Some(index) = period.index_of(balance.month) else {
            continue;
        };
        let current = amounts[index];
        amounts[index] = normal_balance
            .amount(balance)
            .and_then(|amount| current.checked_add(amount))
            .ok_or_else(|| {
                AggregatorError::InvalidData(format!(
                    "balance of category type {} overflows in {}",
                    balance.category_type_code, balance.month
                ))
            })?;
    }
    Ok(amounts)
}
