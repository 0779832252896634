//! Ledger repository: monthly balances straight from `ledger_entries`.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use statera_core::fiscal::MonthKey;
use statera_core::ledger::{
    AggregatorError, BalanceQuery, LedgerAggregator, LedgerEntry, MonthlyBalance,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::ledger_entries;
use crate::entities::sea_orm_active_enums::EntryKind;

const MONTH_EXPR: &str = "to_char(entry_date, 'YYYY-MM')";

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerRepositoryError {
    /// The query returned a month that is not `YYYY-MM`.
    #[error("Invalid month '{0}' returned by ledger query")]
    InvalidMonth(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerRepositoryError> for AggregatorError {
    fn from(err: LedgerRepositoryError) -> Self {
        match err {
            LedgerRepositoryError::Database(DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) => {
                Self::Unavailable(err.to_string())
            }
            LedgerRepositoryError::Database(_) => Self::Query(err.to_string()),
            LedgerRepositoryError::InvalidMonth(_) => Self::InvalidData(err.to_string()),
        }
    }
}

/// Row of the monthly balance query.
#[derive(Debug, FromQueryResult)]
pub(super) struct BalanceRow {
    pub(super) category_type_code: String,
    pub(super) month: String,
    pub(super) income_sum: Decimal,
    pub(super) expense_sum: Decimal,
}

impl TryFrom<BalanceRow> for MonthlyBalance {
    type Error = LedgerRepositoryError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        let month = row
            .month
            .parse::<MonthKey>()
            .map_err(|_| LedgerRepositoryError::InvalidMonth(row.month.clone()))?;

        Ok(Self {
            category_type_code: row.category_type_code,
            month,
            income_sum: row.income_sum,
            expense_sum: row.expense_sum,
        })
    }
}

/// Ledger repository backed by Postgres.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sums income and expense per category type and month.
    ///
    /// Selects entries in the date range whose category type code or
    /// category number is listed in the query. An empty query returns no
    /// rows without touching the database.
    pub async fn find_monthly_balances(
        &self,
        query: &BalanceQuery,
    ) -> Result<Vec<MonthlyBalance>, LedgerRepositoryError> {
        if query.is_empty() {
            return Ok(vec![]);
        }

        let mut selection = Condition::any();
        if !query.category_type_codes.is_empty() {
            selection = selection.add(
                ledger_entries::Column::CategoryTypeCode.is_in(query.category_type_codes.clone()),
            );
        }
        if !query.category_numbers.is_empty() {
            selection = selection.add(
                ledger_entries::Column::CategoryNumber.is_in(query.category_numbers.clone()),
            );
        }

        let rows = ledger_entries::Entity::find()
            .select_only()
            .column(ledger_entries::Column::CategoryTypeCode)
            .column_as(Expr::cust(MONTH_EXPR), "month")
            .column_as(
                Expr::cust("COALESCE(SUM(amount) FILTER (WHERE kind = 'income'), 0)"),
                "income_sum",
            )
            .column_as(
                Expr::cust("COALESCE(SUM(amount) FILTER (WHERE kind = 'expense'), 0)"),
                "expense_sum",
            )
            .filter(ledger_entries::Column::EntryDate.gte(query.start))
            .filter(ledger_entries::Column::EntryDate.lte(query.end))
            .filter(selection)
            .group_by(ledger_entries::Column::CategoryTypeCode)
            .group_by(Expr::cust(MONTH_EXPR))
            .order_by_asc(ledger_entries::Column::CategoryTypeCode)
            .order_by_asc(Expr::cust(MONTH_EXPR))
            .into_model::<BalanceRow>()
            .all(&self.db)
            .await?;

        debug!(
            start = %query.start,
            end = %query.end,
            rows = rows.len(),
            "Fetched monthly balances"
        );

        rows.into_iter().map(MonthlyBalance::try_from).collect()
    }

    /// Inserts ledger entries, returning how many were written.
    pub async fn insert_entries(
        &self,
        entries: &[LedgerEntry],
    ) -> Result<usize, LedgerRepositoryError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().fixed_offset();
        let models = entries.iter().map(|entry| ledger_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            entry_date: Set(entry.date),
            category_type_code: Set(entry.category_type_code.clone()),
            category_number: Set(entry.category_number.clone()),
            kind: Set(EntryKind::from(entry.kind)),
            amount: Set(entry.amount),
            description: Set(None),
            created_at: Set(now),
        });

        ledger_entries::Entity::insert_many(models)
            .exec(&self.db)
            .await?;

        Ok(entries.len())
    }
}

#[async_trait]
impl LedgerAggregator for LedgerRepository {
    async fn monthly_balances(
        &self,
        query: &BalanceQuery,
    ) -> Result<Vec<MonthlyBalance>, AggregatorError> {
        Ok(self.find_monthly_balances(query).await?)
    }
}
