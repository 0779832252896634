//! Ledger entries migration.
//!
//! Creates the table the ledger aggregator reads monthly balances from.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS ledger_entries CASCADE; DROP TYPE IF EXISTS entry_kind;",
        )
        .await?;
        Ok(())
    }
}

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TYPE entry_kind AS ENUM ('income', 'expense');

-- Dated, categorized money movements
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_date DATE NOT NULL,
    category_type_code VARCHAR(20) NOT NULL,
    category_number VARCHAR(50) NOT NULL,
    kind entry_kind NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_non_negative CHECK (amount >= 0)
);

-- Aggregation by category type over a date range
CREATE INDEX idx_ledger_entries_type_date ON ledger_entries(category_type_code, entry_date);

-- Aggregation by specific category number
CREATE INDEX idx_ledger_entries_number_date ON ledger_entries(category_number, entry_date);
";
