//! Database layer with `SeaORM` entities and the ledger aggregator.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - A Postgres-backed `LedgerAggregator`
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{LedgerRepository, LedgerRepositoryError};
pub use sea_orm::DatabaseConnection;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbErr};
use statera_shared::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
