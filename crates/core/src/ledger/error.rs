//! Ledger aggregator error types.

use thiserror::Error;

/// Errors raised by a ledger aggregator.
///
/// These are upstream failures: the engine never retries them and fails the
/// whole report instead of returning partial statements.
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// The ledger store could not be reached.
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),

    /// The ledger store rejected or failed the query.
    #[error("Ledger query failed: {0}")]
    Query(String),

    /// Ledger data could not be read (e.g. a malformed ledger file).
    #[error("Invalid ledger data: {0}")]
    InvalidData(String),
}
