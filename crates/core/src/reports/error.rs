//! Report error types.

use chrono::NaiveDate;
use statera_shared::AppError;
use thiserror::Error;

use crate::ledger::AggregatorError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Unknown report category.
    #[error("Unknown report category: {0}")]
    InvalidCategory(String),

    /// The ledger aggregator failed. No partial report is produced.
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidDateRange { .. } | ReportError::InvalidCategory(_) => {
                Self::Validation(err.to_string())
            }
            ReportError::Aggregator(AggregatorError::Unavailable(msg)) => {
                Self::ExternalService(msg)
            }
            ReportError::Aggregator(AggregatorError::Query(msg)) => Self::Database(msg),
            ReportError::Aggregator(AggregatorError::InvalidData(msg)) => Self::Internal(msg),
        }
    }
}
