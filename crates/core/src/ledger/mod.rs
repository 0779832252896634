//! Ledger access for statement generation.
//!
//! The engine never reads transactions directly. It asks a [`LedgerAggregator`]
//! for monthly income/expense sums per category type and works from those:
//! - Monthly balance and query types
//! - The aggregator contract
//! - An in-memory ledger used by tests and file-based runs

pub mod aggregator;
pub mod error;
pub mod memory;
pub mod types;

pub use aggregator::LedgerAggregator;
pub use error::AggregatorError;
pub use memory::InMemoryLedger;
pub use types::{BalanceQuery, EntryKind, LedgerEntry, MonthlyBalance};
