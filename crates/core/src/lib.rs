//! Statement computation engine for Statera.
//!
//! This crate contains the engine with ZERO web or database dependencies.
//! Ledger data arrives through the [`ledger::LedgerAggregator`] contract.
//!
//! # Modules
//!
//! - `fiscal` - Report periods and month keys
//! - `formula` - Safe arithmetic over named section results
//! - `ledger` - Aggregator contract and an in-memory ledger
//! - `mapping` - Declarative statement structure
//! - `reports` - Section processing, cross-statement injection and assembly

pub mod fiscal;
pub mod formula;
pub mod ledger;
pub mod mapping;
pub mod reports;
