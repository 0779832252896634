//! Financial statement generation.
//!
//! This module turns a mapping definition and ledger balances into statements:
//! - Leaf balance fetching, one aggregator call per ledger leaf
//! - Section processing over an immutable data context
//! - Cross-statement injection (net income into cash flow, imports)
//! - Assembly of the public output tree
//! - The statement service that orchestrates a whole request

pub mod assembler;
pub mod context;
pub mod error;
pub mod fetch;
pub mod injector;
pub mod processor;
pub mod service;
pub mod types;


pub use assembler::{Assemble, StatementAssembler};
pub use context::DataContext;
pub use error::ReportError;
pub use fetch::{LeafAmounts, fetch_leaf_amounts};
pub use injector::CrossStatementInjector;
pub use processor::SectionProcessor;
pub use service::{ComputedStatements, StatementService};
pub use types::*;
