//! Reporting periods and month columns.

pub mod period;

pub use period::{MonthKey, ParseMonthKeyError, ReportPeriod};
