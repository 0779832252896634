//! Report data types.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::fiscal::ReportPeriod;
pub use crate::mapping::StatementKind;
use crate::mapping::SectionRole;

/// Which statements a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Income statement only.
    IncomeStatement,
    /// Balance sheet only.
    BalanceSheet,
    /// Cash flow statement only.
    CashFlow,
    /// All three statements.
    All,
}

impl ReportCategory {
    /// Statements produced for this category, in report order.
    #[must_use]
    pub const fn statements(self) -> &'static [StatementKind] {
        match self {
            Self::IncomeStatement => &[StatementKind::IncomeStatement],
            Self::BalanceSheet => &[StatementKind::BalanceSheet],
            Self::CashFlow => &[StatementKind::CashFlow],
            Self::All => &StatementKind::ALL,
        }
    }

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportCategory {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income_statement" => Ok(Self::IncomeStatement),
            "balance_sheet" => Ok(Self::BalanceSheet),
            "cash_flow" => Ok(Self::CashFlow),
            "all" => Ok(Self::All),
            other => Err(ReportError::InvalidCategory(other.to_string())),
        }
    }
}

/// Computed value of one section node, before assembly.
///
/// `amounts` always has one entry per month column of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionResult {
    /// Node key.
    pub key: String,
    /// Display name.
    pub label: String,
    /// Role, if the node is one half of a shared key.
    pub role: Option<SectionRole>,
    /// One amount per month column.
    pub amounts: Vec<Decimal>,
    /// Child results in declaration order.
    pub children: Vec<SectionResult>,
}

impl SectionResult {
    /// Key the result was bound under, role-qualified when tagged.
    #[must_use]
    pub fn context_key(&self) -> Cow<'_, str> {
        match self.role {
            Some(role) => Cow::Owned(format!("{}_{role}", self.key)),
            None => Cow::Borrowed(&self.key),
        }
    }

    /// Finds this result or a descendant by context key, depth-first.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Self> {
        if self.context_key() == key {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

/// Finds a result anywhere in a statement by context key.
#[must_use]
pub fn find_section<'a>(sections: &'a [SectionResult], key: &str) -> Option<&'a SectionResult> {
    sections.iter().find_map(|section| section.find(key))
}

/// A section of an assembled statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSection {
    /// Display name.
    pub label: String,
    /// One amount per month column.
    pub amount: Vec<Decimal>,
    /// Nested sections, omitted when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsections: Option<Vec<StatementSection>>,
}

/// A generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialReport {
    /// The requested window and its month columns.
    pub period: ReportPeriod,
    /// Income statement, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_statement: Option<Vec<StatementSection>>,
    /// Balance sheet, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_sheet: Option<Vec<StatementSection>>,
    /// Cash flow statement, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flow: Option<Vec<StatementSection>>,
}

impl FinancialReport {
    /// Creates a report with no statements.
    #[must_use]
    pub const fn new(period: ReportPeriod) -> Self {
        Self {
            period,
            income_statement: None,
            balance_sheet: None,
            cash_flow: None,
        }
    }

    /// Returns the sections of a statement, if present.
    #[must_use]
    pub fn statement(&self, kind: StatementKind) -> Option<&[StatementSection]> {
        match kind {
            StatementKind::IncomeStatement => self.income_statement.as_deref(),
            StatementKind::BalanceSheet => self.balance_sheet.as_deref(),
            StatementKind::CashFlow => self.cash_flow.as_deref(),
        }
    }

    /// Stores the sections of a statement.
    pub fn set_statement(&mut self, kind: StatementKind, sections: Vec<StatementSection>) {
        let slot = match kind {
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::CashFlow => &mut self.cash_flow,
        };
        *slot = Some(sections);
    }

    /// Number of sections across all statements, nested ones included.
    #[must_use]
    pub fn section_count(&self) -> usize {
        fn count(sections: &[StatementSection]) -> usize {
            sections
                .iter()
                .map(|s| 1 + s.subsections.as_deref().map_or(0, count))
                .sum()
        }

        StatementKind::ALL
            .into_iter()
            .filter_map(|kind| self.statement(kind))
            .map(count)
            .sum()
    }
}
