//! The mapping definition artifact.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MappingError;
use super::node::{SectionNode, SectionSource};
use super::validation;

/// Key of the income-statement node seeded into the cash flow statement
/// when a definition does not name one.
pub const DEFAULT_NET_INCOME_KEY: &str = "net_income";

/// The three financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Income statement (profit and loss).
    IncomeStatement,
    /// Balance sheet.
    BalanceSheet,
    /// Cash flow statement.
    CashFlow,
}

impl StatementKind {
    /// All statements in report order.
    pub const ALL: [Self; 3] = [Self::IncomeStatement, Self::BalanceSheet, Self::CashFlow];

    /// Snake-case name, as used in definitions and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown statement '{s}'"))
    }
}

/// Declarative structure of every statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDefinition {
    /// Artifact version, for operators.
    #[serde(default = "default_version")]
    pub version: String,
    /// Income-statement key seeded into the cash flow statement.
    #[serde(default = "default_net_income_key")]
    pub net_income_key: String,
    /// Income statement root sections.
    #[serde(default)]
    pub income_statement: Vec<SectionNode>,
    /// Balance sheet root sections.
    #[serde(default)]
    pub balance_sheet: Vec<SectionNode>,
    /// Cash flow root sections.
    #[serde(default)]
    pub cash_flow: Vec<SectionNode>,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_net_income_key() -> String {
    DEFAULT_NET_INCOME_KEY.to_string()
}

impl MappingDefinition {
    /// Reads and validates a definition file.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Io` if the file cannot be read, `MappingError::Parse`
    /// if it is malformed, or the first validation error found.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| MappingError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Parses and validates a definition.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Parse` if the JSON is malformed, or the first
    /// validation error found.
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        let definition: Self =
            serde_json::from_str(json).map_err(|e| MappingError::Parse(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Checks keys, formulas and imports.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), MappingError> {
        validation::validate(self)
    }

    /// Root sections of a statement.
    #[must_use]
    pub fn statement(&self, kind: StatementKind) -> &[SectionNode] {
        match kind {
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Values a statement needs from other statements, as `(statement, key)` pairs.
    ///
    /// A non-empty cash flow statement always depends on the net income key.
    /// Every `import` node adds its source.
    #[must_use]
    pub fn imports(&self, kind: StatementKind) -> Vec<(StatementKind, String)> {
        let mut imports = Vec::new();
        if kind == StatementKind::CashFlow && !self.cash_flow.is_empty() {
            imports.push((StatementKind::IncomeStatement, self.net_income_key.clone()));
        }

        for root in self.statement(kind) {
            root.walk(&mut |node| {
                if let SectionSource::Import { statement, key } = &node.source {
                    let import = (*statement, key.clone());
                    if !imports.contains(&import) {
                        imports.push(import);
                    }
                }
            });
        }
        imports
    }

    /// Finds a node of `kind` by context key.
    #[must_use]
    pub fn find(&self, kind: StatementKind, key: &str) -> Option<&SectionNode> {
        let mut found = None;
        for root in self.statement(kind) {
            root.walk(&mut |node| {
                if found.is_none() && node.context_key() == key {
                    found = Some(node);
                }
            });
        }
        found
    }
}
