//! Mapping definition error types.

use thiserror::Error;

use super::definition::StatementKind;
use crate::formula::FormulaError;

/// Errors found while loading or validating a mapping definition.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The definition file could not be read.
    #[error("Cannot read mapping definition {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// The definition is not valid JSON for the expected shape.
    #[error("Malformed mapping definition: {0}")]
    Parse(String),

    /// Two sections of one statement bind the same context key.
    #[error("Duplicate key '{key}' in {statement}")]
    DuplicateKey {
        /// Statement containing the duplicate.
        statement: StatementKind,
        /// The duplicated key.
        key: String,
    },

    /// A calculation does not parse.
    #[error("Invalid calculation for '{key}' in {statement}: {error}")]
    InvalidFormula {
        /// Statement containing the section.
        statement: StatementKind,
        /// Section key.
        key: String,
        /// Parse error.
        #[source]
        error: FormulaError,
    },

    /// A calculation references a key declared nowhere in scope.
    #[error("Calculation for '{key}' in {statement} references undeclared key '{reference}'")]
    UndeclaredReference {
        /// Statement containing the section.
        statement: StatementKind,
        /// Section key.
        key: String,
        /// The unknown reference.
        reference: String,
    },

    /// A calculation references itself or a key resolved after it.
    #[error(
        "Calculation for '{key}' in {statement} references '{reference}' before it is resolved"
    )]
    ForwardReference {
        /// Statement containing the section.
        statement: StatementKind,
        /// Section key.
        key: String,
        /// The reference that is not yet available.
        reference: String,
    },

    /// A section imports from its own statement.
    #[error("Section '{key}' in {statement} imports from its own statement")]
    SelfImport {
        /// Statement containing the section.
        statement: StatementKind,
        /// Section key.
        key: String,
    },

    /// A section imports a key that the source statement does not declare.
    #[error(
        "Section '{key}' in {statement} imports unknown key '{source_key}' from {source_statement}"
    )]
    UnknownImport {
        /// Statement containing the section.
        statement: StatementKind,
        /// Section key.
        key: String,
        /// Statement the value is imported from.
        source_statement: StatementKind,
        /// Key looked up in the source statement.
        source_key: String,
    },

    /// Statements import from each other in a cycle.
    #[error("Statement imports form a cycle through {0}")]
    ImportCycle(StatementKind),

    /// The net income key is missing from the income statement.
    #[error("Net income key '{0}' is not declared in the income statement")]
    MissingNetIncome(String),
}

impl From<MappingError> for statera_shared::AppError {
    fn from(err: MappingError) -> Self {
        Self::Configuration(err.to_string())
    }
}
