//! Mapping definitions: the declarative structure of every statement.
//!
//! A mapping definition is external configuration. It says which sections a
//! statement has, in which order, and where each section's value comes from.
//! Swapping the definition changes the shape of every report without code
//! changes. Definitions are validated when loaded so that bad references and
//! cycles surface before any report is generated.

pub mod definition;
pub mod error;
pub mod node;
mod validation;

#[cfg(test)]
mod tests;

pub use definition::{DEFAULT_NET_INCOME_KEY, MappingDefinition, StatementKind};
pub use error::MappingError;
pub use node::{CategorySelector, NormalBalance, SectionNode, SectionRole, SectionSource};
