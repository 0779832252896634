//! Statement assembly.

use super::types::{SectionResult, StatementSection};

/// Anything that can be turned into a public statement section.
pub trait Assemble {
    /// Builds the output section, recursively.
    fn assemble(&self) -> StatementSection;
}

impl Assemble for SectionResult {
    fn assemble(&self) -> StatementSection {
        StatementSection {
            label: self.label.clone(),
            amount: self.amounts.clone(),
            subsections: (!self.children.is_empty())
                .then(|| StatementAssembler::assemble(&self.children)),
        }
    }
}

impl Assemble for StatementSection {
    fn assemble(&self) -> StatementSection {
        StatementSection {
            label: self.label.clone(),
            amount: self.amount.clone(),
            subsections: self
                .subsections
                .as_deref()
                .filter(|subsections| !subsections.is_empty())
                .map(StatementAssembler::assemble),
        }
    }
}

/// Produces the output tree of a statement.
///
/// Keys, roles and sources are dropped; labels, amounts and nesting are
/// kept. Empty subsection lists are omitted. Assembling an already assembled
/// tree returns it unchanged.
pub struct StatementAssembler;

impl StatementAssembler {
    /// Assembles a list of sections.
    #[must_use]
    pub fn assemble<T: Assemble>(sections: &[T]) -> Vec<StatementSection> {
        sections.iter().map(Assemble::assemble).collect()
    }

    /// Normalizes an assembled tree, dropping empty subsection lists.
    #[must_use]
    pub fn normalize(sections: &[StatementSection]) -> Vec<StatementSection> {
        Self::assemble(sections)
    }
}
