//! Cross-statement data injection.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::context::DataContext;
use super::types::{SectionResult, StatementKind, find_section};
use crate::mapping::MappingDefinition;

/// Seeds a statement's root context with values computed by other statements.
///
/// Cash flow receives the income statement's net income. Any `import` node
/// adds the key it names. Source statements are computed once per request
/// and their unassembled results are reused for every statement that needs
/// them.
pub struct CrossStatementInjector<'a> {
    definition: &'a MappingDefinition,
}

impl<'a> CrossStatementInjector<'a> {
    /// Creates an injector for a definition.
    #[must_use]
    pub const fn new(definition: &'a MappingDefinition) -> Self {
        Self { definition }
    }

    /// Statements `target` needs computed before it.
    #[must_use]
    pub fn sources(&self, target: StatementKind) -> Vec<StatementKind> {
        let mut sources = Vec::new();
        for (statement, _) in self.definition.imports(target) {
            if !sources.contains(&statement) {
                sources.push(statement);
            }
        }
        sources
    }

    /// Groups `requested` and every statement they depend on into stages.
    ///
    /// Statements in one stage depend only on earlier stages and can be
    /// computed concurrently. Within a stage, statements keep report order.
    #[must_use]
    pub fn schedule(&self, requested: &[StatementKind]) -> Vec<Vec<StatementKind>> {
        let mut pending = Vec::new();
        let mut stack = requested.to_vec();
        while let Some(kind) = stack.pop() {
            if !pending.contains(&kind) {
                pending.push(kind);
                stack.extend(self.sources(kind));
            }
        }
        pending.sort_unstable();

        let mut done: Vec<StatementKind> = Vec::new();
        let mut stages = Vec::new();
        while !pending.is_empty() {
            let ready: Vec<StatementKind> = pending
                .iter()
                .copied()
                .filter(|kind| self.sources(*kind).iter().all(|s| done.contains(s)))
                .collect();

            // Unvalidated import cycles: run the rest with whatever seeds exist.
            let stage = if ready.is_empty() {
                std::mem::take(&mut pending)
            } else {
                pending.retain(|kind| !ready.contains(kind));
                ready
            };
            done.extend(&stage);
            stages.push(stage);
        }
        stages
    }

    /// Builds the root context of `target` from already computed statements.
    ///
    /// Values are bound under the key named in the source statement. A value
    /// that cannot be found is left unbound and resolves to zeros downstream.
    #[must_use]
    pub fn seed(
        &self,
        target: StatementKind,
        computed: &HashMap<StatementKind, Vec<SectionResult>>,
    ) -> DataContext {
        self.definition
            .imports(target)
            .into_iter()
            .fold(DataContext::new(), |context, (statement, key)| {
                match computed
                    .get(&statement)
                    .and_then(|results| find_section(results, &key))
                {
                    Some(section) => {
                        debug!(
                            statement = %target,
                            source = %statement,
                            key = %key,
                            "Injecting value"
                        );
                        context.with(key, section.amounts.clone())
                    }
                    None => {
                        warn!(
                            statement = %target,
                            source = %statement,
                            key = %key,
                            "Injected value not found"
                        );
                        context
                    }
                }
            })
    }
}
