//! Load-time checks for mapping definitions.

use std::collections::HashSet;

use super::definition::{MappingDefinition, StatementKind};
use super::error::MappingError;
use super::node::{SectionNode, SectionSource};
use crate::formula::Formula;

pub(super) fn validate(definition: &MappingDefinition) -> Result<(), MappingError> {
    if !definition.cash_flow.is_empty()
        && definition
            .find(StatementKind::IncomeStatement, &definition.net_income_key)
            .is_none()
    {
        return Err(MappingError::MissingNetIncome(
            definition.net_income_key.clone(),
        ));
    }

    for kind in StatementKind::ALL {
        validate_statement(definition, kind)?;
    }

    for kind in StatementKind::ALL {
        check_import_cycle(definition, kind, &mut Vec::new())?;
    }

    Ok(())
}

fn validate_statement(
    definition: &MappingDefinition,
    kind: StatementKind,
) -> Result<(), MappingError> {
    let roots = definition.statement(kind);

    let mut declared = HashSet::new();
    let mut duplicate = None;
    for root in roots {
        root.walk(&mut |node| {
            let key = node.context_key().into_owned();
            if duplicate.is_none() && declared.contains(&key) {
                duplicate = Some(key);
            } else {
                declared.insert(key);
            }
        });
    }
    if let Some(key) = duplicate {
        return Err(MappingError::DuplicateKey {
            statement: kind,
            key,
        });
    }

    let checker = ScopeChecker {
        definition,
        statement: kind,
        declared: &declared,
    };

    // Roots see the seeded imports and every earlier root.
    let mut scope: HashSet<String> = definition
        .imports(kind)
        .into_iter()
        .map(|(_, key)| key)
        .collect();
    for root in roots {
        checker.check(root, &scope)?;
        scope.insert(root.context_key().into_owned());
    }

    Ok(())
}

/// Mirrors the processor's scoping: a node sees its parent's scope plus the
/// children resolved before it.
struct ScopeChecker<'a> {
    definition: &'a MappingDefinition,
    statement: StatementKind,
    declared: &'a HashSet<String>,
}

impl ScopeChecker<'_> {
    fn check(
        &self,
        node: &SectionNode,
        parent_scope: &HashSet<String>,
    ) -> Result<(), MappingError> {
        let mut local = parent_scope.clone();
        for child in &node.children {
            self.check(child, &local)?;
            local.insert(child.context_key().into_owned());
        }

        match &node.source {
            SectionSource::Formula { calculation } => {
                self.check_formula(node, calculation, &local)
            }
            SectionSource::Import { statement, key } => self.check_import(node, *statement, key),
            SectionSource::Ledger { .. } | SectionSource::Group => Ok(()),
        }
    }

    fn check_formula(
        &self,
        node: &SectionNode,
        calculation: &str,
        scope: &HashSet<String>,
    ) -> Result<(), MappingError> {
        let formula = Formula::parse(calculation).map_err(|error| MappingError::InvalidFormula {
            statement: self.statement,
            key: node.context_key().into_owned(),
            error,
        })?;

        let Some(reference) = formula
            .references()
            .into_iter()
            .find(|reference| !scope.contains(*reference))
        else {
            return Ok(());
        };

        let key = node.context_key().into_owned();
        let reference = reference.to_string();
        if self.declared.contains(&reference) {
            Err(MappingError::ForwardReference {
                statement: self.statement,
                key,
                reference,
            })
        } else {
            Err(MappingError::UndeclaredReference {
                statement: self.statement,
                key,
                reference,
            })
        }
    }

    fn check_import(
        &self,
        node: &SectionNode,
        source_statement: StatementKind,
        source_key: &str,
    ) -> Result<(), MappingError> {
        if source_statement == self.statement {
            return Err(MappingError::SelfImport {
                statement: self.statement,
                key: node.context_key().into_owned(),
            });
        }

        if self.definition.find(source_statement, source_key).is_none() {
            return Err(MappingError::UnknownImport {
                statement: self.statement,
                key: node.context_key().into_owned(),
                source_statement,
                source_key: source_key.to_string(),
            });
        }

        Ok(())
    }
}

fn check_import_cycle(
    definition: &MappingDefinition,
    kind: StatementKind,
    path: &mut Vec<StatementKind>,
) -> Result<(), MappingError> {
    if path.contains(&kind) {
        return Err(MappingError::ImportCycle(kind));
    }

    path.push(kind);
    for (source, _) in definition.imports(kind) {
        check_import_cycle(definition, source, path)?;
    }
    path.pop();
    Ok(())
}
