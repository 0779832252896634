//! Recursive section processing.

use rust_decimal::Decimal;
use tracing::warn;

use super::context::DataContext;
use super::fetch::LeafAmounts;
use super::types::SectionResult;
use crate::fiscal::ReportPeriod;
use crate::formula::Formula;
use crate::mapping::{SectionNode, SectionSource};

/// Resolves section nodes into section results.
///
/// Processing is synchronous: ledger leaves read from balances fetched
/// beforehand, everything else is computed from the data context.
pub struct SectionProcessor<'a> {
    period: &'a ReportPeriod,
    leaves: &'a LeafAmounts,
}

impl<'a> SectionProcessor<'a> {
    /// Creates a processor over fetched leaf amounts.
    #[must_use]
    pub const fn new(period: &'a ReportPeriod, leaves: &'a LeafAmounts) -> Self {
        Self { period, leaves }
    }

    /// Resolves the root sections of a statement in declaration order.
    ///
    /// Each root sees `seed` plus the roots resolved before it.
    #[must_use]
    pub fn process(&self, roots: &[SectionNode], seed: DataContext) -> Vec<SectionResult> {
        let mut context = seed;
        let mut results = Vec::with_capacity(roots.len());
        for root in roots {
            let result = self.resolve(root, &context);
            context = context.with(root.context_key().into_owned(), result.amounts.clone());
            results.push(result);
        }
        results
    }

    /// Resolves one node against its parent's context.
    ///
    /// Children are resolved first, in order, each one extending the local
    /// context with its own binding. Only direct children are bound; deeper
    /// descendants stay invisible to this node.
    #[must_use]
    pub fn resolve(&self, node: &SectionNode, parent: &DataContext) -> SectionResult {
        let mut local = parent.clone();
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let result = self.resolve(child, &local);
            // Role siblings bind only `<key>_income`/`<key>_expense`; the shared
            // `<key>` stays unbound and reads as 0 if a formula names it.
            local = local.with(child.context_key().into_owned(), result.amounts.clone());
            children.push(result);
        }

        let amounts = match &node.source {
            SectionSource::Ledger { .. } => self
                .leaves
                .get(&*node.context_key())
                .map_or_else(|| self.zeros(), |amounts| self.fit(amounts)),
            SectionSource::Formula { calculation } => {
                self.calculate(node, calculation, parent, &local)
            }
            SectionSource::Import { key, .. } => parent
                .get(key)
                .map_or_else(|| self.zeros(), |amounts| self.fit(amounts)),
            SectionSource::Group => self.zeros(),
        };

        SectionResult {
            key: node.key.clone(),
            label: node.label.clone(),
            role: node.role,
            amounts,
            children,
        }
    }

    fn calculate(
        &self,
        node: &SectionNode,
        calculation: &str,
        parent: &DataContext,
        local: &DataContext,
    ) -> Vec<Decimal> {
        // A bare key already bound above this node is copied as-is.
        if let Some(amounts) = parent.get(calculation.trim()).filter(|a| !a.is_empty()) {
            return self.fit(amounts);
        }

        match Formula::parse(calculation) {
            Ok(formula) => (0..self.period.len())
                .map(|month| formula.evaluate_or_zero(local, month))
                .collect(),
            Err(err) => {
                warn!(
                    key = %node.key,
                    formula = %calculation.trim(),
                    error = %err,
                    "Rejected calculation, using zeros"
                );
                self.zeros()
            }
        }
    }

    fn zeros(&self) -> Vec<Decimal> {
        vec![Decimal::ZERO; self.period.len()]
    }

    /// Pads with zeros or truncates to the period's month count.
    fn fit(&self, amounts: &[Decimal]) -> Vec<Decimal> {
        let mut fitted = amounts.to_vec();
        fitted.resize(self.period.len(), Decimal::ZERO);
        fitted
    }
}
