//! Statement generation service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future;
use tracing::{debug, info};

use super::assembler::StatementAssembler;
use super::context::DataContext;
use super::error::ReportError;
use super::fetch::fetch_leaf_amounts;
use super::injector::CrossStatementInjector;
use super::processor::SectionProcessor;
use super::types::{FinancialReport, ReportCategory, SectionResult, StatementKind};
use crate::fiscal::ReportPeriod;
use crate::ledger::LedgerAggregator;
use crate::mapping::MappingDefinition;

/// Unassembled results of every computed statement.
pub type ComputedStatements = HashMap<StatementKind, Vec<SectionResult>>;

/// Service for generating financial statements.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct StatementService {
    definition: Arc<MappingDefinition>,
    aggregator: Arc<dyn LedgerAggregator>,
    max_concurrent_queries: usize,
}

impl StatementService {
    /// Default bound on concurrent aggregator calls per statement.
    pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 8;

    /// Creates a service over a validated definition and a ledger.
    #[must_use]
    pub fn new(definition: Arc<MappingDefinition>, aggregator: Arc<dyn LedgerAggregator>) -> Self {
        Self {
            definition,
            aggregator,
            max_concurrent_queries: Self::DEFAULT_MAX_CONCURRENT_QUERIES,
        }
    }

    /// Sets the bound on concurrent aggregator calls. Zero is treated as one.
    #[must_use]
    pub fn with_max_concurrent_queries(mut self, max: usize) -> Self {
        self.max_concurrent_queries = max.max(1);
        self
    }

    /// Generates the statements of `category` for `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `end` is before `start`, or
    /// `ReportError::Aggregator` if any ledger query fails. No partial report
    /// is returned.
    pub async fn generate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: ReportCategory,
    ) -> Result<FinancialReport, ReportError> {
        let period = ReportPeriod::resolve(start, end)?;
        info!(
            %start,
            %end,
            %category,
            months = period.len(),
            "Generating financial report"
        );

        let mut computed = self.compute(category.statements(), &period).await?;

        let mut report = FinancialReport::new(period);
        for &kind in category.statements() {
            if let Some(results) = computed.remove(&kind) {
                report.set_statement(kind, StatementAssembler::assemble(&results));
            }
        }

        info!(
            %category,
            statements = category.statements().len(),
            sections = report.section_count(),
            "Financial report generated"
        );
        Ok(report)
    }

    /// Computes `requested` and every statement they import from, unassembled.
    ///
    /// Statements without mutual dependencies run concurrently. Each
    /// statement is computed once, however many others import from it.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Aggregator` on the first ledger failure.
    pub async fn compute(
        &self,
        requested: &[StatementKind],
        period: &ReportPeriod,
    ) -> Result<ComputedStatements, ReportError> {
        let injector = CrossStatementInjector::new(&self.definition);
        let mut computed = ComputedStatements::new();

        for stage in injector.schedule(requested) {
            let seeded: Vec<(StatementKind, DataContext)> = stage
                .into_iter()
                .map(|kind| (kind, injector.seed(kind, &computed)))
                .collect();

            let results = future::try_join_all(seeded.into_iter().map(|(kind, seed)| async move {
                let results = self.compute_statement(kind, period, seed).await?;
                Ok::<_, ReportError>((kind, results))
            }))
            .await?;

            computed.extend(results);
        }

        Ok(computed)
    }

    /// Computes one statement from a seeded root context.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Aggregator` on the first ledger failure.
    pub async fn compute_statement(
        &self,
        kind: StatementKind,
        period: &ReportPeriod,
        seed: DataContext,
    ) -> Result<Vec<SectionResult>, ReportError> {
        let roots = self.definition.statement(kind);
        let leaves = fetch_leaf_amounts(
            roots,
            period,
            self.aggregator.as_ref(),
            self.max_concurrent_queries,
        )
        .await?;

        debug!(
            statement = %kind,
            leaves = leaves.len(),
            seeded = seed.len(),
            "Processing statement"
        );
        Ok(SectionProcessor::new(period, &leaves).process(roots, seed))
    }
}
