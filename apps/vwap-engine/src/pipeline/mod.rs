//! Ingestion pipeline orchestration.
//!
//! Builds the symbol catalog, opens one reader per symbol, pulls a bounded
//! batch from each, feeds the engine, and collects one outcome per symbol
//! in catalog order.
//!
//! Two execution paths share the same per-symbol work:
//!
//! - [`IngestionPipeline::run`]: symbols strictly sequential, one file open
//!   at a time, never holding a handle across symbols.
//! - [`IngestionPipeline::run_concurrent`]: one tokio task per symbol, each
//!   exclusively owning its reader, with a per-symbol timeout so one slow
//!   or corrupt file cannot stall the run. Results land in pre-reserved
//!   slots indexed by symbol id, so catalog order is preserved regardless
//!   of task completion order.
//!
//! Per-symbol failures never abort the run: the affected symbol keeps its
//! slot with a failure marker and the remaining symbols still report.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::catalog::{CatalogError, SymbolCatalog};
use crate::domain::{SymbolEntry, SymbolFailure, SymbolOutcome};
use crate::engine::WeightedAverageEngine;
use crate::reader::{ParsePolicy, ReaderError, TickFileReader};

/// Default bound on leading ticks considered per symbol.
pub const DEFAULT_TICK_BUDGET: usize = 2000;

/// Default per-symbol timeout on the concurrent path.
pub const DEFAULT_SYMBOL_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Error Type
// =============================================================================

/// Errors that abort the pipeline before any symbol is processed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The catalog could not be built from the input directory.
    #[error("catalog build failed: {0}")]
    Catalog(#[from] CatalogError),
}

// =============================================================================
// Ingestion Pipeline
// =============================================================================

/// Orchestrates catalog build, per-symbol ingestion, and aggregation.
#[derive(Debug)]
pub struct IngestionPipeline {
    engine: Arc<WeightedAverageEngine>,
    tick_budget: usize,
    parse_policy: ParsePolicy,
    symbol_timeout: Duration,
}

impl IngestionPipeline {
    /// Create a pipeline over the given engine with default bounds.
    #[must_use]
    pub fn new(engine: Arc<WeightedAverageEngine>) -> Self {
        Self {
            engine,
            tick_budget: DEFAULT_TICK_BUDGET,
            parse_policy: ParsePolicy::default(),
            symbol_timeout: DEFAULT_SYMBOL_TIMEOUT,
        }
    }

    /// Set the per-symbol tick budget.
    ///
    /// Symbols with more ticks than the budget are silently truncated to
    /// the first `tick_budget` records in file order. This bounds the
    /// working set per symbol and is a deliberate policy, not a defect.
    #[must_use]
    pub const fn with_tick_budget(mut self, tick_budget: usize) -> Self {
        self.tick_budget = tick_budget;
        self
    }

    /// Set the malformed-line policy passed to each reader.
    #[must_use]
    pub const fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Set the per-symbol timeout used by the concurrent path.
    #[must_use]
    pub const fn with_symbol_timeout(mut self, timeout: Duration) -> Self {
        self.symbol_timeout = timeout;
        self
    }

    /// Run the pipeline sequentially over a tick directory.
    ///
    /// Returns one [`SymbolOutcome`] per non-sentinel symbol in catalog
    /// order. Exactly one file resource is open at any moment.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Catalog`] if the directory cannot be
    /// scanned; per-symbol failures are recorded in their outcome slots.
    pub fn run(&self, directory: &Path) -> Result<Vec<SymbolOutcome>, PipelineError> {
        let catalog = SymbolCatalog::build(directory)?;
        self.log_run_start(&catalog, "sequential");

        let outcomes = catalog
            .entries()
            .iter()
            .map(|entry| self.ingest_symbol(entry))
            .collect();

        Ok(outcomes)
    }

    /// Run the pipeline with one concurrent task per symbol.
    ///
    /// Each task owns its file resource exclusively; there is no shared
    /// mutable state between tasks. A task exceeding the per-symbol
    /// timeout records [`SymbolFailure::Timeout`] in its slot instead of
    /// stalling the run. The outcome order matches [`Self::run`] exactly.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Catalog`] if the directory cannot be
    /// scanned; per-symbol failures are recorded in their outcome slots.
    pub async fn run_concurrent(
        &self,
        directory: &Path,
    ) -> Result<Vec<SymbolOutcome>, PipelineError> {
        let catalog = SymbolCatalog::build(directory)?;
        self.log_run_start(&catalog, "concurrent");

        let mut slots: Vec<Option<SymbolOutcome>> = vec![None; catalog.entries().len()];
        let mut tasks: JoinSet<(usize, SymbolOutcome)> = JoinSet::new();

        for entry in catalog.entries() {
            let entry = entry.clone();
            let engine = Arc::clone(&self.engine);
            let budget = self.tick_budget;
            let policy = self.parse_policy;
            let timeout = self.symbol_timeout;

            tasks.spawn(async move {
                let slot = entry.symbol_id.slot();
                let outcome = ingest_symbol_with_timeout(entry, engine, budget, policy, timeout)
                    .await;
                (slot, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(e) => {
                    // A panicked task loses its slot; surfaced below as a
                    // resource failure rather than poisoning the run.
                    tracing::error!(error = %e, "Symbol ingestion task failed to join");
                }
            }
        }

        let outcomes = slots
            .into_iter()
            .zip(catalog.entries())
            .map(|(slot, entry)| {
                slot.unwrap_or_else(|| SymbolOutcome {
                    symbol_id: entry.symbol_id,
                    symbol_name: entry.symbol_name.clone(),
                    result: Err(SymbolFailure::Resource(
                        "ingestion task panicked".to_string(),
                    )),
                })
            })
            .collect();

        Ok(outcomes)
    }

    /// Ingest one symbol: open, pull the bounded batch, compute, release.
    fn ingest_symbol(&self, entry: &SymbolEntry) -> SymbolOutcome {
        let result = self.ingest_symbol_inner(entry);

        match &result {
            Ok(avg) => tracing::debug!(
                symbol = %entry.symbol_name,
                weighted_average_price = avg.weighted_average_price,
                total_weight = avg.total_weight,
                "Symbol aggregated"
            ),
            Err(failure) => tracing::warn!(
                symbol = %entry.symbol_name,
                failure = %failure,
                "Symbol ingestion failed"
            ),
        }

        SymbolOutcome {
            symbol_id: entry.symbol_id,
            symbol_name: entry.symbol_name.clone(),
            result,
        }
    }

    fn ingest_symbol_inner(
        &self,
        entry: &SymbolEntry,
    ) -> Result<crate::domain::WeightedAverageResult, SymbolFailure> {
        let mut reader =
            TickFileReader::open(&entry.source_path, entry.symbol_id, self.parse_policy)
                .map_err(|e| SymbolFailure::Resource(e.to_string()))?;

        let batch = reader
            .read_batch(self.tick_budget)
            .map_err(|e| match e {
                ReaderError::Io { .. } => SymbolFailure::Resource(e.to_string()),
                _ => SymbolFailure::Parse(e.to_string()),
            })?;

        self.engine
            .compute(entry.symbol_id, &batch)
            .map_err(|_| SymbolFailure::EmptyBatch)
        // Reader dropped here: the file handle is released before the next
        // symbol begins.
    }

    fn log_run_start(&self, catalog: &SymbolCatalog, mode: &str) {
        tracing::info!(
            mode,
            symbols = catalog.entries().len(),
            tick_budget = self.tick_budget,
            parse_policy = self.parse_policy.as_str(),
            backend = self.engine.backend_name(),
            "Starting ingestion pipeline"
        );
    }
}

/// Run one symbol's ingestion on the blocking pool under a timeout.
async fn ingest_symbol_with_timeout(
    entry: SymbolEntry,
    engine: Arc<WeightedAverageEngine>,
    budget: usize,
    policy: ParsePolicy,
    timeout: Duration,
) -> SymbolOutcome {
    let symbol_id = entry.symbol_id;
    let symbol_name = entry.symbol_name.clone();

    let pipeline = IngestionPipeline {
        engine,
        tick_budget: budget,
        parse_policy: policy,
        symbol_timeout: timeout,
    };

    let work = tokio::task::spawn_blocking(move || pipeline.ingest_symbol(&entry));

    match tokio::time::timeout(timeout, work).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => SymbolOutcome {
            symbol_id,
            symbol_name,
            result: Err(SymbolFailure::Resource(join_error.to_string())),
        },
        Err(_elapsed) => SymbolOutcome {
            symbol_id,
            symbol_name,
            result: Err(SymbolFailure::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        },
    }
}
