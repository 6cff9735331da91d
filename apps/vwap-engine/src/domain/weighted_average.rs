//! Per-symbol weighted-average results and failure markers.

use serde::{Deserialize, Serialize};

use super::symbol::SymbolId;

/// Size-weighted average price over one symbol's bounded tick batch.
///
/// Produced once per symbol per pipeline run, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedAverageResult {
    /// Symbol the batch belonged to.
    pub symbol_id: SymbolId,
    /// `sum(price_i * size_i) / sum(size_i)` over the batch.
    pub weighted_average_price: f64,
    /// `sum(size_i)` over the batch; always positive.
    pub total_weight: u64,
}

/// Why one symbol's result slot holds no average.
///
/// Per-symbol failures are isolated: a failed symbol keeps its catalog-order
/// slot with one of these markers while the remaining symbols still report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SymbolFailure {
    /// A tick line could not be parsed under the strict policy.
    #[error("parse failure: {0}")]
    Parse(String),

    /// The batch had zero total weight (no ticks, or all zero-size).
    #[error("empty batch: no weighted ticks")]
    EmptyBatch,

    /// The tick file could not be opened or read.
    #[error("resource failure: {0}")]
    Resource(String),

    /// The symbol's ingestion task exceeded the per-symbol timeout.
    #[error("timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured per-symbol budget that was exceeded.
        timeout_ms: u64,
    },
}

/// One catalog-ordered output slot: a computed average or a failure marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolOutcome {
    /// Symbol the slot belongs to.
    pub symbol_id: SymbolId,
    /// Symbol name, for reporting.
    pub symbol_name: String,
    /// Computed average, or why it is missing.
    pub result: Result<WeightedAverageResult, SymbolFailure>,
}

impl SymbolOutcome {
    /// Check whether this slot holds a computed average.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
