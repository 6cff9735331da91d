//! Weighted-average engine.
//!
//! Consumes a bounded run of ticks for one symbol and computes the
//! size-weighted average price, delegating the final summation to a
//! pluggable [`ReductionBackend`].

pub mod reduction;

use std::sync::Arc;

use crate::domain::{SymbolId, TickRecord, WeightedAverageResult};

pub use reduction::{BackendKind, RayonReduction, ReductionBackend, SequentialReduction};

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur while computing a weighted average.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The batch had zero total weight: no ticks, or all ticks zero-size.
    ///
    /// Surfaced explicitly rather than dividing by zero into NaN/Inf.
    #[error("empty batch for symbol {symbol_id}: total weight is zero")]
    EmptyBatch {
        /// Symbol whose batch carried no weight.
        symbol_id: SymbolId,
    },
}

// =============================================================================
// Weighted Average Engine
// =============================================================================

/// Computes size-weighted average prices over tick batches.
pub struct WeightedAverageEngine {
    backend: Arc<dyn ReductionBackend>,
}

impl WeightedAverageEngine {
    /// Create an engine over the given reduction backend.
    #[must_use]
    pub fn new(backend: Arc<dyn ReductionBackend>) -> Self {
        Self { backend }
    }

    /// Name of the reduction backend in use, for logging.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Compute the weighted average over one symbol's batch.
    ///
    /// `total_weight = sum(size_i)` and
    /// `weighted_average_price = sum(price_i * size_i) / total_weight`.
    /// The weighted summation goes through the reduction backend, so exact
    /// accumulation order is backend-specific.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyBatch`] when the total weight is zero.
    pub fn compute(
        &self,
        symbol_id: SymbolId,
        batch: &[TickRecord],
    ) -> Result<WeightedAverageResult, EngineError> {
        let total_weight: u64 = batch.iter().map(|t| t.size).sum();
        if total_weight == 0 {
            return Err(EngineError::EmptyBatch { symbol_id });
        }

        let weighted: Vec<f64> = batch.iter().map(|t| t.price * t.size as f64).collect();
        let weighted_sum = self.backend.sum(&weighted);

        Ok(WeightedAverageResult {
            symbol_id,
            weighted_average_price: weighted_sum / total_weight as f64,
            total_weight,
        })
    }
}

impl std::fmt::Debug for WeightedAverageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedAverageEngine")
            .field("backend", &self.backend.name())
            .finish()
    }
}
