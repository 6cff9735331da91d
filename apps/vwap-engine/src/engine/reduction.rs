//! Pluggable reduction backends for the weighted summation.
//!
//! The engine's final summation is the designated offload point: any
//! backend that computes an associative floating-point sum satisfies the
//! contract. Accumulation order is backend-specific, so two backends agree
//! only within floating-point tolerance, never bit-for-bit.

use std::sync::Arc;

use rayon::prelude::*;

/// Associative sum over a sequence of floating-point values.
///
/// Implementations may be sequential, thread-parallel, or device-offloaded;
/// the engine only requires the capability for the duration of one
/// `compute()` call.
pub trait ReductionBackend: Send + Sync {
    /// Sum the values.
    fn sum(&self, values: &[f64]) -> f64;

    /// Get the name of this backend, for logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Sequential Backend
// =============================================================================

/// Straight left-to-right fold on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialReduction;

impl ReductionBackend for SequentialReduction {
    fn sum(&self, values: &[f64]) -> f64 {
        values.iter().sum()
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

// =============================================================================
// Rayon Backend
// =============================================================================

/// Work-stealing parallel reduction on the rayon thread pool.
///
/// Inputs below `min_parallel_len` fall back to a sequential fold; the
/// fork-join overhead dominates on small batches.
#[derive(Debug, Clone, Copy)]
pub struct RayonReduction {
    /// Minimum input length before the parallel path engages.
    pub min_parallel_len: usize,
}

impl Default for RayonReduction {
    fn default() -> Self {
        Self {
            min_parallel_len: 4096,
        }
    }
}

impl ReductionBackend for RayonReduction {
    fn sum(&self, values: &[f64]) -> f64 {
        if values.len() < self.min_parallel_len {
            values.iter().sum()
        } else {
            values.par_iter().sum()
        }
    }

    fn name(&self) -> &'static str {
        "rayon"
    }
}

// =============================================================================
// Backend Selection
// =============================================================================

/// Reduction backend selector, parsed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Sequential fold on the calling thread.
    #[default]
    Sequential,
    /// Parallel reduction on the rayon thread pool.
    Parallel,
}

impl BackendKind {
    /// Parse a backend kind from string, case-insensitive. Unrecognized
    /// values fall back to `Sequential`.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "parallel" | "rayon" => Self::Parallel,
            _ => Self::Sequential,
        }
    }

    /// Instantiate the selected backend.
    #[must_use]
    pub fn create(self) -> Arc<dyn ReductionBackend> {
        match self {
            Self::Sequential => Arc::new(SequentialReduction),
            Self::Parallel => Arc::new(RayonReduction::default()),
        }
    }
}
