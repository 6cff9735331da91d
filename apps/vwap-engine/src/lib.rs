#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines
    )
)]

//! VWAP Engine - Tick Ingestion & Weighted-Average Pipeline
//!
//! Ingests per-symbol tick files (timestamp, price, size, exchange, event
//! type) from a directory and, for each symbol, computes a size-weighted
//! average price over a bounded prefix of its tick stream. The final
//! summation is delegated to a pluggable reduction backend so it can run
//! as a sequential fold or a parallel reduction without changing the
//! numeric contract.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: value types with no I/O
//!   - `tick`: tick records and the closed event-type vocabulary
//!   - `symbol`: dense symbol ids (0 reserved as sentinel) and catalog entries
//!   - `weighted_average`: per-symbol results and failure markers
//!
//! - **Core**: the ingestion-and-aggregation pipeline
//!   - `catalog`: directory scan and stable id assignment
//!   - `reader`: streaming line parsing, one file handle per symbol
//!   - `engine`: weighted reduction over a bounded batch
//!   - `pipeline`: orchestration, sequential and concurrent paths
//!
//! - **Edges**: configuration and reporting
//!   - `config`: environment-variable configuration
//!   - `report`: ordered textual report
//!
//! # Data Flow
//!
//! ```text
//! directory ──► SymbolCatalog ──► TickFileReader (per symbol)
//!                                       │ bounded batch
//!                                       ▼
//!                              WeightedAverageEngine ──► ReductionBackend
//!                                       │
//!                                       ▼
//!                       ordered Vec<SymbolOutcome> ──► report
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core value types with no I/O dependencies.
pub mod domain;

/// Symbol catalog built from a directory scan.
pub mod catalog;

/// Line-oriented tick file reader.
pub mod reader;

/// Weighted-average engine and reduction backends.
pub mod engine;

/// Pipeline orchestration.
pub mod pipeline;

/// Environment-variable configuration.
pub mod config;

/// Textual reporting.
pub mod report;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{CatalogError, SymbolCatalog};
pub use config::{ConfigError, PipelineConfig};
pub use domain::{
    SymbolEntry, SymbolFailure, SymbolId, SymbolOutcome, TickRecord, TickType,
    WeightedAverageResult,
};
pub use engine::{
    BackendKind, EngineError, RayonReduction, ReductionBackend, SequentialReduction,
    WeightedAverageEngine,
};
pub use pipeline::{DEFAULT_TICK_BUDGET, IngestionPipeline, PipelineError};
pub use reader::{ParsePolicy, ReaderError, TickFileReader};
pub use report::{RunStatus, render, run_status};
