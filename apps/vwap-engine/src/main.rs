//! VWAP Engine Binary
//!
//! Scans the configured tick directory and prints one size-weighted
//! average price per symbol, in catalog order.
//!
//! # Usage
//!
//! ```bash
//! TICK_DATA_DIR=./ticks cargo run -p vwap-engine
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `TICK_DATA_DIR`: directory of per-symbol `<SYMBOL>.txt` tick files
//!
//! ## Optional
//! - `TICK_BUDGET`: max leading ticks per symbol (default: 2000)
//! - `PARSE_POLICY`: strict | skip_and_warn (default: strict)
//! - `SYMBOL_TIMEOUT_MS`: per-symbol timeout (default: 30000)
//! - `REDUCTION_BACKEND`: sequential | parallel (default: sequential)
//! - `CONCURRENT`: per-symbol tasks (default: true)
//! - `RUST_LOG`: log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use vwap_engine::report::{RunStatus, render, run_status};
use vwap_engine::{IngestionPipeline, PipelineConfig, SymbolOutcome, WeightedAverageEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    tracing::info!("Starting VWAP engine");

    let config = PipelineConfig::from_env().context("configuration")?;
    log_config(&config);

    let engine = Arc::new(WeightedAverageEngine::new(config.backend.create()));
    let pipeline = IngestionPipeline::new(engine)
        .with_tick_budget(config.tick_budget)
        .with_parse_policy(config.parse_policy)
        .with_symbol_timeout(config.symbol_timeout);

    let outcomes = if config.concurrent {
        pipeline
            .run_concurrent(&config.data_dir)
            .await
            .context("pipeline run")?
    } else {
        pipeline.run(&config.data_dir).context("pipeline run")?
    };

    print!("{}", render(&outcomes));
    report_status(&outcomes);

    Ok(())
}

/// Load a .env file when present; absence is not an error.
fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Initialize the tracing subscriber with environment filter.
///
/// Uses a static directive string that is a compile-time constant
/// guaranteed to parse.
#[allow(clippy::expect_used)]
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "vwap_engine=info"
                    .parse()
                    .expect("static directive 'vwap_engine=info' is valid"),
            ),
        )
        .init();
}

/// Log the parsed configuration.
fn log_config(config: &PipelineConfig) {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        tick_budget = config.tick_budget,
        parse_policy = config.parse_policy.as_str(),
        symbol_timeout_ms = config.symbol_timeout.as_millis() as u64,
        concurrent = config.concurrent,
        "Configuration loaded"
    );
}

/// Log the final success or partial-failure status.
fn report_status(outcomes: &[SymbolOutcome]) {
    match run_status(outcomes) {
        RunStatus::Success => {
            tracing::info!(symbols = outcomes.len(), "Pipeline run succeeded");
        }
        RunStatus::PartialFailure { failed } => {
            tracing::warn!(
                symbols = outcomes.len(),
                failed,
                "Pipeline run completed with per-symbol failures"
            );
        }
    }
}
