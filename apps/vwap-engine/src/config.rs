//! Pipeline configuration, loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TICK_DATA_DIR`: directory of per-symbol `<SYMBOL>.txt` tick files
//!
//! ## Optional
//! - `TICK_BUDGET`: max leading ticks per symbol (default: 2000)
//! - `PARSE_POLICY`: `strict` | `skip_and_warn` (default: strict)
//! - `SYMBOL_TIMEOUT_MS`: per-symbol timeout, concurrent path (default: 30000)
//! - `REDUCTION_BACKEND`: `sequential` | `parallel` (default: sequential)
//! - `CONCURRENT`: run symbols as concurrent tasks (default: true)

use std::path::PathBuf;
use std::time::Duration;

use crate::engine::BackendKind;
use crate::pipeline::{DEFAULT_SYMBOL_TIMEOUT, DEFAULT_TICK_BUDGET};
use crate::reader::ParsePolicy;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The tick data directory was not configured.
    #[error("TICK_DATA_DIR environment variable is required")]
    MissingDataDir,
}

/// Parsed pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of per-symbol tick files.
    pub data_dir: PathBuf,
    /// Max leading ticks considered per symbol.
    pub tick_budget: usize,
    /// Malformed-line policy.
    pub parse_policy: ParsePolicy,
    /// Per-symbol timeout on the concurrent path.
    pub symbol_timeout: Duration,
    /// Reduction backend for the weighted summation.
    pub backend: BackendKind,
    /// Whether to run symbols as concurrent tasks.
    pub concurrent: bool,
}

impl PipelineConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDataDir`] if `TICK_DATA_DIR` is unset
    /// or empty. Optional variables fall back to their defaults when unset
    /// or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::from_env`].
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = get("TICK_DATA_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingDataDir)?;

        let tick_budget = get("TICK_BUDGET")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TICK_BUDGET);

        let parse_policy = get("PARSE_POLICY")
            .map(|v| ParsePolicy::from_str_case_insensitive(&v))
            .unwrap_or_default();

        let symbol_timeout = get("SYMBOL_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .map_or(DEFAULT_SYMBOL_TIMEOUT, Duration::from_millis);

        let backend = get("REDUCTION_BACKEND")
            .map(|v| BackendKind::from_str_case_insensitive(&v))
            .unwrap_or_default();

        let concurrent = get("CONCURRENT")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            data_dir,
            tick_budget,
            parse_policy,
            symbol_timeout,
            backend,
            concurrent,
        })
    }
}
