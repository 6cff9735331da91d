//! Textual reporting over the ordered outcome sequence.

use crate::domain::SymbolOutcome;

/// Aggregate run status derived from the outcome slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every symbol produced a weighted average.
    Success,
    /// At least one symbol slot holds a failure marker.
    PartialFailure {
        /// Number of failed symbol slots.
        failed: usize,
    },
}

/// Derive the run status from the outcomes.
#[must_use]
pub fn run_status(outcomes: &[SymbolOutcome]) -> RunStatus {
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed == 0 {
        RunStatus::Success
    } else {
        RunStatus::PartialFailure { failed }
    }
}

/// Render the outcomes as one report line per symbol, in catalog order.
///
/// Successful symbols render `SYMBOL<tab>price`; failed symbols keep their
/// position and render the failure reason instead of omitting the line, so
/// the report stays aligned with the catalog.
#[must_use]
pub fn render(outcomes: &[SymbolOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        match &outcome.result {
            Ok(avg) => {
                out.push_str(&format!(
                    "{}\t{:.4}\n",
                    outcome.symbol_name, avg.weighted_average_price
                ));
            }
            Err(failure) => {
                out.push_str(&format!("{}\t<{failure}>\n", outcome.symbol_name));
            }
        }
    }
    out
}
