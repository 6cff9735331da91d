//! Tick record and event type value objects.
//!
//! A tick is one timestamped trade/quote event for a symbol, parsed from a
//! comma-separated line of a per-symbol input file:
//!
//! ```text
//! 2024-01-02 09:30:00.500,101.25,100,NASDAQ,TRADE
//! ```

use serde::{Deserialize, Serialize};

use super::symbol::SymbolId;

/// Event type for a tick, mapped from a closed set of string tokens.
///
/// Unknown tokens are rejected at parse time; the vocabulary is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TickType {
    /// An executed trade.
    Trade,
    /// A consolidated quote update.
    Quote,
    /// A bid-side quote update.
    Bid,
    /// An ask-side quote update.
    Ask,
}

impl TickType {
    /// Map an event-type token to its variant.
    ///
    /// Returns `None` for tokens outside the fixed vocabulary.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TRADE" => Some(Self::Trade),
            "QUOTE" => Some(Self::Quote),
            "BID" => Some(Self::Bid),
            "ASK" => Some(Self::Ask),
            _ => None,
        }
    }

    /// Get the wire token for this event type.
    #[must_use]
    pub const fn as_token(&self) -> &'static str {
        match self {
            Self::Trade => "TRADE",
            Self::Quote => "QUOTE",
            Self::Bid => "BID",
            Self::Ask => "ASK",
        }
    }
}

impl std::fmt::Display for TickType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

/// One parsed tick line, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Event timestamp with millisecond resolution (Unix epoch millis,
    /// local-time calendar interpretation).
    pub epoch_millis: i64,
    /// Trade/quote price, non-negative.
    pub price: f64,
    /// Shares or contracts; zero-size ticks carry no weight.
    pub size: u64,
    /// Exchange code, passed through verbatim from the input line.
    pub exchange: String,
    /// Event type.
    pub tick_type: TickType,
    /// Symbol this tick belongs to, stamped by the reader that produced it.
    pub symbol_id: SymbolId,
}
