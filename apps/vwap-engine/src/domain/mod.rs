//! Domain layer - Core value types with no I/O dependencies.

pub mod symbol;
pub mod tick;
pub mod weighted_average;

pub use symbol::{SymbolEntry, SymbolId};
pub use tick::{TickRecord, TickType};
pub use weighted_average::{SymbolFailure, SymbolOutcome, WeightedAverageResult};
