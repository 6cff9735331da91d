//! Symbol identifier and catalog entry value objects.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Dense identifier for a symbol, assigned by the catalog in scan order.
///
/// Id 0 is reserved as the null sentinel and never backs a file; real ids
/// start at 1 and are stable for the lifetime of one run, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// The reserved null identifier (no symbol).
    pub const NULL: Self = Self(0);

    /// Create a symbol id from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw identifier value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Check whether this is the reserved null sentinel.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Zero-based position of this symbol in catalog-ordered collections.
    ///
    /// Valid only for non-null ids: id `i` maps to slot `i - 1`.
    #[must_use]
    pub const fn slot(&self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog entry: a symbol and the file backing it.
///
/// `symbol_id`, `symbol_name` and `source_path` are 1:1:1 within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// Dense identifier assigned at catalog build time.
    pub symbol_id: SymbolId,
    /// Symbol name, derived from the file name minus its extension.
    pub symbol_name: String,
    /// Path of the tick file backing this symbol.
    pub source_path: PathBuf,
}
