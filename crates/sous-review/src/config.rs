//! Ledger configuration

use serde::{Deserialize, Serialize};

/// Review ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Most pre-application snapshots kept for undo
    pub undo_capacity: usize,
}

impl LedgerConfig {
    /// Default undo depth
    pub const DEFAULT_UNDO_CAPACITY: usize = 20;

    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With undo capacity
    #[inline]
    #[must_use]
    pub fn with_undo_capacity(mut self, capacity: usize) -> Self {
        self.undo_capacity = capacity;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            undo_capacity: Self::DEFAULT_UNDO_CAPACITY,
        }
    }
}
