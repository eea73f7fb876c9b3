//! Error types for the review ledger

use sous_patch::{ApplyError, ValidationError};
use sous_recipe::RecipeError;

/// Errors from ledger operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    /// The proposal failed validation or application
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// A direct edit targeted something that is not there
    #[error(transparent)]
    Recipe(#[from] RecipeError),
}

impl ReviewError {
    /// Validation violations, if this came from a failed proposal
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Apply(e) => e.errors(),
            Self::Recipe(_) => &[],
        }
    }
}
