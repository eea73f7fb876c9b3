//! Sous Patch Engine
//!
//! Validation and atomic application of patch sets against versioned recipes.
//!
//! # Core Concepts
//!
//! - [`validate`]: Read-only check of a whole batch, collecting every violation
//! - [`apply`]: Validate-then-apply, producing a new recipe at `version + 1`
//! - [`PatchApplier`]: Applier with a pluggable [`sous_recipe::IdSource`] and removal policy
//! - [`apply_patch`]: The single-patch primitive the review ledger builds on
//!
//! # Example
//!
//! ```rust
//! use sous_patch::{apply, validate};
//! use sous_recipe::{Patch, PatchSet, Recipe};
//!
//! let recipe = Recipe::new("Pancakes");
//! let proposal = PatchSet::new(&recipe, vec![Patch::add_note("Use buttermilk")]);
//!
//! assert!(validate(&proposal, &recipe).is_valid());
//! let next = apply(&proposal, &recipe).unwrap();
//! assert_eq!(next.version, recipe.version + 1);
//! assert_eq!(next.notes, vec!["Use buttermilk".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod applier;
mod validator;

pub use applier::{
    apply, apply_patch, apply_with, Applied, ApplyError, PatchApplier, PatchEffect, RemovalMode,
};
pub use validator::{validate, Validation, ValidationError, ValidationErrorCode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
