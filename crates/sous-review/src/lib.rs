//! Sous Review Ledger
//!
//! Review workflow layered over the strict patch engine for a single editor.
//!
//! # Core Concepts
//!
//! - [`ReviewLedger`]: Owns the current recipe, the pending change set and undo history
//! - [`ChangeSet`]: Per-id record of one application plus its pre-image
//! - [`UndoStack`]: Bounded stack of pre-application snapshots
//! - [`guard`]: Refuses removal of ingredients a completed step already used
//!
//! # Example
//!
//! ```rust
//! use sous_recipe::{Ingredient, Patch, PatchSet, Recipe};
//! use sous_review::ReviewLedger;
//!
//! let recipe = Recipe::new("Salsa").with_ingredients(vec![Ingredient::new("2 tomatoes")]);
//! let id = recipe.ingredients[0].id;
//! let mut ledger = ReviewLedger::new(recipe);
//!
//! let proposal = PatchSet::new(ledger.recipe(), vec![Patch::remove_ingredient(id)]);
//! ledger.propose(&proposal).unwrap();
//! assert!(ledger.recipe().ingredients[0].removed);
//!
//! let rejected = ledger.reject_changes().unwrap();
//! assert_eq!(rejected.patch_set_id(), proposal.id());
//! assert!(!ledger.recipe().ingredients[0].removed);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod change_set;
mod config;
mod error;
pub mod guard;
mod ledger;
mod undo;

pub use change_set::{rejection_fact, ChangeKind, ChangeMark, ChangeSet, RefusedPatch};
pub use config::LedgerConfig;
pub use error::ReviewError;
pub use ledger::ReviewLedger;
pub use undo::UndoStack;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
