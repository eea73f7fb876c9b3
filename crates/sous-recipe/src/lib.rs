//! Sous Recipe Model
//!
//! Versioned recipe documents and the closed set of structural edits that
//! can be proposed against them.
//!
//! # Core Concepts
//!
//! - [`Recipe`]: The versioned document (ingredients, steps, notes)
//! - [`Patch`]: One edit operation, a closed tagged union
//! - [`PatchSet`]: A batch of patches tied to a base recipe version
//! - [`IdSource`]: Where fresh row ids come from during application
//!
//! # Example
//!
//! ```rust
//! use sous_recipe::{Ingredient, Patch, PatchSet, Recipe};
//!
//! let recipe = Recipe::new("Flatbread").with_ingredients(vec![Ingredient::new("2 cups flour")]);
//! let proposal = PatchSet::new(&recipe, vec![Patch::add_note("Rest the dough 10 min")]);
//!
//! assert_eq!(proposal.base_recipe_version(), recipe.version);
//! ```

#![warn(unreachable_pub)]

mod id;
mod patch;
mod recipe;

pub use id::{IdSource, IngredientId, PatchSetId, RandomIds, RecipeId, SequentialIds, StepId};
pub use patch::{Patch, PatchSet, PatchSetBuilder, PatchSetError, PatchSetStatus};
pub use recipe::{Ingredient, Recipe, RecipeError, Step, StepStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
