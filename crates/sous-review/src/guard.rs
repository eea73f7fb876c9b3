//! Ingredient history guard
//!
//! An ingredient whose text already shows up in a completed step has been
//! used; removing it would rewrite history. The ledger refuses such removals
//! and appends a note telling the cook instead.

use sous_recipe::{Ingredient, Patch, Recipe, Step};

/// Reason recorded when the guard refuses a removal
pub const USED_INGREDIENT_REASON: &str = "Cannot remove ingredient already used in completed step";

/// First done step whose text mentions the ingredient (case-insensitive)
#[must_use]
pub fn consumed_by<'r>(recipe: &'r Recipe, ingredient: &Ingredient) -> Option<&'r Step> {
    let needle = ingredient.text.to_lowercase();
    if needle.trim().is_empty() {
        return None;
    }
    recipe
        .done_steps()
        .find(|step| step.text.to_lowercase().contains(&needle))
}

/// Ingredient text without its leading quantity or trailing qualifiers
///
/// `"2 cups flour, sifted"` becomes `"cups flour"`.
#[must_use]
pub fn short_name(text: &str) -> &str {
    // leading run of [0-9 whitespace / ½ ¼ ¾ ⅓ ⅔]
    let name = text.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '/' | '½' | '¼' | '¾' | '⅓' | '⅔')
    });
    name.split(',').next().unwrap_or(name).trim()
}

/// Note substituted for a refused removal
#[must_use]
pub fn compensating_note(ingredient: &Ingredient) -> Patch {
    Patch::add_note(format!(
        "{} was already used. If you already added it, proceed; otherwise skip it in future steps.",
        short_name(&ingredient.text)
    ))
}
