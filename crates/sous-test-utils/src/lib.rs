//! Testing utilities for the Sous workspace
//!
//! Shared seed recipes with stable ids, patch-set helpers, and proptest
//! strategies.

#![allow(missing_docs)]

use proptest::prelude::*;
use sous_recipe::{
    Ingredient, IngredientId, Patch, PatchSet, PatchSetId, Recipe, RecipeId, Step, StepId,
    StepStatus,
};

pub const RECIPE_ID: RecipeId = RecipeId::from_u128(0x0000_0000_0000_0000_FFFF_0000_0000_0001);

pub const FLOUR_ID: IngredientId = IngredientId::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
pub const SALT_ID: IngredientId = IngredientId::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);
pub const WATER_ID: IngredientId = IngredientId::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0003);

pub const MIX_STEP_ID: StepId = StepId::from_u128(0x0000_0000_0000_0000_0001_0000_0000_0001);
pub const BAKE_STEP_ID: StepId = StepId::from_u128(0x0000_0000_0000_0000_0001_0000_0000_0002);
pub const DONE_STEP_ID: StepId = StepId::from_u128(0x0000_0000_0000_0000_0001_0000_0000_0003);

pub const PATCH_SET_ID: PatchSetId = PatchSetId::from_u128(0xAAAA_AAAA_AAAA_AAAA_AAAA_AAAA_AAAA_AAAA);

/// Ids that never appear in a seed recipe
pub const UNKNOWN_INGREDIENT_ID: IngredientId = IngredientId::from_u128(0xDEAD_0001);
pub const UNKNOWN_STEP_ID: StepId = StepId::from_u128(0xDEAD_0002);

/// "Simple Bread" at version 1: three ingredients, two todo steps and one done step
#[must_use]
pub fn seed_recipe() -> Recipe {
    Recipe::with_id(RECIPE_ID, "Simple Bread")
        .with_ingredients(vec![
            Ingredient::with_id(FLOUR_ID, "2 cups flour"),
            Ingredient::with_id(SALT_ID, "1 tsp salt"),
            Ingredient::with_id(WATER_ID, "3/4 cup water"),
        ])
        .with_steps(vec![
            Step::with_id(MIX_STEP_ID, "Mix dry ingredients", StepStatus::Todo),
            Step::with_id(BAKE_STEP_ID, "Bake at 375°F for 30 min", StepStatus::Todo),
            Step::with_id(DONE_STEP_ID, "Let cool on rack", StepStatus::Done),
        ])
        .with_notes(vec!["Original family recipe".to_string()])
}

/// Seed recipe where the done step already consumed the salt
#[must_use]
pub fn seed_recipe_with_salt_used() -> Recipe {
    Recipe::with_id(RECIPE_ID, "Simple Bread")
        .with_ingredients(vec![
            Ingredient::with_id(FLOUR_ID, "2 cups flour"),
            Ingredient::with_id(SALT_ID, "1 tsp salt"),
            Ingredient::with_id(WATER_ID, "3/4 cup water"),
        ])
        .with_steps(vec![
            Step::with_id(MIX_STEP_ID, "Whisk 1 TSP SALT into the water", StepStatus::Done),
            Step::with_id(BAKE_STEP_ID, "Bake at 375°F for 30 min", StepStatus::Todo),
        ])
}

/// Patch set with the fixed [`PATCH_SET_ID`] against the recipe's current version
#[must_use]
pub fn patch_set(recipe: &Recipe, patches: Vec<Patch>) -> PatchSet {
    patch_set_at(recipe, recipe.version, patches)
}

/// Patch set with the fixed [`PATCH_SET_ID`] against an explicit version
#[must_use]
pub fn patch_set_at(recipe: &Recipe, version: u64, patches: Vec<Patch>) -> PatchSet {
    match PatchSet::builder()
        .id(PATCH_SET_ID)
        .base_recipe_id(recipe.id())
        .base_version(version)
        .patches(patches)
        .build()
    {
        Ok(set) => set,
        Err(e) => unreachable!("base id and version are always set: {e}"),
    }
}

/// Always valid against [`seed_recipe`]
#[must_use]
pub fn valid_patch_set() -> PatchSet {
    patch_set(&seed_recipe(), vec![Patch::add_note("Knead for 10 minutes")])
}

/// Always invalid against [`seed_recipe`]: rewrites the done step
#[must_use]
pub fn invalid_patch_set() -> PatchSet {
    patch_set(
        &seed_recipe(),
        vec![Patch::update_step(DONE_STEP_ID, "Changed done step")],
    )
}

/// Any non-replacing patch that references the recipe's ids or an unknown id
pub fn arb_patch(recipe: &Recipe) -> BoxedStrategy<Patch> {
    let mut ingredient_ids: Vec<IngredientId> = recipe.ingredients.iter().map(|i| i.id).collect();
    ingredient_ids.push(UNKNOWN_INGREDIENT_ID);
    let mut step_ids: Vec<StepId> = recipe.steps.iter().map(|s| s.id).collect();
    step_ids.push(UNKNOWN_STEP_ID);

    let ingredient = prop::sample::select(ingredient_ids);
    let step = prop::sample::select(step_ids);
    let text = "[a-z]{1,8}";

    prop_oneof![
        (text, prop::option::of(ingredient.clone()))
            .prop_map(|(text, after_id)| Patch::AddIngredient { text, after_id }),
        (ingredient.clone(), text).prop_map(|(id, text)| Patch::update_ingredient(id, text)),
        ingredient.prop_map(Patch::remove_ingredient),
        (text, prop::option::of(step.clone()))
            .prop_map(|(text, after_step_id)| Patch::AddStep { text, after_step_id }),
        (step.clone(), text).prop_map(|(id, text)| Patch::update_step(id, text)),
        step.prop_map(Patch::remove_step),
        text.prop_map(Patch::add_note),
    ]
    .boxed()
}

/// Batches of up to five patches, usually (not always) at the current version
pub fn arb_patch_set(recipe: &Recipe) -> BoxedStrategy<PatchSet> {
    let base = recipe.clone();
    let current = recipe.version;
    (
        prop::collection::vec(arb_patch(recipe), 0..6),
        prop_oneof![3 => Just(current), 1 => 0u64..5],
    )
        .prop_map(move |(patches, version)| patch_set_at(&base, version, patches))
        .boxed()
}
