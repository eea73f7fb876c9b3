//! Patch operations and patch sets
//!
//! A [`Patch`] is one structural edit instruction. It never carries a recipe
//! snapshot and is meaningless without a base recipe to apply to. A
//! [`PatchSet`] batches patches against one base version and is consumed
//! exactly once by validate-then-apply.

use crate::id::{IngredientId, PatchSetId, RecipeId, StepId};
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// One edit operation
///
/// The wire form is internally tagged by `op`, e.g.
/// `{"op": "update_step", "step_id": "...", "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    /// Insert an ingredient after `after_id`, or append
    AddIngredient {
        /// Ingredient text
        text: String,
        /// Anchor row
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after_id: Option<IngredientId>,
    },

    /// Rewrite an ingredient's text
    UpdateIngredient {
        /// Target row
        id: IngredientId,
        /// New text
        text: String,
    },

    /// Remove an ingredient
    RemoveIngredient {
        /// Target row
        id: IngredientId,
    },

    /// Insert a `todo` step after `after_step_id`, or append
    AddStep {
        /// Step text
        text: String,
        /// Anchor step
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after_step_id: Option<StepId>,
    },

    /// Rewrite a step's text
    UpdateStep {
        /// Target step
        step_id: StepId,
        /// New text
        text: String,
    },

    /// Remove a step
    RemoveStep {
        /// Target step
        id: StepId,
    },

    /// Append a note
    AddNote {
        /// Note text
        text: String,
    },

    /// Replace the whole document, keeping only its id
    ReplaceRecipe {
        /// New title
        title: String,
        /// Ingredient texts, in order
        ingredients: Vec<String>,
        /// Step texts, in order
        steps: Vec<String>,
    },
}

impl Patch {
    /// Append an ingredient
    #[inline]
    #[must_use]
    pub fn add_ingredient(text: impl Into<String>) -> Self {
        Self::AddIngredient {
            text: text.into(),
            after_id: None,
        }
    }

    /// Insert an ingredient after another
    #[inline]
    #[must_use]
    pub fn add_ingredient_after(text: impl Into<String>, after: IngredientId) -> Self {
        Self::AddIngredient {
            text: text.into(),
            after_id: Some(after),
        }
    }

    /// Rewrite an ingredient
    #[inline]
    #[must_use]
    pub fn update_ingredient(id: IngredientId, text: impl Into<String>) -> Self {
        Self::UpdateIngredient {
            id,
            text: text.into(),
        }
    }

    /// Remove an ingredient
    #[inline]
    #[must_use]
    pub fn remove_ingredient(id: IngredientId) -> Self {
        Self::RemoveIngredient { id }
    }

    /// Append a step
    #[inline]
    #[must_use]
    pub fn add_step(text: impl Into<String>) -> Self {
        Self::AddStep {
            text: text.into(),
            after_step_id: None,
        }
    }

    /// Insert a step after another
    #[inline]
    #[must_use]
    pub fn add_step_after(text: impl Into<String>, after: StepId) -> Self {
        Self::AddStep {
            text: text.into(),
            after_step_id: Some(after),
        }
    }

    /// Rewrite a step
    #[inline]
    #[must_use]
    pub fn update_step(step_id: StepId, text: impl Into<String>) -> Self {
        Self::UpdateStep {
            step_id,
            text: text.into(),
        }
    }

    /// Remove a step
    #[inline]
    #[must_use]
    pub fn remove_step(id: StepId) -> Self {
        Self::RemoveStep { id }
    }

    /// Append a note
    #[inline]
    #[must_use]
    pub fn add_note(text: impl Into<String>) -> Self {
        Self::AddNote { text: text.into() }
    }

    /// Replace the document
    #[must_use]
    pub fn replace_recipe<I, J, S, T>(title: impl Into<String>, ingredients: I, steps: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::ReplaceRecipe {
            title: title.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Wire name of the operation
    #[must_use]
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::AddIngredient { .. } => "add_ingredient",
            Self::UpdateIngredient { .. } => "update_ingredient",
            Self::RemoveIngredient { .. } => "remove_ingredient",
            Self::AddStep { .. } => "add_step",
            Self::UpdateStep { .. } => "update_step",
            Self::RemoveStep { .. } => "remove_step",
            Self::AddNote { .. } => "add_note",
            Self::ReplaceRecipe { .. } => "replace_recipe",
        }
    }

    /// Check if this patch replaces the whole document
    #[inline]
    #[must_use]
    pub fn is_replace(&self) -> bool {
        matches!(self, Self::ReplaceRecipe { .. })
    }

    /// Check if the patch removes something
    #[inline]
    #[must_use]
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::RemoveIngredient { .. } | Self::RemoveStep { .. })
    }
}

/// Review status of a proposal. Metadata only; validation ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchSetStatus {
    /// Awaiting a decision
    #[default]
    Pending,
    /// Applied
    Accepted,
    /// Discarded
    Rejected,
}

/// A batch of patches proposed together against one base version
///
/// # Invariants
/// - the patch list never changes after construction
/// - `base_recipe_version` is the version the proposer saw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSet {
    patch_set_id: PatchSetId,
    base_recipe_id: RecipeId,
    base_recipe_version: u64,
    #[serde(default)]
    status: PatchSetStatus,
    patches: Vec<Patch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_recipe_snapshot: Option<Box<Recipe>>,
}

impl PatchSet {
    /// Create a pending patch set against the recipe's current version
    #[must_use]
    pub fn new(base: &Recipe, patches: Vec<Patch>) -> Self {
        Self {
            patch_set_id: PatchSetId::new(),
            base_recipe_id: base.id(),
            base_recipe_version: base.version,
            status: PatchSetStatus::Pending,
            patches,
            summary: None,
            base_recipe_snapshot: None,
        }
    }

    /// Start a builder
    #[inline]
    #[must_use]
    pub fn builder() -> PatchSetBuilder {
        PatchSetBuilder::new()
    }

    /// Proposal id
    #[inline]
    #[must_use]
    pub fn id(&self) -> PatchSetId {
        self.patch_set_id
    }

    /// Targeted document
    #[inline]
    #[must_use]
    pub fn base_recipe_id(&self) -> RecipeId {
        self.base_recipe_id
    }

    /// Version the proposal was made against
    #[inline]
    #[must_use]
    pub fn base_recipe_version(&self) -> u64 {
        self.base_recipe_version
    }

    /// Review status
    #[inline]
    #[must_use]
    pub fn status(&self) -> PatchSetStatus {
        self.status
    }

    /// Same proposal with a new review status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: PatchSetStatus) -> Self {
        self.status = status;
        self
    }

    /// Patches in proposal order
    #[inline]
    #[must_use]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Number of patches
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Whether the batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Human-readable summary from the proposer
    #[inline]
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Recipe as the proposer saw it, if captured
    #[inline]
    #[must_use]
    pub fn base_recipe_snapshot(&self) -> Option<&Recipe> {
        self.base_recipe_snapshot.as_deref()
    }

    /// First `replace_recipe` patch, which overrides everything else in the batch
    #[must_use]
    pub fn replacement(&self) -> Option<&Patch> {
        self.patches.iter().find(|p| p.is_replace())
    }
}

/// Errors building a patch set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchSetError {
    /// No base recipe id given
    #[error("missing base recipe id")]
    MissingBaseRecipe,

    /// No base version given
    #[error("missing base recipe version")]
    MissingBaseVersion,
}

/// Builder for [`PatchSet`]
#[derive(Debug, Default)]
pub struct PatchSetBuilder {
    patch_set_id: Option<PatchSetId>,
    base_recipe_id: Option<RecipeId>,
    base_recipe_version: Option<u64>,
    patches: Vec<Patch>,
    summary: Option<String>,
    snapshot: Option<Recipe>,
}

impl PatchSetBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the proposal id (otherwise random)
    #[inline]
    #[must_use]
    pub fn id(mut self, id: PatchSetId) -> Self {
        self.patch_set_id = Some(id);
        self
    }

    /// Set base recipe id
    #[inline]
    #[must_use]
    pub fn base_recipe_id(mut self, id: RecipeId) -> Self {
        self.base_recipe_id = Some(id);
        self
    }

    /// Set base version
    #[inline]
    #[must_use]
    pub fn base_version(mut self, version: u64) -> Self {
        self.base_recipe_version = Some(version);
        self
    }

    /// Take base id and version from a recipe
    #[inline]
    #[must_use]
    pub fn for_recipe(self, recipe: &Recipe) -> Self {
        self.base_recipe_id(recipe.id()).base_version(recipe.version)
    }

    /// Append one patch
    #[inline]
    #[must_use]
    pub fn patch(mut self, patch: Patch) -> Self {
        self.patches.push(patch);
        self
    }

    /// Append several patches
    #[inline]
    #[must_use]
    pub fn patches(mut self, patches: impl IntoIterator<Item = Patch>) -> Self {
        self.patches.extend(patches);
        self
    }

    /// Set summary
    #[inline]
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Capture the base recipe for audit
    #[inline]
    #[must_use]
    pub fn snapshot(mut self, recipe: &Recipe) -> Self {
        self.snapshot = Some(recipe.clone());
        self
    }

    /// Build the patch set
    ///
    /// # Errors
    /// Returns error if the base recipe id or version is missing
    pub fn build(self) -> Result<PatchSet, PatchSetError> {
        let base_recipe_id = self.base_recipe_id.ok_or(PatchSetError::MissingBaseRecipe)?;
        let base_recipe_version = self
            .base_recipe_version
            .ok_or(PatchSetError::MissingBaseVersion)?;

        Ok(PatchSet {
            patch_set_id: self.patch_set_id.unwrap_or_default(),
            base_recipe_id,
            base_recipe_version,
            status: PatchSetStatus::Pending,
            patches: self.patches,
            summary: self.summary,
            base_recipe_snapshot: self.snapshot.map(Box::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn patch_wire_shape_is_op_tagged() {
        let id = StepId::from_u128(3);
        let value = serde_json::to_value(Patch::update_step(id, "Stir")).unwrap();

        assert_eq!(
            value,
            json!({"op": "update_step", "step_id": id.to_string(), "text": "Stir"})
        );
    }

    #[test]
    fn optional_anchor_may_be_absent_or_null() {
        let absent: Patch = serde_json::from_value(json!({"op": "add_step", "text": "Rest"})).unwrap();
        let null: Patch =
            serde_json::from_value(json!({"op": "add_step", "text": "Rest", "after_step_id": null}))
                .unwrap();

        assert_eq!(absent, Patch::add_step("Rest"));
        assert_eq!(null, Patch::add_step("Rest"));
    }

    #[test]
    fn out_of_shape_patch_is_rejected() {
        let missing_field = serde_json::from_value::<Patch>(json!({"op": "update_step", "text": "x"}));
        let unknown_op = serde_json::from_value::<Patch>(json!({"op": "delete_everything"}));

        assert!(missing_field.is_err());
        assert!(unknown_op.is_err());
    }

    #[test]
    fn op_names_match_wire_tags() {
        let patches = [
            Patch::add_ingredient("x"),
            Patch::remove_step(StepId::from_u128(1)),
            Patch::replace_recipe("T", vec!["a"], vec!["b"]),
        ];
        for patch in patches {
            let value = serde_json::to_value(&patch).unwrap();
            assert_eq!(value["op"], patch.op_name());
        }
    }

    #[test]
    fn replace_accepts_lists_of_different_shapes() {
        let steps = vec![String::from("Stretch"), String::from("Bake")];
        let patch = Patch::replace_recipe("Focaccia", ["flour", "oil", "salt"], steps);

        assert_eq!(
            patch,
            Patch::ReplaceRecipe {
                title: "Focaccia".to_string(),
                ingredients: vec!["flour".into(), "oil".into(), "salt".into()],
                steps: vec!["Stretch".into(), "Bake".into()],
            }
        );
    }

    #[test]
    fn new_patch_set_tracks_base() {
        let recipe = Recipe::new("Soup").with_version(4);
        let set = PatchSet::new(&recipe, vec![Patch::add_note("salt")]);

        assert_eq!(set.base_recipe_id(), recipe.id());
        assert_eq!(set.base_recipe_version(), 4);
        assert_eq!(set.status(), PatchSetStatus::Pending);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn replacement_finds_first_replace() {
        let recipe = Recipe::new("Soup");
        let first = Patch::replace_recipe("A", Vec::<String>::new(), Vec::<String>::new());
        let second = Patch::replace_recipe("B", Vec::<String>::new(), Vec::<String>::new());
        let set = PatchSet::new(
            &recipe,
            vec![Patch::add_note("n"), first.clone(), second],
        );

        assert_eq!(set.replacement(), Some(&first));
    }

    #[test]
    fn builder_success() {
        let recipe = Recipe::new("Soup");
        let id = PatchSetId::from_u128(9);
        let set = PatchSet::builder()
            .id(id)
            .for_recipe(&recipe)
            .patch(Patch::add_note("a"))
            .patches([Patch::add_note("b")])
            .summary("two notes")
            .snapshot(&recipe)
            .build()
            .unwrap();

        assert_eq!(set.id(), id);
        assert_eq!(set.len(), 2);
        assert_eq!(set.summary(), Some("two notes"));
        assert_eq!(set.base_recipe_snapshot(), Some(&recipe));
    }

    #[test]
    fn builder_missing_base() {
        let result = PatchSet::builder().base_version(1).build();
        assert_eq!(result, Err(PatchSetError::MissingBaseRecipe));

        let result = PatchSet::builder().base_recipe_id(RecipeId::new()).build();
        assert_eq!(result, Err(PatchSetError::MissingBaseVersion));
    }

    #[test]
    fn patch_set_round_trips_through_json() {
        let recipe = Recipe::new("Soup");
        let set = PatchSet::new(&recipe, vec![Patch::add_note("a")]).with_status(PatchSetStatus::Rejected);
        let json = serde_json::to_string(&set).unwrap();

        assert!(json.contains("\"baseRecipeVersion\":1"));
        let back: PatchSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
