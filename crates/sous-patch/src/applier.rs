//! Atomic patch set application
//!
//! [`apply`] re-runs the validator, then applies every patch to a working
//! copy and publishes it only when the whole batch succeeded. The input
//! recipe is never touched, so a failed call leaves the caller exactly where
//! it started.

use crate::validator::{validate, Validation, ValidationError};
use sous_recipe::{
    IdSource, Ingredient, IngredientId, Patch, PatchSet, RandomIds, Recipe, Step, StepId,
    StepStatus,
};

/// Errors from patch application
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The batch did not validate; nothing was applied
    #[error("validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationError>),
}

impl ApplyError {
    /// Violations behind the failure
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::ValidationFailed(errors) => errors,
        }
    }
}

/// How `remove_ingredient` treats the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalMode {
    /// Drop the row outright
    #[default]
    Delete,

    /// Flag the row `removed` and keep it for review
    SoftDelete,
}

/// What a single applied patch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchEffect {
    /// New ingredient row
    IngredientAdded(IngredientId),
    /// Ingredient text rewritten
    IngredientChanged(IngredientId),
    /// Ingredient deleted or flagged
    IngredientRemoved(IngredientId),
    /// New step
    StepAdded(StepId),
    /// Step text rewritten
    StepChanged(StepId),
    /// Step deleted
    StepRemoved(StepId),
    /// Note appended at this index
    NoteAdded(usize),
    /// Whole document replaced
    Replaced,
}

/// Result of a successful application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The new recipe, version already incremented
    pub recipe: Recipe,

    /// Per-patch effects, in application order
    pub effects: Vec<PatchEffect>,
}

impl Applied {
    /// Check if the batch was a whole-document replace
    #[inline]
    #[must_use]
    pub fn replaced(&self) -> bool {
        self.effects.contains(&PatchEffect::Replaced)
    }
}

/// Validate-then-apply engine
///
/// Holds the id source used for new rows and the removal policy.
pub struct PatchApplier<'a> {
    ids: &'a mut dyn IdSource,
    removal: RemovalMode,
}

impl std::fmt::Debug for PatchApplier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchApplier")
            .field("removal", &self.removal)
            .finish_non_exhaustive()
    }
}

impl<'a> PatchApplier<'a> {
    /// Create an applier that hard-deletes removed rows
    #[inline]
    #[must_use]
    pub fn new(ids: &'a mut dyn IdSource) -> Self {
        Self {
            ids,
            removal: RemovalMode::Delete,
        }
    }

    /// Set removal policy
    #[inline]
    #[must_use]
    pub fn with_removal(mut self, removal: RemovalMode) -> Self {
        self.removal = removal;
        self
    }

    /// Validate and apply a patch set
    ///
    /// A `replace_recipe` patch, when present, is the only patch applied;
    /// the rest of the batch is ignored. The version moves on by exactly one
    /// however many patches the batch holds.
    ///
    /// # Errors
    /// Returns [`ApplyError::ValidationFailed`] with every violation when the
    /// batch is invalid, or when the working copy disagrees with the
    /// validator. The input recipe is unchanged in both cases.
    pub fn apply(&mut self, patch_set: &PatchSet, recipe: &Recipe) -> Result<Applied, ApplyError> {
        if let Validation::Invalid(errors) = validate(patch_set, recipe) {
            tracing::warn!(
                patch_set_id = %patch_set.id(),
                errors = errors.len(),
                "refusing to apply invalid patch set"
            );
            return Err(ApplyError::ValidationFailed(errors));
        }

        let mut working = recipe.clone();
        let batch: &[Patch] = match patch_set.replacement() {
            Some(replace) => std::slice::from_ref(replace),
            None => patch_set.patches(),
        };

        let mut effects = Vec::with_capacity(batch.len());
        for patch in batch {
            let effect = apply_patch(&mut working, patch, &mut *self.ids, self.removal)
                .map_err(|e| ApplyError::ValidationFailed(vec![e]))?;
            effects.push(effect);
        }
        working.version = recipe.version + 1;

        tracing::info!(
            patch_set_id = %patch_set.id(),
            version = working.version,
            applied = effects.len(),
            "applied patch set"
        );
        Ok(Applied {
            recipe: working,
            effects,
        })
    }
}

/// Validate and apply with random ids and hard deletes
///
/// # Errors
/// See [`PatchApplier::apply`]
pub fn apply(patch_set: &PatchSet, recipe: &Recipe) -> Result<Recipe, ApplyError> {
    apply_with(patch_set, recipe, &mut RandomIds)
}

/// Validate and apply, minting ids from `ids`
///
/// # Errors
/// See [`PatchApplier::apply`]
pub fn apply_with(
    patch_set: &PatchSet,
    recipe: &Recipe,
    ids: &mut dyn IdSource,
) -> Result<Recipe, ApplyError> {
    PatchApplier::new(ids)
        .apply(patch_set, recipe)
        .map(|applied| applied.recipe)
}

/// Apply one patch in place
///
/// This is the primitive under [`PatchApplier`]; it does not validate the
/// batch and does not touch the version. Anchors of `add_*` patches are
/// resolved against the current (already mutated) sequence; a missing
/// anchor appends.
///
/// # Errors
/// Fails without mutating `working` when the patch targets a row that is
/// not there, or tries to change a done step.
pub fn apply_patch(
    working: &mut Recipe,
    patch: &Patch,
    ids: &mut dyn IdSource,
    removal: RemovalMode,
) -> Result<PatchEffect, ValidationError> {
    match patch {
        Patch::AddIngredient { text, after_id } => {
            let ingredient = Ingredient::with_id(ids.next_ingredient_id(), text.clone());
            let id = ingredient.id;
            match (*after_id).and_then(|anchor| working.ingredient_index(anchor)) {
                Some(index) => working.ingredients.insert(index + 1, ingredient),
                None => working.ingredients.push(ingredient),
            }
            Ok(PatchEffect::IngredientAdded(id))
        }

        Patch::UpdateIngredient { id, text } => {
            let row = working
                .ingredients
                .iter_mut()
                .find(|i| i.id == *id && !i.removed)
                .ok_or_else(|| missing("update_ingredient", id))?;
            row.text.clone_from(text);
            Ok(PatchEffect::IngredientChanged(*id))
        }

        Patch::RemoveIngredient { id } => {
            let index = working
                .ingredients
                .iter()
                .position(|i| i.id == *id && !i.removed)
                .ok_or_else(|| missing("remove_ingredient", id))?;
            match removal {
                RemovalMode::Delete => {
                    working.ingredients.remove(index);
                }
                RemovalMode::SoftDelete => working.ingredients[index].removed = true,
            }
            Ok(PatchEffect::IngredientRemoved(*id))
        }

        Patch::AddStep {
            text,
            after_step_id,
        } => {
            let step = Step::with_id(ids.next_step_id(), text.clone(), StepStatus::Todo);
            let id = step.id;
            match (*after_step_id).and_then(|anchor| working.step_index(anchor)) {
                Some(index) => working.steps.insert(index + 1, step),
                None => working.steps.push(step),
            }
            Ok(PatchEffect::StepAdded(id))
        }

        Patch::UpdateStep { step_id, text } => {
            let step = working
                .steps
                .iter_mut()
                .find(|s| s.id == *step_id)
                .ok_or_else(|| missing("update_step", step_id))?;
            if step.is_done() {
                return Err(ValidationError::StepDoneImmutable(*step_id));
            }
            step.text.clone_from(text);
            Ok(PatchEffect::StepChanged(*step_id))
        }

        Patch::RemoveStep { id } => {
            let index = working
                .step_index(*id)
                .ok_or_else(|| missing("remove_step", id))?;
            if working.steps[index].is_done() {
                return Err(ValidationError::StepDoneImmutable(*id));
            }
            working.steps.remove(index);
            if working.current_step_id == Some(*id) {
                working.current_step_id = working.steps.iter().find(|s| !s.is_done()).map(|s| s.id);
            }
            Ok(PatchEffect::StepRemoved(*id))
        }

        Patch::AddNote { text } => {
            working.notes.push(text.clone());
            Ok(PatchEffect::NoteAdded(working.notes.len() - 1))
        }

        Patch::ReplaceRecipe {
            title,
            ingredients,
            steps,
        } => {
            working.title.clone_from(title);
            working.ingredients = ingredients
                .iter()
                .map(|text| Ingredient::with_id(ids.next_ingredient_id(), text.clone()))
                .collect();
            working.steps = steps
                .iter()
                .map(|text| Step::with_id(ids.next_step_id(), text.clone(), StepStatus::Todo))
                .collect();
            working.notes.clear();
            working.current_step_id = working.steps.first().map(|s| s.id);
            Ok(PatchEffect::Replaced)
        }
    }
}

fn missing(op: &str, id: &dyn std::fmt::Display) -> ValidationError {
    ValidationError::InternalConflict(format!("{op} target {id} missing from working copy"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sous_recipe::{RecipeId, SequentialIds};

    fn recipe() -> Recipe {
        Recipe::with_id(RecipeId::from_u128(1), "Toast")
            .with_ingredients(vec![
                Ingredient::with_id(IngredientId::from_u128(10), "bread"),
                Ingredient::with_id(IngredientId::from_u128(11), "butter"),
            ])
            .with_steps(vec![
                Step::with_id(StepId::from_u128(20), "Slice", StepStatus::Todo),
                Step::with_id(StepId::from_u128(21), "Toast", StepStatus::Todo),
            ])
    }

    #[test]
    fn apply_patch_missing_target_is_internal_conflict() {
        let mut r = recipe();
        let before = r.clone();
        let err = apply_patch(
            &mut r,
            &Patch::update_ingredient(IngredientId::from_u128(99), "x"),
            &mut SequentialIds::new(),
            RemovalMode::Delete,
        )
        .unwrap_err();

        assert!(matches!(err, ValidationError::InternalConflict(_)));
        assert_eq!(r, before);
    }

    #[test]
    fn soft_delete_keeps_row_flagged() {
        let mut r = recipe();
        let id = IngredientId::from_u128(11);
        let effect = apply_patch(
            &mut r,
            &Patch::remove_ingredient(id),
            &mut SequentialIds::new(),
            RemovalMode::SoftDelete,
        )
        .unwrap();

        assert_eq!(effect, PatchEffect::IngredientRemoved(id));
        assert_eq!(r.ingredients.len(), 2);
        assert!(r.ingredients[1].removed);
    }

    #[test]
    fn add_ingredient_with_unknown_anchor_appends() {
        let mut r = recipe();
        let mut ids = SequentialIds::starting_at(500);
        apply_patch(
            &mut r,
            &Patch::add_ingredient_after("jam", IngredientId::from_u128(99)),
            &mut ids,
            RemovalMode::Delete,
        )
        .unwrap();

        assert_eq!(r.ingredients.last().map(|i| i.text.as_str()), Some("jam"));
        assert_eq!(r.ingredients[2].id, IngredientId::from_u128(500));
    }

    #[test]
    fn removing_current_step_moves_pointer() {
        let mut r = recipe();
        assert_eq!(r.current_step_id, Some(StepId::from_u128(20)));
        apply_patch(
            &mut r,
            &Patch::remove_step(StepId::from_u128(20)),
            &mut SequentialIds::new(),
            RemovalMode::Delete,
        )
        .unwrap();

        assert_eq!(r.current_step_id, Some(StepId::from_u128(21)));
    }

    #[test]
    fn applied_reports_effects_in_order() {
        let r = recipe();
        let set = PatchSet::new(
            &r,
            vec![
                Patch::add_note("warm plates"),
                Patch::update_step(StepId::from_u128(21), "Toast lightly"),
            ],
        );
        let mut ids = SequentialIds::new();
        let applied = PatchApplier::new(&mut ids).apply(&set, &r).unwrap();

        assert_eq!(
            applied.effects,
            vec![
                PatchEffect::NoteAdded(0),
                PatchEffect::StepChanged(StepId::from_u128(21)),
            ]
        );
        assert!(!applied.replaced());
        assert_eq!(applied.recipe.version, 2);
    }

    #[test]
    fn apply_error_display_counts_errors() {
        let err = ApplyError::ValidationFailed(vec![
            ValidationError::InvalidStepId(StepId::from_u128(1)),
            ValidationError::InvalidStepId(StepId::from_u128(2)),
        ]);
        assert_eq!(err.to_string(), "validation failed with 2 error(s)");
        assert_eq!(err.errors().len(), 2);
    }
}
