//! Patch set validation
//!
//! [`validate`] decides whether a [`PatchSet`] may be applied to a
//! [`Recipe`]. It is read-only and walks the whole batch, collecting every
//! violation instead of stopping at the first one.

use serde::{Deserialize, Serialize};
use sous_recipe::{IngredientId, Patch, PatchSet, Recipe, RecipeId, StepId};
use std::collections::HashSet;

/// Reason a patch set cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ValidationError {
    /// Proposal was made against a different version
    #[error("version mismatch: expected {expected}, got {got}")]
    VersionMismatch {
        /// Current recipe version
        expected: u64,
        /// Version the proposal was based on
        got: u64,
    },

    /// Proposal targets a different document
    #[error("recipe id mismatch: expected {expected}, got {got}")]
    RecipeIdMismatch {
        /// Current recipe id
        expected: RecipeId,
        /// Id the proposal targets
        got: RecipeId,
    },

    /// Ingredient id absent from the recipe or already removed in this batch
    #[error("invalid ingredient id: {0}")]
    InvalidIngredientId(IngredientId),

    /// Step id absent from the recipe or already removed in this batch
    #[error("invalid step id: {0}")]
    InvalidStepId(StepId),

    /// Attempt to change or remove a completed step
    #[error("step is done and immutable: {0}")]
    StepDoneImmutable(StepId),

    /// The batch contradicts itself or the working copy
    #[error("internal conflict: {0}")]
    InternalConflict(String),
}

impl ValidationError {
    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> ValidationErrorCode {
        match self {
            Self::VersionMismatch { .. } => ValidationErrorCode::VersionMismatch,
            Self::InvalidIngredientId(_) => ValidationErrorCode::InvalidIngredientId,
            Self::InvalidStepId(_) => ValidationErrorCode::InvalidStepId,
            Self::StepDoneImmutable(_) => ValidationErrorCode::StepDoneImmutable,
            Self::RecipeIdMismatch { .. } | Self::InternalConflict(_) => {
                ValidationErrorCode::InternalConflict
            }
        }
    }

    /// Check if re-proposing against the current recipe could fix this
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::VersionMismatch { .. })
    }
}

/// Error codes shared with the assistant integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    /// `VERSION_MISMATCH`
    VersionMismatch,
    /// `INVALID_INGREDIENT_ID`
    InvalidIngredientId,
    /// `INVALID_STEP_ID`
    InvalidStepId,
    /// `STEP_DONE_IMMUTABLE`
    StepDoneImmutable,
    /// `INTERNAL_CONFLICT`
    InternalConflict,
}

impl ValidationErrorCode {
    /// Wire spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VersionMismatch => "VERSION_MISMATCH",
            Self::InvalidIngredientId => "INVALID_INGREDIENT_ID",
            Self::InvalidStepId => "INVALID_STEP_ID",
            Self::StepDoneImmutable => "STEP_DONE_IMMUTABLE",
            Self::InternalConflict => "INTERNAL_CONFLICT",
        }
    }
}

impl std::fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "errors", rename_all = "snake_case")]
pub enum Validation {
    /// The batch may be applied
    Valid,

    /// Every violation found, in discovery order (duplicates kept)
    Invalid(Vec<ValidationError>),
}

impl Validation {
    /// Check if the batch may be applied
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations (empty when valid)
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Convert into a `Result`
    ///
    /// # Errors
    /// Returns the collected violations when invalid
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(errors) => Err(errors),
        }
    }

    fn from_errors(errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }
}

/// Validate a patch set against a recipe
///
/// Never mutates either argument and always walks the entire batch.
///
/// # Checks
/// 1. `base_recipe_version` must equal `recipe.version`
/// 2. `base_recipe_id` must equal `recipe.id()`
/// 3. every referenced ingredient/step must exist in the recipe and must not
///    have been removed earlier in the same batch
/// 4. `done` steps can be neither updated nor removed
///
/// Soft-removed ingredient rows count as absent.
#[must_use]
pub fn validate(patch_set: &PatchSet, recipe: &Recipe) -> Validation {
    let mut walk = BatchWalk::new(recipe);

    if patch_set.base_recipe_version() != recipe.version {
        walk.errors.push(ValidationError::VersionMismatch {
            expected: recipe.version,
            got: patch_set.base_recipe_version(),
        });
    }

    if patch_set.base_recipe_id() != recipe.id() {
        walk.errors.push(ValidationError::RecipeIdMismatch {
            expected: recipe.id(),
            got: patch_set.base_recipe_id(),
        });
    }

    for patch in patch_set.patches() {
        walk.check(patch);
    }

    let validation = Validation::from_errors(walk.errors);
    tracing::debug!(
        patch_set_id = %patch_set.id(),
        patches = patch_set.len(),
        errors = validation.errors().len(),
        "validated patch set"
    );
    validation
}

/// Running state of one pass over a batch
struct BatchWalk<'r> {
    recipe: &'r Recipe,
    removed_ingredients: HashSet<IngredientId>,
    removed_steps: HashSet<StepId>,
    errors: Vec<ValidationError>,
}

impl<'r> BatchWalk<'r> {
    fn new(recipe: &'r Recipe) -> Self {
        Self {
            recipe,
            removed_ingredients: HashSet::new(),
            removed_steps: HashSet::new(),
            errors: Vec::new(),
        }
    }

    fn ingredient_usable(&self, id: IngredientId) -> bool {
        self.recipe.live_ingredient(id).is_some() && !self.removed_ingredients.contains(&id)
    }

    fn step_usable(&self, id: StepId) -> bool {
        self.recipe.step(id).is_some() && !self.removed_steps.contains(&id)
    }

    fn check(&mut self, patch: &Patch) {
        match patch {
            Patch::AddIngredient { after_id, .. } => {
                if let Some(anchor) = *after_id {
                    if !self.ingredient_usable(anchor) {
                        self.errors.push(ValidationError::InvalidIngredientId(anchor));
                    }
                }
            }

            Patch::UpdateIngredient { id, .. } => {
                if !self.ingredient_usable(*id) {
                    self.errors.push(ValidationError::InvalidIngredientId(*id));
                }
            }

            Patch::RemoveIngredient { id } => {
                if self.ingredient_usable(*id) {
                    self.removed_ingredients.insert(*id);
                } else {
                    self.errors.push(ValidationError::InvalidIngredientId(*id));
                }
            }

            Patch::AddStep { after_step_id, .. } => {
                if let Some(anchor) = *after_step_id {
                    if !self.step_usable(anchor) {
                        self.errors.push(ValidationError::InvalidStepId(anchor));
                    }
                }
            }

            Patch::UpdateStep { step_id, .. } => {
                if !self.step_usable(*step_id) {
                    self.errors.push(ValidationError::InvalidStepId(*step_id));
                } else if self.is_done(*step_id) {
                    self.errors.push(ValidationError::StepDoneImmutable(*step_id));
                }
            }

            Patch::RemoveStep { id } => {
                if !self.step_usable(*id) {
                    self.errors.push(ValidationError::InvalidStepId(*id));
                } else if self.is_done(*id) {
                    self.errors.push(ValidationError::StepDoneImmutable(*id));
                } else {
                    self.removed_steps.insert(*id);
                }
            }

            Patch::AddNote { .. } | Patch::ReplaceRecipe { .. } => {}
        }
    }

    fn is_done(&self, id: StepId) -> bool {
        self.recipe.step(id).is_some_and(sous_recipe::Step::is_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sous_recipe::{Ingredient, Step, StepStatus};

    fn recipe() -> Recipe {
        Recipe::with_id(RecipeId::from_u128(1), "Toast")
            .with_ingredients(vec![Ingredient::with_id(IngredientId::from_u128(10), "bread")])
            .with_steps(vec![
                Step::with_id(StepId::from_u128(20), "Slice", StepStatus::Todo),
                Step::with_id(StepId::from_u128(21), "Plate", StepStatus::Done),
            ])
    }

    #[test]
    fn empty_batch_is_valid() {
        let r = recipe();
        assert_eq!(validate(&PatchSet::new(&r, vec![]), &r), Validation::Valid);
    }

    #[test]
    fn error_codes() {
        assert_eq!(
            ValidationError::VersionMismatch { expected: 1, got: 2 }.code().as_str(),
            "VERSION_MISMATCH"
        );
        assert_eq!(
            ValidationError::RecipeIdMismatch {
                expected: RecipeId::from_u128(1),
                got: RecipeId::from_u128(2),
            }
            .code(),
            ValidationErrorCode::InternalConflict
        );
        assert_eq!(
            ValidationError::StepDoneImmutable(StepId::from_u128(1)).code().to_string(),
            "STEP_DONE_IMMUTABLE"
        );
    }

    #[test]
    fn soft_removed_ingredient_counts_as_absent() {
        let mut r = recipe();
        r.ingredients[0].removed = true;
        let id = IngredientId::from_u128(10);
        let set = PatchSet::new(&r, vec![Patch::update_ingredient(id, "rye")]);

        assert_eq!(
            validate(&set, &r),
            Validation::Invalid(vec![ValidationError::InvalidIngredientId(id)])
        );
    }

    #[test]
    fn done_step_removal_does_not_mark_removed() {
        let r = recipe();
        let done = StepId::from_u128(21);
        let set = PatchSet::new(
            &r,
            vec![Patch::remove_step(done), Patch::add_step_after("Garnish", done)],
        );

        // the anchor is still usable because the removal was refused
        assert_eq!(
            validate(&set, &r),
            Validation::Invalid(vec![ValidationError::StepDoneImmutable(done)])
        );
    }

    #[test]
    fn validation_serializes_with_codes() {
        let v = Validation::Invalid(vec![ValidationError::InvalidStepId(StepId::from_u128(5))]);
        let json = serde_json::to_value(&v).unwrap();

        assert_eq!(json["result"], "invalid");
        assert_eq!(json["errors"][0]["kind"], "invalid_step_id");
    }

    #[test]
    fn into_result_exposes_errors() {
        assert_eq!(Validation::Valid.into_result(), Ok(()));
        let errors = vec![ValidationError::InternalConflict("x".into())];
        assert_eq!(Validation::Invalid(errors.clone()).into_result(), Err(errors));
    }
}
