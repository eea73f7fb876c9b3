//! The recipe document
//!
//! A [`Recipe`] is the root aggregate the patch protocol edits. It is a plain
//! value type: cloning it yields a fully independent deep copy, which is what
//! undo and reject snapshots rely on.
//!
//! # Invariants
//! - `id` never changes for the document's lifetime
//! - `version` starts at 1 and only ever grows by one per accepted edit
//! - ingredient and step ids are unique and never reused
//! - the text of a `done` step is never the target of an update

use crate::id::{IngredientId, RecipeId, StepId};
use serde::{Deserialize, Serialize};

/// Versioned recipe document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    id: RecipeId,

    /// Edit counter, starts at 1
    pub version: u64,

    /// Display title
    pub title: String,

    /// Ingredients in display order
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Free-text notes, append-only through patches
    #[serde(default)]
    pub notes: Vec<String>,

    /// Step the cook is currently on, if any
    #[serde(default)]
    pub current_step_id: Option<StepId>,
}

impl Recipe {
    /// Version every new document starts at
    pub const INITIAL_VERSION: u64 = 1;

    /// Create an empty recipe with a fresh id
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(RecipeId::new(), title)
    }

    /// Create an empty recipe with a known id
    #[must_use]
    pub fn with_id(id: RecipeId, title: impl Into<String>) -> Self {
        Self {
            id,
            version: Self::INITIAL_VERSION,
            title: title.into(),
            ingredients: Vec::new(),
            steps: Vec::new(),
            notes: Vec::new(),
            current_step_id: None,
        }
    }

    /// Set version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Set ingredients
    #[inline]
    #[must_use]
    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    /// Set steps; the current step becomes the first `todo` step
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self.current_step_id = self.first_todo_step();
        self
    }

    /// Set notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Document id
    #[inline]
    #[must_use]
    pub fn id(&self) -> RecipeId {
        self.id
    }

    /// Ingredient by id, including soft-removed rows
    #[must_use]
    pub fn ingredient(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    /// Ingredient by id, ignoring soft-removed rows
    #[must_use]
    pub fn live_ingredient(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredient(id).filter(|i| !i.removed)
    }

    /// Position of an ingredient row
    #[must_use]
    pub fn ingredient_index(&self, id: IngredientId) -> Option<usize> {
        self.ingredients.iter().position(|i| i.id == id)
    }

    /// Ingredients not pending removal
    pub fn live_ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter().filter(|i| !i.removed)
    }

    /// Step by id
    #[must_use]
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Position of a step
    #[must_use]
    pub fn step_index(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Steps already completed
    pub fn done_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.is_done())
    }

    /// Whether any row is flagged for removal
    #[must_use]
    pub fn has_pending_removals(&self) -> bool {
        self.ingredients.iter().any(|i| i.removed)
    }

    /// Drop every soft-removed ingredient row, returning how many went
    pub fn purge_removed(&mut self) -> usize {
        let before = self.ingredients.len();
        self.ingredients.retain(|i| !i.removed);
        before - self.ingredients.len()
    }

    /// Flip an ingredient's `checked` flag
    ///
    /// Counts as an edit: the version moves on, so proposals made against
    /// the old version go stale.
    ///
    /// # Errors
    /// Returns [`RecipeError::IngredientNotFound`] for unknown or removed rows
    pub fn toggle_ingredient(&mut self, id: IngredientId) -> Result<(), RecipeError> {
        let ingredient = self
            .ingredients
            .iter_mut()
            .find(|i| i.id == id && !i.removed)
            .ok_or(RecipeError::IngredientNotFound(id))?;
        ingredient.checked = !ingredient.checked;
        self.version += 1;
        Ok(())
    }

    /// Complete a step and advance the current-step pointer
    ///
    /// # Errors
    /// - [`RecipeError::StepNotFound`] for unknown ids
    /// - [`RecipeError::StepAlreadyDone`] when the step is already complete
    pub fn mark_step_done(&mut self, id: StepId) -> Result<(), RecipeError> {
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RecipeError::StepNotFound(id))?;
        if step.is_done() {
            return Err(RecipeError::StepAlreadyDone(id));
        }
        step.status = StepStatus::Done;
        self.current_step_id = self.first_todo_step();
        self.version += 1;
        Ok(())
    }

    /// Point the cook at a different `todo` step. Not a versioned edit.
    ///
    /// # Errors
    /// - [`RecipeError::StepNotFound`] for unknown ids
    /// - [`RecipeError::StepAlreadyDone`] when the step is complete
    pub fn set_current_step(&mut self, id: StepId) -> Result<(), RecipeError> {
        let step = self.step(id).ok_or(RecipeError::StepNotFound(id))?;
        if step.is_done() {
            return Err(RecipeError::StepAlreadyDone(id));
        }
        self.current_step_id = Some(id);
        Ok(())
    }

    fn first_todo_step(&self) -> Option<StepId> {
        self.steps.iter().find(|s| !s.is_done()).map(|s| s.id)
    }
}

/// One ingredient row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Row id
    pub id: IngredientId,

    /// Free text, e.g. "2 cups flour"
    pub text: String,

    /// Ticked off by the cook
    #[serde(default)]
    pub checked: bool,

    /// Soft-deleted, awaiting review
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
}

impl Ingredient {
    /// New unchecked ingredient with a fresh id
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(IngredientId::new(), text)
    }

    /// New unchecked ingredient with a known id
    #[inline]
    #[must_use]
    pub fn with_id(id: IngredientId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            checked: false,
            removed: false,
        }
    }
}

/// Completion state of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet performed
    #[default]
    Todo,

    /// Performed; text is frozen
    Done,
}

/// One step of the method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step id
    pub id: StepId,

    /// Instruction text
    pub text: String,

    /// Completion state
    #[serde(default)]
    pub status: StepStatus,
}

impl Step {
    /// New `todo` step with a fresh id
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(StepId::new(), text, StepStatus::Todo)
    }

    /// New step with a known id and status
    #[inline]
    #[must_use]
    pub fn with_id(id: StepId, text: impl Into<String>, status: StepStatus) -> Self {
        Self {
            id,
            text: text.into(),
            status,
        }
    }

    /// Whether the step is complete
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == StepStatus::Done
    }
}

/// Errors from direct (non-patch) recipe edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    /// No live ingredient with this id
    #[error("ingredient not found: {0}")]
    IngredientNotFound(IngredientId),

    /// No step with this id
    #[error("step not found: {0}")]
    StepNotFound(StepId),

    /// Step is already complete
    #[error("step already done: {0}")]
    StepAlreadyDone(StepId),
}
