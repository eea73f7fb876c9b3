//! Review ledger
//!
//! The ledger owns the current recipe for a single editor and layers a
//! review workflow over the strict patch engine:
//!
//! - removals are soft until [`ReviewLedger::approve_changes`]
//! - [`ReviewLedger::reject_changes`] restores the pre-application recipe
//! - every application pushes an undo snapshot
//! - removing an ingredient a done step already used is refused and replaced
//!   by a note

use crate::change_set::{ChangeKind, ChangeSet};
use crate::config::LedgerConfig;
use crate::error::ReviewError;
use crate::guard::{self, USED_INGREDIENT_REASON};
use crate::undo::UndoStack;
use sous_patch::{apply_patch, validate, ApplyError, RemovalMode, Validation, ValidationError};
use sous_recipe::{IdSource, IngredientId, Patch, PatchSet, RandomIds, Recipe, StepId};

/// Single-editor review ledger
pub struct ReviewLedger {
    recipe: Recipe,
    pending: Option<ChangeSet>,
    undo: UndoStack,
    ids: Box<dyn IdSource>,
    config: LedgerConfig,
}

impl std::fmt::Debug for ReviewLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewLedger")
            .field("recipe", &self.recipe)
            .field("pending", &self.pending)
            .field("undo_depth", &self.undo.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReviewLedger {
    /// Create ledger with default configuration and random ids
    #[inline]
    #[must_use]
    pub fn new(recipe: Recipe) -> Self {
        Self::with_config(recipe, LedgerConfig::default())
    }

    /// Create ledger with configuration
    #[must_use]
    pub fn with_config(recipe: Recipe, config: LedgerConfig) -> Self {
        Self {
            recipe,
            pending: None,
            undo: UndoStack::new(config.undo_capacity),
            ids: Box::new(RandomIds),
            config,
        }
    }

    /// With id source for new rows
    #[must_use]
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Current recipe, including rows pending removal
    #[inline]
    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Change set awaiting approve or reject
    #[inline]
    #[must_use]
    pub fn pending_changes(&self) -> Option<&ChangeSet> {
        self.pending.as_ref()
    }

    /// Check if a change set awaits review
    #[inline]
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.pending.is_some()
    }

    /// Check if there is anything to undo
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Number of undo snapshots held
    #[inline]
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Validate and apply a proposal, opening a review window
    ///
    /// The whole batch is validated strictly first. Patches are then applied
    /// one by one with soft deletes; a removal caught by the history guard is
    /// recorded as refused and a compensating note is applied in its place.
    /// The version moves on by one.
    ///
    /// A change set still pending is superseded: it is approved implicitly,
    /// purging its soft-removed rows, and the new change set replaces it.
    ///
    /// # Errors
    /// [`ReviewError::Apply`] when the batch does not validate; the ledger,
    /// including any pending change set, is unchanged
    pub fn propose(&mut self, patch_set: &PatchSet) -> Result<&ChangeSet, ReviewError> {
        if let Validation::Invalid(errors) = validate(patch_set, &self.recipe) {
            tracing::warn!(
                patch_set_id = %patch_set.id(),
                errors = errors.len(),
                "proposal failed validation"
            );
            return Err(ApplyError::ValidationFailed(errors).into());
        }

        if let Some(superseded) = self.pending.take() {
            let purged = self.recipe.purge_removed();
            tracing::info!(
                patch_set_id = %superseded.patch_set_id(),
                purged,
                "superseded pending changes"
            );
        }

        let mut working = self.recipe.clone();
        let ids = &mut *self.ids;
        let change_set = match patch_set.replacement() {
            Some(replace) => {
                let mut change_set = ChangeSet::new(
                    patch_set.id(),
                    ChangeKind::ReplaceRecipe,
                    self.recipe.clone(),
                );
                let effect = apply_patch(&mut working, replace, ids, RemovalMode::SoftDelete)
                    .map_err(conflict)?;
                change_set.record(replace.clone(), &effect);
                change_set
            }
            None => {
                let mut change_set =
                    ChangeSet::new(patch_set.id(), ChangeKind::Patches, self.recipe.clone());
                for patch in patch_set.patches() {
                    apply_guarded(&mut working, patch, ids, &mut change_set).map_err(conflict)?;
                }
                change_set
            }
        };
        working.version = self.recipe.version + 1;

        let previous = std::mem::replace(&mut self.recipe, working);
        self.undo.push(previous);

        tracing::info!(
            patch_set_id = %patch_set.id(),
            version = self.recipe.version,
            applied = change_set.applied.len(),
            refused = change_set.refused.len(),
            "opened review"
        );
        Ok(self.pending.insert(change_set))
    }

    /// Keep the pending changes and purge soft-removed rows
    ///
    /// Returns the approved change set, or `None` when nothing was pending.
    pub fn approve_changes(&mut self) -> Option<ChangeSet> {
        let change_set = self.pending.take()?;
        let purged = self.recipe.purge_removed();
        tracing::info!(
            patch_set_id = %change_set.patch_set_id(),
            purged,
            "approved changes"
        );
        Some(change_set)
    }

    /// Discard the pending changes, restoring the pre-application recipe
    ///
    /// The undo snapshot pushed by the proposal is dropped, since the
    /// restore already covers it. Returns the rejected change set so the
    /// caller can report it upward.
    pub fn reject_changes(&mut self) -> Option<ChangeSet> {
        let change_set = self.pending.take()?;
        self.recipe = change_set.previous_recipe().clone();
        self.undo.pop();
        tracing::info!(
            patch_set_id = %change_set.patch_set_id(),
            version = self.recipe.version,
            "rejected changes"
        );
        Some(change_set)
    }

    /// Restore the most recent undo snapshot
    ///
    /// A raw restore: the version goes back with the snapshot. Any pending
    /// change set is dropped. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        self.recipe = previous;
        self.pending = None;
        tracing::info!(version = self.recipe.version, "undid last change");
        true
    }

    /// Tick an ingredient on or off
    ///
    /// # Errors
    /// See [`Recipe::toggle_ingredient`]
    pub fn toggle_ingredient(&mut self, id: IngredientId) -> Result<(), ReviewError> {
        self.recipe.toggle_ingredient(id)?;
        Ok(())
    }

    /// Complete a step
    ///
    /// # Errors
    /// See [`Recipe::mark_step_done`]
    pub fn mark_step_done(&mut self, id: StepId) -> Result<(), ReviewError> {
        self.recipe.mark_step_done(id)?;
        tracing::debug!(step_id = %id, version = self.recipe.version, "step done");
        Ok(())
    }

    /// Move the current-step pointer
    ///
    /// # Errors
    /// See [`Recipe::set_current_step`]
    pub fn set_current_step(&mut self, id: StepId) -> Result<(), ReviewError> {
        self.recipe.set_current_step(id)?;
        Ok(())
    }

    /// Give up the ledger, keeping the current recipe
    #[must_use]
    pub fn into_recipe(self) -> Recipe {
        self.recipe
    }
}

fn apply_guarded(
    working: &mut Recipe,
    patch: &Patch,
    ids: &mut dyn IdSource,
    change_set: &mut ChangeSet,
) -> Result<(), ValidationError> {
    if let Patch::RemoveIngredient { id } = patch {
        let current: &Recipe = working;
        let used = current
            .live_ingredient(*id)
            .filter(|ingredient| guard::consumed_by(current, ingredient).is_some())
            .cloned();
        if let Some(ingredient) = used {
            tracing::warn!(
                ingredient_id = %id,
                "refusing to remove an ingredient a done step already used"
            );
            let note = guard::compensating_note(&ingredient);
            let effect = apply_patch(working, &note, ids, RemovalMode::SoftDelete)?;
            change_set.refuse(patch.clone(), USED_INGREDIENT_REASON, Some(note.clone()));
            change_set.record(note, &effect);
            return Ok(());
        }
    }

    let effect = apply_patch(working, patch, ids, RemovalMode::SoftDelete)?;
    change_set.record(patch.clone(), &effect);
    Ok(())
}

fn conflict(error: ValidationError) -> ApplyError {
    ApplyError::ValidationFailed(vec![error])
}
