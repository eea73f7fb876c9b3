//! Change sets
//!
//! A [`ChangeSet`] records what one reviewed application did, per entity id,
//! so the presentation layer can highlight a diff without re-deriving it. It
//! also carries the pre-application recipe, which is what a reject restores.

use serde::{Deserialize, Serialize};
use sous_patch::PatchEffect;
use sous_recipe::{IngredientId, Patch, PatchSetId, Recipe, StepId};

/// Shape of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Item-level edits; ids are tracked
    Patches,
    /// Whole-document replace; no per-item ids are tracked
    ReplaceRecipe,
}

/// Per-entity mark for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMark {
    /// Newly inserted
    Added,
    /// Text rewritten
    Changed,
    /// Deleted or pending deletion
    Removed,
}

/// A patch the ledger declined to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusedPatch {
    /// The patch as proposed
    pub patch: Patch,
    /// Human-readable reason
    pub reason: String,
    /// Patch applied in its place, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute: Option<Patch>,
}

/// Record of one reviewed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    patch_set_id: PatchSetId,
    kind: ChangeKind,
    previous_recipe: Recipe,

    /// Ingredients inserted
    pub added_ingredient_ids: Vec<IngredientId>,
    /// Ingredients rewritten
    pub changed_ingredient_ids: Vec<IngredientId>,
    /// Ingredients flagged for removal
    pub removed_ingredient_ids: Vec<IngredientId>,
    /// Steps inserted
    pub added_step_ids: Vec<StepId>,
    /// Steps rewritten
    pub changed_step_ids: Vec<StepId>,
    /// Steps deleted
    pub removed_step_ids: Vec<StepId>,
    /// Indices of appended notes
    pub added_note_indices: Vec<usize>,
    /// Patches that took effect, substitutes included, in order
    pub applied: Vec<Patch>,
    /// Patches the ledger declined
    pub refused: Vec<RefusedPatch>,
}

impl ChangeSet {
    /// Start an empty change set against the pre-application recipe
    #[must_use]
    pub fn new(patch_set_id: PatchSetId, kind: ChangeKind, previous_recipe: Recipe) -> Self {
        Self {
            patch_set_id,
            kind,
            previous_recipe,
            added_ingredient_ids: Vec::new(),
            changed_ingredient_ids: Vec::new(),
            removed_ingredient_ids: Vec::new(),
            added_step_ids: Vec::new(),
            changed_step_ids: Vec::new(),
            removed_step_ids: Vec::new(),
            added_note_indices: Vec::new(),
            applied: Vec::new(),
            refused: Vec::new(),
        }
    }

    /// Proposal this change set came from
    #[inline]
    #[must_use]
    pub fn patch_set_id(&self) -> PatchSetId {
        self.patch_set_id
    }

    /// Shape of the application
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Recipe as it was before the application
    #[inline]
    #[must_use]
    pub fn previous_recipe(&self) -> &Recipe {
        &self.previous_recipe
    }

    /// Give up the pre-application recipe
    #[inline]
    #[must_use]
    pub fn into_previous_recipe(self) -> Recipe {
        self.previous_recipe
    }

    /// Fold one applied patch and its effect into the record
    pub fn record(&mut self, patch: Patch, effect: &PatchEffect) {
        match *effect {
            PatchEffect::IngredientAdded(id) => self.added_ingredient_ids.push(id),
            PatchEffect::IngredientChanged(id) => self.changed_ingredient_ids.push(id),
            PatchEffect::IngredientRemoved(id) => self.removed_ingredient_ids.push(id),
            PatchEffect::StepAdded(id) => self.added_step_ids.push(id),
            PatchEffect::StepChanged(id) => self.changed_step_ids.push(id),
            PatchEffect::StepRemoved(id) => self.removed_step_ids.push(id),
            PatchEffect::NoteAdded(index) => self.added_note_indices.push(index),
            PatchEffect::Replaced => {}
        }
        self.applied.push(patch);
    }

    /// Record a refused patch and what replaced it
    pub fn refuse(&mut self, patch: Patch, reason: impl Into<String>, substitute: Option<Patch>) {
        self.refused.push(RefusedPatch {
            patch,
            reason: reason.into(),
            substitute,
        });
    }

    /// How an ingredient row should render; removal wins over change
    #[must_use]
    pub fn ingredient_mark(&self, id: IngredientId) -> Option<ChangeMark> {
        if self.removed_ingredient_ids.contains(&id) {
            Some(ChangeMark::Removed)
        } else if self.added_ingredient_ids.contains(&id) {
            Some(ChangeMark::Added)
        } else if self.changed_ingredient_ids.contains(&id) {
            Some(ChangeMark::Changed)
        } else {
            None
        }
    }

    /// How a step should render; removal wins over change
    #[must_use]
    pub fn step_mark(&self, id: StepId) -> Option<ChangeMark> {
        if self.removed_step_ids.contains(&id) {
            Some(ChangeMark::Removed)
        } else if self.added_step_ids.contains(&id) {
            Some(ChangeMark::Added)
        } else if self.changed_step_ids.contains(&id) {
            Some(ChangeMark::Changed)
        } else {
            None
        }
    }

    /// Check if nothing took effect
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Hidden-context fact reporting this change set as rejected
    #[must_use]
    pub fn rejection_fact(&self) -> String {
        rejection_fact(self.patch_set_id)
    }
}

/// Machine-readable fact telling the assistant a proposal was turned down
///
/// The id is rendered as a lowercase hyphenated UUID, so
/// `"PATCH_REJECTED: aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa"`. Consumers should
/// match the id case-insensitively.
#[must_use]
pub fn rejection_fact(patch_set_id: PatchSetId) -> String {
    format!("PATCH_REJECTED: {patch_set_id}")
}
