//! Chat/review reducer
//!
//! `reduce` is a total function of state and event. Any pair missing from
//! the transition table returns the state unchanged.

use crate::hidden::HiddenContext;
use crate::state::{UiEvent, UiEventKind, UiPhase, UiState};
use sous_patch::{PatchApplier, Validation};
use sous_recipe::{IdSource, RandomIds};
use sous_review::rejection_fact;

/// Advance the UI state by one event, minting new row ids at random
#[must_use]
pub fn reduce(state: UiState, event: UiEvent) -> UiState {
    reduce_with(state, event, &mut RandomIds)
}

/// Advance the UI state by one event, minting new row ids from `ids`
#[must_use]
pub fn reduce_with(state: UiState, event: UiEvent, ids: &mut dyn IdSource) -> UiState {
    let from = state.phase();
    let kind = event.kind();

    let next = match (state, event) {
        (UiState::RecipeOnly { recipe }, UiEvent::OpenChat) => UiState::ChatOpen {
            recipe,
            draft: String::new(),
            hidden: HiddenContext::new(),
        },

        (UiState::ChatOpen { recipe, .. }, UiEvent::CloseChat) => UiState::RecipeOnly { recipe },

        (UiState::ChatOpen { recipe, hidden, .. }, UiEvent::UserDraftChanged(draft)) => {
            UiState::ChatOpen {
                recipe,
                draft,
                hidden,
            }
        }

        (UiState::ChatOpen { recipe, hidden, .. }, UiEvent::PatchReceived(patch_set)) => {
            UiState::PatchProposed {
                recipe,
                patch_set,
                hidden,
            }
        }

        (
            UiState::PatchProposed {
                recipe,
                patch_set,
                hidden,
            },
            UiEvent::ValidatePatch,
        ) => {
            let validation = sous_patch::validate(&patch_set, &recipe);
            UiState::PatchReview {
                recipe,
                patch_set,
                validation,
                hidden,
            }
        }

        (
            state @ UiState::PatchReview {
                validation: Validation::Valid,
                ..
            },
            UiEvent::AcceptPatch,
        ) => accept(state, ids),

        (
            UiState::PatchReview {
                recipe,
                patch_set,
                hidden,
                ..
            },
            UiEvent::RejectPatch(draft),
        ) => UiState::ChatOpen {
            recipe,
            draft,
            hidden: hidden.appending(rejection_fact(patch_set.id())),
        },

        (state, _) => state,
    };

    tracing::debug!(?from, event = ?kind, to = ?next.phase(), "reduced ui event");
    next
}

fn accept(state: UiState, ids: &mut dyn IdSource) -> UiState {
    let UiState::PatchReview {
        recipe, patch_set, ..
    } = &state
    else {
        return state;
    };
    match PatchApplier::new(ids).apply(patch_set, recipe) {
        Ok(applied) => UiState::RecipeOnly {
            recipe: applied.recipe,
        },
        Err(e) => {
            tracing::warn!(patch_set_id = %patch_set.id(), error = %e, "accept failed, staying in review");
            state
        }
    }
}

/// Events with an entry in the transition table for `phase`
///
/// `AcceptPatch` is listed for review even though it only moves on when the
/// verdict is valid.
#[must_use]
pub fn allowed_events(phase: UiPhase) -> Vec<UiEventKind> {
    use UiEventKind::{
        AcceptPatch, CloseChat, OpenChat, PatchReceived, RejectPatch, UserDraftChanged,
        ValidatePatch,
    };
    match phase {
        UiPhase::RecipeOnly => vec![OpenChat],
        UiPhase::ChatOpen => vec![CloseChat, UserDraftChanged, PatchReceived],
        UiPhase::PatchProposed => vec![ValidatePatch],
        UiPhase::PatchReview => vec![AcceptPatch, RejectPatch],
    }
}

/// Check if `(phase, event)` has an entry in the transition table
#[must_use]
pub fn transition_defined(phase: UiPhase, event: UiEventKind) -> bool {
    allowed_events(phase).contains(&event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sous_recipe::{Patch, PatchSet, Recipe, SequentialIds};

    #[test]
    fn open_then_close_round_trips() {
        let recipe = Recipe::new("Tea");
        let open = reduce(UiState::new(recipe.clone()), UiEvent::OpenChat);
        assert_eq!(open.draft(), Some(""));
        assert_eq!(reduce(open, UiEvent::CloseChat), UiState::new(recipe));
    }

    #[test]
    fn accept_uses_supplied_ids() {
        let recipe = Recipe::new("Tea");
        let set = PatchSet::new(&recipe, vec![Patch::add_step("Steep")]);
        let review = UiState::PatchReview {
            recipe,
            patch_set: set,
            validation: Validation::Valid,
            hidden: HiddenContext::new(),
        };

        let next = reduce_with(review, UiEvent::AcceptPatch, &mut SequentialIds::starting_at(7));

        assert_eq!(next.phase(), UiPhase::RecipeOnly);
        assert_eq!(next.recipe().steps[0].id, sous_recipe::StepId::from_u128(7));
    }

    #[test]
    fn table_matches_phases() {
        assert!(transition_defined(UiPhase::RecipeOnly, UiEventKind::OpenChat));
        assert!(!transition_defined(UiPhase::RecipeOnly, UiEventKind::CloseChat));
        assert!(!transition_defined(UiPhase::PatchProposed, UiEventKind::PatchReceived));
        assert_eq!(allowed_events(UiPhase::PatchReview).len(), 2);
    }
}
