//! UI state and events
//!
//! Closed unions: every state carries exactly the data its phase needs.

use crate::hidden::HiddenContext;
use sous_patch::Validation;
use sous_recipe::{PatchSet, Recipe};

/// Chat/review UI state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    /// Recipe canvas only, no chat
    RecipeOnly {
        /// Current recipe
        recipe: Recipe,
    },

    /// Chat open, user composing
    ChatOpen {
        /// Current recipe
        recipe: Recipe,
        /// Unsent user text
        draft: String,
        /// Facts for the next outgoing message
        hidden: HiddenContext,
    },

    /// Proposal arrived, not yet validated
    PatchProposed {
        /// Current recipe
        recipe: Recipe,
        /// Incoming proposal
        patch_set: PatchSet,
        /// Carried through from chat
        hidden: HiddenContext,
    },

    /// Proposal validated, awaiting accept or reject
    PatchReview {
        /// Current recipe
        recipe: Recipe,
        /// Proposal under review
        patch_set: PatchSet,
        /// Validator verdict
        validation: Validation,
        /// Carried through from chat
        hidden: HiddenContext,
    },
}

impl UiState {
    /// Initial state for a seeded recipe
    #[inline]
    #[must_use]
    pub fn new(recipe: Recipe) -> Self {
        Self::RecipeOnly { recipe }
    }

    /// Recipe in every phase
    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        match self {
            Self::RecipeOnly { recipe }
            | Self::ChatOpen { recipe, .. }
            | Self::PatchProposed { recipe, .. }
            | Self::PatchReview { recipe, .. } => recipe,
        }
    }

    /// Phase tag
    #[must_use]
    pub fn phase(&self) -> UiPhase {
        match self {
            Self::RecipeOnly { .. } => UiPhase::RecipeOnly,
            Self::ChatOpen { .. } => UiPhase::ChatOpen,
            Self::PatchProposed { .. } => UiPhase::PatchProposed,
            Self::PatchReview { .. } => UiPhase::PatchReview,
        }
    }

    /// Hidden context, if the phase carries one
    #[must_use]
    pub fn hidden(&self) -> Option<&HiddenContext> {
        match self {
            Self::RecipeOnly { .. } => None,
            Self::ChatOpen { hidden, .. }
            | Self::PatchProposed { hidden, .. }
            | Self::PatchReview { hidden, .. } => Some(hidden),
        }
    }

    /// Current draft while chatting
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::ChatOpen { draft, .. } => Some(draft.as_str()),
            _ => None,
        }
    }

    /// Proposal in flight
    #[must_use]
    pub fn patch_set(&self) -> Option<&PatchSet> {
        match self {
            Self::PatchProposed { patch_set, .. } | Self::PatchReview { patch_set, .. } => {
                Some(patch_set)
            }
            _ => None,
        }
    }

    /// Verdict under review
    #[must_use]
    pub fn validation(&self) -> Option<&Validation> {
        match self {
            Self::PatchReview { validation, .. } => Some(validation),
            _ => None,
        }
    }

    /// Check if the chat sheet is showing
    #[inline]
    #[must_use]
    pub fn is_chat_presented(&self) -> bool {
        !matches!(self, Self::RecipeOnly { .. })
    }

    /// Check if a proposal awaits validation
    #[inline]
    #[must_use]
    pub fn is_patch_proposed(&self) -> bool {
        matches!(self, Self::PatchProposed { .. })
    }

    /// Check if a proposal awaits a decision
    #[inline]
    #[must_use]
    pub fn is_patch_review(&self) -> bool {
        matches!(self, Self::PatchReview { .. })
    }

    /// Remove and return the hidden facts, leaving the phase otherwise intact
    pub fn take_hidden(&mut self) -> HiddenContext {
        match self {
            Self::RecipeOnly { .. } => HiddenContext::new(),
            Self::ChatOpen { hidden, .. }
            | Self::PatchProposed { hidden, .. }
            | Self::PatchReview { hidden, .. } => std::mem::take(hidden),
        }
    }
}

/// Phase tag of a [`UiState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiPhase {
    /// See [`UiState::RecipeOnly`]
    RecipeOnly,
    /// See [`UiState::ChatOpen`]
    ChatOpen,
    /// See [`UiState::PatchProposed`]
    PatchProposed,
    /// See [`UiState::PatchReview`]
    PatchReview,
}

impl UiPhase {
    /// Every phase
    pub const ALL: [Self; 4] = [
        Self::RecipeOnly,
        Self::ChatOpen,
        Self::PatchProposed,
        Self::PatchReview,
    ];
}

/// Input to the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Show the chat
    OpenChat,
    /// Hide the chat
    CloseChat,
    /// Draft text edited
    UserDraftChanged(String),
    /// Assistant proposed a patch set
    PatchReceived(PatchSet),
    /// Run the validator on the proposal
    ValidatePatch,
    /// Apply the proposal
    AcceptPatch,
    /// Drop the proposal; the text becomes the new draft
    RejectPatch(String),
}

impl UiEvent {
    /// Kind tag, without payload
    #[must_use]
    pub fn kind(&self) -> UiEventKind {
        match self {
            Self::OpenChat => UiEventKind::OpenChat,
            Self::CloseChat => UiEventKind::CloseChat,
            Self::UserDraftChanged(_) => UiEventKind::UserDraftChanged,
            Self::PatchReceived(_) => UiEventKind::PatchReceived,
            Self::ValidatePatch => UiEventKind::ValidatePatch,
            Self::AcceptPatch => UiEventKind::AcceptPatch,
            Self::RejectPatch(_) => UiEventKind::RejectPatch,
        }
    }
}

/// Kind tag of a [`UiEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    /// See [`UiEvent::OpenChat`]
    OpenChat,
    /// See [`UiEvent::CloseChat`]
    CloseChat,
    /// See [`UiEvent::UserDraftChanged`]
    UserDraftChanged,
    /// See [`UiEvent::PatchReceived`]
    PatchReceived,
    /// See [`UiEvent::ValidatePatch`]
    ValidatePatch,
    /// See [`UiEvent::AcceptPatch`]
    AcceptPatch,
    /// See [`UiEvent::RejectPatch`]
    RejectPatch,
}

impl UiEventKind {
    /// Every event kind
    pub const ALL: [Self; 7] = [
        Self::OpenChat,
        Self::CloseChat,
        Self::UserDraftChanged,
        Self::PatchReceived,
        Self::ValidatePatch,
        Self::AcceptPatch,
        Self::RejectPatch,
    ];
}
