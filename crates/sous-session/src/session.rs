//! Editing session
//!
//! [`EditSession`] is the hosting client's store: it owns the current
//! [`UiState`] and the visible transcript, feeds events through the reducer,
//! and composes outgoing messages with their hidden context.

use crate::config::SessionConfig;
use crate::machine::reduce_with;
use crate::state::{UiEvent, UiState};
use crate::transcript::{ChatMessage, Transcript};
use sous_recipe::{IdSource, PatchSet, RandomIds, Recipe};

/// One editor's session over one recipe
pub struct EditSession {
    state: UiState,
    transcript: Transcript,
    ids: Box<dyn IdSource>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state)
            .field("transcript", &self.transcript)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create session with default configuration
    #[inline]
    #[must_use]
    pub fn new(recipe: Recipe) -> Self {
        Self::with_config(recipe, &SessionConfig::default())
    }

    /// Create session with configuration
    #[must_use]
    pub fn with_config(recipe: Recipe, config: &SessionConfig) -> Self {
        Self {
            state: UiState::new(recipe),
            transcript: Transcript::new(config.max_transcript_messages),
            ids: Box::new(RandomIds),
        }
    }

    /// With id source for rows added on accept
    #[must_use]
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Current UI state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Current recipe
    #[inline]
    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        self.state.recipe()
    }

    /// Visible chat log
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Feed one event through the reducer
    pub fn send(&mut self, event: UiEvent) -> &UiState {
        self.state = reduce_with(self.state.clone(), event, &mut *self.ids);
        &self.state
    }

    /// Record a user message and build the string to send upstream
    ///
    /// The text is trimmed; blank input is ignored and yields `None`. Only
    /// the visible text goes into the transcript. Hidden facts are prefixed
    /// onto the returned string and consumed, so each is delivered once. The
    /// facts are taken in whatever phase the session is in, including a
    /// pending proposal or review. The draft is cleared when chat is open.
    pub fn submit_user_message(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.transcript.push(ChatMessage::user(trimmed));

        let hidden = self.state.take_hidden();
        self.send(UiEvent::UserDraftChanged(String::new()));

        tracing::debug!(hidden_facts = hidden.len(), "composed outgoing message");
        Some(hidden.compose(trimmed))
    }

    /// Record the assistant's reply and queue its proposal, if any
    pub fn receive_assistant_reply(&mut self, text: &str, patch_set: Option<PatchSet>) -> &UiState {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.transcript.push(ChatMessage::assistant(trimmed));
        }
        if let Some(patch_set) = patch_set {
            self.send(UiEvent::PatchReceived(patch_set));
        }
        &self.state
    }

    /// Record an app status line
    pub fn note_system(&mut self, text: &str) {
        self.transcript.push(ChatMessage::system(text));
    }

    /// Give up the session, keeping the current state
    #[must_use]
    pub fn into_state(self) -> UiState {
        self.state
    }
}
