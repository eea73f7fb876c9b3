//! Sous Session
//!
//! Pure chat/review state machine and the editing session built on it.
//!
//! # Core Concepts
//!
//! - [`UiState`] / [`UiEvent`]: Closed unions for the four review phases and their inputs
//! - [`reduce`]: Total reducer; unmatched pairs leave the state unchanged
//! - [`HiddenContext`]: Facts prefixed onto the next outgoing message, never rendered
//! - [`EditSession`]: Owns state and transcript for one editor
//!
//! # Example
//!
//! ```rust
//! use sous_recipe::{Patch, PatchSet, Recipe};
//! use sous_session::{reduce, UiEvent, UiPhase, UiState};
//!
//! let recipe = Recipe::new("Omelette");
//! let proposal = PatchSet::new(&recipe, vec![Patch::add_note("Low heat")]);
//!
//! let state = reduce(UiState::new(recipe), UiEvent::OpenChat);
//! let state = reduce(state, UiEvent::PatchReceived(proposal));
//! let state = reduce(state, UiEvent::ValidatePatch);
//! let state = reduce(state, UiEvent::AcceptPatch);
//!
//! assert_eq!(state.phase(), UiPhase::RecipeOnly);
//! assert_eq!(state.recipe().version, 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod hidden;
mod machine;
mod session;
mod state;
mod transcript;

pub use config::{ConfigError, SessionConfig};
pub use hidden::{compose_user_message, HiddenContext, CLOSE_TAG, OPEN_TAG};
pub use machine::{allowed_events, reduce, reduce_with, transition_defined};
pub use session::EditSession;
pub use state::{UiEvent, UiEventKind, UiPhase, UiState};
pub use transcript::{ChatMessage, Role, Transcript};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
