//! Hidden context
//!
//! Facts the assistant must see but the user never does. They travel inside
//! the UI state and are prefixed onto the next outgoing message as a
//! delimited block.

use serde::{Deserialize, Serialize};
use sous_recipe::PatchSetId;
use sous_review::{rejection_fact, ChangeSet};

/// Opening delimiter of the hidden block
pub const OPEN_TAG: &str = "[[SYSCTX]]";

/// Closing delimiter of the hidden block
pub const CLOSE_TAG: &str = "[[/SYSCTX]]";

/// Ordered, append-only list of hidden facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiddenContext {
    entries: Vec<String>,
}

impl HiddenContext {
    /// Create an empty context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with `entry` appended
    #[must_use]
    pub fn appending(mut self, entry: impl Into<String>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Append in place
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Append the fact that a proposal was turned down
    pub fn record_rejection(&mut self, patch_set_id: PatchSetId) {
        self.push(rejection_fact(patch_set_id));
    }

    /// Append the fact for a change set the ledger rolled back
    pub fn record_rejected_changes(&mut self, change_set: &ChangeSet) {
        self.push(change_set.rejection_fact());
    }

    /// Facts in insertion order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of facts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the outgoing message for `user_text`
    #[must_use]
    pub fn compose(&self, user_text: &str) -> String {
        compose_user_message(self, user_text)
    }
}

/// Prefix hidden facts onto an outgoing user message
///
/// With no facts the user text comes back unchanged. Otherwise the facts
/// are newline-joined inside a `[[SYSCTX]]` block, followed by a newline and
/// the user text.
#[must_use]
pub fn compose_user_message(hidden: &HiddenContext, user_text: &str) -> String {
    if hidden.is_empty() {
        return user_text.to_string();
    }
    format!(
        "{OPEN_TAG}\n{}\n{CLOSE_TAG}\n{user_text}",
        hidden.entries.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_context_leaves_text_alone() {
        assert_eq!(compose_user_message(&HiddenContext::new(), "hello"), "hello");
    }

    #[test]
    fn entries_are_newline_joined_in_one_block() {
        let hidden = HiddenContext::new().appending("A").appending("B");
        assert_eq!(hidden.compose("hi"), "[[SYSCTX]]\nA\nB\n[[/SYSCTX]]\nhi");
    }

    #[test]
    fn rejection_is_recorded_as_fact() {
        let mut hidden = HiddenContext::new();
        hidden.record_rejection(PatchSetId::from_u128(1));
        assert_eq!(
            hidden.entries(),
            &["PATCH_REJECTED: 00000000-0000-0000-0000-000000000001".to_string()]
        );
    }
}
