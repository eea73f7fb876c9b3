//! Edit Session Tests
//!
//! Transcript handling and hidden-context delivery.

use pretty_assertions::assert_eq;
use sous_session::{EditSession, Role, SessionConfig, UiEvent, UiPhase, OPEN_TAG};
use sous_test_utils::*;

#[test]
fn reject_then_send_prefixes_fact_but_shows_plain_text() {
    let mut session = EditSession::new(seed_recipe());
    session.send(UiEvent::OpenChat);
    session.receive_assistant_reply("Here is a tweak.", Some(valid_patch_set()));
    assert_eq!(session.state().phase(), UiPhase::PatchProposed);

    session.send(UiEvent::ValidatePatch);
    session.send(UiEvent::RejectPatch("try again".into()));
    assert_eq!(session.state().draft(), Some("try again"));

    let outgoing = session.submit_user_message("  try again ").unwrap();

    assert_eq!(
        outgoing,
        "[[SYSCTX]]\nPATCH_REJECTED: aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa\n[[/SYSCTX]]\ntry again"
    );
    let last = session.transcript().last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.text, "try again");
    assert!(session.transcript().messages().all(|m| !m.text.contains(OPEN_TAG)));
    assert_eq!(session.state().draft(), Some(""));
}

#[test]
fn hidden_facts_are_delivered_once() {
    let mut session = EditSession::new(seed_recipe());
    session.send(UiEvent::OpenChat);
    session.receive_assistant_reply("", Some(valid_patch_set()));
    session.send(UiEvent::ValidatePatch);
    session.send(UiEvent::RejectPatch(String::new()));

    assert!(session.submit_user_message("first").unwrap().starts_with(OPEN_TAG));
    assert_eq!(session.submit_user_message("second").as_deref(), Some("second"));
}

#[test]
fn blank_messages_are_ignored() {
    let mut session = EditSession::new(seed_recipe());
    session.send(UiEvent::OpenChat);

    assert_eq!(session.submit_user_message("   \n"), None);
    assert!(session.transcript().is_empty());
}

#[test]
fn accepted_proposal_updates_recipe() {
    let mut session = EditSession::new(seed_recipe());
    session.send(UiEvent::OpenChat);
    session.receive_assistant_reply("Adding a note.", Some(valid_patch_set()));
    session.send(UiEvent::ValidatePatch);
    session.send(UiEvent::AcceptPatch);

    assert_eq!(session.state().phase(), UiPhase::RecipeOnly);
    assert_eq!(session.recipe().version, 2);
    assert_eq!(session.recipe().notes.last().map(String::as_str), Some("Knead for 10 minutes"));
    assert_eq!(session.transcript().len(), 1);
}

#[test]
fn reply_without_chat_open_does_not_queue_proposal() {
    let mut session = EditSession::new(seed_recipe());
    session.receive_assistant_reply("hello", Some(valid_patch_set()));

    assert_eq!(session.state().phase(), UiPhase::RecipeOnly);
    assert_eq!(session.transcript().len(), 1);
}

#[test]
fn transcript_respects_configured_capacity() {
    let config = SessionConfig::new().with_max_transcript_messages(2);
    let mut session = EditSession::with_config(seed_recipe(), &config);
    session.note_system("ready");
    session.submit_user_message("one");
    session.submit_user_message("two");

    let texts: Vec<&str> = session.transcript().messages().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two"]);
}

#[test]
fn facts_are_taken_while_a_proposal_is_pending() {
    let mut session = EditSession::new(seed_recipe());
    session.send(UiEvent::OpenChat);
    session.receive_assistant_reply("", Some(valid_patch_set()));
    session.send(UiEvent::ValidatePatch);
    session.send(UiEvent::RejectPatch(String::new()));
    session.receive_assistant_reply("Another idea.", Some(valid_patch_set()));
    assert_eq!(session.state().phase(), UiPhase::PatchProposed);

    let outgoing = session.submit_user_message("hm").unwrap();

    assert!(outgoing.starts_with(OPEN_TAG));
    assert_eq!(session.state().phase(), UiPhase::PatchProposed);
    assert!(session.state().hidden().is_some_and(|h| h.is_empty()));
}
