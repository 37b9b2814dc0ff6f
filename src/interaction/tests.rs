use super::*;
use crate::dispatch::{DispatchResult, RequestId};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(ms)
}

fn machine() -> InteractionMachine {
    InteractionMachine::new(Duration::seconds(5))
}

fn no_submit(_: String) -> RequestId {
    panic!("unexpected submit")
}

/// Drive the machine into AwaitingInput with `text` typed
fn typing(text: &str) -> InteractionMachine {
    let mut m = machine();
    m.handle_event(InputEvent::StartInput, true, no_submit);
    for c in text.chars() {
        m.handle_event(InputEvent::Append(c), true, no_submit);
    }
    m
}

#[test]
fn test_starts_idle() {
    let m = machine();
    assert_eq!(m.state(), &InteractionState::Idle);
    assert!(!m.answer_slot_occupied());
}

#[test]
fn test_start_input_requires_person() {
    let mut m = machine();

    assert_eq!(m.handle_event(InputEvent::StartInput, false, no_submit), Transition::Ignored);
    assert_eq!(m.state(), &InteractionState::Idle);

    assert_eq!(m.handle_event(InputEvent::StartInput, true, no_submit), Transition::Changed);
    assert_eq!(
        m.state(),
        &InteractionState::AwaitingInput {
            pending_text: String::new()
        }
    );
}

#[test]
fn test_append_and_backspace() {
    let mut m = typing("cat");
    m.handle_event(InputEvent::Backspace, true, no_submit);
    m.handle_event(InputEvent::Append('r'), false, no_submit);

    // Guard applies only to StartInput; typing continues without a person
    assert_eq!(
        m.state(),
        &InteractionState::AwaitingInput {
            pending_text: "car".to_string()
        }
    );
}

#[test]
fn test_backspace_on_empty_is_idempotent() {
    let mut m = typing("");
    for _ in 0..3 {
        assert_eq!(m.handle_event(InputEvent::Backspace, true, no_submit), Transition::Ignored);
    }
    assert_eq!(
        m.state(),
        &InteractionState::AwaitingInput {
            pending_text: String::new()
        }
    );
}

#[test]
fn test_backspace_removes_whole_char() {
    let mut m = typing("café");
    m.handle_event(InputEvent::Backspace, true, no_submit);
    assert_eq!(m.view(true), InteractionView::Typing("caf"));
}

#[test]
fn test_submit_goes_straight_to_pending_answer() {
    let mut m = typing("cat?");
    let id = RequestId::new();
    let mut sent = None;

    let transition = m.handle_event(InputEvent::Submit, true, |query| {
        sent = Some(query);
        id
    });

    assert_eq!(transition, Transition::Submitted(id));
    assert_eq!(sent.as_deref(), Some("cat?"));
    assert_eq!(
        m.state(),
        &InteractionState::ShowingAnswer {
            request_id: id,
            answer: None
        }
    );
    assert!(m.answer_slot_occupied());
    assert_eq!(m.view(true), InteractionView::Waiting);
}

#[test]
fn test_cancel_returns_to_idle() {
    let mut m = typing("never mind");
    assert_eq!(m.handle_event(InputEvent::Cancel, true, no_submit), Transition::Changed);
    assert_eq!(m.state(), &InteractionState::Idle);
}

#[test]
fn test_start_input_ignored_while_showing_answer() {
    let mut m = typing("cat?");
    let id = RequestId::new();
    m.handle_event(InputEvent::Submit, true, |_| id);

    assert_eq!(m.handle_event(InputEvent::StartInput, true, no_submit), Transition::Ignored);
    m.apply_result(&DispatchResult::answered(id, "It's a feline."), at(1000));
    assert_eq!(m.handle_event(InputEvent::StartInput, true, no_submit), Transition::Ignored);
    assert!(m.answer_slot_occupied());
}

#[test]
fn test_text_events_ignored_outside_text_entry() {
    let mut m = machine();
    assert_eq!(m.handle_event(InputEvent::Append('x'), true, no_submit), Transition::Ignored);
    assert_eq!(m.handle_event(InputEvent::Submit, true, no_submit), Transition::Ignored);
    assert_eq!(m.handle_event(InputEvent::Backspace, true, no_submit), Transition::Ignored);
    assert_eq!(m.state(), &InteractionState::Idle);
}

#[test]
fn test_answer_displayed_for_ttl_then_idle() {
    let mut m = typing("cat?");
    let id = RequestId::new();
    m.handle_event(InputEvent::Submit, true, |_| id);

    assert!(m.apply_result(&DispatchResult::answered(id, "It's a feline."), at(1000)));
    assert_eq!(m.view(false), InteractionView::Answer("It's a feline."));

    assert!(!m.tick(at(5999)));
    assert_eq!(m.view(false), InteractionView::Answer("It's a feline."));

    assert!(m.tick(at(6000)));
    assert_eq!(m.state(), &InteractionState::Idle);
}

#[test]
fn test_pending_answer_never_expires() {
    let mut m = typing("slow question");
    m.handle_event(InputEvent::Submit, true, |_| RequestId::new());

    assert!(!m.tick(at(600_000)));
    assert!(m.answer_slot_occupied());
}

#[test]
fn test_stale_result_dropped() {
    let mut m = typing("first");
    let first = RequestId::new();
    m.handle_event(InputEvent::Submit, true, |_| first);

    // Forced reset, then a second question
    m.reset();
    m.handle_event(InputEvent::StartInput, true, no_submit);
    m.handle_event(InputEvent::Append('?'), true, no_submit);
    let second = RequestId::new();
    m.handle_event(InputEvent::Submit, true, |_| second);

    assert!(!m.apply_result(&DispatchResult::answered(first, "late first answer"), at(500)));
    assert_eq!(
        m.state(),
        &InteractionState::ShowingAnswer {
            request_id: second,
            answer: None
        }
    );

    assert!(m.apply_result(&DispatchResult::answered(second, "second answer"), at(600)));
    assert_eq!(m.view(true), InteractionView::Answer("second answer"));
}

#[test]
fn test_result_while_idle_dropped() {
    let mut m = machine();
    assert!(!m.apply_result(&DispatchResult::answered(RequestId::new(), "orphan"), at(0)));
    assert_eq!(m.state(), &InteractionState::Idle);
}

#[test]
fn test_duplicate_result_does_not_restart_display() {
    let mut m = typing("q");
    let id = RequestId::new();
    m.handle_event(InputEvent::Submit, true, |_| id);

    m.apply_result(&DispatchResult::answered(id, "first"), at(1000));
    assert!(!m.apply_result(&DispatchResult::answered(id, "second"), at(4000)));
    assert!(m.tick(at(6000)));
}

#[test]
fn test_failure_shown_as_answer() {
    let mut m = typing("dog?");
    let id = RequestId::new();
    m.handle_event(InputEvent::Submit, true, |_| id);

    m.apply_result(&DispatchResult::failed(id, "FAQ service error."), at(100));
    assert_eq!(m.view(true), InteractionView::Answer("FAQ service error."));
}

#[test]
fn test_view_per_state() {
    let m = machine();
    assert_eq!(m.view(true), InteractionView::Prompt);
    assert_eq!(m.view(false), InteractionView::Hidden);

    let m = typing("hi");
    assert_eq!(m.view(false), InteractionView::Typing("hi"));
}

// ── Key mapping ──────────────────────────────────────────────────────────────

#[test]
fn test_key_from_code() {
    assert_eq!(Key::from_code(255), None);
    assert_eq!(Key::from_code(13), Some(Key::Enter));
    assert_eq!(Key::from_code(10), Some(Key::Enter));
    assert_eq!(Key::from_code(8), Some(Key::Backspace));
    assert_eq!(Key::from_code(127), Some(Key::Backspace));
    assert_eq!(Key::from_code(27), Some(Key::Escape));
    assert_eq!(Key::from_code('i' as u32), Some(Key::Char('i')));
    assert_eq!(Key::from_code(9), Some(Key::Other(9)));
}

#[test]
fn test_keymap_outside_text_entry() {
    let keys = KeyMap::default();
    assert_eq!(
        keys.map(Key::Char('i'), false),
        Some(KeyAction::Input(InputEvent::StartInput))
    );
    assert_eq!(keys.map(Key::Char('q'), false), Some(KeyAction::Quit));
    // Escape only means something during text entry
    assert_eq!(keys.map(Key::Escape, false), None);
    assert_eq!(keys.map(Key::Char('x'), false), None);
    assert_eq!(keys.map(Key::Enter, false), None);
}

#[test]
fn test_keymap_while_typing() {
    let keys = KeyMap::default();
    assert_eq!(keys.map(Key::Char('q'), true), Some(KeyAction::Quit));
    // The start key is plain text while typing
    assert_eq!(
        keys.map(Key::Char('i'), true),
        Some(KeyAction::Input(InputEvent::Append('i')))
    );
    assert_eq!(keys.map(Key::Enter, true), Some(KeyAction::Input(InputEvent::Submit)));
    assert_eq!(
        keys.map(Key::Backspace, true),
        Some(KeyAction::Input(InputEvent::Backspace))
    );
    assert_eq!(keys.map(Key::Escape, true), Some(KeyAction::Input(InputEvent::Cancel)));
    assert_eq!(keys.map(Key::Other(9), true), None);
}
