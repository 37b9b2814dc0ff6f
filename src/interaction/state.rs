use crate::dispatch::{DispatchResult, RequestId};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// An answer currently on screen
#[derive(Clone, Debug, PartialEq)]
pub struct ShownAnswer {
    pub text: String,
    pub shown_at: DateTime<Utc>,
}

/// The single interaction state of the running loop.
///
/// `ShowingAnswer` covers both "submitted, waiting" (`answer: None`) and
/// "resolved, on screen" (`answer: Some`), so the answer slot is occupied
/// exactly when the state is `ShowingAnswer`.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    AwaitingInput {
        pending_text: String,
    },
    ShowingAnswer {
        request_id: RequestId,
        answer: Option<ShownAnswer>,
    },
}

/// User intent after key mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    StartInput,
    Append(char),
    Backspace,
    Submit,
    /// Leave text entry without sending
    Cancel,
}

/// Effect of feeding an event to the machine
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    /// Guard failed or event not valid in this state
    Ignored,
    Changed,
    /// Query handed to the dispatcher
    Submitted(RequestId),
}

/// What the display should draw for the interaction slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionView<'a> {
    Hidden,
    /// Idle with a person in frame: invite the user to type
    Prompt,
    Typing(&'a str),
    /// Submitted, answer not back yet
    Waiting,
    Answer(&'a str),
}

pub struct InteractionMachine {
    state: InteractionState,
    answer_ttl: Duration,
}

impl InteractionMachine {
    pub fn new(answer_ttl: Duration) -> Self {
        Self {
            state: InteractionState::Idle,
            answer_ttl,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.state, InteractionState::AwaitingInput { .. })
    }

    pub fn answer_slot_occupied(&self) -> bool {
        matches!(self.state, InteractionState::ShowingAnswer { .. })
    }

    /// Apply one input event.
    ///
    /// `person_present` is the start-input guard for the current frame.
    /// `submit` is called at most once, on `Submit`, with the typed text; the
    /// id it returns becomes the outstanding request.
    pub fn handle_event<F>(&mut self, event: InputEvent, person_present: bool, submit: F) -> Transition
    where
        F: FnOnce(String) -> RequestId,
    {
        match (&mut self.state, event) {
            (InteractionState::Idle, InputEvent::StartInput) => {
                if !person_present {
                    debug!("Start input ignored: no person in frame");
                    return Transition::Ignored;
                }
                self.state = InteractionState::AwaitingInput {
                    pending_text: String::new(),
                };
                debug!("Text entry started");
                Transition::Changed
            }
            (InteractionState::AwaitingInput { pending_text }, InputEvent::Append(c)) => {
                pending_text.push(c);
                Transition::Changed
            }
            (InteractionState::AwaitingInput { pending_text }, InputEvent::Backspace) => {
                if pending_text.pop().is_some() {
                    Transition::Changed
                } else {
                    Transition::Ignored
                }
            }
            (InteractionState::AwaitingInput { pending_text }, InputEvent::Submit) => {
                let query = std::mem::take(pending_text);
                let request_id = submit(query);
                info!(request_id = %request_id, "Question submitted");
                self.state = InteractionState::ShowingAnswer {
                    request_id,
                    answer: None,
                };
                Transition::Submitted(request_id)
            }
            (InteractionState::AwaitingInput { .. }, InputEvent::Cancel) => {
                self.state = InteractionState::Idle;
                debug!("Text entry cancelled");
                Transition::Changed
            }
            _ => Transition::Ignored,
        }
    }

    /// Show the answer for the outstanding request. Results for any other
    /// request, or a second result for one already shown, are dropped.
    pub fn apply_result(&mut self, result: &DispatchResult, now: DateTime<Utc>) -> bool {
        match &mut self.state {
            InteractionState::ShowingAnswer { request_id, answer }
                if *request_id == result.request_id && answer.is_none() =>
            {
                *answer = Some(ShownAnswer {
                    text: result.text().to_string(),
                    shown_at: now,
                });
                info!(request_id = %result.request_id, failed = result.is_failure(), "Answer shown");
                true
            }
            _ => {
                debug!(request_id = %result.request_id, "Discarding stale answer");
                false
            }
        }
    }

    /// Return to `Idle` once a shown answer has been up for the display TTL.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let expired = match &self.state {
            InteractionState::ShowingAnswer {
                answer: Some(shown),
                ..
            } => now - shown.shown_at >= self.answer_ttl,
            _ => false,
        };
        if expired {
            self.state = InteractionState::Idle;
            debug!("Answer display expired");
        }
        expired
    }

    /// Force `Idle`, abandoning any outstanding request.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn view(&self, person_present: bool) -> InteractionView<'_> {
        match &self.state {
            InteractionState::Idle if person_present => InteractionView::Prompt,
            InteractionState::Idle => InteractionView::Hidden,
            InteractionState::AwaitingInput { pending_text } => InteractionView::Typing(pending_text),
            InteractionState::ShowingAnswer { answer: None, .. } => InteractionView::Waiting,
            InteractionState::ShowingAnswer {
                answer: Some(shown),
                ..
            } => InteractionView::Answer(&shown.text),
        }
    }
}
