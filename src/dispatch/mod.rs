// Off-loop question answering: service seam, HTTP client, result channel

mod dispatcher;
mod service;

pub use dispatcher::AnswerDispatcher;
pub use service::{AnswerService, HttpAnswerService, NO_ANSWER_TEXT};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;


/// Identifier tagging a dispatched query and its result.
///
/// UUIDv7, minted by the dispatcher that issued the request, so ids from the
/// synthesis and manual channels never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a dispatched query ended
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    Answered(String),
    /// Fixed human-readable error text; details are logged, not shown
    Failed(String),
}

/// Exactly one of these is delivered per submitted request
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchResult {
    pub request_id: RequestId,
    pub outcome: DispatchOutcome,
}

impl DispatchResult {
    pub fn answered(request_id: RequestId, answer: impl Into<String>) -> Self {
        Self {
            request_id,
            outcome: DispatchOutcome::Answered(answer.into()),
        }
    }

    pub fn failed(request_id: RequestId, error_text: impl Into<String>) -> Self {
        Self {
            request_id,
            outcome: DispatchOutcome::Failed(error_text.into()),
        }
    }

    /// Text to put on screen, answer or error alike
    pub fn text(&self) -> &str {
        match &self.outcome {
            DispatchOutcome::Answered(text) | DispatchOutcome::Failed(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Failed(_))
    }
}
