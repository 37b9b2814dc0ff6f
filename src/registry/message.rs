use crate::dispatch::RequestId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message on screen for one label
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayMessage {
    /// Label identity; at most one live message per key
    pub key: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// What a text builder hands back to the registry
#[derive(Clone, Debug, PartialEq)]
pub enum MessageText {
    /// Text known now; the message goes live immediately
    Ready(String),
    /// Text will arrive with the result of this request
    Pending(RequestId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Reserved,
    /// A live or pending entry already holds the label
    Existing,
    /// The builder declined to produce text
    Skipped,
}
