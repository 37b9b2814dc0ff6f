// Transient per-label display messages (detection overlays)

mod message;

pub use message::{DisplayMessage, MessageText, UpsertOutcome};

use crate::dispatch::RequestId;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;


enum Entry {
    /// Label reserved while its text is being synthesized. Not visible, not
    /// subject to TTL.
    Pending(RequestId),
    Live(DisplayMessage),
}

struct Slot {
    label: String,
    entry: Entry,
}

/// Holds at most one message per label, in insertion order.
///
/// Slots live in a `Vec` with linear lookup; their order is the on-screen
/// stacking order. All mutation goes through `&mut self`.
pub struct MessageRegistry {
    ttl: Duration,
    slots: Vec<Slot>,
}

impl MessageRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Vec::new(),
        }
    }

    /// Insert a message for `label` unless one is already live or pending.
    ///
    /// `build` runs only when the label is free. Returning `None` skips the
    /// insert, leaving the label free for a later frame. An existing entry is
    /// never refreshed.
    pub fn upsert<F>(&mut self, label: &str, now: DateTime<Utc>, build: F) -> UpsertOutcome
    where
        F: FnOnce() -> Option<MessageText>,
    {
        if self.position(label).is_some() {
            return UpsertOutcome::Existing;
        }

        let entry = match build() {
            Some(MessageText::Ready(text)) => Entry::Live(DisplayMessage {
                key: label.to_string(),
                text,
                created_at: now,
            }),
            Some(MessageText::Pending(request_id)) => Entry::Pending(request_id),
            None => return UpsertOutcome::Skipped,
        };

        let outcome = match entry {
            Entry::Live(_) => UpsertOutcome::Inserted,
            Entry::Pending(_) => UpsertOutcome::Reserved,
        };
        debug!(label = %label, outcome = ?outcome, "Message upserted");

        self.slots.push(Slot {
            label: label.to_string(),
            entry,
        });
        outcome
    }

    /// Complete a pending entry. The message goes live at `now` and starts its
    /// TTL. Returns false (and changes nothing) when `label` is not pending on
    /// `request_id`.
    pub fn resolve(
        &mut self,
        label: &str,
        request_id: RequestId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(index) = self.position(label) else {
            return false;
        };
        let slot = &mut self.slots[index];
        match slot.entry {
            Entry::Pending(pending) if pending == request_id => {
                slot.entry = Entry::Live(DisplayMessage {
                    key: slot.label.clone(),
                    text: text.into(),
                    created_at: now,
                });
                true
            }
            _ => false,
        }
    }

    /// Drop live messages whose TTL has elapsed. Returns how many were removed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.slots.len();
        self.slots.retain(|slot| match &slot.entry {
            Entry::Live(message) => now - message.created_at < ttl,
            Entry::Pending(_) => true,
        });
        let removed = before - self.slots.len();
        if removed > 0 {
            debug!(removed, "Expired messages removed");
        }
        removed
    }

    /// Live messages in insertion order
    pub fn active_messages(&self) -> Vec<&DisplayMessage> {
        self.slots
            .iter()
            .filter_map(|slot| match &slot.entry {
                Entry::Live(message) => Some(message),
                Entry::Pending(_) => None,
            })
            .collect()
    }

    pub fn get(&self, label: &str) -> Option<&DisplayMessage> {
        self.position(label)
            .and_then(|index| match &self.slots[index].entry {
                Entry::Live(message) => Some(message),
                Entry::Pending(_) => None,
            })
    }

    /// True when `label` has a live or pending entry
    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.entry, Entry::Pending(_)))
            .count()
    }

    /// Live and pending entries
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.label == label)
    }
}
