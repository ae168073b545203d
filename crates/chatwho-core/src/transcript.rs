//! Ordered, unique-by-id message transcript.
//!
//! Insertion order is display order. An id index sits alongside the ordered
//! list so membership and position lookups are O(1) regardless of how long
//! the room history grows.

use std::{collections::HashMap, slice};

use chatwho_proto::Message;

/// How a transcript mutation changed the visible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A new message was appended at `index` (always the last position).
    Appended {
        /// Position of the new message.
        index: usize,
    },
    /// The message at `index` was replaced in place.
    Replaced {
        /// Position of the replaced message.
        index: usize,
    },
    /// The whole transcript was replaced.
    Reset {
        /// Number of messages after the reset.
        len: usize,
    },
}

/// Ordered list of messages, unique by id.
///
/// # Invariants
///
/// - At most one message per id.
/// - `index[m.id] == i` for every message `m` at position `i`, and the index
///   holds no other entries.
/// - In-place replacement never moves a message; only appends and resets
///   change positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    index: HashMap<String, usize>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from an ordered list (see [`Transcript::reset`]).
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut transcript = Self::new();
        transcript.reset(messages);
        transcript
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in display order.
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate messages in display order.
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Position of the message with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// True if a message with `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Message with `id`.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.position(id).and_then(|i| self.messages.get(i))
    }

    /// Append `message`, or replace the entry with the same id in place.
    pub fn upsert(&mut self, message: Message) -> Change {
        if let Some(index) = self.position(&message.id) {
            self.messages[index] = message;
            return Change::Replaced { index };
        }

        let index = self.messages.len();
        self.index.insert(message.id.clone(), index);
        self.messages.push(message);
        Change::Appended { index }
    }

    /// Replace the entry with the same id in place.
    ///
    /// Hands the message back if its id is unknown.
    pub fn replace(&mut self, message: Message) -> Result<usize, Message> {
        match self.position(&message.id) {
            Some(index) => {
                self.messages[index] = message;
                Ok(index)
            },
            None => Err(message),
        }
    }

    /// Replace the whole transcript with `messages`, in the given order.
    ///
    /// If `messages` repeats an id, the first occurrence fixes the position
    /// and the last occurrence's fields win. Returns the new length.
    pub fn reset(&mut self, messages: Vec<Message>) -> usize {
        self.messages.clear();
        self.index.clear();
        self.messages.reserve(messages.len());

        for message in messages {
            self.upsert(message);
        }
        self.messages.len()
    }

    /// Consume the transcript, returning the ordered messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Check the id index against the ordered list.
    ///
    /// Always true for a transcript mutated only through this API; exposed
    /// for simulation invariants.
    pub fn is_consistent(&self) -> bool {
        self.index.len() == self.messages.len()
            && self.messages.iter().enumerate().all(|(i, m)| self.index.get(&m.id) == Some(&i))
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
