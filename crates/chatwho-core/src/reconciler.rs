//! Transcript reconciliation state machine.
//!
//! The [`Reconciler`] owns the transcript of one joined room. Local input is
//! appended optimistically before any network round-trip; frames arriving
//! from the channel are then merged by message id:
//!
//! - `add` with an unseen id appends (a message from someone else)
//! - `add` with a known id replaces in place (the relay echoing our own
//!   optimistic append, or a duplicate delivery)
//! - `update` replaces a known id in place; unknown ids follow
//!   [`OrphanUpdatePolicy`]
//! - `all` replaces the whole transcript, dropping optimistic entries the
//!   relay does not know about
//!
//! Frames are applied one at a time, fully, in delivery order. There is no
//! buffering or reordering beyond the optional orphan-update buffer.

use std::collections::VecDeque;

use chatwho_proto::{Frame, Message, ProtocolError};

use crate::{
    Change, LogLevel, ReconcileError, ReconcilerAction, ReconcilerEvent, Transcript,
    env::{Environment, MESSAGE_ID_LEN},
};

/// What to do with an `update` whose id is not in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanUpdatePolicy {
    /// Drop the update (logged). Tolerates update-before-add delivery at the
    /// cost of losing the edit.
    Drop,
    /// Hold up to `limit` updates (latest per id, oldest evicted first) and
    /// apply one on top of the matching `add` when it arrives.
    Buffer {
        /// Maximum number of held updates.
        limit: usize,
    },
}

/// Reconciler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Handling of updates for unknown ids.
    pub orphan_updates: OrphanUpdatePolicy,
    /// Length of locally generated message ids.
    pub id_len: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self { orphan_updates: OrphanUpdatePolicy::Drop, id_len: MESSAGE_ID_LEN }
    }
}

/// Running counters, for status displays and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilerStats {
    /// Frames applied (decoded successfully).
    pub frames_applied: u64,
    /// Frames rejected by the decoder.
    pub frames_rejected: u64,
    /// `add` frames for an unseen id.
    pub remote_appends: u64,
    /// `add` frames merged into an existing entry.
    pub echoes_merged: u64,
    /// Updates applied in place (including buffered ones).
    pub updates_applied: u64,
    /// Updates buffered for an unknown id.
    pub updates_buffered: u64,
    /// Updates dropped (unknown id, evicted, or discarded by a sync).
    pub updates_dropped: u64,
    /// Full `all` replacements.
    pub syncs: u64,
}

/// Result of [`Reconciler::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The optimistically appended message.
    pub message: Message,
    /// Actions for the caller: the transcript change and the `add` frame.
    pub actions: Vec<ReconcilerAction>,
}

/// Per-room transcript reconciler.
///
/// Pure state machine: no I/O, no async. The room is fixed for the lifetime
/// of the reconciler; joining another room means building a new one.
#[derive(Debug, Clone)]
pub struct Reconciler<E: Environment> {
    env: E,
    room: String,
    config: ReconcilerConfig,
    transcript: Transcript,
    /// Orphan updates waiting for their `add`. Oldest first.
    pending_updates: VecDeque<Message>,
    stats: ReconcilerStats,
}

impl<E: Environment> Reconciler<E> {
    /// Create a reconciler for `room` with an empty transcript.
    pub fn new(env: E, room: impl Into<String>, config: ReconcilerConfig) -> Self {
        Self {
            env,
            room: room.into(),
            config,
            transcript: Transcript::new(),
            pending_updates: VecDeque::new(),
            stats: ReconcilerStats::default(),
        }
    }

    /// Room this reconciler belongs to.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Current transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Configuration in use.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Counters since creation.
    pub fn stats(&self) -> ReconcilerStats {
        self.stats
    }

    /// Number of buffered orphan updates.
    pub fn pending_updates(&self) -> usize {
        self.pending_updates.len()
    }

    /// Process an event and return actions.
    pub fn handle(
        &mut self,
        event: ReconcilerEvent,
    ) -> Result<Vec<ReconcilerAction>, ReconcileError> {
        match event {
            ReconcilerEvent::Submit { content, user } => Ok(self.submit(content, user).actions),
            ReconcilerEvent::FrameReceived(frame) => Ok(self.apply(frame)),
            ReconcilerEvent::RawReceived(raw) => Ok(self.receive(&raw)?),
        }
    }

    /// Append a locally typed message and produce its `add` frame.
    ///
    /// The transcript grows by one entry before this returns; the caller
    /// sends the frame afterwards and a failed send never rolls the append
    /// back.
    pub fn submit(&mut self, content: impl Into<String>, user: impl Into<String>) -> Submission {
        let mut id = self.env.new_id(Some(self.config.id_len));
        while self.transcript.contains(&id) {
            id = self.env.new_id(Some(self.config.id_len));
        }
        let message = Message::user(id, content, user);
        let change = self.transcript.upsert(message.clone());

        tracing::debug!(room = %self.room, id = %message.id, "optimistic append");

        let actions =
            vec![ReconcilerAction::Changed(change), ReconcilerAction::Send(Frame::Add(message.clone()))];
        Submission { message, actions }
    }

    /// Decode a raw text frame and apply it.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the frame is malformed. The transcript is
    /// untouched in that case and the session continues.
    pub fn receive(&mut self, raw: &str) -> Result<Vec<ReconcilerAction>, ProtocolError> {
        match Frame::decode(raw) {
            Ok(frame) => Ok(self.apply(frame)),
            Err(err) => {
                self.stats.frames_rejected += 1;
                // Unknown frame types are expected from newer servers.
                if err.is_semantic() {
                    tracing::info!(room = %self.room, error = %err, "rejected frame");
                } else {
                    tracing::warn!(room = %self.room, error = %err, "undecodable frame");
                }
                Err(err)
            },
        }
    }

    /// Apply a decoded frame.
    pub fn apply(&mut self, frame: Frame) -> Vec<ReconcilerAction> {
        self.stats.frames_applied += 1;
        tracing::debug!(room = %self.room, kind = %frame.kind(), "applying frame");

        match frame {
            Frame::Add(message) => self.apply_add(message),
            Frame::Update(message) => self.apply_update(message),
            Frame::All { messages } => self.apply_all(messages),
        }
    }

    fn apply_add(&mut self, message: Message) -> Vec<ReconcilerAction> {
        let id = message.id.clone();
        let change = self.transcript.upsert(message);
        match change {
            Change::Appended { .. } => self.stats.remote_appends += 1,
            Change::Replaced { .. } => self.stats.echoes_merged += 1,
            Change::Reset { .. } => {},
        }

        let mut actions = vec![ReconcilerAction::Changed(change)];

        if let Some(update) = self.take_pending(&id)
            && let Ok(index) = self.transcript.replace(update)
        {
            self.stats.updates_applied += 1;
            actions.push(ReconcilerAction::Changed(Change::Replaced { index }));
            actions.push(ReconcilerAction::Log {
                level: LogLevel::Debug,
                message: format!("Applied buffered update for {id}"),
            });
        }

        actions
    }

    fn apply_update(&mut self, message: Message) -> Vec<ReconcilerAction> {
        match self.transcript.replace(message) {
            Ok(index) => {
                self.stats.updates_applied += 1;
                vec![ReconcilerAction::Changed(Change::Replaced { index })]
            },
            Err(orphan) => self.orphan_update(orphan),
        }
    }

    fn orphan_update(&mut self, message: Message) -> Vec<ReconcilerAction> {
        let limit = match self.config.orphan_updates {
            OrphanUpdatePolicy::Buffer { limit } if limit > 0 => limit,
            OrphanUpdatePolicy::Buffer { .. } | OrphanUpdatePolicy::Drop => {
                self.stats.updates_dropped += 1;
                tracing::debug!(room = %self.room, id = %message.id, "dropped update for unknown id");
                return vec![ReconcilerAction::Log {
                    level: LogLevel::Info,
                    message: format!("Dropped update for unknown message {}", message.id),
                }];
            },
        };

        let mut actions = Vec::new();

        // Latest update per id wins
        self.pending_updates.retain(|pending| pending.id != message.id);

        if self.pending_updates.len() >= limit
            && let Some(evicted) = self.pending_updates.pop_front()
        {
            self.stats.updates_dropped += 1;
            actions.push(ReconcilerAction::Log {
                level: LogLevel::Warn,
                message: format!("Evicted buffered update for {}", evicted.id),
            });
        }

        self.stats.updates_buffered += 1;
        actions.push(ReconcilerAction::Log {
            level: LogLevel::Debug,
            message: format!("Buffered update for unknown message {}", message.id),
        });
        self.pending_updates.push_back(message);

        actions
    }

    fn apply_all(&mut self, messages: Vec<Message>) -> Vec<ReconcilerAction> {
        let len = self.transcript.reset(messages);
        self.stats.syncs += 1;
        tracing::debug!(room = %self.room, len, "transcript replaced");

        let mut actions = vec![ReconcilerAction::Changed(Change::Reset { len })];

        let mut discarded = 0usize;
        for update in std::mem::take(&mut self.pending_updates) {
            match self.transcript.replace(update) {
                Ok(index) => {
                    self.stats.updates_applied += 1;
                    actions.push(ReconcilerAction::Changed(Change::Replaced { index }));
                },
                Err(_) => discarded += 1,
            }
        }

        if discarded > 0 {
            self.stats.updates_dropped += discarded as u64;
            actions.push(ReconcilerAction::Log {
                level: LogLevel::Info,
                message: format!("Discarded {discarded} buffered updates after sync"),
            });
        }

        actions
    }

    fn take_pending(&mut self, id: &str) -> Option<Message> {
        let position = self.pending_updates.iter().position(|pending| pending.id == id)?;
        self.pending_updates.remove(position)
    }
}
