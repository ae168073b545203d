//! In-memory room relay.
//!
//! [`SimHub`] behaves like the room server a real deployment talks to:
//!
//! - a joining session is sent the stored history as one `all` frame
//! - an `add` is upserted into the history and broadcast to every session,
//!   the sender included (this is the echo the sender's reconciler merges)
//! - an `update` for a known id replaces it and is broadcast; updates for
//!   unknown ids are ignored
//! - `all` frames from sessions are ignored
//!
//! The hub performs no I/O. Callers fan broadcast frames out to
//! [`SimHub::sessions`] themselves, which lets tests choose delivery timing.

use std::collections::BTreeSet;

use chatwho_core::{Frame, Message, ProtocolError, Transcript, env::Environment};

/// Identifier of a joined session.
pub type SessionId = u64;

/// In-memory room relay.
#[derive(Debug, Clone)]
pub struct SimHub<E: Environment> {
    env: E,
    history: Transcript,
    sessions: BTreeSet<SessionId>,
    next_session: SessionId,
}

impl<E: Environment> SimHub<E> {
    /// Create an empty room.
    pub fn new(env: E) -> Self {
        Self { env, history: Transcript::new(), sessions: BTreeSet::new(), next_session: 0 }
    }

    /// Create a room with existing history.
    pub fn with_history(env: E, messages: Vec<Message>) -> Self {
        let mut hub = Self::new(env);
        hub.history.reset(messages);
        hub
    }

    /// Register a session. Returns its id and the catch-up frame for it.
    pub fn join(&mut self) -> (SessionId, Frame) {
        let session = self.next_session;
        self.next_session += 1;
        self.sessions.insert(session);
        tracing::debug!(session, history = self.history.len(), "session joined");

        (session, Frame::All { messages: self.history.as_slice().to_vec() })
    }

    /// Unregister a session.
    pub fn leave(&mut self, session: SessionId) {
        if self.sessions.remove(&session) {
            tracing::debug!(session, "session left");
        }
    }

    /// Joined sessions, in join order.
    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.iter().copied()
    }

    /// Stored history.
    pub fn history(&self) -> &Transcript {
        &self.history
    }

    /// Handle a frame from `from`. Returns the frame to broadcast, if any.
    pub fn receive(&mut self, from: SessionId, frame: Frame) -> Option<Frame> {
        match frame {
            Frame::Add(message) => {
                self.history.upsert(message.clone());
                Some(Frame::Add(message))
            },
            Frame::Update(message) => match self.history.replace(message.clone()) {
                Ok(_) => Some(Frame::Update(message)),
                Err(_) => {
                    tracing::debug!(session = from, id = %message.id, "ignored update for unknown id");
                    None
                },
            },
            Frame::All { .. } => {
                tracing::warn!(session = from, "ignored sync frame from session");
                None
            },
        }
    }

    /// Decode and handle a raw text frame from `from`.
    pub fn receive_raw(&mut self, from: SessionId, raw: &str) -> Result<Option<Frame>, ProtocolError> {
        let frame = Frame::decode(raw)?;
        Ok(self.receive(from, frame))
    }

    /// Rewrite the content of a stored message. Returns the update to
    /// broadcast, or `None` if `id` is unknown.
    pub fn edit(&mut self, id: &str, content: impl Into<String>) -> Option<Frame> {
        let mut message = self.history.get(id)?.clone();
        message.content = content.into();
        self.history.replace(message.clone()).ok()?;
        Some(Frame::Update(message))
    }

    /// Post an assistant message. Returns the `add` to broadcast.
    pub fn post(&mut self, user: impl Into<String>, content: impl Into<String>) -> Frame {
        let id = self.env.new_id(Some(chatwho_core::env::MESSAGE_ID_LEN));
        let message = Message::assistant(id, content, user);
        self.history.upsert(message.clone());
        Frame::Add(message)
    }
}
