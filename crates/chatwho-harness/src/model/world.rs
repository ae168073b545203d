//! Simulated room with several clients.

use std::collections::VecDeque;

use chatwho_app::pick_name;
use chatwho_core::{
    Frame, Message, Reconciler, ReconcilerAction, ReconcilerConfig, Transcript,
};

use super::Operation;
use crate::{
    SessionId, SimEnv, SimHub,
    invariants::{ClientSnapshot, SystemSnapshot},
};

/// One simulated participant.
#[derive(Debug, Clone)]
pub struct SimClient {
    session: SessionId,
    user: String,
    reconciler: Reconciler<SimEnv>,
    /// Encoded frames sent by the hub, not yet delivered.
    inbox: VecDeque<String>,
}

impl SimClient {
    /// Hub session of this client.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Display name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Client transcript.
    pub fn transcript(&self) -> &Transcript {
        self.reconciler.transcript()
    }

    /// Client reconciler.
    pub fn reconciler(&self) -> &Reconciler<SimEnv> {
        &self.reconciler
    }

    /// Number of undelivered frames.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

/// Hub plus clients with explicit delivery.
#[derive(Debug, Clone)]
pub struct SimWorld {
    env: SimEnv,
    config: ReconcilerConfig,
    hub: SimHub<SimEnv>,
    clients: Vec<SimClient>,
    rejected_frames: u64,
}

impl SimWorld {
    /// Create a world of `num_clients` (at least one) joined clients.
    pub fn new(num_clients: usize, seed: u64) -> Self {
        Self::with_config(num_clients, seed, ReconcilerConfig::default())
    }

    /// Create a world whose clients use `config`.
    pub fn with_config(num_clients: usize, seed: u64, config: ReconcilerConfig) -> Self {
        let env = SimEnv::with_seed(seed);
        let hub = SimHub::new(env.clone());
        let mut world = Self { env, config, hub, clients: Vec::new(), rejected_frames: 0 };

        for _ in 0..num_clients.max(1) {
            let client = world.join_client(pick_name(&world.env).to_owned());
            world.clients.push(client);
        }
        world
    }

    fn join_client(&mut self, user: String) -> SimClient {
        let (session, catch_up) = self.hub.join();
        let reconciler = Reconciler::new(self.env.clone(), "sim", self.config.clone());
        SimClient { session, user, reconciler, inbox: VecDeque::from([catch_up.encode()]) }
    }

    /// Apply an operation.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Submit { client_id, content } => {
                let index = self.client_index(*client_id);
                self.submit(index, content.to_content());
            },
            Operation::Deliver { client_id, count } => {
                let index = self.client_index(*client_id);
                self.deliver(index, usize::from(*count));
            },
            Operation::DeliverAll => self.deliver_all(),
            Operation::Edit { pick, content } => {
                let len = self.hub.history().len();
                if len > 0 {
                    self.edit(usize::from(*pick) % len, content.to_content());
                }
            },
            Operation::Post { content } => self.post(content.to_content()),
            Operation::Rejoin { client_id } => {
                let index = self.client_index(*client_id);
                self.rejoin(index);
            },
            Operation::Garbage { client_id, bytes } => {
                // Bytes that happen to decode would be a forged frame, not garbage
                let raw = String::from_utf8_lossy(bytes).into_owned();
                if Frame::decode(&raw).is_err() {
                    let index = self.client_index(*client_id);
                    self.inject_raw(index, raw);
                }
            },
        }
    }

    fn client_index(&self, client_id: u8) -> usize {
        usize::from(client_id) % self.clients.len()
    }

    /// Submit `content` from client `index`. The frame reaches the hub
    /// immediately; the echo is queued like any other broadcast.
    pub fn submit(&mut self, index: usize, content: impl Into<String>) -> Option<Message> {
        let client = self.clients.get_mut(index)?;
        let session = client.session;
        let submission = client.reconciler.submit(content, client.user.clone());

        for action in submission.actions {
            if let ReconcilerAction::Send(frame) = action {
                self.hub_receive(session, &frame.encode());
            }
        }
        Some(submission.message)
    }

    fn hub_receive(&mut self, session: SessionId, raw: &str) {
        match self.hub.receive_raw(session, raw) {
            Ok(Some(broadcast)) => self.broadcast(&broadcast),
            Ok(None) => {},
            Err(e) => tracing::warn!(session, error = %e, "hub rejected frame"),
        }
    }

    fn broadcast(&mut self, frame: &Frame) {
        let raw = frame.encode();
        let sessions: Vec<_> = self.hub.sessions().collect();
        for client in &mut self.clients {
            if sessions.contains(&client.session) {
                client.inbox.push_back(raw.clone());
            }
        }
    }

    /// Deliver up to `count` queued frames to client `index`. Returns how
    /// many were delivered.
    pub fn deliver(&mut self, index: usize, count: usize) -> usize {
        let Some(client) = self.clients.get_mut(index) else {
            return 0;
        };

        let mut delivered = 0;
        while delivered < count {
            let Some(raw) = client.inbox.pop_front() else {
                break;
            };
            delivered += 1;
            if client.reconciler.receive(&raw).is_err() {
                self.rejected_frames += 1;
            }
        }
        delivered
    }

    /// Deliver every queued frame to every client.
    pub fn deliver_all(&mut self) {
        for index in 0..self.clients.len() {
            self.deliver(index, usize::MAX);
        }
    }

    /// Hub-side edit of the message at history position `pick`.
    pub fn edit(&mut self, pick: usize, content: impl Into<String>) {
        let Some(id) = self.hub.history().as_slice().get(pick).map(|m| m.id.clone()) else {
            return;
        };
        if let Some(update) = self.hub.edit(&id, content) {
            self.broadcast(&update);
        }
    }

    /// Hub-side assistant message.
    pub fn post(&mut self, content: impl Into<String>) {
        let frame = self.hub.post("Assistant", content);
        self.broadcast(&frame);
    }

    /// Replace client `index` with a fresh session under the same name.
    pub fn rejoin(&mut self, index: usize) {
        let Some(old) = self.clients.get(index) else {
            return;
        };
        let (session, user) = (old.session, old.user.clone());

        self.hub.leave(session);
        let client = self.join_client(user);
        self.clients[index] = client;
    }

    /// Queue a raw frame for client `index`.
    pub fn inject_raw(&mut self, index: usize, raw: String) {
        if let Some(client) = self.clients.get_mut(index) {
            client.inbox.push_back(raw);
        }
    }

    /// Observable state for invariant checks.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            hub: self.hub.history().as_slice().to_vec(),
            clients: self
                .clients
                .iter()
                .enumerate()
                .map(|(i, c)| ClientSnapshot::capture(i, c.transcript(), c.pending()))
                .collect(),
        }
    }

    /// The relay.
    pub fn hub(&self) -> &SimHub<SimEnv> {
        &self.hub
    }

    /// All clients.
    pub fn clients(&self) -> &[SimClient] {
        &self.clients
    }

    /// Frames clients rejected as malformed.
    pub fn rejected_frames(&self) -> u64 {
        self.rejected_frames
    }
}
