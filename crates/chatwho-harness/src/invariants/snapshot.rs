//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use chatwho_core::{Message, Transcript};

/// Snapshot of the hub and every client.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Hub history in order.
    pub hub: Vec<Message>,
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no hub history, no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if no client has undelivered frames.
    pub fn is_quiescent(&self) -> bool {
        self.clients.iter().all(|c| c.pending_frames == 0)
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client index in the world.
    pub id: usize,
    /// Transcript in display order.
    pub messages: Vec<Message>,
    /// Whether the transcript's id index matched its positions.
    pub index_consistent: bool,
    /// Frames queued for this client but not delivered yet.
    pub pending_frames: usize,
}

impl ClientSnapshot {
    /// Capture a client transcript.
    pub fn capture(id: usize, transcript: &Transcript, pending_frames: usize) -> Self {
        Self {
            id,
            messages: transcript.as_slice().to_vec(),
            index_consistent: transcript.is_consistent(),
            pending_frames,
        }
    }
}
