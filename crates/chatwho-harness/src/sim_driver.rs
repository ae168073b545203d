//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`chatwho_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use chatwho_app::{App, AppEvent, Driver, RoomCode};
use chatwho_core::{Frame, env::Environment};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sim driver: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Debug, Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    incoming_frames: VecDeque<String>,
    outgoing_frames: Vec<Frame>,
    connected_room: Option<RoomCode>,
    fail_connect: bool,
    fail_sends: bool,
    renders: usize,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share state, so a test can keep a handle for injection and
/// inspection while the runtime owns another.
#[derive(Debug, Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::expect_used)]
    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().expect("invariant: driver lock is never held across a panic")
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.state().pending_events.push_back(event);
    }

    /// Inject a frame from the channel.
    pub fn inject_frame(&self, frame: &Frame) {
        self.inject_raw(frame.encode());
    }

    /// Inject raw text from the channel.
    pub fn inject_raw(&self, raw: impl Into<String>) {
        self.state().incoming_frames.push_back(raw.into());
    }

    /// Make subsequent `connect` calls fail.
    pub fn fail_connect(&self, fail: bool) {
        self.state().fail_connect = fail;
    }

    /// Make subsequent `send_frame` calls fail.
    pub fn fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    /// Take all captured outgoing frames.
    pub fn take_outgoing(&self) -> Vec<Frame> {
        std::mem::take(&mut self.state().outgoing_frames)
    }

    /// Check if there are pending events or frames to process.
    pub fn has_pending(&self) -> bool {
        let state = self.state();
        !state.pending_events.is_empty() || !state.incoming_frames.is_empty()
    }

    /// Room the driver is connected to.
    pub fn connected_room(&self) -> Option<RoomCode> {
        self.state().connected_room.clone()
    }

    /// Number of render calls.
    pub fn renders(&self) -> usize {
        self.state().renders
    }

    /// True once `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.state().pending_events.pop_front())
    }

    async fn send_frame(&mut self, frame: Frame) -> Result<(), Self::Error> {
        let mut state = self.state();
        if state.fail_sends {
            return Err(SimDriverError("channel closed".into()));
        }
        state.outgoing_frames.push(frame);
        Ok(())
    }

    async fn recv_frame(&mut self) -> Option<String> {
        self.state().incoming_frames.pop_front()
    }

    async fn connect(&mut self, room: &RoomCode) -> Result<(), Self::Error> {
        let mut state = self.state();
        if state.fail_connect {
            return Err(SimDriverError(format!("room {room} unreachable")));
        }
        state.connected_room = Some(room.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().connected_room.is_some()
    }

    fn render<E: Environment>(&mut self, _app: &App<E>) -> Result<(), Self::Error> {
        self.state().renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.connected_room = None;
        state.stopped = true;
    }
}
