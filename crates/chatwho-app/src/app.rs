//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of a chat session completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the room's [`Reconciler`] and feeds it typed and received messages.
//! - Edits the input line and scroll position from key presses.
//! - Stores terminal dimensions to handle resize events.
//! - Tracks connection state and a status line for UI feedback.

use chatwho_core::{
    Change, LogLevel, Reconciler, ReconcilerAction, ReconcilerConfig, Transcript,
    env::Environment,
};

use crate::{AppAction, AppEvent, ConnectionState, InputLine, KeyInput, RoomCode};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App<E: Environment> {
    /// Connection state.
    state: ConnectionState,
    /// Transcript reconciliation for the joined room.
    reconciler: Reconciler<E>,
    /// Joined room.
    room: RoomCode,
    /// Display name attached to submitted messages.
    user: String,
    /// Line being typed.
    input: InputLine,
    /// Messages scrolled back from the newest. 0 follows the tail.
    scroll: usize,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl<E: Environment> App<E> {
    /// Create an App for `room`, posting as `user`.
    pub fn new(env: E, room: RoomCode, user: impl Into<String>, config: ReconcilerConfig) -> Self {
        let reconciler = Reconciler::new(env, room.as_str(), config);
        Self {
            state: ConnectionState::Disconnected,
            reconciler,
            room,
            user: user.into(),
            input: InputLine::default(),
            scroll: 0,
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Connecting => {
                self.state = ConnectionState::Connecting;
                vec![AppAction::Render]
            },
            AppEvent::Connected => {
                self.state = ConnectionState::Connected;
                self.status_message = Some(format!("Joined room {}", self.room));
                vec![AppAction::Render]
            },
            AppEvent::Disconnected { reason } => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some(format!("Disconnected: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::FrameReceived(raw) => self.receive(&raw),
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Enter => return self.submit(),
            KeyInput::Esc => return self.quit(),
            KeyInput::Char(c) => self.input.insert(c),
            KeyInput::Backspace => self.input.backspace(),
            KeyInput::Delete => self.input.delete(),
            KeyInput::Left => self.input.left(),
            KeyInput::Right => self.input.right(),
            KeyInput::Home => self.input.home(),
            KeyInput::End => self.input.end(),
            KeyInput::Up => {
                let max = self.reconciler.transcript().len().saturating_sub(1);
                self.scroll = (self.scroll + 1).min(max);
            },
            KeyInput::Down => self.scroll = self.scroll.saturating_sub(1),
        }
        vec![AppAction::Render]
    }

    /// Submit the input line as a message.
    ///
    /// Blank input is ignored. Otherwise the text is sent verbatim, the line
    /// is cleared and the view jumps back to the newest message.
    fn submit(&mut self) -> Vec<AppAction> {
        if self.input.as_str().trim().is_empty() {
            return vec![];
        }

        let content = self.input.take();
        self.scroll = 0;
        let submission = self.reconciler.submit(content, self.user.clone());
        self.apply_reconciler_actions(submission.actions)
    }

    fn receive(&mut self, raw: &str) -> Vec<AppAction> {
        match self.reconciler.receive(raw) {
            Ok(actions) => self.apply_reconciler_actions(actions),
            Err(err) => {
                self.status_message = Some(format!("Dropped frame: {err}"));
                vec![AppAction::Render]
            },
        }
    }

    fn apply_reconciler_actions(&mut self, actions: Vec<ReconcilerAction>) -> Vec<AppAction> {
        let mut out = Vec::new();
        let mut changed = false;

        for action in actions {
            match action {
                ReconcilerAction::Send(frame) => out.push(AppAction::SendFrame(frame)),
                ReconcilerAction::Changed(change) => {
                    changed = true;
                    self.pin_scroll(change);
                },
                ReconcilerAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!(room = %self.room, "{message}"),
                    LogLevel::Info => tracing::info!(room = %self.room, "{message}"),
                    LogLevel::Warn => tracing::warn!(room = %self.room, "{message}"),
                },
            }
        }

        if changed {
            out.push(AppAction::Render);
        }
        out
    }

    /// Keep a scrolled-back view on the same message as the transcript grows.
    fn pin_scroll(&mut self, change: Change) {
        if self.scroll == 0 {
            return;
        }
        if matches!(change, Change::Appended { .. }) {
            self.scroll += 1;
        }
        self.scroll = self.scroll.min(self.reconciler.transcript().len().saturating_sub(1));
    }

    /// Initiate connection to the room channel.
    pub fn connect(&mut self) -> Vec<AppAction> {
        self.state = ConnectionState::Connecting;
        vec![AppAction::Connect { room: self.room.clone() }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Joined room.
    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    /// Display name of the session user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Room transcript in display order.
    pub fn transcript(&self) -> &Transcript {
        self.reconciler.transcript()
    }

    /// Underlying reconciler.
    pub fn reconciler(&self) -> &Reconciler<E> {
        &self.reconciler
    }

    /// Input line.
    pub fn input(&self) -> &InputLine {
        &self.input
    }

    /// Text typed so far.
    pub fn input_buffer(&self) -> &str {
        self.input.as_str()
    }

    /// Cursor position in the input line (chars).
    pub fn input_cursor(&self) -> usize {
        self.input.cursor()
    }

    /// Messages scrolled back from the newest.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
