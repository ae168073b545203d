//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The room channel is either a
//! WebSocket or an in-process room.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    time::Duration,
};

use chatwho_app::{App, AppEvent, Driver, KeyInput, RoomCode};
use chatwho_core::{Frame, env::Environment};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;

use crate::{
    server,
    transport::{self, Channel, TransportError},
    ui,
};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel send error.
    #[error("channel send error")]
    ChannelSend,
}

/// Where the room channel goes.
#[derive(Debug, Clone)]
pub enum ChannelTarget {
    /// A room server reached over WebSocket.
    Remote {
        /// Server base URL.
        server: String,
        /// Party (room namespace) on the server.
        party: String,
    },
    /// An in-process room with the built-in assistant.
    InProcess {
        /// Pause between streamed assistant updates.
        stream_delay: Duration,
    },
}

/// Terminal driver implementing the [`Driver`] trait.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    target: ChannelTarget,
    channel: Option<Channel>,
    /// Events raised by the driver itself, delivered before terminal input.
    pending: VecDeque<AppEvent>,
    tick: Duration,
}

impl TerminalDriver {
    /// Input poll timeout; a [`AppEvent::Tick`] is produced when it elapses.
    pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

    /// Create a new terminal driver. Enters raw mode and the alternate screen.
    pub fn new(target: ChannelTarget) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self {
            terminal,
            event_stream,
            target,
            channel: None,
            pending: VecDeque::new(),
            tick: Self::DEFAULT_TICK,
        })
    }

    /// Convert a crossterm key press to `KeyInput`.
    ///
    /// Ctrl-C maps to `Esc` since raw mode swallows the signal.
    fn convert_key(event: KeyEvent) -> Option<KeyInput> {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c' | 'd') => Some(KeyInput::Esc),
                _ => None,
            };
        }

        match event.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn close_channel(&mut self, reason: &str) {
        if let Some(channel) = self.channel.take() {
            channel.stop();
            tracing::info!(reason, "room channel closed");
            self.pending.push_back(AppEvent::Disconnected { reason: reason.to_string() });
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key_event).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(self.tick) => Ok(Some(AppEvent::Tick)),
        }
    }

    async fn send_frame(&mut self, frame: Frame) -> Result<(), Self::Error> {
        let Some(channel) = &self.channel else {
            return Err(TerminalError::ChannelSend);
        };

        if channel.to_server.send(frame.encode()).await.is_err() {
            self.close_channel("connection closed");
            return Err(TerminalError::ChannelSend);
        }
        Ok(())
    }

    async fn recv_frame(&mut self) -> Option<String> {
        let result = self.channel.as_mut()?.from_server.try_recv();
        match result {
            Ok(text) => Some(text),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.close_channel("connection closed");
                None
            },
        }
    }

    async fn connect(&mut self, room: &RoomCode) -> Result<(), Self::Error> {
        if let Some(old) = self.channel.take() {
            old.stop();
        }

        let channel = match &self.target {
            ChannelTarget::Remote { server, party } => {
                transport::connect(&transport::room_url(server, party, room.as_str())).await?
            },
            ChannelTarget::InProcess { stream_delay } => server::spawn_server(*stream_delay),
        };
        self.channel = Some(channel);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_keys_convert() {
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('x'), KeyModifiers::NONE)),
            Some(KeyInput::Char('x'))
        );
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(KeyInput::Char('X'))
        );
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Enter, KeyModifiers::NONE)),
            Some(KeyInput::Enter)
        );
        assert_eq!(TerminalDriver::convert_key(press(KeyCode::Tab, KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyInput::Esc)
        );
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            None
        );
    }
}
