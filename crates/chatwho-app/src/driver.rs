//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use chatwho_core::env::Environment;
use chatwho_proto::Frame;

use crate::{App, AppEvent, RoomCode};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: Uses crossterm for terminal events, WebSocket for the channel
/// - **Simulation**: Queues events and frames in memory
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns an event or `None` if no events are ready.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Send a frame on the room channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is closed or the send fails.
    fn send_frame(&mut self, frame: Frame) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive a raw text frame from the room channel.
    ///
    /// Returns `None` if no frame is ready or the channel is closed.
    fn recv_frame(&mut self) -> impl Future<Output = Option<String>> + Send;

    /// Open the channel for `room`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be opened.
    fn connect(&mut self, room: &RoomCode) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Check if the channel is open.
    fn is_connected(&self) -> bool;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error>;

    /// Close the channel and clean up resources.
    fn stop(&mut self);
}
