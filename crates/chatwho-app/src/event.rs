//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Channel notifications from the driver.

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Connection in progress.
    Connecting,

    /// Room channel open.
    Connected,

    /// Room channel closed.
    Disconnected {
        /// Why the channel closed.
        reason: String,
    },

    /// Raw text frame received on the room channel.
    FrameReceived(String),

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
