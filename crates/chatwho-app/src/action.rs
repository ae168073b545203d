//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use chatwho_proto::Frame;

use crate::RoomCode;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Open the room channel.
    Connect {
        /// Room to join.
        room: RoomCode,
    },

    /// Send a frame on the room channel.
    SendFrame(Frame),
}
