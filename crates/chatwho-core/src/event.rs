//! Reconciler events and actions.

use chatwho_proto::Frame;

use crate::Change;

/// Events the caller feeds into the reconciler.
///
/// The caller is responsible for:
/// - Forwarding user input (submit a message)
/// - Delivering frames from the room channel in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerEvent {
    /// User submitted a message.
    Submit {
        /// Message text, sent verbatim.
        content: String,
        /// Display name of the session user.
        user: String,
    },

    /// Decoded frame received from the channel.
    FrameReceived(Frame),

    /// Raw text frame received from the channel.
    RawReceived(String),
}

/// Severity of a [`ReconcilerAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Routine detail.
    Debug,
    /// Notable but expected.
    Info,
    /// Something was dropped.
    Warn,
}

/// Actions the reconciler produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerAction {
    /// Send a frame on the room channel (fire-and-forget).
    Send(Frame),

    /// The transcript changed; renderers should refresh.
    Changed(Change),

    /// Diagnostic for the caller's log.
    Log {
        /// Severity.
        level: LogLevel,
        /// Log message.
        message: String,
    },
}
