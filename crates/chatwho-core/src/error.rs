//! Reconciler error types.

use chatwho_proto::ProtocolError;
use thiserror::Error;

/// Errors surfaced by [`crate::Reconciler::handle`].
///
/// None of these are fatal to the session: the transcript is left exactly as
/// it was before the failing event and the next event is processed normally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Received frame could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
