//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding frames from the wire.
///
/// Every variant is recoverable at the session level: the offending frame is
/// dropped and the next one is processed normally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame text is not a JSON object.
    #[error("invalid JSON frame: {0}")]
    Json(String),

    /// Byte frame is not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    /// Frame has no string `type` tag.
    #[error("frame has no type tag")]
    MissingFrameType,

    /// Frame `type` tag is not one of `add`, `update`, `all`.
    #[error("unknown frame type: {0:?}")]
    UnknownFrameType(String),

    /// A required message field is missing or has the wrong shape.
    #[error("malformed message: field `{field}` {reason}")]
    MalformedMessage {
        /// Path of the offending field (e.g. `content` or `messages[2].id`).
        field: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl ProtocolError {
    /// Returns true if the frame was well-formed JSON but carried bad data.
    ///
    /// Distinguishes a misbehaving peer (bad fields, unknown tags) from a
    /// transport that delivered garbage.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Self::MissingFrameType | Self::UnknownFrameType(_) | Self::MalformedMessage { .. }
        )
    }

    pub(crate) fn malformed(field: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedMessage { field: field.into(), reason }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
