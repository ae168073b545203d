//! Protocol frames.
//!
//! A [`Frame`] is one discrete message on a room channel. Frames travel as
//! JSON text objects internally tagged by `"type"`:
//!
//! ```text
//! { "type": "add",    "id", "content", "user", "role" }
//! { "type": "update", "id", "content", "user", "role" }
//! { "type": "all",    "messages": [ { "id", "content", "user", "role" }, ... ] }
//! ```
//!
//! `add` is used both for brand-new messages and for the relay's echo of a
//! message the receiver already appended optimistically. The receiver tells
//! the two apart by whether the id is already known, not by the tag.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{
    Message,
    errors::{ProtocolError, Result},
};

/// Frame tag without the payload, for logging and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// New message or authoritative echo.
    Add,
    /// In-place edit of a known message.
    Update,
    /// Full transcript replacement.
    All,
}

impl FrameKind {
    /// Wire tag of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::All => "all",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol frame exchanged over a room channel.
///
/// # Invariants
///
/// - Every message carried by a decoded frame has a non-empty `id` and all
///   four fields present with the right types. Frames failing this are
///   rejected by [`Frame::decode`] rather than patched up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frame {
    /// Carries one full message: brand-new, or the echo of an optimistic append.
    Add(Message),
    /// Carries one full message whose id is already in the transcript.
    Update(Message),
    /// Carries the full ordered transcript, replacing local state.
    All {
        /// Messages in display order.
        messages: Vec<Message>,
    },
}

impl Frame {
    /// Tag of this frame.
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Add(_) => FrameKind::Add,
            Self::Update(_) => FrameKind::Update,
            Self::All { .. } => FrameKind::All,
        }
    }

    /// Encode the frame as JSON text.
    #[allow(clippy::expect_used)]
    pub fn encode(&self) -> String {
        // INVARIANT: frames hold only strings, a unit enum and a Vec of those,
        // none of which can fail to serialize.
        serde_json::to_string(self).expect("invariant: frame fields always serialize to JSON")
    }

    /// Decode a frame from JSON text.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Json`] if the text is not a JSON object
    /// - [`ProtocolError::MissingFrameType`] if there is no string `type`
    /// - [`ProtocolError::UnknownFrameType`] for unrecognized tags
    /// - [`ProtocolError::MalformedMessage`] for missing or wrongly-typed
    ///   message fields (an `all` frame with one bad entry is rejected whole)
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ProtocolError::Json(format!(
                    "expected a JSON object, got {}",
                    kind_of(&other)
                )));
            },
        };

        let tag = match object.get("type") {
            Some(Value::String(tag)) => tag.as_str(),
            _ => return Err(ProtocolError::MissingFrameType),
        };

        match tag {
            "add" => Ok(Self::Add(Message::from_object(&object, "")?)),
            "update" => Ok(Self::Update(Message::from_object(&object, "")?)),
            "all" => {
                let entries = match object.get("messages") {
                    Some(Value::Array(entries)) => entries,
                    Some(_) => {
                        return Err(ProtocolError::malformed("messages", "is not an array"));
                    },
                    None => return Err(ProtocolError::malformed("messages", "is missing")),
                };

                let messages = entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        let path = format!("messages[{i}]");
                        match entry {
                            Value::Object(fields) => Message::from_object(fields, &path),
                            _ => Err(ProtocolError::malformed(path, "is not an object")),
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(Self::All { messages })
            },
            other => Err(ProtocolError::UnknownFrameType(other.to_owned())),
        }
    }

    /// Decode a frame from raw bytes holding UTF-8 JSON.
    ///
    /// Some channels deliver text frames as binary payloads.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(Self::text_from_bytes(bytes)?)
    }

    /// View a binary payload as frame text without decoding it.
    pub fn text_from_bytes(bytes: &[u8]) -> Result<&str> {
        std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_frame_puts_tag_first() {
        let frame = Frame::Add(Message::user("k3Jd9x0a", "hi", "Alice"));
        insta::assert_snapshot!(
            frame.encode(),
            @r#"{"type":"add","id":"k3Jd9x0a","content":"hi","user":"Alice","role":"user"}"#
        );
    }

    #[test]
    fn all_frame_encodes_messages_in_order() {
        let frame = Frame::All {
            messages: vec![Message::user("a", "one", "Ann"), Message::assistant("b", "two", "AI")],
        };
        insta::assert_snapshot!(
            frame.encode(),
            @r#"{"type":"all","messages":[{"id":"a","content":"one","user":"Ann","role":"user"},{"id":"b","content":"two","user":"AI","role":"assistant"}]}"#
        );
    }

    #[test]
    fn decodes_update() {
        let frame = Frame::decode(
            r#"{"type":"update","id":"m1","content":"edited","user":"Bob","role":"user"}"#,
        )
        .unwrap();
        assert_eq!(frame, Frame::Update(Message::user("m1", "edited", "Bob")));
        assert_eq!(frame.kind(), FrameKind::Update);
    }

    #[test]
    fn decodes_empty_sync() {
        let frame = Frame::decode(r#"{"type":"all","messages":[]}"#).unwrap();
        assert_eq!(frame, Frame::All { messages: vec![] });
    }

    #[test]
    fn unknown_tag_is_protocol_error() {
        let err = Frame::decode(r#"{"type":"delete","id":"m1"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownFrameType("delete".into()));
    }

    #[test]
    fn missing_tag() {
        let err = Frame::decode(r#"{"id":"m1"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingFrameType);

        let err = Frame::decode(r#"{"type":3}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingFrameType);
    }

    #[test]
    fn non_object_is_json_error() {
        assert!(matches!(Frame::decode("[1,2]"), Err(ProtocolError::Json(_))));
        assert!(matches!(Frame::decode("not json"), Err(ProtocolError::Json(_))));
        assert!(matches!(Frame::decode(""), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn sync_with_one_bad_entry_is_rejected_whole() {
        let text = r#"{"type":"all","messages":[
            {"id":"a","content":"ok","user":"Ann","role":"user"},
            {"id":"b","content":null,"user":"Ann","role":"user"}
        ]}"#;
        let err = Frame::decode(text).unwrap_err();
        assert_eq!(err, ProtocolError::malformed("messages[1].content", "is not a string"));
    }

    #[test]
    fn sync_entry_must_be_object() {
        let err = Frame::decode(r#"{"type":"all","messages":["a"]}"#).unwrap_err();
        assert_eq!(err, ProtocolError::malformed("messages[0]", "is not an object"));
    }

    #[test]
    fn sync_without_messages_array() {
        let err = Frame::decode(r#"{"type":"all"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::malformed("messages", "is missing"));

        let err = Frame::decode(r#"{"type":"all","messages":{}}"#).unwrap_err();
        assert_eq!(err, ProtocolError::malformed("messages", "is not an array"));
    }

    #[test]
    fn bytes_must_be_utf8() {
        assert_eq!(Frame::decode_bytes(&[0xff, 0xfe]), Err(ProtocolError::InvalidUtf8));

        let frame = Frame::decode_bytes(br#"{"type":"all","messages":[]}"#).unwrap();
        assert_eq!(frame.kind(), FrameKind::All);
    }
}
