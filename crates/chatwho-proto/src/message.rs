//! Chat message and role types.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{ProtocolError, Result};

/// Author role carried with every message.
///
/// The reconciler carries the role through untouched; only renderers look at
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by a participant.
    User,
    /// Message produced by an assistant participant.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message.
///
/// `id` is the only join key used during reconciliation and is unique within
/// a room for the room's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Message {
    /// Room-unique message identifier.
    pub id: String,
    /// Raw message text, may embed formatting markers.
    pub content: String,
    /// Display name of the author.
    pub user: String,
    /// Author role.
    pub role: Role,
}

impl Message {
    /// Create a message typed by a participant.
    pub fn user(id: impl Into<String>, content: impl Into<String>, user: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into(), user: user.into(), role: Role::User }
    }

    /// Create an assistant message.
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), content: content.into(), user: user.into(), role: Role::Assistant }
    }

    /// Parse message fields out of a JSON object.
    ///
    /// `path` prefixes field names in errors so that a bad entry inside a
    /// sync frame reports e.g. `messages[3].user`.
    pub(crate) fn from_object(object: &Map<String, Value>, path: &str) -> Result<Self> {
        let id = required_str(object, path, "id")?;
        if id.is_empty() {
            return Err(ProtocolError::malformed(field_path(path, "id"), "is empty"));
        }

        let content = required_str(object, path, "content")?;
        let user = required_str(object, path, "user")?;
        let role = required_str(object, path, "role")?;
        let role = Role::parse(role)
            .ok_or_else(|| ProtocolError::malformed(field_path(path, "role"), "is not a known role"))?;

        Ok(Self { id: id.to_owned(), content: content.to_owned(), user: user.to_owned(), role })
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, path: &str, name: &str) -> Result<&'a str> {
    match object.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ProtocolError::malformed(field_path(path, name), "is not a string")),
        None => Err(ProtocolError::malformed(field_path(path, name), "is missing")),
    }
}

fn field_path(path: &str, name: &str) -> String {
    if path.is_empty() { name.to_owned() } else { format!("{path}.{name}") }
}
