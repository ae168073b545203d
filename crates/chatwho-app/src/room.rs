//! Room codes.
//!
//! A room code names the channel all participants of a room share. Codes are
//! typed by users, so parsing is forgiving about surrounding whitespace and
//! slashes (a pasted `/abc/` path joins room `abc`).

use std::{fmt, str::FromStr};

use chatwho_core::env::Environment;
use thiserror::Error;

/// Errors parsing a [`RoomCode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Nothing left after trimming.
    #[error("room code is empty")]
    Empty,

    /// Whitespace or `/` inside the code.
    #[error("room code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Validated room name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    /// Parse user input into a room code.
    ///
    /// Surrounding whitespace and leading/trailing `/` are stripped.
    pub fn parse(input: &str) -> Result<Self, RoomError> {
        let code = input.trim().trim_matches('/');
        if code.is_empty() {
            return Err(RoomError::Empty);
        }
        if let Some(c) = code.chars().find(|c| c.is_whitespace() || *c == '/') {
            return Err(RoomError::InvalidCharacter(c));
        }
        Ok(Self(code.to_owned()))
    }

    /// Generate a fresh room code.
    pub fn generate<E: Environment>(env: &E) -> Self {
        Self(env.new_id(None))
    }

    /// Code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RoomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use chatwho_core::env::DEFAULT_ID_LEN;
    use proptest::prelude::*;

    use super::*;

    #[derive(Clone)]
    struct ZeroEnv;

    impl Environment for ZeroEnv {
        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(0);
        }
    }

    #[test]
    fn parse_trims_whitespace_and_slashes() {
        assert_eq!(RoomCode::parse("  /lobby/ ").map(|r| r.0), Ok("lobby".into()));
        assert_eq!(RoomCode::parse("//abc").map(|r| r.0), Ok("abc".into()));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(RoomCode::parse(""), Err(RoomError::Empty));
        assert_eq!(RoomCode::parse("  // "), Err(RoomError::Empty));
    }

    #[test]
    fn parse_rejects_inner_separators() {
        assert_eq!(RoomCode::parse("a b"), Err(RoomError::InvalidCharacter(' ')));
        assert_eq!(RoomCode::parse("a/b"), Err(RoomError::InvalidCharacter('/')));
    }

    proptest! {
        #[test]
        fn prop_parsed_codes_are_clean(input in "\\PC{0,24}") {
            if let Ok(code) = RoomCode::parse(&input) {
                prop_assert!(!code.as_str().is_empty());
                let dirty = code.as_str().contains(|c: char| c.is_whitespace() || c == '/');
                prop_assert!(!dirty);
                prop_assert_eq!(RoomCode::parse(code.as_str()), Ok(code.clone()));
            }
        }
    }

    #[test]
    fn generated_codes_use_default_length() {
        let code = RoomCode::generate(&ZeroEnv);
        assert_eq!(code.as_str().len(), DEFAULT_ID_LEN);
        assert_eq!(code.as_str().parse::<RoomCode>(), Ok(code));
    }
}
