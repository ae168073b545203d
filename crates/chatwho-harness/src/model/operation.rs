//! Operations for model-based testing.
//!
//! Operations represent all possible actions in the world. They are generated
//! randomly (proptest or a fuzzer's `Unstructured`) and applied to a
//! [`crate::SimWorld`].

use arbitrary::Arbitrary;

/// Client index (taken modulo the number of clients).
pub type ClientId = u8;

/// Operations that can be applied to the world.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Client types and submits a message.
    Submit {
        /// Client submitting.
        client_id: ClientId,
        /// Message content.
        content: SmallText,
    },

    /// Deliver up to `count` queued frames to one client.
    Deliver {
        /// Receiving client.
        client_id: ClientId,
        /// Frames to deliver.
        count: u8,
    },

    /// Deliver every queued frame to every client.
    DeliverAll,

    /// The hub rewrites a stored message and broadcasts the update.
    Edit {
        /// History position (taken modulo history length).
        pick: u8,
        /// New content.
        content: SmallText,
    },

    /// The hub posts an assistant message.
    Post {
        /// Message content.
        content: SmallText,
    },

    /// Client reloads: fresh reconciler, pending frames dropped, re-join.
    Rejoin {
        /// Client rejoining.
        client_id: ClientId,
    },

    /// A corrupt frame is queued for one client. Skipped if the bytes
    /// decode to a valid frame.
    Garbage {
        /// Receiving client.
        client_id: ClientId,
        /// Raw bytes (decoded lossily).
        bytes: Vec<u8>,
    },
}

/// Small message content for testing.
///
/// Compact representation that expands to text exercising the tokenizer:
/// plain words, inline code and fenced blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallText {
    /// Content seed.
    pub seed: u8,
    /// Shape selector.
    pub shape: u8,
}

impl SmallText {
    /// Expand to message text.
    pub fn to_content(self) -> String {
        let word = format!("w{}", self.seed);
        match self.shape % 5 {
            0 => word,
            1 => format!("run `{word}` now"),
            2 => format!("```rs\nlet {word} = {};\n```", self.seed),
            3 => format!("{word} `unterminated"),
            _ => format!("  {word}\n{word}  "),
        }
    }
}
