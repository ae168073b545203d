//! Protocol
//!
//! Wire representation for chatwho rooms. A room channel carries JSON text
//! frames; each frame is a tagged object that either adds a message, updates
//! a message in place, or delivers the full ordered transcript.
//!
//! # Components
//!
//! - [`Message`]: One chat message (`id`, `content`, `user`, `role`)
//! - [`Frame`]: Tagged union exchanged over the channel
//! - [`ProtocolError`]: Decode failures (unknown tag, malformed fields)
//!
//! # Decoding policy
//!
//! Decoding is strict. A frame with a missing or wrongly-typed message field
//! is rejected whole rather than coerced, so a bad frame can never leave a
//! half-applied transcript behind. Unknown extra fields are ignored.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;
mod message;

pub use errors::{ProtocolError, Result};
pub use frame::{Frame, FrameKind};
pub use message::{Message, Role};
