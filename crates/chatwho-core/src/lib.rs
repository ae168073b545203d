//! Core
//!
//! Sans-IO logic for one joined room: the [`Reconciler`] merges optimistic
//! local messages with channel broadcasts into a single ordered
//! [`Transcript`], and [`markup`] splits message text into renderable spans.
//!
//! # Architecture
//!
//! Nothing here performs I/O. The reconciler consumes events
//! ([`ReconcilerEvent`]) and returns actions ([`ReconcilerAction`]) for the
//! caller to execute, such as sending a frame on the room channel. Identifier
//! generation goes through the [`env::Environment`] trait so simulations can
//! run with a seeded RNG.
//!
//! # Components
//!
//! - [`Transcript`]: Ordered, unique-by-id message list with an id index
//! - [`Reconciler`]: Optimistic append and frame application state machine
//! - [`markup::tokenize`]: Literal, inline-code and fenced-code spans

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod error;
mod event;
pub mod markup;
mod reconciler;
mod transcript;

pub use chatwho_proto::{Frame, FrameKind, Message, ProtocolError, Role};
pub use error::ReconcileError;
pub use event::{LogLevel, ReconcilerAction, ReconcilerEvent};
pub use reconciler::{
    OrphanUpdatePolicy, Reconciler, ReconcilerConfig, ReconcilerStats, Submission,
};
pub use transcript::{Change, Transcript};
