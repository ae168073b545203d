//! Terminal UI for chatwho
//!
//! A thin shell over [`chatwho_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`chatwho_app::Runtime`].
//!
//! This crate only handles terminal rendering and the room channel: a
//! WebSocket ([`transport`]) or an in-process room ([`server`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod server;
pub mod terminal;
pub mod transport;
pub mod ui;

pub use chatwho_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{ChannelTarget, TerminalDriver, TerminalError};
pub use transport::{Channel, TransportError};
