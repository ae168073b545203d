//! Application layer for chatwho
//!
//! Pure state machines and generic runtime for the chat client, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (input line, scrolling, frame handling)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`RoomCode`]: Validated room name
//! - [`SystemEnv`]: Production environment over the OS RNG

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod input;
mod names;
mod room;
mod runtime;
mod state;
mod system_env;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use names::{NAMES, pick_name};
pub use room::{RoomCode, RoomError};
pub use runtime::{Runtime, RuntimeConfig};
pub use state::{ConnectionState, InputLine};
pub use system_env::SystemEnv;
