//! Deterministic simulation harness for chatwho testing.
//!
//! Seeded implementations of the Environment and Driver traits plus an
//! in-memory room relay, for reproducible tests of many clients sharing one
//! room.
//!
//! # Model-Based Testing
//!
//! The `model` module runs several reconcilers against one [`SimHub`] with
//! explicit, per-client FIFO delivery. [`Operation`]s are generated randomly
//! and applied to the [`SimWorld`].
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the
//! transcript invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_hub;

pub use invariants::{
    ClientSnapshot, Convergence, Invariant, InvariantRegistry, InvariantResult, SystemSnapshot,
    TranscriptIntegrity, Violation,
};
pub use model::{ClientId, Operation, SimClient, SimWorld, SmallText};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::SimEnv;
pub use sim_hub::{SessionId, SimHub};
