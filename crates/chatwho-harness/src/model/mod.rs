//! Multi-client room simulation.
//!
//! A [`SimWorld`] connects several reconcilers to one [`crate::SimHub`].
//! Frames a client sends reach the hub immediately; frames the hub sends are
//! queued per client and only delivered by explicit [`Operation`]s, so random
//! operation sequences explore every interleaving of local input and
//! broadcast delivery.

mod operation;
mod world;

pub use operation::{ClientId, Operation, SmallText};
pub use world::{SimClient, SimWorld};
