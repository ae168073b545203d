//! Seeded simulation environment.
//!
//! [`SimEnv`] draws every random byte from a ChaCha stream, so a seed fixes
//! every message id, room code and picked name of a run.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{Arc, Mutex};

use chatwho_core::env::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic environment for simulation.
///
/// Clones share one RNG stream, so ids drawn through any clone never repeat
/// within a run.
#[derive(Debug, Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha8Rng>>,
    seed: u64,
}

impl SimEnv {
    /// Create an environment from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))), seed }
    }

    /// Seed this environment was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Environment for SimEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng
            .lock()
            .expect("invariant: RNG lock is never held across a panic")
            .fill_bytes(buffer);
    }
}
