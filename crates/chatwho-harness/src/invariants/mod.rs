//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during system execution.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all possible execution paths.
//!
//! # Architecture
//!
//! The invariant system extracts observable state from the hub and every
//! client into a [`SystemSnapshot`], then runs registered [`Invariant`]
//! checks against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = world.snapshot();
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{Convergence, TranscriptIntegrity};
pub use snapshot::{ClientSnapshot, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against system state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard transcript invariants.
    ///
    /// Includes:
    /// - [`TranscriptIntegrity`]: ids unique, id index matches positions
    /// - [`Convergence`]: quiescent clients hold the hub's messages
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(TranscriptIntegrity);
        registry.add(Convergence);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
