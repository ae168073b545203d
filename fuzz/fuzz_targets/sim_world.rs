//! Fuzz target for the multi-client simulation
//!
//! Applies arbitrary operation sequences to a [`SimWorld`] and checks the
//! standard invariants after every step and once more after a final full
//! delivery.
//!
//! # Invariants
//!
//! - No duplicate ids in the hub or any client
//! - Every client converges on the hub's history once all frames are
//!   delivered

#![no_main]

use arbitrary::Arbitrary;
use chatwho_harness::{InvariantRegistry, Operation, SimWorld};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Scenario {
    seed: u64,
    clients: u8,
    operations: Vec<Operation>,
}

fuzz_target!(|scenario: Scenario| {
    let clients = usize::from(scenario.clients % 4) + 1;
    let mut world = SimWorld::new(clients, scenario.seed);
    let invariants = InvariantRegistry::standard();

    for op in &scenario.operations {
        world.apply(op);
        if let Err(violations) = invariants.check_all(&world.snapshot()) {
            panic!("after {op:?}: {violations:?}");
        }
    }

    world.deliver_all();
    if let Err(violations) = invariants.check_all(&world.snapshot()) {
        panic!("after final delivery: {violations:?}");
    }
});
