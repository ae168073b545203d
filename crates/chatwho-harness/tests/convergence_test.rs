//! Model-based convergence tests.
//!
//! These tests generate random operation sequences against a multi-client
//! [`SimWorld`] and check the transcript invariants after every step.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!                          ▼
//!     SimWorld (N reconcilers, one SimHub, per-client FIFO inboxes)
//!                          │
//!                          ▼
//!     InvariantRegistry::standard() after each op and after quiescence
//! ```

use chatwho_core::{OrphanUpdatePolicy, ReconcilerConfig};
use chatwho_harness::{InvariantRegistry, Operation, SimWorld, SmallText};
use proptest::prelude::*;

fn small_text_strategy() -> impl Strategy<Value = SmallText> {
    (any::<u8>(), any::<u8>()).prop_map(|(seed, shape)| SmallText { seed, shape })
}

/// Strategy for generating operations with valid client IDs.
fn operation_strategy(num_clients: usize) -> impl Strategy<Value = Operation> {
    let client_id = 0..num_clients as u8;

    prop_oneof![
        5 => (client_id.clone(), small_text_strategy())
            .prop_map(|(client_id, content)| Operation::Submit { client_id, content }),
        4 => (client_id.clone(), 1u8..4)
            .prop_map(|(client_id, count)| Operation::Deliver { client_id, count }),
        1 => Just(Operation::DeliverAll),
        2 => (any::<u8>(), small_text_strategy())
            .prop_map(|(pick, content)| Operation::Edit { pick, content }),
        2 => small_text_strategy().prop_map(|content| Operation::Post { content }),
        1 => client_id.clone().prop_map(|client_id| Operation::Rejoin { client_id }),
        1 => (client_id, prop::collection::vec(any::<u8>(), 0..16))
            .prop_map(|(client_id, bytes)| Operation::Garbage { client_id, bytes }),
    ]
}

fn run(world: &mut SimWorld, ops: &[Operation]) -> Result<(), TestCaseError> {
    let invariants = InvariantRegistry::standard();

    for op in ops {
        world.apply(op);
        if let Err(violations) = invariants.check_all(&world.snapshot()) {
            return Err(TestCaseError::fail(format!("after {op:?}: {violations:?}")));
        }
    }

    world.deliver_all();
    let snapshot = world.snapshot();
    prop_assert!(snapshot.is_quiescent());
    if let Err(violations) = invariants.check_all(&snapshot) {
        return Err(TestCaseError::fail(format!("after quiescence: {violations:?}")));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// INVARIANT: every client converges on the hub's messages once all
    /// frames are delivered, whatever the interleaving.
    #[test]
    fn prop_clients_converge(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(3), 0..60),
    ) {
        let mut world = SimWorld::new(3, seed);
        run(&mut world, &ops)?;
    }

    /// Buffering orphan updates never breaks convergence either.
    #[test]
    fn prop_buffered_updates_converge(
        seed in any::<u64>(),
        limit in 0usize..4,
        ops in prop::collection::vec(operation_strategy(2), 0..60),
    ) {
        let config = ReconcilerConfig {
            orphan_updates: OrphanUpdatePolicy::Buffer { limit },
            ..ReconcilerConfig::default()
        };
        let mut world = SimWorld::with_config(2, seed, config);
        run(&mut world, &ops)?;
    }

    /// Same seed and operations give the same transcripts.
    #[test]
    fn prop_runs_are_deterministic(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(2), 0..30),
    ) {
        let mut a = SimWorld::new(2, seed);
        let mut b = SimWorld::new(2, seed);
        for op in &ops {
            a.apply(op);
            b.apply(op);
        }
        for (x, y) in a.clients().iter().zip(b.clients()) {
            prop_assert_eq!(x.transcript(), y.transcript());
        }
    }
}

#[test]
fn own_messages_keep_typing_order() {
    let mut world = SimWorld::new(2, 9);
    world.deliver_all();

    world.submit(1, "remote first");
    world.submit(0, "local second");

    // Client 0 has not seen client 1's message yet
    let ids: Vec<_> = world.clients()[0].transcript().iter().map(|m| m.content.clone()).collect();
    assert_eq!(ids, ["local second"]);

    world.deliver_all();
    let contents: Vec<_> =
        world.clients()[0].transcript().iter().map(|m| m.content.clone()).collect();
    assert_eq!(contents, ["local second", "remote first"]);

    let hub: Vec<_> = world.hub().history().iter().map(|m| m.content.clone()).collect();
    assert_eq!(hub, ["remote first", "local second"]);
}

#[test]
fn edits_reach_every_client() {
    let mut world = SimWorld::new(3, 4);
    world.post("draft");
    world.deliver_all();
    world.edit(0, "final");
    world.deliver_all();

    for client in world.clients() {
        let contents: Vec<_> = client.transcript().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["final"]);
    }
}

#[test]
fn snapshot_of_fresh_world() {
    let mut world = SimWorld::new(2, 11);
    world.post("```py\nprint(1)\n```");
    world.deliver_all();

    let contents: Vec<_> = world.clients()[1]
        .transcript()
        .iter()
        .map(|m| format!("{}<{}>: {}", m.user, m.role, m.content))
        .collect();
    insta::assert_debug_snapshot!(contents, @r#"
    [
        "Assistant<assistant>: ```py\nprint(1)\n```",
    ]
    "#);
}
