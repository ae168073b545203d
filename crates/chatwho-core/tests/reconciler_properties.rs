//! Property tests for the transcript reconciler.
//!
//! These tests verify critical invariants:
//! - Ids in the transcript are unique after any frame sequence
//! - Re-applying an `add` or `update` is idempotent
//! - An `all` frame is authoritative
//! - Optimistic appends keep their position when echoed back
//! - Adds with unseen ids append in arrival order

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chatwho_core::{
    Change, Frame, Message, OrphanUpdatePolicy, Reconciler, ReconcilerAction, ReconcilerConfig,
    env::Environment,
};
use proptest::prelude::*;

/// Deterministic environment: a splitmix64 stream from a fixed seed.
#[derive(Clone)]
struct SeqEnv(Arc<AtomicU64>);

impl SeqEnv {
    fn new(seed: u64) -> Self {
        Self(Arc::new(AtomicU64::new(seed)))
    }
}

impl Environment for SeqEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        for chunk in buffer.chunks_mut(8) {
            let mut z = self.0.fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed);
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            chunk.copy_from_slice(&z.to_le_bytes()[..chunk.len()]);
        }
    }
}

/// Messages drawn from a tiny id space so collisions are common.
fn message() -> impl Strategy<Value = Message> {
    ("[a-d]", "[a-z]{0,4}", prop_oneof![Just("ann"), Just("bob")])
        .prop_map(|(id, content, user)| Message::user(id, content, user))
}

fn frame() -> impl Strategy<Value = Frame> {
    prop_oneof![
        4 => message().prop_map(Frame::Add),
        3 => message().prop_map(Frame::Update),
        1 => prop::collection::vec(message(), 0..5).prop_map(|messages| Frame::All { messages }),
    ]
}

fn policy() -> impl Strategy<Value = OrphanUpdatePolicy> {
    prop_oneof![
        Just(OrphanUpdatePolicy::Drop),
        (0usize..4).prop_map(|limit| OrphanUpdatePolicy::Buffer { limit }),
    ]
}

fn reconciler(policy: OrphanUpdatePolicy) -> Reconciler<SeqEnv> {
    let config = ReconcilerConfig { orphan_updates: policy, ..ReconcilerConfig::default() };
    Reconciler::new(SeqEnv::new(7), "room", config)
}

fn ids(r: &Reconciler<SeqEnv>) -> Vec<String> {
    r.transcript().iter().map(|m| m.id.clone()).collect()
}

proptest! {
    /// INVARIANT: the transcript never holds two messages with one id.
    #[test]
    fn prop_ids_stay_unique(policy in policy(), frames in prop::collection::vec(frame(), 0..40)) {
        let mut r = reconciler(policy);
        for frame in frames {
            r.apply(frame);
            let ids = ids(&r);
            let unique: std::collections::HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
            prop_assert!(r.transcript().is_consistent());
        }
    }

    /// INVARIANT: applying the same add or update twice equals applying it once.
    #[test]
    fn prop_add_and_update_are_idempotent(
        prefix in prop::collection::vec(frame(), 0..20),
        message in message(),
        as_update in any::<bool>(),
    ) {
        let mut r = reconciler(OrphanUpdatePolicy::Drop);
        for frame in prefix {
            r.apply(frame);
        }

        let frame = if as_update { Frame::Update(message) } else { Frame::Add(message) };
        r.apply(frame.clone());
        let once = r.transcript().clone();
        r.apply(frame);
        prop_assert_eq!(r.transcript(), &once);
    }

    /// INVARIANT: after an `all` frame the transcript equals its payload.
    #[test]
    fn prop_sync_is_authoritative(
        prefix in prop::collection::vec(frame(), 0..20),
        local in prop::collection::vec("[a-z]{1,5}", 0..4),
        snapshot in prop::collection::vec(message(), 0..6),
    ) {
        let mut r = reconciler(OrphanUpdatePolicy::Drop);
        for frame in prefix {
            r.apply(frame);
        }
        for content in local {
            r.submit(content, "me");
        }

        r.apply(Frame::All { messages: snapshot.clone() });
        let expected = chatwho_core::Transcript::from_messages(snapshot);
        prop_assert_eq!(r.transcript(), &expected);
    }

    /// Echoes of local messages replace in place, never duplicate or move.
    #[test]
    fn prop_echo_keeps_position(
        contents in prop::collection::vec("[a-z]{1,5}", 1..6),
        remote in prop::collection::vec(message(), 0..6),
    ) {
        let mut r = reconciler(OrphanUpdatePolicy::Drop);
        let mut mine = Vec::new();
        for content in contents {
            mine.push(r.submit(content, "me").message);
        }
        for message in remote {
            r.apply(Frame::Add(message));
        }

        let before = ids(&r);
        for message in mine {
            r.apply(Frame::Add(message));
        }
        prop_assert_eq!(ids(&r), before);
    }

    /// INVARIANT: adds with unseen ids append one entry each, in arrival order.
    #[test]
    fn prop_new_adds_keep_arrival_order(
        local in prop::collection::vec("[a-z]{1,5}", 0..4),
        remote_ids in prop::collection::hash_set("[a-z]{9,12}", 1..50),
    ) {
        let mut r = reconciler(OrphanUpdatePolicy::Drop);
        for content in local {
            r.submit(content, "me");
        }
        let mut expected = ids(&r);

        for id in remote_ids {
            let len = r.transcript().len();
            let actions = r.apply(Frame::Add(Message::user(id.clone(), "x", "bob")));

            prop_assert_eq!(actions, vec![ReconcilerAction::Changed(Change::Appended { index: len })]);
            prop_assert_eq!(r.transcript().len(), len + 1);
            expected.push(id);
        }
        prop_assert_eq!(ids(&r), expected);
    }

    /// Rejected raw frames never alter the transcript.
    #[test]
    fn prop_garbage_is_ignored(frames in prop::collection::vec(frame(), 0..10), junk in "\\PC{0,40}") {
        let mut r = reconciler(OrphanUpdatePolicy::Drop);
        for frame in frames {
            r.apply(frame);
        }
        let before = r.transcript().clone();

        if r.receive(&junk).is_err() {
            prop_assert_eq!(r.transcript(), &before);
        }
    }
}
