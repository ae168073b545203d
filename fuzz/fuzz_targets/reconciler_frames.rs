//! Fuzz target for the Reconciler frame path
//!
//! Interleaves local submissions with arbitrary inbound text.
//!
//! # Invariants
//!
//! - NEVER panic; undecodable text is rejected and leaves the transcript as is
//! - Message ids stay unique and the id index stays consistent
//! - A submitted message is last in the transcript right after submission

#![no_main]

use arbitrary::Arbitrary;
use chatwho_core::{OrphanUpdatePolicy, Reconciler, ReconcilerConfig};
use chatwho_harness::SimEnv;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    Submit(String),
    Receive(String),
}

#[derive(Debug, Arbitrary)]
struct Case {
    seed: u64,
    buffer_limit: Option<u8>,
    inputs: Vec<Input>,
}

fuzz_target!(|case: Case| {
    let orphan_updates = case
        .buffer_limit
        .map_or(OrphanUpdatePolicy::Drop, |limit| OrphanUpdatePolicy::Buffer { limit: limit.into() });
    let config = ReconcilerConfig { orphan_updates, ..ReconcilerConfig::default() };
    let mut reconciler = Reconciler::new(SimEnv::with_seed(case.seed), "fuzz", config);

    for input in case.inputs {
        match input {
            Input::Submit(content) => {
                let submission = reconciler.submit(content, "fuzzer");
                let last = reconciler.transcript().as_slice().last();
                assert_eq!(last, Some(&submission.message));
            },
            Input::Receive(raw) => {
                let before = reconciler.transcript().clone();
                if reconciler.receive(&raw).is_err() {
                    assert_eq!(reconciler.transcript(), &before);
                }
            },
        }
        assert!(reconciler.transcript().is_consistent());
    }
});
