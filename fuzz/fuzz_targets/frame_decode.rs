//! Fuzz target for Frame::decode
//!
//! Decodes arbitrary bytes as a text frame.
//!
//! # Invariants
//!
//! - NEVER panic; invalid input returns an error
//! - A decoded frame re-encodes to text that decodes to the same frame

#![no_main]

use chatwho_proto::Frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(frame) = Frame::decode_bytes(data) {
        let again = Frame::decode(&frame.encode()).expect("encoded frame must decode");
        assert_eq!(again, frame);
    }
});
