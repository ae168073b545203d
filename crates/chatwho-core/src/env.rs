//! Environment abstraction for deterministic testing.
//!
//! Decouples reconciliation from system randomness. Message and room
//! identifiers are drawn through [`Environment`], so production uses the OS
//! RNG while simulations replay the exact same ids from a seed.

/// URL-safe identifier alphabet (64 symbols).
pub const ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of identifiers when no bound is requested (room codes).
pub const DEFAULT_ID_LEN: usize = 21;

/// Length of locally generated message identifiers.
pub const MESSAGE_ID_LEN: usize = 8;

/// Abstract environment providing randomness.
///
/// # Invariants
///
/// - Given the same seed, `random_bytes()` produces the same sequence of
///   bytes (simulation implementations).
/// - Production implementations draw from a cryptographically secure source,
///   so ids are unique with overwhelming probability across all participants
///   of a room.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Generates a fresh identifier over [`ID_ALPHABET`].
    ///
    /// `None` yields [`DEFAULT_ID_LEN`] symbols, `Some(n)` yields exactly `n`
    /// (at least one). Each symbol consumes one random byte.
    fn new_id(&self, max_len: Option<usize>) -> String {
        let len = max_len.unwrap_or(DEFAULT_ID_LEN).max(1);
        let mut bytes = vec![0u8; len];
        self.random_bytes(&mut bytes);
        bytes.iter().map(|b| char::from(ID_ALPHABET[usize::from(b & 0x3f)])).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Environment returning a fixed counter pattern.
    #[derive(Clone)]
    struct CountingEnv;

    impl Environment for CountingEnv {
        fn random_bytes(&self, buffer: &mut [u8]) {
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = i as u8;
            }
        }
    }

    #[test]
    fn id_uses_alphabet_positions() {
        assert_eq!(CountingEnv.new_id(Some(4)), "ABCD");
    }

    #[test]
    fn id_length_defaults_and_clamps() {
        assert_eq!(CountingEnv.new_id(None).len(), DEFAULT_ID_LEN);
        assert_eq!(CountingEnv.new_id(Some(MESSAGE_ID_LEN)).len(), 8);
        assert_eq!(CountingEnv.new_id(Some(0)).len(), 1);
    }

    #[test]
    fn high_bits_are_ignored() {
        #[derive(Clone)]
        struct HighEnv;
        impl Environment for HighEnv {
            fn random_bytes(&self, buffer: &mut [u8]) {
                buffer.fill(0xff);
            }
        }

        assert_eq!(HighEnv.new_id(Some(3)), "---");
    }

    #[test]
    fn random_u64_is_big_endian() {
        assert_eq!(CountingEnv.random_u64(), 0x0001_0203_0405_0607);
    }
}
