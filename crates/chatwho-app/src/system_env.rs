//! Production environment.

use chatwho_core::env::Environment;

/// Environment backed by the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a system environment.
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - ids would collide");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_differ() {
        let env = SystemEnv::new();
        assert_ne!(env.new_id(None), env.new_id(None));
    }
}
