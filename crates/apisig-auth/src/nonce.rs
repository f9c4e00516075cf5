//! Nonce generation for outbound requests.
//!
//! The verifier requires a `Nonce` but never checks it for reuse, so the value
//! does not need to be cryptographically strong. A [`NonceSource`] is created
//! once and injected into the signing client.

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces the `Nonce` value for each signed request.
pub trait NonceSource: Send + Sync {
    /// Return the next nonce.
    fn next_nonce(&self) -> String;
}

/// Decimal `u64` nonces drawn from the lazily initialized thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonceSource;

impl NonceSource for RandomNonceSource {
    fn next_nonce(&self) -> String {
        rand::random::<u64>().to_string()
    }
}

/// Monotonic counter nonces, for reproducible tests.
#[derive(Debug, Default)]
pub struct SequenceNonceSource {
    next: AtomicU64,
}

impl SequenceNonceSource {
    /// Start counting at `start`.
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl NonceSource for SequenceNonceSource {
    fn next_nonce(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}
