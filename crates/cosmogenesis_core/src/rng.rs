//! Seeded deterministic random streams.
//!
//! Every stochastic decision in the kernel draws from a [`SeedStream`];
//! replaying a seed therefore yields an identical trajectory. Distinct
//! logical streams (physics vs anomaly generation) derive from the same
//! seed string with a suffix so they cannot contaminate each other.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// A reproducible stream of uniform doubles in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SeedStream {
    rng: ChaCha8Rng,
}

impl SeedStream {
    /// Creates a stream from a seed string.
    pub fn new(seed: &str) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed_to_u64(seed)),
        }
    }

    /// Derives an independent named sub-stream from the same seed.
    pub fn derive(seed: &str, suffix: &str) -> Self {
        Self::new(&format!("{seed}{suffix}"))
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform draw in `[lo, hi)`.
    pub fn next_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Gaussian draw via the Box-Muller transform on two uniform draws.
    pub fn next_gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        // Guard against ln(0).
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Hashes a seed string into a 64-bit RNG seed.
fn seed_to_u64(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
