//! Deterministic string-seeded random number generation.
//!
//! Every random decision in the engine flows from a [`Mulberry32`] generator
//! keyed by an arbitrary string seed. The same seed always yields the same
//! infinite draw sequence, on every platform, which is what makes the whole
//! world reconstructible from its seed alone.

use rand_core::{RngCore, impls};

/// Hashes an arbitrary string into a 32-bit generator state.
///
/// Runs a multiply/rotate avalanche over each byte, mixed with the input
/// length so that even the empty string produces a well-distributed non-zero
/// state. Any string is a valid seed; there is no error path.
pub fn hash_seed(seed: &str) -> u32 {
    let mut h: u32 = 0x6A09_E667 ^ seed.len() as u32;
    for &byte in seed.as_bytes() {
        h = (h ^ u32::from(byte)).wrapping_mul(0xCC9E_2D51);
        h = h.rotate_left(13);
    }
    // Final avalanche so short seeds still differ in every output bit.
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^ (h >> 16)
}

/// A Mulberry32 pseudo-random generator with 32 bits of state.
///
/// Small, fast, and fully deterministic: each step adds a fixed odd constant
/// to the state and runs two xorshift-multiply rounds over it. Statistical
/// quality is far below cryptographic generators but ample for procedural
/// placement, and the tiny state makes per-cell derivation essentially free.
///
/// Implements [`RngCore`], so all of `rand`'s derived draws
/// (`random_range`, `random_bool`, slice `choose`) work on it directly.
#[derive(Clone, Debug)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates a generator from a raw 32-bit state.
    pub fn new(state: u32) -> Self {
        Self { state }
    }

    /// Creates a generator keyed by a string seed.
    ///
    /// This is the only constructor generation code uses; it guarantees
    /// that two generators built from equal strings are indistinguishable.
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(hash_seed(seed))
    }

    /// Advances the generator and returns the next 32-bit output.
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Draws a value uniformly distributed in `[0, 1)`.
    ///
    /// The primitive behind density gates and other threshold draws:
    /// the raw 32-bit output divided by 2^32, so `1.0` is never returned.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.step()) / 4_294_967_296.0
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}
