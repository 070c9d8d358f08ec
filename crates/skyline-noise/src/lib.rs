//! Seeded 2D gradient noise and fractal Brownian motion.
//!
//! The permutation table is shuffled by the string-seeded PRNG, so the entire
//! noise field is a pure function of the seed: two fields built from equal
//! seeds agree at every coordinate, bit for bit. Lattice math goes through
//! `libm` rather than platform libc so results are identical across targets.

use skyline_rng::Mulberry32;

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
///
/// Zero first and second derivatives at `t = 0` and `t = 1`, which removes
/// visible grid artifacts at cell boundaries.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Gradient selection from the low two bits of a permutation entry.
///
/// The four diagonal gradients `(±1, ±1)` give classic 2D gradient noise an
/// exact output range of `[-1, 1]`.
#[inline]
fn grad(hash: u8, x: f64, z: f64) -> f64 {
    match hash & 3 {
        0 => x + z,
        1 => -x + z,
        2 => x - z,
        _ => -x - z,
    }
}

/// A seeded 2D gradient-noise field with fractal summation.
///
/// Construction shuffles a 256-entry permutation table with Fisher-Yates
/// driven by [`Mulberry32`], then mirrors it to 512 entries so corner
/// lookups never need a wrap-around branch.
pub struct NoiseField {
    perm: [u8; 512],
}

impl NoiseField {
    /// Builds the noise field for a string seed.
    pub fn new(seed: &str) -> Self {
        let mut rng = Mulberry32::from_seed_str(seed);

        let mut table: [u8; 256] = core::array::from_fn(|i| i as u8);
        for i in (1..256).rev() {
            let j = (rng.next_unit() * (i + 1) as f64) as usize;
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Samples raw gradient noise at `(x, z)`. Output is in `[-1, 1]`.
    pub fn noise2(&self, x: f64, z: f64) -> f64 {
        let xf = libm::floor(x);
        let zf = libm::floor(z);
        let xi = (xf as i64 & 255) as usize;
        let zi = (zf as i64 & 255) as usize;
        let dx = x - xf;
        let dz = z - zf;

        let u = fade(dx);
        let v = fade(dz);

        let a = self.perm[xi] as usize;
        let b = self.perm[xi + 1] as usize;
        let aa = self.perm[a + zi];
        let ab = self.perm[a + zi + 1];
        let ba = self.perm[b + zi];
        let bb = self.perm[b + zi + 1];

        let x1 = lerp(grad(aa, dx, dz), grad(ba, dx - 1.0, dz), u);
        let x2 = lerp(grad(ab, dx, dz - 1.0), grad(bb, dx - 1.0, dz - 1.0), u);
        lerp(x1, x2, v)
    }

    /// Fractal Brownian motion: `octaves` layers of [`noise2`](Self::noise2)
    /// at doubling frequency and halving amplitude, normalized by the total
    /// amplitude so output stays in `[-1, 1]`.
    ///
    /// `octaves == 0` returns `0.0` (the empty sum; the zero amplitude total
    /// is guarded so no division by zero occurs).
    pub fn fbm(&self, x: f64, z: f64, octaves: u32) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.noise2(x * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }

        if max_amplitude == 0.0 {
            return 0.0;
        }
        total / max_amplitude
    }
}
