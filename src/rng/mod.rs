//! R-compatible random number generation for bootstrap resampling
//!
//! Implements R's Mersenne Twister with R's `set.seed()` scrambling, plus the
//! rejection sampler R's `sample()` uses to draw uniform indices. Generators
//! are plain values passed explicitly to every consumer; parallel work gets
//! independent child generators through [`RMersenneTwister::split`].

use std::collections::HashSet;

/// R's Mersenne Twister RNG
///
/// Matches R's Mersenne-Twister as defined in RNG.c: a 624-word state array
/// with Matsumoto and Nishimura's algorithm.
#[derive(Clone)]
pub struct RMersenneTwister {
    state: [u32; 624],
    index: usize,
}

impl RMersenneTwister {
    const N: usize = 624;
    const M: usize = 397;
    const MATRIX_A: u32 = 0x9908B0DF;
    const UPPER_MASK: u32 = 0x80000000;
    const LOWER_MASK: u32 = 0x7FFFFFFF;
    /// 2^-32
    const I2_32M1: f64 = 2.3283064365386963e-10;

    /// Create a new RNG seeded the way R's `set.seed(seed)` does
    pub fn new(seed: u32) -> Self {
        let mut mt = RMersenneTwister {
            state: [0; Self::N],
            index: Self::N,
        };
        mt.scramble_seed(seed);
        mt
    }

    /// Initial scrambling from R's RNG.c: an LCG `x = 69069 * x + 1`
    /// warmed up 50 times, one value discarded, then 624 values fill the state.
    fn scramble_seed(&mut self, seed: u32) {
        let mut x: u32 = seed;

        for _ in 0..50 {
            x = x.wrapping_mul(69069).wrapping_add(1);
        }
        x = x.wrapping_mul(69069).wrapping_add(1);

        for slot in self.state.iter_mut() {
            x = x.wrapping_mul(69069).wrapping_add(1);
            *slot = x;
        }

        self.index = Self::N;
    }

    /// Regenerate the 624 words of the state array
    fn generate_numbers(&mut self) {
        for i in 0..Self::N {
            let y = (self.state[i] & Self::UPPER_MASK)
                | (self.state[(i + 1) % Self::N] & Self::LOWER_MASK);
            self.state[i] = self.state[(i + Self::M) % Self::N] ^ (y >> 1);
            if y & 1 != 0 {
                self.state[i] ^= Self::MATRIX_A;
            }
        }
        self.index = 0;
    }

    /// Next tempered 32-bit output
    pub fn next_u32(&mut self) -> u32 {
        if self.index >= Self::N {
            self.generate_numbers();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9D2C5680;
        y ^= (y << 15) & 0xEFC60000;
        y ^= y >> 18;

        y
    }

    /// Uniform draw in the open interval (0, 1), with R's `fixup` applied
    pub fn runif(&mut self) -> f64 {
        let u = self.next_u32() as f64 * Self::I2_32M1;
        if u <= 0.0 {
            0.5 * Self::I2_32M1
        } else if u >= 1.0 {
            1.0 - 0.5 * Self::I2_32M1
        } else {
            u
        }
    }

    /// Random integer assembled from 16-bit chunks, masked to `bits` bits
    fn rbits(&mut self, bits: u32) -> u64 {
        let mut v: u64 = 0;
        let mut n = 0;
        while n <= bits {
            let v1 = (self.runif() * 65536.0).floor() as u64;
            v = v.wrapping_mul(65536).wrapping_add(v1);
            n += 16;
        }
        if bits >= 64 {
            v
        } else {
            v & ((1u64 << bits) - 1)
        }
    }

    /// Uniform index in `[0, n)` by rejection sampling (R's `sample.kind = "Rejection"`)
    ///
    /// Returns 0 for `n == 0`.
    pub fn unif_index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let bits = (n as f64).log2().ceil() as u32;
        loop {
            let dv = self.rbits(bits);
            if dv < n as u64 {
                return dv as usize;
            }
        }
    }

    /// Draw `size` indices from `[0, n)` with replacement
    pub fn sample_with_replacement(&mut self, n: usize, size: usize) -> Vec<usize> {
        (0..size).map(|_| self.unif_index(n)).collect()
    }

    /// Draw a seed for a child generator
    pub fn next_seed(&mut self) -> u32 {
        self.next_u32()
    }

    /// Draw `n` pairwise distinct child seeds.
    ///
    /// A draw equal to an earlier one is discarded and redrawn, so no two
    /// children share a stream. Without collisions this is the same sequence
    /// as `n` calls to [`next_seed`](Self::next_seed).
    pub fn distinct_seeds(&mut self, n: usize) -> Vec<u32> {
        let mut used = HashSet::with_capacity(n);
        let mut seeds = Vec::with_capacity(n);
        while seeds.len() < n {
            let seed = self.next_seed();
            if used.insert(seed) {
                seeds.push(seed);
            }
        }
        seeds
    }

    /// Derive an independent child generator, advancing this one by one draw
    pub fn split(&mut self) -> Self {
        Self::new(self.next_seed())
    }
}

impl std::fmt::Debug for RMersenneTwister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RMersenneTwister")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r_rng_runif() {
        let mut rng = RMersenneTwister::new(2);

        // set.seed(2); runif(5)
        let expected = [0.1848822599, 0.7023740360, 0.5733263348, 0.1680519204, 0.9438393388];

        for &exp in expected.iter() {
            let got = rng.runif();
            assert!(got > 0.0 && got < 1.0);
            assert!((got - exp).abs() < 1e-9, "got {}, expected {}", got, exp);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = RMersenneTwister::new(42);
        let mut b = RMersenneTwister::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_unif_index_in_range() {
        let mut rng = RMersenneTwister::new(7);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let i = rng.unif_index(5);
            assert!(i < 5);
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s), "every index should be drawn eventually");
    }

    #[test]
    fn test_unif_index_single() {
        let mut rng = RMersenneTwister::new(3);
        for _ in 0..20 {
            assert_eq!(rng.unif_index(1), 0);
        }
        assert_eq!(rng.unif_index(0), 0);
    }

    #[test]
    fn test_distinct_seeds_no_repeats() {
        // the first 1000 raw draws of this parent contain a repeated value
        let mut raw = RMersenneTwister::new(6922);
        let draws: Vec<u32> = (0..1000).map(|_| raw.next_seed()).collect();
        let raw_unique: HashSet<u32> = draws.iter().copied().collect();
        assert!(raw_unique.len() < draws.len());

        let seeds = RMersenneTwister::new(6922).distinct_seeds(1000);
        let unique: HashSet<u32> = seeds.iter().copied().collect();
        assert_eq!(seeds.len(), 1000);
        assert_eq!(unique.len(), 1000);
        assert_eq!(seeds[0], draws[0]);
    }

    #[test]
    fn test_split_streams_differ() {
        let mut parent = RMersenneTwister::new(11);
        let mut c1 = parent.split();
        let mut c2 = parent.split();
        let s1: Vec<u32> = (0..10).map(|_| c1.next_u32()).collect();
        let s2: Vec<u32> = (0..10).map(|_| c2.next_u32()).collect();
        assert_ne!(s1, s2);
    }
}
