//! Bounded random values for sensor samples, decay steps and transit delays.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of bounded random integers.
///
/// Each worker owns one; implementations need not be thread-safe beyond `Send`.
pub trait RandomSource: Send + 'static {
    /// Return a value in `low..high`. `high` must be greater than `low`.
    fn gen_range(&mut self, low: u32, high: u32) -> u32;
}

/// [`RandomSource`] backed by a `rand` standard RNG.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic stream for the given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Derive a source for one worker.
    ///
    /// With a base seed every worker still gets its own stream, so two
    /// monitors do not read identical values.
    pub fn for_worker(seed: Option<u64>, worker_index: u64) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed.wrapping_add(worker_index.wrapping_mul(0x9E37_79B9_7F4A_7C15))),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn gen_range(&mut self, low: u32, high: u32) -> u32 {
        self.rng.gen_range(low..high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = SeededRandom::from_seed(42);
        let mut b = SeededRandom::from_seed(42);
        let xs: Vec<u32> = (0..16).map(|_| a.gen_range(0, 1000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.gen_range(0, 1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = SeededRandom::from_entropy();
        for _ in 0..1000 {
            let v = rng.gen_range(1, 30);
            assert!((1..30).contains(&v));
        }
    }

    #[test]
    fn test_workers_get_distinct_streams() {
        let mut a = SeededRandom::for_worker(Some(7), 0);
        let mut b = SeededRandom::for_worker(Some(7), 1);
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0, u32::MAX)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0, u32::MAX)).collect();
        assert_ne!(xs, ys);
    }
}
