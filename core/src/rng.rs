//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through the single SimRng owned by an engine,
//! seeded once from SimConfig::random_seed. Two engines built from the
//! same config draw the same stream and produce the same event log.

use rand::{distributions::WeightedIndex, prelude::Distribution, RngCore, SeedableRng};
use rand_distr::Poisson;
use rand_pcg::Pcg64Mcg;

pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick. None for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_u64_below(items.len() as u64) as usize;
        items.get(index)
    }

    /// Index drawn proportionally to `weights`.
    /// None when the slice is empty or every weight is zero.
    pub fn weighted_index(&mut self, weights: &[u64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.inner))
    }

    /// Poisson draw with the given mean. A non-positive mean yields 0.
    pub fn poisson(&mut self, mean: f64) -> u32 {
        match Poisson::new(mean) {
            Ok(dist) => {
                let draw: f64 = dist.sample(&mut self.inner);
                draw as u32
            }
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(12345);
        let mut b = SimRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_u64_below(1000), b.next_u64_below(1000));
        }
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SimRng::new(7);
        for _ in 0..200 {
            assert_eq!(rng.weighted_index(&[0, 5, 0]), Some(1));
        }
        assert_eq!(rng.weighted_index(&[0, 0]), None);
        assert_eq!(rng.weighted_index(&[]), None);
    }

    #[test]
    fn poisson_mean_is_close() {
        let mut rng = SimRng::new(99);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| rng.poisson(1.5) as u64).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 1.5).abs() < 0.05, "sample mean {mean:.3} too far from 1.5");
        assert_eq!(rng.poisson(0.0), 0);
    }

    #[test]
    fn choose_on_empty_slice_is_none() {
        let mut rng = SimRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }
}
