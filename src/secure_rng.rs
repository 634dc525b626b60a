//! Seedable random number generation for the structural model simulation.
//!
//! Uses the ChaCha20 stream cipher generator so that every Monte Carlo row can
//! get its own reproducible, non-overlapping stream derived from one master
//! seed. Rows generated in parallel therefore produce exactly the same panel
//! as rows generated sequentially.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Exp, StandardNormal};

use crate::errors::{HaircutError, HaircutResult};

// Golden ratio constant for seed mixing to ensure good distribution
const GOLDEN_RATIO_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Mix a master seed with a stream index for deterministic, decorrelated streams.
///
/// Uses golden ratio multiplication and bit rotation so adjacent indices map
/// to unrelated seeds.
pub fn mix_seed(base_seed: u64, index: usize) -> u64 {
    base_seed
        .wrapping_mul(GOLDEN_RATIO_SEED_MIX)
        .wrapping_add(index as u64)
        .rotate_left(17)
}

/// Draw a fresh master seed from OS entropy.
pub fn entropy_seed() -> u64 {
    ChaCha20Rng::from_entropy().next_u64()
}

/// ChaCha20 wrapper exposing the draws the structural model needs.
#[derive(Clone, Debug)]
pub struct SecureRng {
    rng: ChaCha20Rng,
}

impl SecureRng {
    /// Create a new RNG with a specific seed for reproducibility.
    ///
    /// `seed_from_u64` expands the u64 into the full 256-bit ChaCha key.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Create the RNG for stream `index` of a run seeded with `master_seed`.
    pub fn for_stream(master_seed: u64, index: usize) -> Self {
        Self::with_seed(mix_seed(master_seed, index))
    }

    /// Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Standard normal draw.
    pub fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    /// Fill `buffer` with independent standard normal draws.
    pub fn fill_standard_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.rng);
        }
    }

    /// Exponential sampler parameterised by its mean (scale), not its rate.
    pub fn exponential_with_mean(mean: f64) -> HaircutResult<Exp<f64>> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(HaircutError::invalid(
                "exponential_mean",
                mean,
                "finite and > 0",
            ));
        }
        Exp::new(1.0 / mean).map_err(|e| {
            HaircutError::numerical(
                format!("failed to build exponential distribution: {}", e),
                "exponential_with_mean",
            )
        })
    }

    /// Draw from any `rand_distr` distribution.
    pub fn sample<D: Distribution<f64>>(&mut self, distribution: &D) -> f64 {
        distribution.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_rng_determinism() {
        let mut rng1 = SecureRng::with_seed(12345);
        let mut rng2 = SecureRng::with_seed(12345);

        for _ in 0..100 {
            assert_eq!(rng1.uniform(), rng2.uniform());
            assert_eq!(rng1.standard_normal(), rng2.standard_normal());
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = SecureRng::for_stream(entropy_seed(), 0);
        for _ in 0..1000 {
            let val = rng.uniform();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_streams_are_distinct() {
        let mut a = SecureRng::for_stream(42, 0);
        let mut b = SecureRng::for_stream(42, 1);
        let va: Vec<f64> = (0..10).map(|_| a.uniform()).collect();
        let vb: Vec<f64> = (0..10).map(|_| b.uniform()).collect();
        assert_ne!(va, vb);

        assert_ne!(mix_seed(42, 0), mix_seed(42, 1));
        assert_ne!(mix_seed(42, 0), mix_seed(43, 0));
    }

    #[test]
    fn test_stream_matches_mixed_seed() {
        let master = entropy_seed();
        let mut stream = SecureRng::for_stream(master, 3);
        let mut direct = SecureRng::with_seed(mix_seed(master, 3));
        for _ in 0..50 {
            assert_eq!(stream.uniform(), direct.uniform());
        }
    }

    #[test]
    fn test_exponential_mean() {
        let exp = SecureRng::exponential_with_mean(0.5).unwrap();
        let mut rng = SecureRng::with_seed(7);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.sample(&exp)).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "sample mean {} too far from 0.5", mean);

        assert!(SecureRng::exponential_with_mean(0.0).is_err());
        assert!(SecureRng::exponential_with_mean(f64::NAN).is_err());
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = SecureRng::with_seed(99);
        let mut buffer = vec![0.0; 20_000];
        rng.fill_standard_normal(&mut buffer);
        let mean = buffer.iter().sum::<f64>() / buffer.len() as f64;
        let var = buffer.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / buffer.len() as f64;
        assert!(mean.abs() < 0.03);
        assert!((var - 1.0).abs() < 0.05);
    }
}
