//! Simulation of t-statistics for the strategies a researcher could have tried.
//!
//! Follows the structural model of Harvey, Liu and Zhu (2015): with
//! probability `p0` a strategy has zero mean return, otherwise its mean is
//! drawn from an exponential distribution with mean `lambda`. Returns carry
//! Gaussian noise with a common pairwise correlation `rho`. Each panel row is
//! one Monte Carlo repetition holding the absolute t-statistics of a full
//! universe of simulated strategies.

use nalgebra::{Cholesky, DMatrix, DVector};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::HaircutConfig,
    errors::{validate_allocation_size, validate_count, validate_positive, HaircutError, HaircutResult},
    parameters::StructuralParameters,
    secure_rng::SecureRng,
};

/// Sampler for the equicorrelated Gaussian noise component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoiseModel {
    /// One common factor plus idiosyncratic shocks: `√ρ·Z₀ + √(1−ρ)·Zⱼ`.
    /// Exact for a constant-correlation matrix and linear in the trial count.
    #[default]
    OneFactor,
    /// Cholesky factor of the full Toeplitz covariance matrix.
    /// Cubic set-up cost; intended for small universes and cross-checks.
    Cholesky,
}

/// Inputs of one panel simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationModel {
    /// Common pairwise correlation of strategy returns
    pub rho: f64,
    /// Number of simulated strategies per row
    pub num_trials: usize,
    /// Probability that a strategy has zero mean
    pub prob_zero_mean: f64,
    /// Mean of the exponential distribution of nonzero monthly means
    pub lambda: f64,
    /// Annual volatility of strategy returns
    pub annual_volatility: f64,
    /// Observations used to scale the noise
    pub observations_per_year: usize,
    /// Noise sampler
    pub noise_model: NoiseModel,
}

impl SimulationModel {
    /// Build the model from interpolated structural parameters and the run configuration.
    pub fn from_parameters(
        parameters: &StructuralParameters,
        num_trials: usize,
        config: &HaircutConfig,
    ) -> Self {
        Self {
            rho: parameters.rho,
            num_trials,
            prob_zero_mean: parameters.prob_zero_mean,
            lambda: parameters.lambda,
            annual_volatility: config.annual_volatility,
            observations_per_year: config.observations_per_year,
            noise_model: config.noise_model,
        }
    }

    fn monthly_volatility(&self) -> f64 {
        self.annual_volatility / 12f64.sqrt()
    }

    /// Standard error of a monthly mean estimated from `observations_per_year` returns.
    fn standard_error(&self) -> f64 {
        self.monthly_volatility() / (self.observations_per_year as f64).sqrt()
    }

    fn validate(&self) -> HaircutResult<()> {
        if !(0.0..1.0).contains(&self.rho) {
            return Err(HaircutError::invalid("rho", self.rho, "[0, 1)"));
        }
        validate_count(self.num_trials, 1, "num_trials")?;
        validate_count(self.observations_per_year, 1, "observations_per_year")?;
        validate_positive(self.annual_volatility, "annual_volatility")?;
        validate_positive(self.lambda, "lambda")?;
        if self.prob_zero_mean.is_nan() {
            return Err(HaircutError::invalid("prob_zero_mean", self.prob_zero_mean, "not NaN"));
        }
        Ok(())
    }
}

/// Panel of simulated absolute t-statistics, one row per Monte Carlo repetition.
#[derive(Debug, Clone, PartialEq)]
pub struct TStatisticPanel {
    num_trials: usize,
    data: Vec<f64>,
}

impl TStatisticPanel {
    /// Number of repetitions (rows).
    pub fn num_repetitions(&self) -> usize {
        self.data.len() / self.num_trials
    }

    /// Number of simulated strategies per row.
    pub fn num_trials(&self) -> usize {
        self.num_trials
    }

    /// One repetition's simulated universe.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.num_trials;
        &self.data[start..start + self.num_trials]
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.num_trials)
    }
}

/// Symmetric Toeplitz matrix generated from its first row.
pub fn toeplitz(first_row: &[f64]) -> DMatrix<f64> {
    let n = first_row.len();
    DMatrix::from_fn(n, n, |i, j| first_row[i.abs_diff(j)])
}

/// Correlation matrix with unit diagonal and constant off-diagonal `rho`.
pub fn equicorrelation_matrix(n: usize, rho: f64) -> DMatrix<f64> {
    let mut first_row = vec![rho; n];
    if let Some(first) = first_row.first_mut() {
        *first = 1.0;
    }
    toeplitz(&first_row)
}

enum NoiseSampler {
    OneFactor { common: f64, idiosyncratic: f64 },
    Cholesky { lower: DMatrix<f64> },
}

impl NoiseSampler {
    fn new(model: &SimulationModel) -> HaircutResult<Self> {
        let scale = model.standard_error();
        match model.noise_model {
            NoiseModel::OneFactor => Ok(NoiseSampler::OneFactor {
                common: scale * model.rho.sqrt(),
                idiosyncratic: scale * (1.0 - model.rho).sqrt(),
            }),
            NoiseModel::Cholesky => {
                let covariance =
                    equicorrelation_matrix(model.num_trials, model.rho) * (scale * scale);
                let cholesky = Cholesky::new(covariance).ok_or_else(|| {
                    HaircutError::numerical(
                        format!(
                            "covariance matrix with rho = {} is not positive definite",
                            model.rho
                        ),
                        "simulate_t_statistics",
                    )
                })?;
                Ok(NoiseSampler::Cholesky {
                    lower: cholesky.l(),
                })
            }
        }
    }

    fn fill(&self, rng: &mut SecureRng, row: &mut [f64]) {
        match self {
            NoiseSampler::OneFactor {
                common,
                idiosyncratic,
            } => {
                let factor = common * rng.standard_normal();
                for value in row.iter_mut() {
                    *value = factor + idiosyncratic * rng.standard_normal();
                }
            }
            NoiseSampler::Cholesky { lower } => {
                let mut shocks = vec![0.0; row.len()];
                rng.fill_standard_normal(&mut shocks);
                let correlated = lower * DVector::from_vec(shocks);
                row.copy_from_slice(correlated.as_slice());
            }
        }
    }
}

/// Simulate `num_repetitions` rows of absolute t-statistics.
///
/// Row `i` draws from its own stream `mix_seed(master_seed, i)`, so the panel
/// is identical whether rows are filled sequentially or on the rayon pool.
pub fn simulate_t_statistics(
    model: &SimulationModel,
    num_repetitions: usize,
    master_seed: u64,
    config: &HaircutConfig,
) -> HaircutResult<TStatisticPanel> {
    model.validate()?;
    validate_count(num_repetitions, 1, "num_repetitions")?;

    let cells = num_repetitions.checked_mul(model.num_trials).ok_or_else(|| {
        HaircutError::numerical("panel size overflows usize", "simulate_t_statistics")
    })?;
    let bytes = cells.saturating_mul(std::mem::size_of::<f64>());
    validate_allocation_size(bytes, config.max_panel_bytes, "simulate_t_statistics")?;

    let sampler = NoiseSampler::new(model)?;
    let mean_distribution = SecureRng::exponential_with_mean(model.lambda)?;
    let standard_error = model.standard_error();

    log::debug!(
        "Simulating {} x {} t-statistic panel (rho = {:.4}, p0 = {:.4}, lambda = {:.6}, {:?})",
        num_repetitions,
        model.num_trials,
        model.rho,
        model.prob_zero_mean,
        model.lambda,
        model.noise_model
    );

    let fill_row = |index: usize, row: &mut [f64]| {
        let mut rng = SecureRng::for_stream(master_seed, index);
        sampler.fill(&mut rng, row);
        for value in row.iter_mut() {
            let nonzero_mean = rng.uniform() > model.prob_zero_mean;
            let mean = rng.sample(&mean_distribution);
            let mu = if nonzero_mean { mean } else { 0.0 };
            *value = (mu + *value).abs() / standard_error;
        }
    };

    let mut data = vec![0.0; cells];

    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            use rayon::prelude::*;
            data.par_chunks_mut(model.num_trials)
                .enumerate()
                .for_each(|(index, row)| fill_row(index, row));
        } else {
            data.chunks_mut(model.num_trials)
                .enumerate()
                .for_each(|(index, row)| fill_row(index, row));
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(model.num_trials)
            .enumerate()
            .for_each(|(index, row)| fill_row(index, row));
    }

    Ok(TStatisticPanel {
        num_trials: model.num_trials,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn model(rho: f64, num_trials: usize, prob_zero_mean: f64, noise_model: NoiseModel) -> SimulationModel {
        SimulationModel {
            rho,
            num_trials,
            prob_zero_mean,
            lambda: 0.0055,
            annual_volatility: 0.15,
            observations_per_year: 240,
            noise_model,
        }
    }

    fn sample_correlation(panel: &TStatisticPanel, a: usize, b: usize) -> f64 {
        let n = panel.num_repetitions() as f64;
        let xs: Vec<f64> = panel.rows().map(|r| r[a]).collect();
        let ys: Vec<f64> = panel.rows().map(|r| r[b]).collect();
        let mx = xs.iter().sum::<f64>() / n;
        let my = ys.iter().sum::<f64>() / n;
        let cov = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum::<f64>() / n;
        let vx = xs.iter().map(|x| (x - mx).powi(2)).sum::<f64>() / n;
        let vy = ys.iter().map(|y| (y - my).powi(2)).sum::<f64>() / n;
        cov / (vx * vy).sqrt()
    }

    #[test]
    fn test_toeplitz_structure() {
        let m = equicorrelation_matrix(4, 0.3);
        assert_eq!(m.nrows(), 4);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.3 };
                assert_eq!(m[(i, j)], expected);
            }
        }

        let t = toeplitz(&[1.0, 0.5, 0.25]);
        assert_eq!(t[(0, 2)], 0.25);
        assert_eq!(t[(2, 0)], 0.25);
        assert_eq!(t[(1, 2)], 0.5);
    }

    #[test]
    fn test_panel_shape_and_sign() {
        let config = HaircutConfig::fast();
        let panel = simulate_t_statistics(&model(0.2, 50, 0.45, NoiseModel::OneFactor), 30, 1, &config)
            .unwrap();
        assert_eq!(panel.num_repetitions(), 30);
        assert_eq!(panel.num_trials(), 50);
        assert_eq!(panel.rows().len(), 30);
        assert!(panel.rows().all(|row| row.iter().all(|t| t.is_finite() && *t >= 0.0)));
    }

    #[test]
    fn test_same_seed_same_panel() {
        let config = HaircutConfig::fast();
        let m = model(0.4, 40, 0.5, NoiseModel::OneFactor);
        let a = simulate_t_statistics(&m, 20, 77, &config).unwrap();
        let b = simulate_t_statistics(&m, 20, 77, &config).unwrap();
        let c = simulate_t_statistics(&m, 20, 78, &config).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let m = model(0.4, 40, 0.5, NoiseModel::OneFactor);
        let parallel = HaircutConfig {
            parallel: true,
            ..HaircutConfig::fast()
        };
        let sequential = HaircutConfig {
            parallel: false,
            ..HaircutConfig::fast()
        };
        let a = simulate_t_statistics(&m, 25, 5, &parallel).unwrap();
        let b = simulate_t_statistics(&m, 25, 5, &sequential).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pure_noise_is_half_normal() {
        // With p0 >= 1 every strategy has zero mean and |t| ~ |N(0, 1)|.
        let config = HaircutConfig::fast();
        let panel = simulate_t_statistics(&model(0.0, 100, 1.5, NoiseModel::OneFactor), 200, 3, &config)
            .unwrap();
        let n = (panel.num_repetitions() * panel.num_trials()) as f64;
        let mean = panel.rows().flat_map(|r| r.iter()).sum::<f64>() / n;
        assert_approx_eq!(mean, (2.0 / std::f64::consts::PI).sqrt(), 0.03);
    }

    #[test]
    fn test_noise_models_share_correlation() {
        let config = HaircutConfig::fast();
        for noise_model in [NoiseModel::OneFactor, NoiseModel::Cholesky] {
            let panel = simulate_t_statistics(&model(0.0, 3, 1.5, noise_model), 4000, 11, &config)
                .unwrap();
            // Independent noise: |t| of different strategies are uncorrelated.
            assert!(sample_correlation(&panel, 0, 1).abs() < 0.06);
        }

        for noise_model in [NoiseModel::OneFactor, NoiseModel::Cholesky] {
            let panel = simulate_t_statistics(&model(0.9, 3, 1.5, noise_model), 4000, 11, &config)
                .unwrap();
            // Strongly correlated noise carries over to the absolute values.
            assert!(sample_correlation(&panel, 0, 2) > 0.5);
        }
    }

    #[test]
    fn test_invalid_models_rejected() {
        let config = HaircutConfig::fast();
        assert!(simulate_t_statistics(&model(1.0, 10, 0.5, NoiseModel::OneFactor), 10, 1, &config).is_err());
        assert!(simulate_t_statistics(&model(-0.1, 10, 0.5, NoiseModel::OneFactor), 10, 1, &config).is_err());
        assert!(simulate_t_statistics(&model(0.2, 0, 0.5, NoiseModel::OneFactor), 10, 1, &config).is_err());
        assert!(simulate_t_statistics(&model(0.2, 10, 0.5, NoiseModel::OneFactor), 0, 1, &config).is_err());
    }

    #[test]
    fn test_panel_memory_cap() {
        let config = HaircutConfig {
            max_panel_bytes: 1024,
            ..HaircutConfig::fast()
        };
        let result = simulate_t_statistics(&model(0.2, 100, 0.5, NoiseModel::OneFactor), 100, 1, &config);
        assert!(matches!(result, Err(HaircutError::AllocationTooLarge { .. })));
    }
}
