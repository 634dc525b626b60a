//! # Haircut Configuration
//!
//! Simulation settings shared by the haircut and profit hurdle computations.
//! The configuration is always passed explicitly; nothing is stored globally,
//! so two calls with the same configuration and seed give identical results.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::simulation::NoiseModel;

/// Default number of Monte Carlo repetitions.
pub const DEFAULT_NUM_SIMULATIONS: usize = 2000;

/// Annual return volatility assumed by the structural model (15%).
pub const DEFAULT_ANNUAL_VOLATILITY: f64 = 0.15;

/// Number of observations used for volatility estimation in the structural model.
pub const DEFAULT_OBSERVATIONS_PER_YEAR: usize = 240;

/// Monte Carlo settings for the haircut and profit hurdle algorithms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HaircutConfig {
    /// Number of Monte Carlo repetitions (rows of the simulated panel)
    pub num_simulations: usize,
    /// Master seed; `None` draws one from OS entropy per call
    pub seed: Option<u64>,
    /// Run panel generation and repetitions on the rayon pool when available
    pub parallel: bool,
    /// Annual volatility of simulated strategy returns
    pub annual_volatility: f64,
    /// Observation count used to scale the simulated noise
    pub observations_per_year: usize,
    /// Sampler for the correlated Gaussian noise
    pub noise_model: NoiseModel,
    /// Log progress every this many repetitions (0 disables)
    pub progress_interval: usize,
    /// Upper bound on the simulated panel size in bytes
    pub max_panel_bytes: usize,
}

impl Default for HaircutConfig {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            seed: None,
            parallel: true,
            annual_volatility: DEFAULT_ANNUAL_VOLATILITY,
            observations_per_year: DEFAULT_OBSERVATIONS_PER_YEAR,
            noise_model: NoiseModel::OneFactor,
            progress_interval: 100,
            max_panel_bytes: 1 << 30,
        }
    }
}

impl HaircutConfig {
    /// Reduced repetition count for interactive use and tests.
    pub fn fast() -> Self {
        Self {
            num_simulations: 200,
            progress_interval: 0,
            ..Self::default()
        }
    }

    /// Default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Monthly volatility implied by the annual volatility.
    pub fn monthly_volatility(&self) -> f64 {
        self.annual_volatility / 12f64.sqrt()
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: HaircutConfig,
}

impl ConfigBuilder {
    /// Start building from the default configuration.
    pub fn new() -> Self {
        Self {
            config: HaircutConfig::default(),
        }
    }

    /// Set the number of Monte Carlo repetitions.
    pub fn num_simulations(mut self, num_simulations: usize) -> Self {
        self.config.num_simulations = num_simulations;
        self
    }

    /// Set the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Enable or disable parallel execution.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the annual volatility of simulated returns.
    pub fn annual_volatility(mut self, annual_volatility: f64) -> Self {
        self.config.annual_volatility = annual_volatility;
        self
    }

    /// Set the observation count used to scale simulated noise.
    pub fn observations_per_year(mut self, observations: usize) -> Self {
        self.config.observations_per_year = observations;
        self
    }

    /// Choose the noise sampler.
    pub fn noise_model(mut self, noise_model: NoiseModel) -> Self {
        self.config.noise_model = noise_model;
        self
    }

    /// Set the progress logging cadence.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Set the panel memory cap in bytes.
    pub fn max_panel_bytes(mut self, bytes: usize) -> Self {
        self.config.max_panel_bytes = bytes;
        self
    }

    /// Build and return the configuration.
    pub fn build(self) -> HaircutConfig {
        self.config
    }
}
