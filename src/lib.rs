//! # Sharpe Ratio Haircuts
//!
//! Multiple-testing adjustments of backtested Sharpe ratios following
//! Harvey, Liu and Zhu (2015), *...and the Cross-Section of Expected Returns*,
//! and Harvey and Liu (2015), *Backtesting*.
//!
//! A strategy that is the best of many tried looks better than it is. This
//! crate estimates how much of an observed Sharpe ratio survives once the
//! number of strategies tried, and the correlation among them, is accounted
//! for.
//!
//! ## Key Features
//!
//! - **Frequency Normalization**: Sharpe ratios at any sampling frequency, with
//!   the Lo (2002) autocorrelation adjustment
//! - **Structural Model**: HLZ mixture model parameters interpolated by average correlation
//! - **Monte Carlo Simulation**: Correlated t-statistic panels with reproducible,
//!   per-row ChaCha20 streams, parallel on rayon
//! - **Multiple Testing**: Bonferroni, Holm and BHY adjusted p-values and their average
//! - **Profit Hurdles**: Minimum annual return required for significance
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sharpe_haircut::{haircut_sharpe_ratios, HaircutConfig, HaircutRequest, SamplingFrequency};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = HaircutRequest {
//!         sampling_frequency: SamplingFrequency::Daily,
//!         num_obs: 1250,
//!         sharpe_ratio: 0.1,
//!         is_annualized: false,
//!         is_autocorr_adjusted: false,
//!         autocorrelation: 0.05,
//!         num_multiple_test: 100,
//!         avg_correlation: 0.4,
//!     };
//!
//!     let table = haircut_sharpe_ratios(&request, &HaircutConfig::default())?;
//!     println!("Annualized Sharpe ratio: {:.3}", table.annual_sharpe_ratio);
//!     for result in &table.results {
//!         println!(
//!             "{:>10}: p = {:.4}, SR = {:.3}, haircut = {:.1}%",
//!             result.method,
//!             result.adjusted_p_value,
//!             result.adjusted_sharpe_ratio,
//!             result.haircut_percentage
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`haircut_sharpe_ratios`] composes the building blocks, each usable on its own:
//! [`frequency`] normalizes the Sharpe ratio, [`parameters`] interpolates the
//! structural model, [`simulation`] draws the t-statistic panel,
//! [`multiple_testing`] applies the corrections and [`monte_carlo`] runs them
//! over every panel row.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod math_utils;
pub mod results;
pub mod secure_rng;

// Algorithms
pub mod frequency;
pub mod haircut;
pub mod monte_carlo;
pub mod multiple_testing;
pub mod parameters;
pub mod profit_hurdle;
pub mod simulation;

// Re-exports for convenience - main public API
pub use config::{ConfigBuilder, HaircutConfig};
pub use errors::{HaircutError, HaircutResult};
pub use results::{
    CorrectionMethod, CorrectionResult, HaircutTable, ProfitHurdle, ProfitHurdleTable,
};

pub use frequency::{
    annualized_sharpe_ratio, monthly_observations, SamplingFrequency, SharpeRatioInput,
};
pub use haircut::{
    haircut_sharpe_ratios, haircut_sharpe_ratios_with_cancel, sharpe_ratio_haircut,
    sharpe_ratio_p_value, HaircutRequest,
};
pub use monte_carlo::CancellationToken;
pub use parameters::{estimate_structural_parameters, StructuralParameters};
pub use profit_hurdle::{profit_hurdle, profit_hurdle_with_cancel, ProfitHurdleRequest};
pub use simulation::{simulate_t_statistics, NoiseModel, SimulationModel, TStatisticPanel};
