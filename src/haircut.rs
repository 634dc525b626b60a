//! # Sharpe Ratio Haircuts
//!
//! Harvey, C. and Liu, Y. (2015), *Backtesting*, Journal of Portfolio
//! Management: an observed Sharpe ratio is converted into a p-value, the
//! p-value is adjusted for the number of strategies that were tried, and the
//! adjusted p-value is converted back into a Sharpe ratio.
//!
//! ```rust,no_run
//! use sharpe_haircut::{haircut_sharpe_ratios, HaircutConfig, HaircutRequest, SamplingFrequency};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = HaircutRequest {
//!         sampling_frequency: SamplingFrequency::Monthly,
//!         num_obs: 120,
//!         sharpe_ratio: 1.0,
//!         is_annualized: true,
//!         is_autocorr_adjusted: true,
//!         autocorrelation: 0.0,
//!         num_multiple_test: 100,
//!         avg_correlation: 0.4,
//!     };
//!     let table = haircut_sharpe_ratios(&request, &HaircutConfig::seeded(7))?;
//!     for result in &table.results {
//!         println!("{}: haircut {:.1}%", result.method, result.haircut_percentage);
//!     }
//!     Ok(())
//! }
//! ```

use log::debug;
use statrs::distribution::ContinuousCDF;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::HaircutConfig,
    errors::{ensure_finite, validate_count, validate_positive, HaircutError, HaircutResult},
    frequency::{annualized_sharpe_ratio, monthly_observations, SamplingFrequency},
    math_utils::{student_t, upper_tail_quantile},
    monte_carlo::{simulate_corrections, CancellationToken},
    multiple_testing::bonferroni_adjusted,
    parameters::{estimate_structural_parameters, required_trials},
    results::{CorrectionMethod, CorrectionResult, HaircutTable},
    secure_rng::entropy_seed,
    simulation::{simulate_t_statistics, SimulationModel},
};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Inputs of one haircut computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HaircutRequest {
    /// Frequency of the returns behind the Sharpe ratio
    pub sampling_frequency: SamplingFrequency,
    /// Number of return observations at `sampling_frequency`
    pub num_obs: usize,
    /// Reported Sharpe ratio
    ///
    /// Must be positive after annualization and autocorrelation adjustment;
    /// zero, negative or non-finite values are rejected with
    /// [`HaircutError::InvalidInput`].
    pub sharpe_ratio: f64,
    /// Whether `sharpe_ratio` is already annualized
    pub is_annualized: bool,
    /// Whether `sharpe_ratio` is already adjusted for autocorrelation
    pub is_autocorr_adjusted: bool,
    /// First-order autocorrelation of returns at `sampling_frequency`
    pub autocorrelation: f64,
    /// Number of other strategies assumed to have been tried
    pub num_multiple_test: usize,
    /// Average pairwise correlation among the tried strategies
    pub avg_correlation: f64,
}

/// Two-sided p-value of an annualized Sharpe ratio measured over `monthly_obs` months.
///
/// Uses the Student-t distribution with `monthly_obs - 1` degrees of freedom
/// and the t-ratio `SR/√12 · √N`.
pub fn sharpe_ratio_p_value(annual_sharpe_ratio: f64, monthly_obs: usize) -> HaircutResult<f64> {
    validate_positive(annual_sharpe_ratio, "annual_sharpe_ratio")?;
    validate_count(monthly_obs, 2, "monthly_observations")?;

    let n = monthly_obs as f64;
    let t_ratio = annual_sharpe_ratio / MONTHS_PER_YEAR.sqrt() * n.sqrt();
    let distribution = student_t(n - 1.0)?;
    let p_value = 2.0 * distribution.sf(t_ratio);

    if p_value.is_nan() || p_value <= 0.0 {
        return Err(HaircutError::numerical(
            format!(
                "p-value of t-ratio {:.3} underflows double precision",
                t_ratio
            ),
            "sharpe_ratio_p_value",
        ));
    }
    Ok(p_value.min(1.0))
}

/// Adjusted annual Sharpe ratio and haircut percentage for an adjusted p-value.
///
/// The p-value is inverted through the Student-t quantile with
/// `monthly_obs - 1` degrees of freedom at `1 - p/2`, converted to a monthly
/// Sharpe ratio and annualized with `√12`.
///
/// # Example
/// ```rust
/// use sharpe_haircut::haircut::{sharpe_ratio_haircut, sharpe_ratio_p_value};
///
/// let p = sharpe_ratio_p_value(1.0, 120).unwrap();
/// let (adjusted, haircut) = sharpe_ratio_haircut(p, 120, 1.0).unwrap();
/// assert!((adjusted - 1.0).abs() < 1e-6);
/// assert!(haircut.abs() < 1e-4);
/// ```
pub fn sharpe_ratio_haircut(
    adjusted_p_value: f64,
    monthly_obs: usize,
    annual_sharpe_ratio: f64,
) -> HaircutResult<(f64, f64)> {
    if !annual_sharpe_ratio.is_finite() || annual_sharpe_ratio == 0.0 {
        return Err(HaircutError::invalid(
            "annual_sharpe_ratio",
            annual_sharpe_ratio,
            "a finite nonzero number",
        ));
    }
    validate_count(monthly_obs, 2, "monthly_observations")?;
    if adjusted_p_value.is_nan() || adjusted_p_value <= 0.0 || adjusted_p_value > 1.0 {
        return Err(HaircutError::numerical(
            format!("adjusted p-value {} outside (0, 1]", adjusted_p_value),
            "sharpe_ratio_haircut",
        ));
    }

    let n = monthly_obs as f64;
    let distribution = student_t(n - 1.0)?;
    let t_critical = upper_tail_quantile(&distribution, adjusted_p_value / 2.0, "sharpe_ratio_haircut")?;
    let adjusted = ensure_finite(
        t_critical / n.sqrt() * MONTHS_PER_YEAR.sqrt(),
        "adjusted Sharpe ratio",
        "sharpe_ratio_haircut",
    )?;
    let haircut = (annual_sharpe_ratio - adjusted) / annual_sharpe_ratio * 100.0;
    Ok((adjusted, haircut))
}

/// Haircut a Sharpe ratio under Bonferroni, Holm, BHY and their average.
///
/// Only positive Sharpe ratios can be haircut. A request whose annualized,
/// autocorrelation-adjusted Sharpe ratio is zero or negative fails with
/// [`HaircutError::InvalidInput`] before any simulation runs.
pub fn haircut_sharpe_ratios(
    request: &HaircutRequest,
    config: &HaircutConfig,
) -> HaircutResult<HaircutTable> {
    haircut_sharpe_ratios_with_cancel(request, config, &CancellationToken::new())
}

/// [`haircut_sharpe_ratios`] with a token that can stop the Monte Carlo loop.
///
/// All inputs are validated before the panel is simulated; the call either
/// returns the complete table or an error.
pub fn haircut_sharpe_ratios_with_cancel(
    request: &HaircutRequest,
    config: &HaircutConfig,
    cancel: &CancellationToken,
) -> HaircutResult<HaircutTable> {
    if request.sharpe_ratio == 0.0 {
        return Err(HaircutError::invalid(
            "sharpe_ratio",
            request.sharpe_ratio,
            "nonzero; the haircut of a zero Sharpe ratio is undefined",
        ));
    }
    validate_count(request.num_obs, 1, "num_obs")?;
    validate_count(request.num_multiple_test, 1, "num_multiple_test")?;
    validate_count(config.num_simulations, 1, "num_simulations")?;

    let annual_sharpe_ratio = annualized_sharpe_ratio(
        request.sharpe_ratio,
        request.sampling_frequency,
        request.autocorrelation,
        request.is_annualized,
        request.is_autocorr_adjusted,
    )?;
    validate_positive(annual_sharpe_ratio, "annual_sharpe_ratio")?;

    let monthly_obs = monthly_observations(request.num_obs, request.sampling_frequency)?;
    validate_count(monthly_obs, 2, "monthly_observations")?;

    let p_value = sharpe_ratio_p_value(annual_sharpe_ratio, monthly_obs)?;
    let parameters = estimate_structural_parameters(request.avg_correlation);
    let num_trials = required_trials(request.num_multiple_test, &parameters);
    let model = SimulationModel::from_parameters(&parameters, num_trials, config);

    debug!(
        "Haircut inputs: annual SR {:.4}, {} monthly observations, p-value {:e}",
        annual_sharpe_ratio, monthly_obs, p_value
    );
    debug!(
        "Structural parameters: rho {:.3}, universe {:.1}, p0 {:.5}, lambda {:.7}; {} trials per row",
        parameters.rho, parameters.num_trials, parameters.prob_zero_mean, parameters.lambda, num_trials
    );

    let seed = config.seed.unwrap_or_else(entropy_seed);
    let panel = simulate_t_statistics(&model, config.num_simulations, seed, config)?;
    let samples = simulate_corrections(&panel, p_value, request.num_multiple_test, config, cancel)?;

    let bonferroni = bonferroni_adjusted(p_value, request.num_multiple_test);
    let holm = samples.median_holm()?;
    let bhy = samples.median_bhy()?;
    let average = (bonferroni + holm + bhy) / 3.0;

    let adjusted = [bonferroni, holm, bhy, average];
    let mut results = [CorrectionResult {
        method: CorrectionMethod::Bonferroni,
        adjusted_p_value: 0.0,
        adjusted_sharpe_ratio: 0.0,
        haircut_percentage: 0.0,
    }; 4];
    for (slot, method) in results.iter_mut().zip(CorrectionMethod::ALL) {
        let adjusted_p_value = adjusted[method.index()];
        let (adjusted_sharpe_ratio, haircut_percentage) =
            sharpe_ratio_haircut(adjusted_p_value, monthly_obs, annual_sharpe_ratio)?;
        *slot = CorrectionResult {
            method,
            adjusted_p_value,
            adjusted_sharpe_ratio,
            haircut_percentage,
        };
    }

    Ok(HaircutTable {
        results,
        annual_sharpe_ratio,
        monthly_observations: monthly_obs,
        p_value,
        num_trials,
        num_simulations: config.num_simulations,
    })
}
