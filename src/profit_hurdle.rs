//! # Profit Hurdles
//!
//! The minimum average annual return a strategy must earn to stay
//! significant after accounting for `M` other strategies tried. Each
//! correction method yields a threshold t-statistic, which is converted to
//! a return through the strategy's volatility and track record length.

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::HaircutConfig,
    errors::{validate_count, validate_positive, validate_probability, HaircutResult},
    math_utils::{median, standard_normal, upper_tail_quantile},
    monte_carlo::{run_repetitions, CancellationToken},
    multiple_testing::{bhy_threshold_t_stat, holm_threshold_t_stat},
    parameters::{estimate_structural_parameters, required_trials},
    results::{CorrectionMethod, ProfitHurdle, ProfitHurdleTable},
    secure_rng::entropy_seed,
    simulation::{simulate_t_statistics, SimulationModel},
};

/// Inputs of one profit hurdle computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfitHurdleRequest {
    /// Number of other strategies assumed to have been tried
    pub num_multiple_test: usize,
    /// Length of the track record in months
    pub num_obs_monthly: usize,
    /// Significance level, e.g. 0.05
    pub significance_level: f64,
    /// Annual volatility of the strategy's returns
    pub annual_volatility: f64,
    /// Average pairwise correlation among the tried strategies
    pub avg_correlation: f64,
}

/// Annual return in percent whose t-statistic over `num_obs_monthly` months is `t_stat`.
pub fn annual_return_for_t_stat(t_stat: f64, num_obs_monthly: usize, annual_volatility: f64) -> f64 {
    let monthly_volatility = annual_volatility / 12f64.sqrt();
    monthly_volatility / (num_obs_monthly as f64).sqrt() * t_stat * 12.0 * 100.0
}

/// Required annual returns under Bonferroni, Holm, BHY and their average.
pub fn profit_hurdle(
    request: &ProfitHurdleRequest,
    config: &HaircutConfig,
) -> HaircutResult<ProfitHurdleTable> {
    profit_hurdle_with_cancel(request, config, &CancellationToken::new())
}

/// [`profit_hurdle`] with a token that can stop the Monte Carlo loop.
pub fn profit_hurdle_with_cancel(
    request: &ProfitHurdleRequest,
    config: &HaircutConfig,
    cancel: &CancellationToken,
) -> HaircutResult<ProfitHurdleTable> {
    validate_count(request.num_multiple_test, 1, "num_multiple_test")?;
    validate_count(request.num_obs_monthly, 1, "num_obs_monthly")?;
    validate_probability(request.significance_level, "significance_level")?;
    validate_positive(request.annual_volatility, "annual_volatility")?;
    validate_count(config.num_simulations, 1, "num_simulations")?;

    let m = request.num_multiple_test;
    let alpha = request.significance_level;

    let bonferroni = upper_tail_quantile(
        standard_normal(),
        alpha / (2.0 * m as f64),
        "profit_hurdle",
    )?;

    let parameters = estimate_structural_parameters(request.avg_correlation);
    let num_trials = required_trials(m, &parameters);
    let model = SimulationModel::from_parameters(&parameters, num_trials, config);
    debug!(
        "Profit hurdle: {} tests at alpha {}, {} trials per row, Bonferroni t {:.4}",
        m, alpha, num_trials, bonferroni
    );

    let seed = config.seed.unwrap_or_else(entropy_seed);
    let panel = simulate_t_statistics(&model, config.num_simulations, seed, config)?;
    let thresholds = run_repetitions(&panel, config, cancel, |row| {
        Ok((
            holm_threshold_t_stat(row, m, alpha)?,
            bhy_threshold_t_stat(row, m, alpha)?,
        ))
    })?;
    let (holm_samples, bhy_samples): (Vec<f64>, Vec<f64>) = thresholds.into_iter().unzip();

    let holm = median(&holm_samples)?;
    let bhy = median(&bhy_samples)?;
    let average = (bonferroni + holm + bhy) / 3.0;
    let t_stats = [bonferroni, holm, bhy, average];

    let hurdles = CorrectionMethod::ALL.map(|method| {
        let threshold_t_stat = t_stats[method.index()];
        ProfitHurdle {
            method,
            threshold_t_stat,
            annual_return_percentage: annual_return_for_t_stat(
                threshold_t_stat,
                request.num_obs_monthly,
                request.annual_volatility,
            ),
        }
    });

    Ok(ProfitHurdleTable {
        hurdles,
        num_trials,
        num_simulations: config.num_simulations,
    })
}
