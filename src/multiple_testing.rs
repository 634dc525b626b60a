//! Multiple testing corrections: Bonferroni, Holm and BHY.
//!
//! For the haircut, the real strategy's p-value is inserted among the
//! p-values of `M` simulated competing strategies and the adjusted p-value at
//! its rank is read off. The real strategy's position is tracked through the
//! sort by index, never recovered by comparing floats.
//!
//! For the profit hurdle, the same procedures are run on the simulated
//! p-values alone to find the t-statistic a new strategy must beat.

use crate::{
    errors::{validate_count, HaircutResult},
    math_utils::{harmonic_number, two_sided_normal_p_value},
};

/// Threshold t-statistic used when no simulated p-value crosses the cut-off.
pub const DEFAULT_THRESHOLD_T_STAT: f64 = 1.96;

/// Bonferroni adjusted p-value: `min(M·p, 1)`.
pub fn bonferroni_adjusted(p_value: f64, num_multiple_test: usize) -> f64 {
    (num_multiple_test as f64 * p_value).min(1.0)
}

/// Sorted p-values of the simulated trials plus the real strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedPValues {
    values: Vec<f64>,
    real_rank: usize,
}

impl OrderedPValues {
    /// Merge the real strategy's p-value into the simulated ones and sort ascending.
    ///
    /// The real strategy is placed first among equal values, so its rank is
    /// the first position holding its value.
    pub fn with_real(simulated: &[f64], p_real: f64) -> Self {
        let mut tagged: Vec<(f64, bool)> = Vec::with_capacity(simulated.len() + 1);
        tagged.push((p_real, true));
        tagged.extend(simulated.iter().map(|&p| (p, false)));
        tagged.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)));

        let real_rank = tagged.iter().position(|&(_, is_real)| is_real).unwrap_or(0);
        Self {
            values: tagged.into_iter().map(|(p, _)| p).collect(),
            real_rank,
        }
    }

    /// Sorted p-values, real strategy included.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Zero-based rank of the real strategy.
    pub fn real_rank(&self) -> usize {
        self.real_rank
    }
}

/// Holm step-down adjusted p-values for an ascending sequence.
///
/// With `M + 1` sorted p-values, rank `i` (1-based) gets
/// `min(max_{j ≤ i} (M − j + 2)·p_(j), 1)`, which is non-decreasing in `i`.
pub fn holm_adjusted(sorted: &[f64], num_multiple_test: usize) -> Vec<f64> {
    let tests = num_multiple_test as f64 + 1.0;
    let mut running_max = f64::NEG_INFINITY;
    sorted
        .iter()
        .enumerate()
        .map(|(j, &p)| {
            running_max = running_max.max((tests - j as f64) * p);
            running_max.min(1.0)
        })
        .collect()
}

/// Benjamini-Hochberg-Yekutieli adjusted p-values for an ascending sequence.
///
/// The top rank keeps its raw p-value; each lower rank `i` takes
/// `min((M + 1)·c/i · p_(i), adjusted_(i+1))` with `c = Σ_{k=1}^{M} 1/k`.
pub fn bhy_adjusted(sorted: &[f64], num_multiple_test: usize) -> Vec<f64> {
    let mut adjusted = sorted.to_vec();
    let Some(last) = sorted.len().checked_sub(1) else {
        return adjusted;
    };
    let scale = (num_multiple_test as f64 + 1.0) * harmonic_number(num_multiple_test);
    for i in (0..last).rev() {
        let rank = (i + 1) as f64;
        adjusted[i] = (scale / rank * sorted[i]).min(adjusted[i + 1]);
    }
    adjusted
}

/// Holm and BHY adjusted p-values of the real strategy for one repetition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepetitionCorrection {
    /// Holm adjusted p-value
    pub holm: f64,
    /// BHY adjusted p-value
    pub bhy: f64,
}

/// Correct the real strategy's p-value against one simulated universe.
///
/// The first `num_multiple_test` statistics of `row` are the other strategies tried.
pub fn correct_repetition(
    row: &[f64],
    p_real: f64,
    num_multiple_test: usize,
) -> HaircutResult<RepetitionCorrection> {
    validate_count(row.len(), num_multiple_test, "simulated_trials")?;
    let simulated: Vec<f64> = row[..num_multiple_test]
        .iter()
        .map(|&t| two_sided_normal_p_value(t))
        .collect();

    let ordered = OrderedPValues::with_real(&simulated, p_real);
    let rank = ordered.real_rank();
    let holm = holm_adjusted(ordered.values(), num_multiple_test)[rank];
    let bhy = bhy_adjusted(ordered.values(), num_multiple_test)[rank];

    Ok(RepetitionCorrection { holm, bhy })
}

/// Simulated absolute t-statistics ordered by ascending p-value, with their p-values.
fn ordered_statistics(row: &[f64], num_multiple_test: usize) -> HaircutResult<Vec<(f64, f64)>> {
    validate_count(row.len(), num_multiple_test, "simulated_trials")?;
    let mut ordered: Vec<(f64, f64)> = row[..num_multiple_test]
        .iter()
        .map(|&t| (two_sided_normal_p_value(t), t.abs()))
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.total_cmp(&a.1)));
    Ok(ordered)
}

/// Holm threshold t-statistic for one simulated universe at significance `alpha`.
///
/// Levels are `α/(M + 1 − k)`; the first p-value above its level sets the
/// threshold. The threshold is that strategy's own |t|, which equals
/// `Φ⁻¹(1 − p/2)` without the round trip through a tail probability.
pub fn holm_threshold_t_stat(
    row: &[f64],
    num_multiple_test: usize,
    alpha: f64,
) -> HaircutResult<f64> {
    let ordered = ordered_statistics(row, num_multiple_test)?;
    let m = num_multiple_test as f64;
    Ok(ordered
        .iter()
        .enumerate()
        .find(|(k, (p, _))| *p > alpha / (m - *k as f64))
        .map(|(_, &(_, t))| t)
        .unwrap_or(DEFAULT_THRESHOLD_T_STAT))
}

/// BHY threshold t-statistic for one simulated universe at significance `alpha`.
///
/// Levels are `α·k/(M·c)`; the last p-value at or below its level sets the threshold.
pub fn bhy_threshold_t_stat(
    row: &[f64],
    num_multiple_test: usize,
    alpha: f64,
) -> HaircutResult<f64> {
    if num_multiple_test <= 1 {
        return Ok(DEFAULT_THRESHOLD_T_STAT);
    }
    let ordered = ordered_statistics(row, num_multiple_test)?;
    let m = num_multiple_test as f64;
    let c = harmonic_number(num_multiple_test);
    Ok(ordered
        .iter()
        .enumerate()
        .filter(|(k, (p, _))| *p <= alpha * (*k as f64 + 1.0) / (m * c))
        .last()
        .map(|(_, &(_, t))| t)
        .unwrap_or(DEFAULT_THRESHOLD_T_STAT))
}
