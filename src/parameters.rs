//! Structural model parameters of Harvey, Liu and Zhu (2015).
//!
//! HLZ fit a mixture model to the cross-section of published factors at five
//! levels of average pairwise return correlation. Parameters for any other
//! correlation are interpolated linearly between those anchors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the structural model used to simulate competing strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructuralParameters {
    /// Average correlation among strategy returns
    pub rho: f64,
    /// Number of strategies tried in the HLZ universe
    pub num_trials: f64,
    /// Probability that a strategy has zero mean return
    pub prob_zero_mean: f64,
    /// Mean monthly return of strategies with nonzero mean
    pub lambda: f64,
}

impl StructuralParameters {
    const fn row(rho: f64, num_trials: f64, prob_zero_mean: f64, lambda: f64) -> Self {
        Self {
            rho,
            num_trials,
            prob_zero_mean,
            lambda,
        }
    }

    fn blend(a: &Self, wa: f64, b: &Self, wb: f64) -> Self {
        Self {
            rho: wa * a.rho + wb * b.rho,
            num_trials: wa * a.num_trials + wb * b.num_trials,
            prob_zero_mean: wa * a.prob_zero_mean + wb * b.prob_zero_mean,
            lambda: wa * a.lambda + wb * b.lambda,
        }
    }
}

/// HLZ estimates at rho = 0, 0.2, 0.4, 0.6 and 0.8.
pub const PARAMETER_LEVELS: [StructuralParameters; 5] = [
    StructuralParameters::row(0.0, 1295.0, 3.9660 * 0.1, 5.4995 * 0.001),
    StructuralParameters::row(0.2, 1377.0, 4.4589 * 0.1, 5.5508 * 0.001),
    StructuralParameters::row(0.4, 1476.0, 4.8604 * 0.1, 5.5413 * 0.001),
    StructuralParameters::row(0.6, 1773.0, 5.9902 * 0.1, 5.5512 * 0.001),
    StructuralParameters::row(0.8, 3109.0, 8.3901 * 0.1, 5.5956 * 0.001),
];

// Row used when the correlation is misspecified.
const FALLBACK_LEVEL: usize = 1;
const ANCHOR_SPACING: f64 = 0.2;

/// Interpolate the structural model parameters for an average correlation.
///
/// Correlations in `[0.8, 1)` reuse the weights of the `[0.6, 0.8]` segment
/// formula, which extrapolates along that segment. Correlations outside
/// `[0, 1)` (or NaN) return the `rho = 0.2` row unchanged.
pub fn estimate_structural_parameters(rho: f64) -> StructuralParameters {
    if rho.is_nan() || rho < 0.0 || rho >= 1.0 {
        log::warn!(
            "Average correlation {} outside [0, 1); using the rho = {} parameter row",
            rho,
            PARAMETER_LEVELS[FALLBACK_LEVEL].rho
        );
        return PARAMETER_LEVELS[FALLBACK_LEVEL];
    }

    if let Some(level) = PARAMETER_LEVELS.iter().find(|level| level.rho == rho) {
        return *level;
    }

    let segment = PARAMETER_LEVELS
        .windows(2)
        .position(|pair| rho < pair[1].rho)
        .unwrap_or(PARAMETER_LEVELS.len() - 2);
    let lower_anchor = PARAMETER_LEVELS[segment].rho;
    let upper_anchor = PARAMETER_LEVELS[segment + 1].rho;

    let lower_weight = (upper_anchor - rho) / ANCHOR_SPACING;
    let upper_weight = (rho - lower_anchor) / ANCHOR_SPACING;

    // Blending rho itself can round a value just below 1.0 up to 1.0.
    StructuralParameters {
        rho,
        ..StructuralParameters::blend(
            &PARAMETER_LEVELS[segment],
            lower_weight,
            &PARAMETER_LEVELS[segment + 1],
            upper_weight,
        )
    }
}

/// Number of simulated trials per panel row.
///
/// Rounds the HLZ universe size up to a whole multiple that covers
/// `num_multiple_test` comparisons: `(⌊M/n⌋ + 1)·⌊n + 1⌋`.
pub fn required_trials(num_multiple_test: usize, parameters: &StructuralParameters) -> usize {
    let universe = parameters.num_trials;
    let multiples = (num_multiple_test as f64 / universe).floor() + 1.0;
    (multiples * (universe + 1.0).floor()) as usize
}
