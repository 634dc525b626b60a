//! Mathematical utilities shared by the haircut algorithms.
//!
//! Besides small reductions (median, harmonic numbers) this module wraps the
//! `statrs` normal and Student-t distributions. The haircut inverts p-values
//! as small as 1e-40, where `1 - cdf` collapses to zero in double precision,
//! so all tail probabilities here go through the survival function and all
//! quantiles are taken from the upper tail.

use once_cell::sync::Lazy;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::errors::{HaircutError, HaircutResult};

// Cached standard normal distribution for performance
static STANDARD_NORMAL: Lazy<Normal> =
    Lazy::new(|| Normal::new(0.0, 1.0).expect("Failed to create standard normal distribution"));

const QUANTILE_RELATIVE_TOLERANCE: f64 = 1e-9;
const MAX_BISECTION_STEPS: usize = 400;

/// Standard normal distribution.
pub fn standard_normal() -> &'static Normal {
    &STANDARD_NORMAL
}

/// Standard Student-t distribution with `degrees_of_freedom`.
pub fn student_t(degrees_of_freedom: f64) -> HaircutResult<StudentsT> {
    StudentsT::new(0.0, 1.0, degrees_of_freedom).map_err(|_| {
        HaircutError::numerical(
            format!(
                "failed to create Student-t distribution with {} degrees of freedom",
                degrees_of_freedom
            ),
            "student_t",
        )
    })
}

/// Two-sided p-value of a statistic under the standard normal: `2·(1 − Φ(|t|))`.
pub fn two_sided_normal_p_value(t_statistic: f64) -> f64 {
    (2.0 * STANDARD_NORMAL.sf(t_statistic.abs())).min(1.0)
}

/// Sort a slice of f64 values safely, handling NaN values.
///
/// NaN values are sorted to the end of the slice.
pub fn sort_f64_slice(slice: &mut [f64]) {
    slice.sort_by(|a, b| match a.partial_cmp(b) {
        Some(ord) => ord,
        None => {
            if a.is_nan() && b.is_nan() {
                std::cmp::Ordering::Equal
            } else if a.is_nan() {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Less
            }
        }
    });
}

/// Median of a sample; the mean of the two central values for even lengths.
pub fn median(values: &[f64]) -> HaircutResult<f64> {
    if values.is_empty() {
        return Err(HaircutError::numerical("median of an empty sample", "median"));
    }
    let mut sorted = values.to_vec();
    sort_f64_slice(&mut sorted);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok(0.5 * (sorted[mid - 1] + sorted[mid]))
    } else {
        Ok(sorted[mid])
    }
}

/// Harmonic number `H_n = Σ_{k=1}^{n} 1/k`.
pub fn harmonic_number(n: usize) -> f64 {
    (1..=n).map(|k| 1.0 / k as f64).sum()
}

/// Upper-tail quantile of a symmetric distribution: the `t` with `sf(t) = q`.
///
/// The closed-form inverse is used when it reproduces `q` to a relative
/// tolerance; otherwise the root is bracketed and bisected on the survival
/// function, which stays accurate far into the tail.
pub fn upper_tail_quantile<D>(distribution: &D, q: f64, operation: &str) -> HaircutResult<f64>
where
    D: ContinuousCDF<f64, f64>,
{
    if q.is_nan() || q <= 0.0 || q >= 1.0 {
        return Err(HaircutError::numerical(
            format!("tail probability {} outside (0, 1)", q),
            operation,
        ));
    }
    if q > 0.5 {
        return upper_tail_quantile(distribution, 1.0 - q, operation).map(|t| -t);
    }

    let guess = -distribution.inverse_cdf(q);
    if guess.is_finite() && guess >= 0.0 {
        let achieved = distribution.sf(guess);
        if ((achieved - q) / q).abs() <= QUANTILE_RELATIVE_TOLERANCE {
            return Ok(guess);
        }
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    while distribution.sf(hi) > q {
        lo = hi;
        hi *= 2.0;
        if hi > 1e12 {
            return Err(HaircutError::numerical(
                format!("could not bracket the quantile for tail probability {:e}", q),
                operation,
            ));
        }
    }
    for _ in 0..MAX_BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if distribution.sf(mid) > q {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= f64::EPSILON * hi.max(1.0) {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}
