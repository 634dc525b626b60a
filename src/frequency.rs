//! Sampling frequency handling and Sharpe ratio normalization.
//!
//! Converts a Sharpe ratio measured at any sampling frequency into the
//! annualized, autocorrelation-adjusted Sharpe ratio that the haircut
//! algorithms work with. The autocorrelation adjustment follows
//! Lo, A. (2002), *The Statistics of Sharpe Ratios*, Financial Analysts Journal.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{validate_autocorrelation, validate_finite, HaircutError, HaircutResult};

/// Sampling frequency of the returns behind a Sharpe ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SamplingFrequency {
    /// Daily returns (360 per year)
    Daily,
    /// Weekly returns (52 per year)
    Weekly,
    /// Monthly returns (12 per year)
    Monthly,
    /// Quarterly returns (4 per year)
    Quarterly,
    /// Annual returns
    Annual,
    /// Unrecognized frequency code; counts each observation as one month
    /// and applies no annualization.
    Unspecified,
}

impl SamplingFrequency {
    /// All named frequencies, highest first.
    pub const ALL: [SamplingFrequency; 5] = [
        SamplingFrequency::Daily,
        SamplingFrequency::Weekly,
        SamplingFrequency::Monthly,
        SamplingFrequency::Quarterly,
        SamplingFrequency::Annual,
    ];

    /// Number of return observations per year.
    pub const fn times_per_year(&self) -> u32 {
        match self {
            SamplingFrequency::Daily => 360,
            SamplingFrequency::Weekly => 52,
            SamplingFrequency::Monthly => 12,
            SamplingFrequency::Quarterly => 4,
            SamplingFrequency::Annual | SamplingFrequency::Unspecified => 1,
        }
    }

    /// Single-letter code: `D`, `W`, `M`, `Q`, `A`, or `?` when unspecified.
    pub const fn code(&self) -> char {
        match self {
            SamplingFrequency::Daily => 'D',
            SamplingFrequency::Weekly => 'W',
            SamplingFrequency::Monthly => 'M',
            SamplingFrequency::Quarterly => 'Q',
            SamplingFrequency::Annual => 'A',
            SamplingFrequency::Unspecified => '?',
        }
    }

    /// Parse a frequency code, falling back to `Unspecified` for anything unrecognized.
    pub fn from_code_lenient(code: &str) -> Self {
        code.parse().unwrap_or_else(|_| {
            log::warn!(
                "Unrecognized sampling frequency '{}', counting each observation as one month",
                code
            );
            SamplingFrequency::Unspecified
        })
    }
}

impl fmt::Display for SamplingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SamplingFrequency {
    type Err = HaircutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "DAILY" => Ok(SamplingFrequency::Daily),
            "W" | "WEEKLY" => Ok(SamplingFrequency::Weekly),
            "M" | "MONTHLY" => Ok(SamplingFrequency::Monthly),
            "Q" | "QUARTERLY" => Ok(SamplingFrequency::Quarterly),
            "A" | "Y" | "ANNUAL" | "YEARLY" => Ok(SamplingFrequency::Annual),
            _ => Err(HaircutError::InvalidInput {
                parameter: format!("sampling_frequency '{}'", s),
                value: f64::NAN,
                constraint: "one of D, W, M, Q, A".to_string(),
            }),
        }
    }
}

/// Sharpe ratio as reported, with the adjustments already applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SharpeRatioInput {
    /// Reported Sharpe ratio
    pub value: f64,
    /// Frequency of the underlying returns
    pub frequency: SamplingFrequency,
    /// Whether `value` is already annualized
    pub is_annualized: bool,
    /// Whether `value` is already adjusted for return autocorrelation
    pub is_autocorr_adjusted: bool,
    /// First-order autocorrelation of returns at `frequency`
    pub autocorrelation: f64,
}

impl SharpeRatioInput {
    /// Annualized, autocorrelation-adjusted Sharpe ratio.
    pub fn annualized(&self) -> HaircutResult<f64> {
        annualized_sharpe_ratio(
            self.value,
            self.frequency,
            self.autocorrelation,
            self.is_annualized,
            self.is_autocorr_adjusted,
        )
    }
}

/// Multiplier applied to a Sharpe ratio to correct for autocorrelated returns.
///
/// `(1 + 2ρ/(1−ρ) · (1 − (1−ρ^T)/(T(1−ρ))))^(−1/2)` with `T` observations per year.
pub fn autocorrelation_multiplier(rho: f64, times_per_year: u32) -> HaircutResult<f64> {
    validate_autocorrelation(rho)?;
    let t = times_per_year as f64;
    let inner = 1.0
        + (2.0 * rho / (1.0 - rho)) * (1.0 - (1.0 - rho.powi(times_per_year as i32)) / (t * (1.0 - rho)));
    if inner <= 0.0 || !inner.is_finite() {
        return Err(HaircutError::numerical(
            format!("autocorrelation variance factor {} is not positive", inner),
            "autocorrelation_multiplier",
        ));
    }
    Ok(inner.powf(-0.5))
}

/// Annualized Sharpe ratio adjusted for return autocorrelation.
///
/// The annualization multiplier is `√T` unless the ratio is already annualized;
/// the autocorrelation multiplier is skipped when the ratio is already adjusted,
/// in which case `autocorrelation` is ignored.
pub fn annualized_sharpe_ratio(
    sharpe_ratio: f64,
    frequency: SamplingFrequency,
    autocorrelation: f64,
    is_annualized: bool,
    is_autocorr_adjusted: bool,
) -> HaircutResult<f64> {
    validate_finite(sharpe_ratio, "sharpe_ratio")?;
    let times_per_year = frequency.times_per_year();

    let annual_multiplier = if is_annualized {
        1.0
    } else {
        (times_per_year as f64).sqrt()
    };

    let autocorr_multiplier = if is_autocorr_adjusted {
        1.0
    } else {
        autocorrelation_multiplier(autocorrelation, times_per_year)?
    };

    Ok(sharpe_ratio * annual_multiplier * autocorr_multiplier)
}

/// Number of whole monthly observations spanned by `num_obs` returns.
///
/// With an unspecified frequency every observation counts as one month.
pub fn monthly_observations(num_obs: usize, frequency: SamplingFrequency) -> HaircutResult<usize> {
    if frequency == SamplingFrequency::Unspecified {
        return Ok(num_obs);
    }
    num_obs
        .checked_mul(12)
        .map(|months| months / frequency.times_per_year() as usize)
        .ok_or_else(|| {
            HaircutError::invalid("num_obs", num_obs as f64, "small enough to count in months")
        })
}
