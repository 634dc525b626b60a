//! # Result Structures
//!
//! Outputs of the haircut and profit hurdle computations, one entry per
//! multiple testing correction method.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multiple testing correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CorrectionMethod {
    /// Bonferroni: family-wise error rate, computed analytically
    Bonferroni,
    /// Holm step-down: family-wise error rate
    Holm,
    /// Benjamini-Hochberg-Yekutieli: false discovery rate under dependence
    Bhy,
    /// Mean of the three adjusted values
    Average,
}

impl CorrectionMethod {
    /// All methods in table column order.
    pub const ALL: [CorrectionMethod; 4] = [
        CorrectionMethod::Bonferroni,
        CorrectionMethod::Holm,
        CorrectionMethod::Bhy,
        CorrectionMethod::Average,
    ];

    /// Column index in the result tables.
    pub const fn index(&self) -> usize {
        match self {
            CorrectionMethod::Bonferroni => 0,
            CorrectionMethod::Holm => 1,
            CorrectionMethod::Bhy => 2,
            CorrectionMethod::Average => 3,
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            CorrectionMethod::Bonferroni => "Bonferroni",
            CorrectionMethod::Holm => "Holm",
            CorrectionMethod::Bhy => "BHY",
            CorrectionMethod::Average => "Average",
        }
    }
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Haircut outcome for one correction method.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectionResult {
    /// Correction method
    pub method: CorrectionMethod,
    /// Adjusted p-value of the strategy
    pub adjusted_p_value: f64,
    /// Annualized Sharpe ratio implied by the adjusted p-value
    pub adjusted_sharpe_ratio: f64,
    /// Percentage reduction relative to the annualized Sharpe ratio
    pub haircut_percentage: f64,
}

/// Haircut results for all correction methods.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HaircutTable {
    /// Results in [`CorrectionMethod::ALL`] order
    pub results: [CorrectionResult; 4],
    /// Annualized, autocorrelation-adjusted Sharpe ratio before the haircut
    pub annual_sharpe_ratio: f64,
    /// Monthly observations behind the Sharpe ratio
    pub monthly_observations: usize,
    /// Unadjusted two-sided p-value of the strategy
    pub p_value: f64,
    /// Simulated strategies per Monte Carlo repetition
    pub num_trials: usize,
    /// Monte Carlo repetitions used for Holm and BHY
    pub num_simulations: usize,
}

impl HaircutTable {
    /// Result for one method.
    pub fn get(&self, method: CorrectionMethod) -> &CorrectionResult {
        &self.results[method.index()]
    }

    /// The 3×4 table: adjusted p-values, adjusted Sharpe ratios and haircuts
    /// by row; Bonferroni, Holm, BHY and Average by column.
    pub fn to_rows(&self) -> [[f64; 4]; 3] {
        let mut rows = [[0.0; 4]; 3];
        for (column, result) in self.results.iter().enumerate() {
            rows[0][column] = result.adjusted_p_value;
            rows[1][column] = result.adjusted_sharpe_ratio;
            rows[2][column] = result.haircut_percentage;
        }
        rows
    }
}

/// Minimum average annual return, in percent, for one correction method.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfitHurdle {
    /// Correction method
    pub method: CorrectionMethod,
    /// t-statistic a strategy must exceed
    pub threshold_t_stat: f64,
    /// Required annual mean return in percent
    pub annual_return_percentage: f64,
}

/// Profit hurdles for all correction methods.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfitHurdleTable {
    /// Hurdles in [`CorrectionMethod::ALL`] order
    pub hurdles: [ProfitHurdle; 4],
    /// Simulated strategies per Monte Carlo repetition
    pub num_trials: usize,
    /// Monte Carlo repetitions used for Holm and BHY
    pub num_simulations: usize,
}

impl ProfitHurdleTable {
    /// Hurdle for one method.
    pub fn get(&self, method: CorrectionMethod) -> &ProfitHurdle {
        &self.hurdles[method.index()]
    }

    /// Required annual returns in percent, by method.
    pub fn annual_returns(&self) -> [f64; 4] {
        self.hurdles.map(|h| h.annual_return_percentage)
    }
}
