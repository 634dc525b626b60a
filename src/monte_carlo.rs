//! Monte Carlo repetition loop over a simulated t-statistic panel.
//!
//! Every repetition reads one panel row and is independent of all others,
//! so the loop runs on the rayon pool when the `parallel` feature is enabled.
//! Results are collected in row order, which keeps the median reductions
//! independent of scheduling. Long runs can be cancelled cooperatively.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{
    config::HaircutConfig,
    errors::{HaircutError, HaircutResult},
    math_utils::median,
    multiple_testing::{correct_repetition, RepetitionCorrection},
    simulation::TStatisticPanel,
};

/// Shared flag for cooperative cancellation of a Monte Carlo run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; running loops stop at their next repetition.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct Progress<'a> {
    completed: AtomicUsize,
    requested: usize,
    interval: usize,
    cancel: &'a CancellationToken,
}

impl Progress<'_> {
    fn check(&self) -> HaircutResult<()> {
        if self.cancel.is_cancelled() {
            return Err(HaircutError::Cancelled {
                completed: self.completed.load(Ordering::SeqCst),
                requested: self.requested,
            });
        }
        Ok(())
    }

    fn advance(&self) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if self.interval > 0 && done % self.interval == 0 {
            log::info!("Monte Carlo repetitions: {}/{}", done, self.requested);
        }
    }
}

/// Apply `repetition` to every panel row and collect the results in row order.
///
/// Fails atomically: the first error (including cancellation) is returned and
/// no partial results escape.
pub fn run_repetitions<T, F>(
    panel: &TStatisticPanel,
    config: &HaircutConfig,
    cancel: &CancellationToken,
    repetition: F,
) -> HaircutResult<Vec<T>>
where
    T: Send,
    F: Fn(&[f64]) -> HaircutResult<T> + Sync,
{
    let progress = Progress {
        completed: AtomicUsize::new(0),
        requested: panel.num_repetitions(),
        interval: config.progress_interval,
        cancel,
    };

    let step = |index: usize| -> HaircutResult<T> {
        progress.check()?;
        let result = repetition(panel.row(index))?;
        progress.advance();
        Ok(result)
    };

    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            use rayon::prelude::*;
            return (0..panel.num_repetitions())
                .into_par_iter()
                .map(step)
                .collect();
        }
    }

    (0..panel.num_repetitions()).map(step).collect()
}

/// Holm and BHY adjusted p-values of the real strategy across repetitions.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionSamples {
    /// Holm adjusted p-value per repetition
    pub holm: Vec<f64>,
    /// BHY adjusted p-value per repetition
    pub bhy: Vec<f64>,
}

impl CorrectionSamples {
    /// Median Holm adjusted p-value.
    pub fn median_holm(&self) -> HaircutResult<f64> {
        median(&self.holm)
    }

    /// Median BHY adjusted p-value.
    pub fn median_bhy(&self) -> HaircutResult<f64> {
        median(&self.bhy)
    }
}

impl FromIterator<RepetitionCorrection> for CorrectionSamples {
    fn from_iter<I: IntoIterator<Item = RepetitionCorrection>>(iter: I) -> Self {
        let (holm, bhy) = iter.into_iter().map(|c| (c.holm, c.bhy)).unzip();
        Self { holm, bhy }
    }
}

/// Run the Holm and BHY corrections of `p_real` against every panel row.
pub fn simulate_corrections(
    panel: &TStatisticPanel,
    p_real: f64,
    num_multiple_test: usize,
    config: &HaircutConfig,
    cancel: &CancellationToken,
) -> HaircutResult<CorrectionSamples> {
    let corrections = run_repetitions(panel, config, cancel, |row| {
        correct_repetition(row, p_real, num_multiple_test)
    })?;
    Ok(corrections.into_iter().collect())
}
