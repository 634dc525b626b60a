//! Error types and validation functions for Sharpe ratio haircut computations.
//!
//! Every precondition of the haircut and profit hurdle algorithms is checked
//! with the helpers in this module before any simulation starts, so a call
//! either returns a complete result or fails without partial work.

use thiserror::Error;

/// Error types for haircut and profit hurdle computations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HaircutError {
    /// An input violates a precondition of the algorithm.
    #[error("Invalid input: {parameter} = {value}, expected {constraint}")]
    InvalidInput {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation produced a non-finite or degenerate value.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// The Monte Carlo repetition loop was cancelled before completion.
    #[error("Monte Carlo run cancelled after {completed} of {requested} repetitions")]
    Cancelled {
        /// Repetitions finished before the cancellation was observed
        completed: usize,
        /// Repetitions requested by the configuration
        requested: usize,
    },

    /// The simulated panel would exceed the configured memory cap.
    #[error("Allocation of {bytes} bytes in '{operation}' exceeds the configured limit of {limit} bytes")]
    AllocationTooLarge {
        /// Requested size in bytes
        bytes: usize,
        /// Configured limit in bytes
        limit: usize,
        /// Operation requesting the allocation
        operation: String,
    },
}

/// Result type for haircut operations.
pub type HaircutResult<T> = Result<T, HaircutError>;

impl HaircutError {
    pub(crate) fn invalid(parameter: &str, value: f64, constraint: &str) -> Self {
        HaircutError::InvalidInput {
            parameter: parameter.to_string(),
            value,
            constraint: constraint.to_string(),
        }
    }

    pub(crate) fn numerical(reason: impl Into<String>, operation: &str) -> Self {
        HaircutError::NumericalError {
            reason: reason.into(),
            operation: Some(operation.to_string()),
        }
    }
}

/// Validates that a value is finite and not NaN.
///
/// # Example
/// ```rust
/// use sharpe_haircut::errors::validate_finite;
///
/// assert!(validate_finite(1.0, "sharpe_ratio").is_ok());
/// assert!(validate_finite(f64::NAN, "sharpe_ratio").is_err());
/// ```
pub fn validate_finite(value: f64, name: &str) -> HaircutResult<()> {
    if !value.is_finite() {
        Err(HaircutError::invalid(name, value, "a finite number"))
    } else {
        Ok(())
    }
}

/// Validates that a value is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> HaircutResult<()> {
    validate_finite(value, name)?;
    if value <= 0.0 {
        return Err(HaircutError::invalid(name, value, "> 0"));
    }
    Ok(())
}

/// Validates that a count is at least `min`.
pub fn validate_count(value: usize, min: usize, name: &str) -> HaircutResult<()> {
    if value < min {
        return Err(HaircutError::invalid(
            name,
            value as f64,
            &format!(">= {}", min),
        ));
    }
    Ok(())
}

/// Validates that a value lies in the open interval (0, 1).
///
/// # Example
/// ```rust
/// use sharpe_haircut::errors::validate_probability;
///
/// assert!(validate_probability(0.05, "significance_level").is_ok());
/// assert!(validate_probability(1.0, "significance_level").is_err());
/// ```
pub fn validate_probability(value: f64, name: &str) -> HaircutResult<()> {
    if value.is_nan() || value <= 0.0 || value >= 1.0 {
        return Err(HaircutError::invalid(name, value, "(0, 1)"));
    }
    Ok(())
}

/// Validates a return autocorrelation used by the Lo (2002) adjustment.
///
/// The adjustment divides by `1 - rho`, so only `|rho| < 1` is accepted.
pub fn validate_autocorrelation(rho: f64) -> HaircutResult<()> {
    if !rho.is_finite() || rho.abs() >= 1.0 {
        return Err(HaircutError::invalid(
            "autocorrelation",
            rho,
            "(-1, 1); the adjustment is undefined at 1",
        ));
    }
    Ok(())
}

/// Rejects allocations above `limit` bytes.
pub fn validate_allocation_size(size: usize, limit: usize, operation: &str) -> HaircutResult<()> {
    if size > limit {
        return Err(HaircutError::AllocationTooLarge {
            bytes: size,
            limit,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Ensures a computed value is finite, mapping failures to [`HaircutError::NumericalError`].
pub(crate) fn ensure_finite(value: f64, what: &str, operation: &str) -> HaircutResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HaircutError::numerical(
            format!("{} is not finite: {}", what, value),
            operation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite(0.0, "x").is_ok());
        assert!(validate_finite(-3.5, "x").is_ok());
        assert!(validate_finite(f64::INFINITY, "x").is_err());
        assert!(validate_finite(f64::NEG_INFINITY, "x").is_err());

        match validate_finite(f64::NAN, "sharpe_ratio") {
            Err(HaircutError::InvalidInput { parameter, .. }) => {
                assert_eq!(parameter, "sharpe_ratio");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_positive_rejects_zero() {
        assert!(validate_positive(1e-12, "vol").is_ok());
        match validate_positive(0.0, "sharpe_ratio") {
            Err(HaircutError::InvalidInput {
                parameter,
                value,
                constraint,
            }) => {
                assert_eq!(parameter, "sharpe_ratio");
                assert_eq!(value, 0.0);
                assert_eq!(constraint, "> 0");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_count() {
        assert!(validate_count(1, 1, "num_multiple_test").is_ok());
        assert!(matches!(
            validate_count(0, 1, "num_multiple_test"),
            Err(HaircutError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_probability_bounds() {
        assert!(validate_probability(0.5, "alpha").is_ok());
        assert!(validate_probability(0.0, "alpha").is_err());
        assert!(validate_probability(1.0, "alpha").is_err());
        assert!(validate_probability(f64::NAN, "alpha").is_err());
    }

    #[test]
    fn test_validate_autocorrelation() {
        assert!(validate_autocorrelation(0.0).is_ok());
        assert!(validate_autocorrelation(0.99).is_ok());
        assert!(validate_autocorrelation(-0.5).is_ok());
        assert!(validate_autocorrelation(1.0).is_err());
        assert!(validate_autocorrelation(1.2).is_err());
        assert!(validate_autocorrelation(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_allocation_size() {
        assert!(validate_allocation_size(1024, 2048, "panel").is_ok());
        match validate_allocation_size(4096, 2048, "panel") {
            Err(HaircutError::AllocationTooLarge {
                bytes,
                limit,
                operation,
            }) => {
                assert_eq!(bytes, 4096);
                assert_eq!(limit, 2048);
                assert_eq!(operation, "panel");
            }
            other => panic!("Expected AllocationTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display_formatting() {
        let error = HaircutError::InvalidInput {
            parameter: "sharpe_ratio".to_string(),
            value: 0.0,
            constraint: "> 0".to_string(),
        };
        let message = format!("{}", error);
        assert!(message.contains("Invalid input"));
        assert!(message.contains("sharpe_ratio"));

        let cancelled = HaircutError::Cancelled {
            completed: 10,
            requested: 2000,
        };
        let message = format!("{}", cancelled);
        assert!(message.contains("10"));
        assert!(message.contains("2000"));
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(2.0, "t", "op").unwrap(), 2.0);
        match ensure_finite(f64::INFINITY, "t_critical", "haircut") {
            Err(HaircutError::NumericalError { reason, operation }) => {
                assert!(reason.contains("t_critical"));
                assert_eq!(operation.as_deref(), Some("haircut"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }
    }
}
