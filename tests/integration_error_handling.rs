//! Integration tests for error handling and invalid inputs
//!
//! Every precondition must fail before any simulation starts, and a failed
//! call must never return a partially filled table.

use sharpe_haircut::*;

fn valid_request() -> HaircutRequest {
    HaircutRequest {
        sampling_frequency: SamplingFrequency::Monthly,
        num_obs: 120,
        sharpe_ratio: 0.8,
        is_annualized: true,
        is_autocorr_adjusted: true,
        autocorrelation: 0.0,
        num_multiple_test: 20,
        avg_correlation: 0.2,
    }
}

fn test_config() -> HaircutConfig {
    HaircutConfig {
        num_simulations: 20,
        seed: Some(2024),
        ..HaircutConfig::fast()
    }
}

fn expect_invalid(result: HaircutResult<HaircutTable>, expected_parameter: &str) {
    match result {
        Err(HaircutError::InvalidInput { parameter, .. }) => {
            assert_eq!(parameter, expected_parameter);
        }
        other => panic!(
            "Expected InvalidInput for {}, got {:?}",
            expected_parameter, other
        ),
    }
}

/// Test scenario: zero Sharpe ratio
///
/// The haircut divides by the Sharpe ratio, so zero must be reported as an
/// input error rather than NaN or infinity in the table.
#[test]
fn test_zero_sharpe_ratio_is_rejected() {
    let request = HaircutRequest {
        sharpe_ratio: 0.0,
        ..valid_request()
    };
    expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "sharpe_ratio");
}

#[test]
fn test_non_finite_sharpe_ratio_is_rejected() {
    for value in [f64::NAN, f64::INFINITY] {
        let request = HaircutRequest {
            sharpe_ratio: value,
            ..valid_request()
        };
        expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "sharpe_ratio");
    }
}

#[test]
fn test_autocorrelation_of_one_is_rejected() {
    let request = HaircutRequest {
        is_autocorr_adjusted: false,
        autocorrelation: 1.0,
        ..valid_request()
    };
    expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "autocorrelation");
}

#[test]
fn test_zero_counts_are_rejected() {
    let request = HaircutRequest {
        num_obs: 0,
        ..valid_request()
    };
    expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "num_obs");

    let request = HaircutRequest {
        num_multiple_test: 0,
        ..valid_request()
    };
    expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "num_multiple_test");

    let config = HaircutConfig {
        num_simulations: 0,
        ..test_config()
    };
    expect_invalid(haircut_sharpe_ratios(&valid_request(), &config), "num_simulations");
}

#[test]
fn test_misspecified_correlation_falls_back_silently() {
    // Out-of-range correlations use the rho = 0.2 parameters instead of failing.
    let reference = haircut_sharpe_ratios(&valid_request(), &test_config()).unwrap();
    for avg_correlation in [-0.3, 1.0, 7.0] {
        let request = HaircutRequest {
            avg_correlation,
            ..valid_request()
        };
        let table = haircut_sharpe_ratios(&request, &test_config()).unwrap();
        assert_eq!(table, reference);
    }
}

#[test]
fn test_cancelled_run_returns_no_table() {
    let token = CancellationToken::new();
    token.cancel();
    let result = haircut_sharpe_ratios_with_cancel(&valid_request(), &test_config(), &token);
    match result {
        Err(HaircutError::Cancelled { completed, requested }) => {
            assert_eq!(completed, 0);
            assert_eq!(requested, 20);
        }
        other => panic!("Expected Cancelled, got {:?}", other),
    }
}

#[test]
fn test_panel_memory_cap() {
    let config = HaircutConfig {
        max_panel_bytes: 1024,
        ..test_config()
    };
    match haircut_sharpe_ratios(&valid_request(), &config) {
        Err(HaircutError::AllocationTooLarge { bytes, limit, .. }) => {
            assert_eq!(limit, 1024);
            assert!(bytes > limit);
        }
        other => panic!("Expected AllocationTooLarge, got {:?}", other),
    }
}

#[test]
fn test_extreme_sharpe_ratio_reports_numerical_error() {
    // A t-ratio in the thousands has a p-value below the smallest double.
    let request = HaircutRequest {
        sharpe_ratio: 1000.0,
        num_obs: 600,
        ..valid_request()
    };
    match haircut_sharpe_ratios(&request, &test_config()) {
        Err(HaircutError::NumericalError { .. }) => {}
        other => panic!("Expected NumericalError, got {:?}", other),
    }
}

#[test]
fn test_profit_hurdle_input_validation() {
    let valid = ProfitHurdleRequest {
        num_multiple_test: 10,
        num_obs_monthly: 120,
        significance_level: 0.05,
        annual_volatility: 0.1,
        avg_correlation: 0.2,
    };
    assert!(profit_hurdle(&valid, &test_config()).is_ok());

    let cases = [
        ProfitHurdleRequest {
            num_multiple_test: 0,
            ..valid.clone()
        },
        ProfitHurdleRequest {
            num_obs_monthly: 0,
            ..valid.clone()
        },
        ProfitHurdleRequest {
            significance_level: 0.0,
            ..valid.clone()
        },
        ProfitHurdleRequest {
            annual_volatility: -0.1,
            ..valid.clone()
        },
    ];
    for request in &cases {
        assert!(matches!(
            profit_hurdle(request, &test_config()),
            Err(HaircutError::InvalidInput { .. })
        ));
    }
}

#[test]
fn test_frequency_codes() {
    assert!("H".parse::<SamplingFrequency>().is_err());
    assert_eq!(
        SamplingFrequency::from_code_lenient("H"),
        SamplingFrequency::Unspecified
    );
}

/// Test scenario: unknown frequency code with ten observations
///
/// Each observation counts as one month and the Sharpe ratio is not rescaled.
#[test]
fn test_unknown_frequency_uses_observations_as_months() {
    let request = HaircutRequest {
        sampling_frequency: SamplingFrequency::from_code_lenient("H"),
        num_obs: 10,
        is_annualized: false,
        ..valid_request()
    };
    let table = haircut_sharpe_ratios(&request, &test_config()).unwrap();
    assert_eq!(table.monthly_observations, 10);
    assert_eq!(table.annual_sharpe_ratio, 0.8);
}

#[test]
fn test_observation_count_overflow_is_rejected() {
    let request = HaircutRequest {
        sampling_frequency: SamplingFrequency::Daily,
        num_obs: usize::MAX,
        ..valid_request()
    };
    expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "num_obs");
}

#[test]
fn test_negative_sharpe_ratio_is_rejected() {
    let request = HaircutRequest {
        sharpe_ratio: -0.8,
        ..valid_request()
    };
    expect_invalid(haircut_sharpe_ratios(&request, &test_config()), "annual_sharpe_ratio");
}

/// Test scenario: average correlation one ulp below 1
#[test]
fn test_correlation_just_below_one_is_accepted() {
    let request = HaircutRequest {
        avg_correlation: f64::from_bits(1.0f64.to_bits() - 1),
        ..valid_request()
    };
    let config = HaircutConfig {
        num_simulations: 5,
        ..test_config()
    };
    let table = haircut_sharpe_ratios(&request, &config).unwrap();
    assert!(table.num_trials > 3109);
    assert!(table.results.iter().all(|r| r.adjusted_p_value.is_finite()));
}
