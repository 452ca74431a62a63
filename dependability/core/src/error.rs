//! Error types shared by every analysis in the crate

use thiserror::Error;

/// Errors that can occur while building or evaluating a dependability model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DependabilityError {
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Integral of {metric} diverges over [0, inf)")]
    DivergentIntegral { metric: String },

    #[error("Invalid rate {rate} for {name}: rates must be finite and non-negative")]
    InvalidRate { name: String, rate: f64 },

    #[error("{paths} success paths exceed the inclusion-exclusion limit of {limit}")]
    PathLimitExceeded { paths: usize, limit: usize },

    #[error("{components} components exceed the Markov state-space limit of {limit}")]
    StateSpaceTooLarge { components: usize, limit: usize },

    #[error("Singular matrix in matrix exponential")]
    SingularMatrix,
}

impl DependabilityError {
    pub(crate) fn divergent(metric: &str) -> Self {
        DependabilityError::DivergentIntegral {
            metric: metric.to_string(),
        }
    }
}

/// Result type for dependability operations
pub type DependabilityResult<T> = Result<T, DependabilityError>;

/// Validate a failure or repair rate
pub(crate) fn check_rate(name: &str, rate: f64) -> DependabilityResult<f64> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(DependabilityError::InvalidRate {
            name: name.to_string(),
            rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rate_accepts_zero_and_positive() {
        assert_eq!(check_rate("C", 0.0), Ok(0.0));
        assert_eq!(check_rate("C", 1e-4), Ok(1e-4));
    }

    #[test]
    fn test_check_rate_rejects_negative_and_nan() {
        assert!(matches!(
            check_rate("C", -1.0),
            Err(DependabilityError::InvalidRate { .. })
        ));
        assert!(check_rate("C", f64::NAN).is_err());
        assert!(check_rate("C", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = DependabilityError::divergent("mttf");
        assert_eq!(err.to_string(), "Integral of mttf diverges over [0, inf)");

        let err = DependabilityError::PathLimitExceeded { paths: 30, limit: 24 };
        assert!(err.to_string().contains("30 success paths"));
    }
}
