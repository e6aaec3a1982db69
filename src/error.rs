//! Error type shared by every test in the crate.

use thiserror::Error;

/// Errors raised by sample construction and hypothesis tests.
///
/// Validation errors are raised before any computation starts; domain
/// errors are raised when the input is valid but the statistic is
/// undefined for it. No test returns a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircularError {
    /// The sample holds no observations (or all weights are zero).
    #[error("sample contains no observations")]
    EmptySample,

    /// An angle or parameter is NaN or infinite.
    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    /// `alpha` and `w` differ in length.
    #[error("length mismatch: alpha has {alpha} values but w has {w}")]
    LengthMismatch { alpha: usize, w: usize },

    /// A required field was not supplied with the summary input.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The sample is smaller than the test can handle at all.
    #[error("{test} requires at least {min} observations, got {n}")]
    InsufficientSample {
        test: &'static str,
        n: usize,
        min: usize,
    },

    /// The statistic is undefined for this input.
    #[error("degenerate input: {0}")]
    Degenerate(&'static str),
}

impl CircularError {
    pub(crate) fn check_size(test: &'static str, n: usize, min: usize) -> Result<(), Self> {
        if n < min {
            return Err(Self::InsufficientSample { test, n, min });
        }
        Ok(())
    }
}

/// Emits a reduced-reliability warning without failing the test.
pub(crate) fn warn_small_sample(test: &str, n: usize, recommended: usize) {
    if n < recommended {
        log::warn!(
            "{test}: n = {n} is below the recommended minimum of {recommended}; \
             the p-value approximation may be unreliable"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let e = CircularError::MissingField("mean");
        assert_eq!(e.to_string(), "missing required field `mean`");
    }

    #[test]
    fn test_check_size() {
        assert!(CircularError::check_size("kuiper", 1, 2).is_err());
        assert!(CircularError::check_size("kuiper", 2, 2).is_ok());
        let e = CircularError::check_size("change point", 3, 4).unwrap_err();
        assert_eq!(
            e.to_string(),
            "change point requires at least 4 observations, got 3"
        );
    }
}
