use thiserror::Error;

/// Construction-time configuration failure. Every model validates its spec
/// once when built; nothing downstream re-checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required configuration key `{0}`")]
    MissingKey(&'static str),
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("unsupported action mode `{0}`")]
    UnsupportedActionMode(String),
    #[error("calibration points for `{0}` must be strictly increasing in command and non-decreasing in thrust")]
    UnsortedCalibration(&'static str),
    #[error("`{key}` expects {expected} values, got {got}")]
    DimensionMismatch {
        key: &'static str,
        expected: usize,
        got: usize,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

/// Fail unless `value` is finite and strictly positive.
pub(crate) fn require_positive(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("expected > 0, got {value}")))
    }
}

/// Fail unless `lo <= hi` and both are finite.
pub(crate) fn require_range(key: &'static str, lo: f32, hi: f32) -> Result<(), ConfigError> {
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("expected min <= max, got [{lo}, {hi}]")))
    }
}
