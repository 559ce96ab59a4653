//! Error types for loading safety check configuration.

use thiserror::Error;

/// A configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Rejects NaN and infinite values.
    pub(crate) fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::invalid(field, format!("{} is not finite", value)))
        }
    }

    /// Rejects non-finite and negative values.
    pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
        Self::check_finite(field, value)?;
        if value < 0.0 {
            return Err(Self::invalid(field, format!("{} is negative", value)));
        }
        Ok(())
    }

    /// Rejects non-finite values and values below `min`.
    pub(crate) fn check_at_least(
        field: &'static str,
        value: f64,
        min: f64,
    ) -> Result<(), ConfigError> {
        Self::check_finite(field, value)?;
        if value < min {
            return Err(Self::invalid(field, format!("{} is less than {}", value, min)));
        }
        Ok(())
    }
}
