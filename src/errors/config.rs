//! Error types for configuration loading.
//!
//! Configuration problems are fatal at startup: they are reported before any
//! network request is made and before any output is written.

/// Errors that can occur while reading the run configuration.
///
/// # Examples
///
/// ```rust
/// use holdscan::ConfigError;
///
/// let error = ConfigError::missing("CONTRACT_ADDRESS");
/// assert_eq!(error.to_string(), "Missing configuration: CONTRACT_ADDRESS");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set (or is empty).
    #[error("Missing configuration: {variable}")]
    Missing { variable: String },

    /// A variable is set but its value cannot be used.
    #[error("Invalid value for {variable}: {reason}")]
    Invalid { variable: String, reason: String },
}

impl ConfigError {
    /// Create a `Missing` error for a variable.
    pub fn missing(variable: impl Into<String>) -> Self {
        ConfigError::Missing {
            variable: variable.into(),
        }
    }

    /// Create an `Invalid` error for a variable with a reason.
    pub fn invalid(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            variable: variable.into(),
            reason: reason.into(),
        }
    }
}
