//! Error types for the Cadence core crate.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core building blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid or out-of-range calendar date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Malformed recurrence string.
    #[error("Invalid cycle: '{cycle}'")]
    InvalidCycle {
        /// The offending cycle string, verbatim.
        cycle: String,
    },

    /// Unknown ISO currency code.
    #[error("Unknown currency code: '{code}'")]
    InvalidCurrency {
        /// The unrecognised code.
        code: String,
    },

    /// Unknown day count label.
    #[error("Unknown day count convention: '{label}'")]
    InvalidDayCount {
        /// The unrecognised label.
        label: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid cycle error naming the offending string.
    #[must_use]
    pub fn invalid_cycle(cycle: impl Into<String>) -> Self {
        Self::InvalidCycle {
            cycle: cycle.into(),
        }
    }

    /// Creates an unknown day count error.
    #[must_use]
    pub fn invalid_day_count(label: impl Into<String>) -> Self {
        Self::InvalidDayCount {
            label: label.into(),
        }
    }
}
