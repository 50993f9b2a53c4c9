//! Error types for contract operations.

use cadence_core::error::CoreError;
use thiserror::Error;

/// A specialized Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors that can occur while building or scheduling contracts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// A date the contract cannot be scheduled without.
    #[error("Missing required date: {field}")]
    MissingRequiredDate {
        /// The missing field name.
        field: String,
    },

    /// Contract terms that are inconsistent.
    #[error("Invalid contract terms for '{contract_id}': {reason}")]
    InvalidTerms {
        /// The contract identifier (may be empty when the id itself is missing).
        contract_id: String,
        /// Description of what's invalid.
        reason: String,
    },

    /// Core library error (malformed cycle, unknown day count, ...).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ContractError {
    /// Creates a missing date error.
    #[must_use]
    pub fn missing_date(field: impl Into<String>) -> Self {
        Self::MissingRequiredDate {
            field: field.into(),
        }
    }

    /// Creates an invalid terms error.
    #[must_use]
    pub fn invalid_terms(contract_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            contract_id: contract_id.into(),
            reason: reason.into(),
        }
    }
}
