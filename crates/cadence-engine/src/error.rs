//! Engine error types.

use thiserror::Error;

use cadence_contracts::ContractError;
use cadence_scenarios::ScenarioError;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The run was cancelled through its token.
    #[error("valuation run cancelled")]
    Cancelled,

    /// A contract failed to schedule and skipping was disabled.
    #[error("contract {contract_id} failed: {source}")]
    ContractFailed {
        /// Failing contract.
        contract_id: String,
        /// Underlying failure.
        #[source]
        source: ContractError,
    },

    /// Invalid engine configuration.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Writing rows failed.
    #[error("export error: {message}")]
    Export {
        /// Description of the problem.
        message: String,
    },

    /// Scenario definition error.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

impl EngineError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an export error.
    #[must_use]
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Wraps a contract failure.
    #[must_use]
    pub fn contract_failed(contract_id: impl Into<String>, source: ContractError) -> Self {
        Self::ContractFailed {
            contract_id: contract_id.into(),
            source,
        }
    }

    /// Returns true for the cooperative cancellation outcome.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        Self::config(e.to_string())
    }
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        Self::export(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::export(e.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
