//! Error types for scenario definitions.

use cadence_core::types::Date;
use thiserror::Error;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors raised while building or editing scenarios.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    /// Window whose start lies after its end.
    #[error("Invalid scenario window: start {start} is after end {end}")]
    InvalidWindow {
        /// Window start.
        start: Date,
        /// Window end.
        end: Date,
    },

    /// An event with the same id already exists in the definition.
    #[error("Duplicate scenario event '{id}'")]
    DuplicateEvent {
        /// The duplicated event id.
        id: String,
    },

    /// No event with the given id exists in the definition.
    #[error("Scenario event '{id}' not found")]
    EventNotFound {
        /// The missing event id.
        id: String,
    },
}

impl ScenarioError {
    /// Creates a duplicate event error.
    #[must_use]
    pub fn duplicate_event(id: impl Into<String>) -> Self {
        Self::DuplicateEvent { id: id.into() }
    }

    /// Creates an event-not-found error.
    #[must_use]
    pub fn event_not_found(id: impl Into<String>) -> Self {
        Self::EventNotFound { id: id.into() }
    }
}
