//! # Cadence Scenarios
//!
//! Market scenarios for contract valuation runs.
//!
//! - [`ScenarioDefinition`]: a named, editable list of scenario entries
//! - [`ScenarioEvent`]: a rate shock or value adjustment, optionally targeted
//!   at one contract and windowed by a [`ScenarioWindow`]
//! - [`ScenarioOverlay`]: the read-only lookup table consulted at rate resets
//!   and at valuation time

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod definition;
pub mod error;
pub mod overlay;
pub mod window;

pub use definition::{standard, ScenarioDefinition, ScenarioEvent, ScenarioEventKind, BASE_SCENARIO};
pub use error::{ScenarioError, ScenarioResult};
pub use overlay::ScenarioOverlay;
pub use window::ScenarioWindow;
