//! # Cadence Contracts
//!
//! Contract terms, event scheduling and event application.
//!
//! - [`ContractTerms`]: immutable per-contract input, built with
//!   [`ContractTermsBuilder`]
//! - [`ContractEventScheduler`]: expands terms into an ordered event timeline
//! - [`ContractStateMachine`]: replays the timeline over a [`ContractState`],
//!   optionally under a scenario overlay
//!
//! ## Example
//!
//! ```rust
//! use cadence_contracts::prelude::*;
//! use cadence_core::types::Date;
//! use rust_decimal::Decimal;
//! use rust_decimal_macros::dec;
//!
//! let terms = ContractTerms::builder()
//!     .contract_id("LOAN-1")
//!     .status_date(Date::from_ymd(2024, 1, 1).unwrap())
//!     .initial_exchange_date(Date::from_ymd(2024, 1, 1).unwrap())
//!     .maturity_date(Date::from_ymd(2027, 1, 1).unwrap())
//!     .notional_principal(dec!(100000))
//!     .nominal_interest_rate(dec!(0.04))
//!     .interest_cycle(None, "P1Y")
//!     .build()
//!     .unwrap();
//!
//! let mut events = ContractEventScheduler::new()
//!     .schedule(&terms, Date::from_ymd(2030, 1, 1).unwrap())
//!     .unwrap();
//! let mut state = ContractState::init_from(&terms);
//! ContractStateMachine::new(&terms).apply(&mut events, &mut state);
//!
//! assert_eq!(state.notional, Decimal::ZERO);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]

pub mod error;
pub mod event;
pub mod machine;
pub mod schedule;
pub mod state;
pub mod terms;

pub use error::{ContractError, ContractResult};
pub use event::{ContractEvent, EventKind};
pub use machine::{AppliedEvent, ContractStateMachine};
pub use schedule::ContractEventScheduler;
pub use state::ContractState;
pub use terms::{
    ContractFamily, ContractRole, ContractTerms, ContractTermsBuilder, PerformanceStatus,
    RecurrenceStream, ScalingEffect,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ContractError, ContractResult};
    pub use crate::event::{ContractEvent, EventKind};
    pub use crate::machine::{AppliedEvent, ContractStateMachine};
    pub use crate::schedule::ContractEventScheduler;
    pub use crate::state::ContractState;
    pub use crate::terms::{ContractFamily, ContractRole, ContractTerms, ContractTermsBuilder};
}
