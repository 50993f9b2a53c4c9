//! # Cadence Core
//!
//! Foundational building blocks for the Cadence contract valuation engine:
//!
//! - **Types**: [`Date`](types::Date) and [`Currency`](types::Currency)
//! - **Cycles**: recurrence parsing and the cycle date generator
//! - **Day Count Conventions**: year fractions for interest accrual
//!
//! ## Example
//!
//! ```rust
//! use cadence_core::prelude::*;
//!
//! let anchor = Date::from_ymd(2024, 1, 1).unwrap();
//! let horizon = Date::from_ymd(2024, 12, 31).unwrap();
//! let quarters = CycleDateGenerator::new(anchor, horizon)
//!     .dates(Some("P3M"))
//!     .unwrap()
//!     .count();
//! assert_eq!(quarters, 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod cycle;
pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cycle::{Cycle, CycleDateGenerator, CycleDates, CycleUnit};
    pub use crate::daycounts::{DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Currency, Date};
}
