//! Day count conventions for accrual calculations.
//!
//! A day count convention fixes how the days between two dates are counted
//! and which year basis turns that count into a year fraction.
//!
//! # Supported Conventions
//!
//! - [`Act360`]: Actual/360
//! - [`Act365Fixed`]: Actual/365 Fixed
//! - [`ActActIsda`]: Actual/Actual ISDA
//! - [`Thirty360E`]: 30E/360 (Eurobond basis)
//!
//! # Usage
//!
//! ```rust
//! use cadence_core::daycounts::{DayCount, DayCountConvention};
//! use cadence_core::types::Date;
//!
//! let convention: DayCountConvention = "A360".parse().unwrap();
//! let start = Date::from_ymd(2025, 1, 1).unwrap();
//! let end = Date::from_ymd(2025, 4, 1).unwrap();
//!
//! assert_eq!(convention.year_fraction(start, end).to_string(), "0.25");
//! ```

mod actual;
mod thirty360;

pub use actual::{Act360, Act365Fixed, ActActIsda};
pub use thirty360::Thirty360E;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`) so schedules can be
/// derived in parallel.
pub trait DayCount: Send + Sync {
    /// Returns the display name of the convention (e.g. "ACT/360").
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Negative when `end` precedes `start`.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Calculates the day count between two dates under the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;
}

/// Runtime-selectable day count convention.
///
/// Parses both the conventional labels (`"ACT/360"`, `"30E/360"`) and the
/// compact contract-term codes (`"A360"`, `"A365"`, `"30E360"`, `"AA"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// Actual/360
    #[default]
    Act360,
    /// Actual/365 Fixed
    Act365Fixed,
    /// Actual/Actual ISDA
    ActActIsda,
    /// 30E/360
    Thirty360E,
}

impl DayCountConvention {
    /// Returns the convention's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::ActActIsda => "ACT/ACT ISDA",
            DayCountConvention::Thirty360E => "30E/360",
        }
    }

    /// Returns all supported conventions.
    #[must_use]
    pub fn all() -> &'static [DayCountConvention] {
        &[
            DayCountConvention::Act360,
            DayCountConvention::Act365Fixed,
            DayCountConvention::ActActIsda,
            DayCountConvention::Thirty360E,
        ]
    }

    fn as_day_count(&self) -> &'static dyn DayCount {
        match self {
            DayCountConvention::Act360 => &Act360,
            DayCountConvention::Act365Fixed => &Act365Fixed,
            DayCountConvention::ActActIsda => &ActActIsda,
            DayCountConvention::Thirty360E => &Thirty360E,
        }
    }
}

impl DayCount for DayCountConvention {
    fn name(&self) -> &'static str {
        DayCountConvention::name(self)
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        self.as_day_count().year_fraction(start, end)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        self.as_day_count().day_count(start, end)
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_uppercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '/' | '_' | '-'))
            .collect();

        match normalized.as_str() {
            "A360" | "ACT360" | "ACTUAL360" => Ok(DayCountConvention::Act360),
            "A365" | "ACT365" | "ACT365F" | "ACT365FIXED" | "ACTUAL365FIXED" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "AA" | "ACTACT" | "ACTACTISDA" | "ACTUALACTUAL" => Ok(DayCountConvention::ActActIsda),
            "30E360" | "EUROBOND" => Ok(DayCountConvention::Thirty360E),
            _ => Err(CoreError::invalid_day_count(s)),
        }
    }
}
