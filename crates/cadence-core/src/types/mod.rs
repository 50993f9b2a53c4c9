//! Domain types shared across the Cadence crates.
//!
//! - [`Date`]: calendar date with month/year arithmetic
//! - [`Currency`]: ISO currency codes

mod currency;
mod date;

pub use currency::Currency;
pub use date::Date;
