//! Recurrence cycles and cycle-based date generation.
//!
//! A cycle string such as `"P3M"` or `"1Y"` describes a recurrence of
//! `count × unit`. [`CycleDateGenerator`] expands a cycle from an anchor date
//! into an ascending, finite sequence of dates bounded by a horizon.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::cycle::CycleDateGenerator;
//! use cadence_core::types::Date;
//!
//! let anchor = Date::from_ymd(2024, 1, 31).unwrap();
//! let horizon = Date::from_ymd(2024, 4, 30).unwrap();
//!
//! let dates: Vec<Date> = CycleDateGenerator::new(anchor, horizon)
//!     .with_end_of_month(true)
//!     .dates(Some("P1M"))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(dates.len(), 4);
//! assert_eq!(dates[1], Date::from_ymd(2024, 2, 29).unwrap());
//! assert_eq!(dates[2], Date::from_ymd(2024, 3, 31).unwrap());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// Unit of a recurrence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleUnit {
    /// Calendar days
    Day,
    /// Weeks of seven days
    Week,
    /// Calendar months
    Month,
    /// Calendar years
    Year,
}

impl CycleUnit {
    /// Parses a unit letter (`D`, `W`, `M`, `Y`, case-insensitive).
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'D' => Some(CycleUnit::Day),
            'W' => Some(CycleUnit::Week),
            'M' => Some(CycleUnit::Month),
            'Y' => Some(CycleUnit::Year),
            _ => None,
        }
    }

    /// Returns the canonical unit letter.
    #[must_use]
    pub fn letter(&self) -> char {
        match self {
            CycleUnit::Day => 'D',
            CycleUnit::Week => 'W',
            CycleUnit::Month => 'M',
            CycleUnit::Year => 'Y',
        }
    }

    /// Returns true for calendar-aware units (months and years).
    #[must_use]
    pub fn is_calendar(&self) -> bool {
        matches!(self, CycleUnit::Month | CycleUnit::Year)
    }
}

/// A parsed recurrence: `count` repetitions of `unit` per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cycle {
    count: u32,
    unit: CycleUnit,
}

impl Cycle {
    /// Creates a cycle, rejecting a zero count.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCycle` when `count` is zero.
    pub fn new(count: u32, unit: CycleUnit) -> CoreResult<Self> {
        if count == 0 {
            return Err(CoreError::invalid_cycle(format!("0{}", unit.letter())));
        }
        Ok(Self { count, unit })
    }

    /// One calendar year.
    #[must_use]
    pub fn annual() -> Self {
        Self {
            count: 1,
            unit: CycleUnit::Year,
        }
    }

    /// Parses an optional cycle string.
    ///
    /// An empty or whitespace-only string means "no recurrence" and yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCycle` naming the input when the count is
    /// not a positive integer or the unit letter is unknown.
    pub fn parse(s: &str) -> CoreResult<Option<Self>> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let body = trimmed
            .strip_prefix('P')
            .or_else(|| trimmed.strip_prefix('p'))
            .unwrap_or(trimmed);

        let Some(letter) = body.chars().last() else {
            return Err(CoreError::invalid_cycle(s));
        };
        let unit = CycleUnit::from_letter(letter).ok_or_else(|| CoreError::invalid_cycle(s))?;

        let digits = &body[..body.len() - letter.len_utf8()];
        let count: i64 = digits.parse().map_err(|_| CoreError::invalid_cycle(s))?;
        if count <= 0 || count > i64::from(u32::MAX) {
            return Err(CoreError::invalid_cycle(s));
        }

        Ok(Some(Self {
            count: count as u32,
            unit,
        }))
    }

    /// Returns the step count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the step unit.
    #[must_use]
    pub fn unit(&self) -> CycleUnit {
        self.unit
    }

    /// Returns the `k`-th date of the recurrence, computed from the anchor so
    /// month-end clamping never accumulates.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is out of range.
    pub fn nth_from(&self, anchor: Date, k: u32) -> CoreResult<Date> {
        let steps = i64::from(self.count)
            .checked_mul(i64::from(k))
            .ok_or_else(|| CoreError::invalid_date(format!("step overflow: {self} x {k}")))?;
        match self.unit {
            CycleUnit::Day => anchor.add_days(steps),
            CycleUnit::Week => anchor.add_days(
                steps
                    .checked_mul(7)
                    .ok_or_else(|| CoreError::invalid_date(format!("step overflow: {self} x {k}")))?,
            ),
            CycleUnit::Month => anchor.add_months(to_i32(steps)?),
            CycleUnit::Year => anchor.add_years(to_i32(steps)?),
        }
    }
}

fn to_i32(steps: i64) -> CoreResult<i32> {
    i32::try_from(steps).map_err(|_| CoreError::invalid_date(format!("step overflow: {steps}")))
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.count, self.unit.letter())
    }
}

impl FromStr for Cycle {
    type Err = CoreError;

    /// Parses a cycle that must be present; an empty string is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)?.ok_or_else(|| CoreError::invalid_cycle(s))
    }
}

/// Expands recurrence cycles into date sequences between an anchor and a
/// horizon.
#[derive(Debug, Clone, Copy)]
pub struct CycleDateGenerator {
    anchor: Date,
    horizon_end: Date,
    end_of_month_aware: bool,
    include_boundary: bool,
}

impl CycleDateGenerator {
    /// Creates a generator. Defaults: end-of-month unaware, horizon inclusive.
    #[must_use]
    pub fn new(anchor: Date, horizon_end: Date) -> Self {
        Self {
            anchor,
            horizon_end,
            end_of_month_aware: false,
            include_boundary: true,
        }
    }

    /// Sets the end-of-month rule.
    #[must_use]
    pub fn with_end_of_month(mut self, aware: bool) -> Self {
        self.end_of_month_aware = aware;
        self
    }

    /// Sets whether a generated date equal to the horizon is kept.
    #[must_use]
    pub fn with_boundary(mut self, include: bool) -> Self {
        self.include_boundary = include;
        self
    }

    /// Parses `cycle` and returns the lazy date sequence.
    ///
    /// A missing or empty cycle yields an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCycle` for a malformed cycle string.
    pub fn dates(&self, cycle: Option<&str>) -> CoreResult<CycleDates> {
        let parsed = match cycle {
            Some(s) => Cycle::parse(s)?,
            None => None,
        };
        Ok(self.dates_for(parsed))
    }

    /// Returns the lazy date sequence for an already-parsed cycle.
    #[must_use]
    pub fn dates_for(&self, cycle: Option<Cycle>) -> CycleDates {
        CycleDates {
            generator: *self,
            cycle,
            index: 0,
            previous: None,
            exhausted: cycle.is_none(),
        }
    }
}

/// Ascending, finite, single-pass sequence of cycle dates.
///
/// Produced by [`CycleDateGenerator`]. The first element is the anchor itself
/// unless the anchor already lies past the horizon.
#[derive(Debug)]
pub struct CycleDates {
    generator: CycleDateGenerator,
    cycle: Option<Cycle>,
    index: u32,
    previous: Option<Date>,
    exhausted: bool,
}

impl CycleDates {
    fn candidate(&self, cycle: &Cycle) -> Option<Date> {
        let anchor = self.generator.anchor;
        if self.index == 0 {
            return Some(anchor);
        }
        let mut date = match cycle.nth_from(anchor, self.index) {
            Ok(date) => date,
            Err(err) => {
                log::debug!("cycle {cycle} from {anchor} stopped: {err}");
                return None;
            }
        };
        if self.generator.end_of_month_aware
            && cycle.unit().is_calendar()
            && self.previous.is_some_and(|prev| prev.is_end_of_month())
        {
            date = date.end_of_month();
        }
        Some(date)
    }

    fn beyond_horizon(&self, date: Date) -> bool {
        let horizon = self.generator.horizon_end;
        if self.index == 0 {
            return date > horizon;
        }
        date > horizon || (!self.generator.include_boundary && date == horizon)
    }
}

impl Iterator for CycleDates {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let cycle = self.cycle?;
        loop {
            if self.exhausted {
                return None;
            }
            let Some(date) = self.candidate(&cycle) else {
                self.exhausted = true;
                return None;
            };
            if self.beyond_horizon(date) {
                self.exhausted = true;
                return None;
            }
            self.index = self.index.saturating_add(1);
            if self.previous.is_some_and(|prev| date <= prev) {
                continue;
            }
            self.previous = Some(date);
            return Some(date);
        }
    }
}
