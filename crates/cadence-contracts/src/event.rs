//! Contract events and their ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

use cadence_core::types::{Currency, Date};

/// Kind of a contract event.
///
/// Declaration order is the tie-break rank for events sharing a date, so the
/// derived `Ord` sorts same-day events correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Analysis (monitoring) date
    Analysis,
    /// Initial exchange of principal
    InitialExchange,
    /// Maturity
    Maturity,
    /// Purchase
    PurchaseDate,
    /// Interest payment
    InterestPayment,
    /// Interest capitalization
    InterestCapitalization,
    /// Rate reset at the prevailing rate
    RateReset,
    /// Rate reset at a pre-agreed rate
    RateResetFixed,
    /// Fee payment
    FeePayment,
    /// Scaling index revision
    ScalingIndex,
    /// Early termination
    Termination,
}

impl EventKind {
    /// Returns the two- to four-letter event code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            EventKind::Analysis => "AD",
            EventKind::InitialExchange => "IED",
            EventKind::Maturity => "MD",
            EventKind::PurchaseDate => "PRD",
            EventKind::InterestPayment => "IP",
            EventKind::InterestCapitalization => "IPCI",
            EventKind::RateReset => "RR",
            EventKind::RateResetFixed => "RRF",
            EventKind::FeePayment => "FP",
            EventKind::ScalingIndex => "SC",
            EventKind::Termination => "TD",
        }
    }

    /// Parses an event code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.code() == code)
    }

    /// Tie-break rank among same-day events (ascending).
    #[must_use]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// All kinds in rank order.
    #[must_use]
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Analysis,
            EventKind::InitialExchange,
            EventKind::Maturity,
            EventKind::PurchaseDate,
            EventKind::InterestPayment,
            EventKind::InterestCapitalization,
            EventKind::RateReset,
            EventKind::RateResetFixed,
            EventKind::FeePayment,
            EventKind::ScalingIndex,
            EventKind::Termination,
        ]
    }

    /// Returns true for rate reset kinds.
    #[must_use]
    pub fn is_rate_reset(&self) -> bool {
        matches!(self, EventKind::RateReset | EventKind::RateResetFixed)
    }

    /// Returns true for interest payment and capitalization.
    #[must_use]
    pub fn is_interest(&self) -> bool {
        matches!(
            self,
            EventKind::InterestPayment | EventKind::InterestCapitalization
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A scheduled contract event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractEvent {
    /// Owning contract.
    pub contract_id: String,
    /// Event date.
    pub date: Date,
    /// Event kind.
    pub kind: EventKind,
    /// Settlement currency.
    pub currency: Currency,
}

impl ContractEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(contract_id: impl Into<String>, date: Date, kind: EventKind, currency: Currency) -> Self {
        Self {
            contract_id: contract_id.into(),
            date,
            kind,
            currency,
        }
    }

    /// Returns the same event with a different kind.
    #[must_use]
    pub fn rekinded(self, kind: EventKind) -> Self {
        Self { kind, ..self }
    }

    /// Sort key: date, then kind rank.
    #[must_use]
    pub fn sort_key(&self) -> (Date, EventKind) {
        (self.date, self.kind)
    }
}

impl fmt::Display for ContractEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.contract_id, self.date, self.kind)
    }
}

/// Stable-sorts events by date, then kind rank.
pub fn sort_events(events: &mut [ContractEvent]) {
    events.sort_by_key(ContractEvent::sort_key);
}

/// Returns true if `events` is sorted by date, then kind rank.
#[must_use]
pub fn is_ordered(events: &[ContractEvent]) -> bool {
    events.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key())
}
