//! Day buckets: realized events grouped by calendar date.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use cadence_contracts::{ContractFamily, EventKind};
use cadence_core::types::{Currency, Date};

/// A realized contract event under one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryEvent {
    /// Scenario name.
    pub scenario: String,
    /// Owning contract.
    pub contract_id: String,
    /// Contract family.
    pub contract_type: ContractFamily,
    /// Event kind.
    pub kind: EventKind,
    /// Event date.
    pub date: Date,
    /// Signed cash flow.
    pub payoff: Decimal,
    /// Discounted, scenario-adjusted cash flow.
    pub present_value: Decimal,
    /// Settlement currency.
    pub currency: Currency,
}

/// Events sharing one date, with their totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Bucket date.
    pub date: Date,
    /// Events in insertion order.
    pub events: Vec<MonetaryEvent>,
    /// Sum of event payoffs.
    pub total_payoff: Decimal,
    /// Sum of event present values.
    pub total_present_value: Decimal,
}

impl DayBucket {
    /// Creates an empty bucket.
    #[must_use]
    pub fn new(date: Date) -> Self {
        Self {
            date,
            events: Vec::new(),
            total_payoff: Decimal::ZERO,
            total_present_value: Decimal::ZERO,
        }
    }

    /// Recomputes both totals from the events.
    pub fn compute_totals(&mut self) {
        self.total_payoff = self.events.iter().map(|e| e.payoff).sum();
        self.total_present_value = self.events.iter().map(|e| e.present_value).sum();
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true when the bucket holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events for one scenario.
    pub fn for_scenario<'a>(&'a self, scenario: &'a str) -> impl Iterator<Item = &'a MonetaryEvent> + 'a {
        self.events.iter().filter(move |e| e.scenario == scenario)
    }
}

/// Date-keyed accumulator owned by the coordinating thread of a run.
#[derive(Debug, Default)]
pub(crate) struct BucketMap {
    buckets: BTreeMap<Date, DayBucket>,
}

impl BucketMap {
    /// Files events into their date buckets, creating buckets on first use.
    pub(crate) fn insert_all(&mut self, events: impl IntoIterator<Item = MonetaryEvent>) {
        for event in events {
            self.buckets
                .entry(event.date)
                .or_insert_with(|| DayBucket::new(event.date))
                .events
                .push(event);
        }
    }

    /// Computes totals and returns the buckets in date order.
    pub(crate) fn finish(self) -> Vec<DayBucket> {
        self.buckets
            .into_values()
            .map(|mut bucket| {
                bucket.compute_totals();
                bucket
            })
            .collect()
    }
}
