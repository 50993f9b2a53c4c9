//! Output of a valuation run.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use cadence_contracts::ContractFamily;
use cadence_core::types::Date;

use crate::bucket::DayBucket;
use crate::processor::Horizon;

/// A contract left out of one scenario because it could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedContract {
    /// Contract identifier.
    pub contract_id: String,
    /// Scenario during which it failed.
    pub scenario: String,
    /// Error description.
    pub reason: String,
}

/// Result of [`ValuationOrchestrator::run`](crate::ValuationOrchestrator::run).
#[derive(Debug, Clone, Serialize)]
pub struct ValuationRun {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Contracts in the portfolio.
    pub contract_count: usize,
    /// Scenarios evaluated, including the implicit base scenario.
    pub scenario_count: usize,
    /// Valuation window; `None` only for an empty portfolio with no
    /// configured valuation date.
    pub horizon: Option<Horizon>,
    /// Wall-clock duration.
    pub elapsed: Duration,
    /// Buckets in date order.
    pub buckets: Vec<DayBucket>,
    /// Contract count per family.
    pub contracts_by_type: BTreeMap<ContractFamily, usize>,
    /// Contracts skipped per scenario.
    pub skipped: Vec<SkippedContract>,
    /// True when the portfolio had no contracts and nothing was scheduled.
    pub empty_portfolio: bool,
}

impl ValuationRun {
    /// Result for a portfolio without contracts.
    #[must_use]
    pub(crate) fn empty(horizon: Option<Horizon>, scenario_count: usize, elapsed: Duration) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            contract_count: 0,
            scenario_count,
            horizon,
            elapsed,
            buckets: Vec::new(),
            contracts_by_type: BTreeMap::new(),
            skipped: Vec::new(),
            empty_portfolio: true,
        }
    }

    /// Bucket for a date.
    #[must_use]
    pub fn bucket(&self, date: Date) -> Option<&DayBucket> {
        self.buckets
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|i| &self.buckets[i])
    }

    /// Total events across buckets.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.buckets.iter().map(DayBucket::len).sum()
    }

    /// Sum of payoffs for one scenario.
    #[must_use]
    pub fn total_payoff(&self, scenario: &str) -> Decimal {
        self.buckets
            .iter()
            .flat_map(|b| b.for_scenario(scenario))
            .map(|e| e.payoff)
            .sum()
    }

    /// Sum of present values for one scenario.
    #[must_use]
    pub fn total_present_value(&self, scenario: &str) -> Decimal {
        self.buckets
            .iter()
            .flat_map(|b| b.for_scenario(scenario))
            .map(|e| e.present_value)
            .sum()
    }

    /// Serializes the run to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
