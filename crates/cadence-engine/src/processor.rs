//! Contract type processors and their registry.
//!
//! A [`ContractTypeProcessor`] owns the contracts of one family and turns
//! each into [`MonetaryEvent`]s for a scenario and horizon. The
//! [`ProcessorRegistry`] holds one processor per family present in a
//! portfolio; the orchestrator only ever sees the trait.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use cadence_contracts::{
    ContractError, ContractEventScheduler, ContractFamily, ContractResult, ContractState,
    ContractStateMachine, ContractTerms, EventKind,
};
use cadence_core::daycounts::{DayCount, DayCountConvention};
use cadence_core::types::Date;
use cadence_scenarios::ScenarioOverlay;

use crate::bucket::MonetaryEvent;
use crate::config::EngineConfig;
use crate::parallel::maybe_parallel_map;

/// Closed valuation window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// Valuation date.
    pub start: Date,
    /// Last date included.
    pub end: Date,
}

impl Horizon {
    /// Creates a horizon.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// Returns true if `date` lies within the horizon.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Everything a processor needs to derive events for one scenario.
#[derive(Debug, Clone, Copy)]
pub struct DerivationContext<'a> {
    /// Scenario name stamped on every event.
    pub scenario: &'a str,
    /// Overlay consulted at rate resets and for value adjustments.
    pub overlay: Option<&'a ScenarioOverlay>,
    /// Reporting window.
    pub horizon: Horizon,
    /// Flat annual discount rate.
    pub discount_rate: Decimal,
}

impl DerivationContext<'_> {
    /// Present value of `payoff` on `date`.
    ///
    /// `payoff * (1 + r)^-t * (1 + adj / 100)` with `t` the ACT/365F year
    /// fraction from the horizon start.
    #[must_use]
    pub fn present_value(&self, contract_id: &str, date: Date, payoff: Decimal) -> Decimal {
        let mut pv = payoff * self.discount_factor(date);
        if let Some(adj) = self
            .overlay
            .and_then(|o| o.try_value_adjustment(contract_id, date))
        {
            pv *= Decimal::ONE + adj / Decimal::ONE_HUNDRED;
        }
        pv
    }

    fn discount_factor(&self, date: Date) -> Decimal {
        if self.discount_rate.is_zero() {
            return Decimal::ONE;
        }
        let t = DayCountConvention::Act365Fixed.year_fraction(self.horizon.start, date);
        if t.is_zero() {
            return Decimal::ONE;
        }
        let growth = Decimal::ONE + self.discount_rate;

        growth
            .checked_powd(t)
            .and_then(|g| Decimal::ONE.checked_div(g))
            .or_else(|| {
                let (g, t) = (growth.to_f64()?, t.to_f64()?);
                Decimal::from_f64(g.powf(-t))
            })
            .unwrap_or(Decimal::ONE)
    }
}

/// Outcome of one contract: its events, or why it could not be scheduled.
pub type ContractOutcome = ContractResult<Vec<MonetaryEvent>>;

/// Events and failures of a whole processor for one scenario.
#[derive(Debug, Default)]
pub struct ProcessorOutput {
    /// Events of every contract that succeeded.
    pub events: Vec<MonetaryEvent>,
    /// Contracts that failed, with their errors.
    pub failures: Vec<(String, ContractError)>,
}

/// Uniform capability over one contract family.
pub trait ContractTypeProcessor: Send + Sync {
    /// Family handled by this processor.
    fn family(&self) -> ContractFamily;

    /// Contracts owned by this processor, in portfolio order.
    fn contracts(&self) -> &[ContractTerms];

    /// Derives one contract's events within the context's horizon.
    fn derive(&self, terms: &ContractTerms, ctx: &DerivationContext<'_>) -> ContractOutcome;

    /// Number of contracts owned.
    fn contract_count(&self) -> usize {
        self.contracts().len()
    }

    /// Derives a slice of contracts, fanning out when the config allows.
    ///
    /// Outcomes are returned in input order.
    fn derive_chunk(
        &self,
        chunk: &[ContractTerms],
        ctx: &DerivationContext<'_>,
        config: &EngineConfig,
    ) -> Vec<ContractOutcome> {
        maybe_parallel_map(chunk, config, |terms| self.derive(terms, ctx))
    }

    /// Derives every owned contract for one scenario.
    fn monetary_events(&self, ctx: &DerivationContext<'_>, config: &EngineConfig) -> ProcessorOutput {
        let contracts = self.contracts();
        let mut output = ProcessorOutput::default();
        for (terms, outcome) in contracts.iter().zip(self.derive_chunk(contracts, ctx, config)) {
            match outcome {
                Ok(events) => output.events.extend(events),
                Err(e) => output.failures.push((terms.contract_id.clone(), e)),
            }
        }
        output
    }
}

/// Schedules, replays and prices one contract.
///
/// The whole timeline from the status date is replayed so state entering
/// the horizon is correct; only events inside the horizon are reported.
/// Analysis dates carry no cash and are dropped.
fn derive_monetary_events(
    family: ContractFamily,
    terms: &ContractTerms,
    ctx: &DerivationContext<'_>,
) -> ContractOutcome {
    let mut events = ContractEventScheduler::new().schedule(terms, ctx.horizon.end)?;
    let mut state = ContractState::init_from(terms);
    let applied = ContractStateMachine::new(terms)
        .with_overlay(ctx.overlay)
        .replay(&mut events, &mut state);

    Ok(applied
        .into_iter()
        .filter(|a| a.event.kind != EventKind::Analysis && ctx.horizon.contains(a.event.date))
        .map(|a| MonetaryEvent {
            scenario: ctx.scenario.to_string(),
            present_value: ctx.present_value(&terms.contract_id, a.event.date, a.payoff),
            contract_id: a.event.contract_id,
            contract_type: family,
            kind: a.event.kind,
            date: a.event.date,
            payoff: a.payoff,
            currency: a.event.currency,
        })
        .collect())
}

/// Processor for principal-at-maturity contracts.
#[derive(Debug, Clone, Default)]
pub struct PrincipalAtMaturityProcessor {
    contracts: Vec<ContractTerms>,
}

impl PrincipalAtMaturityProcessor {
    /// Creates a processor over `contracts`.
    #[must_use]
    pub fn new(contracts: Vec<ContractTerms>) -> Self {
        Self { contracts }
    }
}

impl ContractTypeProcessor for PrincipalAtMaturityProcessor {
    fn family(&self) -> ContractFamily {
        ContractFamily::PrincipalAtMaturity
    }

    fn contracts(&self) -> &[ContractTerms] {
        &self.contracts
    }

    fn derive(&self, terms: &ContractTerms, ctx: &DerivationContext<'_>) -> ContractOutcome {
        derive_monetary_events(self.family(), terms, ctx)
    }
}

/// Processor for annuity contracts.
#[derive(Debug, Clone, Default)]
pub struct AnnuityProcessor {
    contracts: Vec<ContractTerms>,
}

impl AnnuityProcessor {
    /// Creates a processor over `contracts`.
    #[must_use]
    pub fn new(contracts: Vec<ContractTerms>) -> Self {
        Self { contracts }
    }
}

impl ContractTypeProcessor for AnnuityProcessor {
    fn family(&self) -> ContractFamily {
        ContractFamily::Annuity
    }

    fn contracts(&self) -> &[ContractTerms] {
        &self.contracts
    }

    fn derive(&self, terms: &ContractTerms, ctx: &DerivationContext<'_>) -> ContractOutcome {
        derive_monetary_events(self.family(), terms, ctx)
    }
}

/// Builds the processor for a family batch.
fn processor_for(family: ContractFamily, contracts: Vec<ContractTerms>) -> Box<dyn ContractTypeProcessor> {
    match family {
        ContractFamily::PrincipalAtMaturity => Box::new(PrincipalAtMaturityProcessor::new(contracts)),
        ContractFamily::Annuity => Box::new(AnnuityProcessor::new(contracts)),
    }
}

/// One processor per contract family, iterated in family order.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: BTreeMap<ContractFamily, Box<dyn ContractTypeProcessor>>,
}

impl ProcessorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups a portfolio by family and registers one processor per
    /// family present. Absent families are not registered.
    #[must_use]
    pub fn from_portfolio(portfolio: impl IntoIterator<Item = ContractTerms>) -> Self {
        let mut batches: BTreeMap<ContractFamily, Vec<ContractTerms>> = BTreeMap::new();
        for terms in portfolio {
            batches.entry(terms.family).or_default().push(terms);
        }

        let mut registry = Self::new();
        for (family, contracts) in batches {
            registry.register(processor_for(family, contracts));
        }
        registry
    }

    /// Registers a processor, returning the one it replaces.
    pub fn register(
        &mut self,
        processor: Box<dyn ContractTypeProcessor>,
    ) -> Option<Box<dyn ContractTypeProcessor>> {
        self.processors.insert(processor.family(), processor)
    }

    /// Processor for a family.
    #[must_use]
    pub fn get(&self, family: ContractFamily) -> Option<&dyn ContractTypeProcessor> {
        self.processors.get(&family).map(|p| &**p)
    }

    /// Processors in family order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ContractTypeProcessor> {
        self.processors.values().map(|p| &**p)
    }

    /// Number of registered processors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Total contracts across processors.
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.iter().map(|p| p.contract_count()).sum()
    }

    /// Contract count per family.
    #[must_use]
    pub fn counts_by_family(&self) -> BTreeMap<ContractFamily, usize> {
        self.processors
            .iter()
            .map(|(family, p)| (*family, p.contract_count()))
            .collect()
    }

    /// Earliest status date across all contracts.
    #[must_use]
    pub fn earliest_status_date(&self) -> Option<Date> {
        self.iter()
            .flat_map(|p| p.contracts().iter().map(|t| t.status_date))
            .min()
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.counts_by_family()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_scenarios::{ScenarioDefinition, ScenarioEvent};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn loan(id: &str, family: ContractFamily) -> ContractTerms {
        ContractTerms::builder()
            .contract_id(id)
            .family(family)
            .status_date(d(2024, 1, 1))
            .initial_exchange_date(d(2024, 1, 1))
            .maturity_date(d(2026, 1, 1))
            .notional_principal(dec!(1000))
            .nominal_interest_rate(dec!(0.06))
            .day_count("30E/360")
            .interest_cycle(Some(d(2025, 1, 1)), "P1Y")
            .build()
            .unwrap()
    }

    fn ctx(overlay: Option<&ScenarioOverlay>, rate: Decimal) -> DerivationContext<'_> {
        DerivationContext {
            scenario: "base",
            overlay,
            horizon: Horizon::new(d(2024, 1, 1), d(2034, 1, 1)),
            discount_rate: rate,
        }
    }

    #[test]
    fn test_registry_registers_present_families_only() {
        let registry = ProcessorRegistry::from_portfolio(vec![
            loan("A", ContractFamily::PrincipalAtMaturity),
            loan("B", ContractFamily::PrincipalAtMaturity),
        ]);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(ContractFamily::Annuity).is_none());
        assert_eq!(registry.contract_count(), 2);
        assert_eq!(registry.counts_by_family()[&ContractFamily::PrincipalAtMaturity], 2);
        assert_eq!(registry.earliest_status_date(), Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_registry_orders_by_family() {
        let registry = ProcessorRegistry::from_portfolio(vec![
            loan("B", ContractFamily::Annuity),
            loan("A", ContractFamily::PrincipalAtMaturity),
        ]);
        let families: Vec<_> = registry.iter().map(|p| p.family()).collect();
        assert_eq!(families, vec![ContractFamily::PrincipalAtMaturity, ContractFamily::Annuity]);
    }

    #[test]
    fn test_register_replaces_family() {
        let mut registry = ProcessorRegistry::new();
        assert!(registry.register(Box::new(AnnuityProcessor::default())).is_none());
        let previous = registry.register(Box::new(AnnuityProcessor::new(vec![loan(
            "X",
            ContractFamily::Annuity,
        )])));
        assert_eq!(previous.map(|p| p.contract_count()), Some(0));
        assert_eq!(registry.contract_count(), 1);
    }

    #[test]
    fn test_bullet_events_undiscounted() {
        let processor = PrincipalAtMaturityProcessor::new(vec![loan("A", ContractFamily::PrincipalAtMaturity)]);
        let output = processor.monetary_events(&ctx(None, Decimal::ZERO), &EngineConfig::sequential());

        assert!(output.failures.is_empty());
        let payoffs: Vec<_> = output.events.iter().map(|e| (e.kind, e.payoff)).collect();
        assert_eq!(
            payoffs,
            vec![
                (EventKind::InitialExchange, dec!(-1000)),
                (EventKind::InterestPayment, dec!(60)),
                (EventKind::Maturity, dec!(1060)),
                (EventKind::InterestPayment, dec!(0)),
            ]
        );
        assert!(output.events.iter().all(|e| e.payoff == e.present_value));
        assert!(output.events.iter().all(|e| e.scenario == "base"));
    }

    #[test]
    fn test_events_before_horizon_start_are_replayed_not_reported() {
        let processor = PrincipalAtMaturityProcessor::new(vec![loan("A", ContractFamily::PrincipalAtMaturity)]);
        let mut context = ctx(None, Decimal::ZERO);
        context.horizon = Horizon::new(d(2024, 6, 1), d(2034, 1, 1));

        let output = processor.monetary_events(&context, &EngineConfig::sequential());
        assert!(output.events.iter().all(|e| e.date >= d(2024, 6, 1)));
        let maturity = output
            .events
            .iter()
            .find(|e| e.kind == EventKind::Maturity)
            .unwrap();
        assert_eq!(maturity.payoff, dec!(1060));
    }

    #[test]
    fn test_present_value_discounts_and_adjusts() {
        let scenario = ScenarioDefinition::new("haircut")
            .with_event(ScenarioEvent::value_adjustment("h", dec!(-10)));
        let overlay = ScenarioOverlay::from_definition(&scenario);

        let flat = ctx(Some(&overlay), Decimal::ZERO);
        assert_eq!(flat.present_value("A", d(2025, 1, 1), dec!(100)), dec!(90));

        let discounted = ctx(None, dec!(0.05));
        let pv = discounted.present_value("A", d(2025, 1, 1), dec!(105));
        assert!((pv - dec!(100)).abs() < dec!(0.5));
        assert_eq!(discounted.present_value("A", d(2024, 1, 1), dec!(105)), dec!(105));
    }

    #[test]
    fn test_malformed_cycle_reported_as_failure() {
        let mut bad = loan("BAD", ContractFamily::PrincipalAtMaturity);
        bad.interest.cycle = Some("P0M".to_string());
        let processor = PrincipalAtMaturityProcessor::new(vec![
            loan("A", ContractFamily::PrincipalAtMaturity),
            bad,
        ]);

        let output = processor.monetary_events(&ctx(None, Decimal::ZERO), &EngineConfig::sequential());
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].0, "BAD");
        assert!(output.events.iter().all(|e| e.contract_id == "A"));
    }
}
