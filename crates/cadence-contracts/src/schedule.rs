//! Contract event scheduling.
//!
//! [`ContractEventScheduler`] expands a contract's milestone dates and its
//! recurrence streams into one ordered event timeline:
//!
//! 1. Milestones: initial exchange, maturity, purchase (and any analysis dates)
//! 2. Streams: interest, rate reset, fee and scaling, each expanded from its
//!    anchor and kept strictly after the contract's baseline date
//! 3. Capitalization: interest payments up to the capitalization end date
//!    become capitalizations
//! 4. Fixed reset: the first reset after the status date uses the
//!    pre-agreed rate
//! 5. Termination: events after the termination date are dropped and a
//!    termination event is appended
//! 6. Clipping to `[status date, horizon]`
//! 7. Stable sort by date, then kind rank
//!
//! Each step consumes the previous list and returns a new one.
//!
//! # Example
//!
//! ```rust
//! use cadence_contracts::{ContractEventScheduler, ContractTerms, EventKind};
//! use cadence_core::types::Date;
//! use rust_decimal_macros::dec;
//!
//! let terms = ContractTerms::builder()
//!     .contract_id("LOAN-1")
//!     .status_date(Date::from_ymd(2024, 1, 1).unwrap())
//!     .initial_exchange_date(Date::from_ymd(2024, 1, 1).unwrap())
//!     .maturity_date(Date::from_ymd(2025, 1, 1).unwrap())
//!     .notional_principal(dec!(1000))
//!     .nominal_interest_rate(dec!(0.05))
//!     .interest_cycle(None, "P6M")
//!     .build()
//!     .unwrap();
//!
//! let horizon = Date::from_ymd(2026, 1, 1).unwrap();
//! let events = ContractEventScheduler::new().schedule(&terms, horizon).unwrap();
//! let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         EventKind::InitialExchange,
//!         EventKind::InterestPayment,
//!         EventKind::Maturity,
//!         EventKind::InterestPayment,
//!     ]
//! );
//! ```

use cadence_core::cycle::{Cycle, CycleDateGenerator};
use cadence_core::types::Date;

use crate::error::ContractResult;
use crate::event::{sort_events, ContractEvent, EventKind};
use crate::terms::{ContractTerms, RecurrenceStream};

/// Builds ordered event timelines from contract terms.
#[derive(Debug, Clone, Default)]
pub struct ContractEventScheduler {
    analysis_dates: Vec<Date>,
}

/// How far a recurrence stream runs relative to maturity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    /// Up to and including maturity.
    Inclusive,
    /// Strictly before maturity.
    Exclusive,
}

impl ContractEventScheduler {
    /// Creates a scheduler with no analysis dates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds analysis dates, emitted as [`EventKind::Analysis`] for every contract.
    #[must_use]
    pub fn with_analysis_dates(mut self, dates: impl IntoIterator<Item = Date>) -> Self {
        self.analysis_dates.extend(dates);
        self
    }

    /// Returns the ordered events of `terms` between its status date and
    /// `horizon`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Core` when any stream's cycle is malformed.
    pub fn schedule(&self, terms: &ContractTerms, horizon: Date) -> ContractResult<Vec<ContractEvent>> {
        let mut events = self.milestones(terms);
        let interest_events = interest_stream(terms)?;
        let has_interest = !interest_events.is_empty();
        events.extend(interest_events);
        events.extend(stream_events(
            terms,
            &terms.rate_reset,
            None,
            EventKind::RateReset,
            StreamEnd::Exclusive,
        )?);
        events.extend(stream_events(
            terms,
            &terms.fee,
            None,
            EventKind::FeePayment,
            StreamEnd::Inclusive,
        )?);
        if terms.scaling_effect.is_active() {
            events.extend(stream_events(
                terms,
                &terms.scaling,
                None,
                EventKind::ScalingIndex,
                StreamEnd::Exclusive,
            )?);
        }

        let events = capitalize(terms, events, has_interest);
        let events = fix_first_reset(terms, events);
        let events = terminate(terms, events);
        let mut events = clip(terms.status_date, horizon, events);
        sort_events(&mut events);

        log::debug!(
            "scheduled {} events for {} up to {}",
            events.len(),
            terms.contract_id,
            horizon
        );
        Ok(events)
    }

    fn milestones(&self, terms: &ContractTerms) -> Vec<ContractEvent> {
        let event = |date, kind| ContractEvent::new(terms.contract_id.as_str(), date, kind, terms.currency);

        let mut events: Vec<ContractEvent> = self
            .analysis_dates
            .iter()
            .map(|date| event(*date, EventKind::Analysis))
            .collect();
        if let Some(ied) = terms.initial_exchange_date {
            events.push(event(ied, EventKind::InitialExchange));
        }
        events.push(event(terms.maturity_date, EventKind::Maturity));
        if let Some(prd) = terms.purchase_date {
            events.push(event(prd, EventKind::PurchaseDate));
        }
        events
    }
}

/// Interest payments, with an annual fallback cycle when only a rate is
/// declared and a closing payment at maturity.
fn interest_stream(terms: &ContractTerms) -> ContractResult<Vec<ContractEvent>> {
    if !terms.has_interest_stream() {
        return Ok(Vec::new());
    }
    let fallback = match terms.interest.declared_cycle() {
        Some(_) => None,
        None => Some(Cycle::annual()),
    };
    let mut events = stream_events(
        terms,
        &terms.interest,
        fallback,
        EventKind::InterestPayment,
        StreamEnd::Inclusive,
    )?;

    let maturity = terms.maturity_date;
    let lands_on_maturity = events.last().is_some_and(|e| e.date == maturity);
    if !lands_on_maturity && maturity > terms.baseline_date() {
        events.push(ContractEvent::new(
            terms.contract_id.as_str(),
            maturity,
            EventKind::InterestPayment,
            terms.currency,
        ));
    }
    Ok(events)
}

/// Expands one recurrence stream into events of `kind`.
fn stream_events(
    terms: &ContractTerms,
    stream: &RecurrenceStream,
    fallback: Option<Cycle>,
    kind: EventKind,
    end: StreamEnd,
) -> ContractResult<Vec<ContractEvent>> {
    let cycle = match stream.declared_cycle() {
        Some(s) => Cycle::parse(s)?,
        None => fallback,
    };
    let Some(cycle) = cycle else {
        return Ok(Vec::new());
    };

    let baseline = terms.baseline_date();
    let maturity = terms.maturity_date;
    // the generator always keeps its anchor, even one sitting on maturity
    let events: Vec<ContractEvent> = CycleDateGenerator::new(terms.stream_anchor(stream), maturity)
        .with_end_of_month(terms.end_of_month)
        .with_boundary(end == StreamEnd::Inclusive)
        .dates_for(Some(cycle))
        .filter(|date| *date > baseline)
        .filter(|date| end == StreamEnd::Inclusive || *date < maturity)
        .map(|date| ContractEvent::new(terms.contract_id.as_str(), date, kind, terms.currency))
        .collect();

    log::debug!(
        "{}: {} {} events from cycle {}",
        terms.contract_id,
        events.len(),
        kind,
        cycle
    );
    Ok(events)
}

/// Interest payments on or before the capitalization end date become
/// capitalizations; without an interest stream a single capitalization is
/// emitted at that date.
fn capitalize(terms: &ContractTerms, events: Vec<ContractEvent>, has_interest: bool) -> Vec<ContractEvent> {
    let Some(cap_end) = terms.capitalization_end_date else {
        return events;
    };

    if !has_interest {
        let mut events = events;
        events.push(ContractEvent::new(
            terms.contract_id.as_str(),
            cap_end,
            EventKind::InterestCapitalization,
            terms.currency,
        ));
        return events;
    }

    events
        .into_iter()
        .map(|event| {
            if event.kind == EventKind::InterestPayment && event.date <= cap_end {
                event.rekinded(EventKind::InterestCapitalization)
            } else {
                event
            }
        })
        .collect()
}

/// The earliest reset strictly after the status date becomes a fixed reset
/// when a next reset rate is declared.
fn fix_first_reset(terms: &ContractTerms, events: Vec<ContractEvent>) -> Vec<ContractEvent> {
    if terms.next_reset_rate.is_none() {
        return events;
    }
    let first = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == EventKind::RateReset && e.date > terms.status_date)
        .min_by_key(|(_, e)| e.date)
        .map(|(idx, _)| idx);
    let Some(first) = first else {
        return events;
    };

    log::debug!(
        "{}: reset on {} uses the next reset rate",
        terms.contract_id,
        events[first].date
    );
    events
        .into_iter()
        .enumerate()
        .map(|(idx, event)| {
            if idx == first {
                event.rekinded(EventKind::RateResetFixed)
            } else {
                event
            }
        })
        .collect()
}

/// Drops events after the termination date and appends the termination.
fn terminate(terms: &ContractTerms, events: Vec<ContractEvent>) -> Vec<ContractEvent> {
    let Some(td) = terms.termination_date else {
        return events;
    };
    let mut events: Vec<ContractEvent> = events.into_iter().filter(|e| e.date <= td).collect();
    events.push(ContractEvent::new(
        terms.contract_id.as_str(),
        td,
        EventKind::Termination,
        terms.currency,
    ));
    events
}

fn clip(status_date: Date, horizon: Date, events: Vec<ContractEvent>) -> Vec<ContractEvent> {
    events
        .into_iter()
        .filter(|e| e.date >= status_date && e.date <= horizon)
        .collect()
}
