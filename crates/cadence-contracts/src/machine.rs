//! Contract state machine.
//!
//! Applies an ordered event list to a [`ContractState`], one transition per
//! event. Before every event (analysis dates excepted) interest and fees
//! accrue from the current status date under the contract's day count.
//!
//! | Kind | Transition | Payoff |
//! |---|---|---|
//! | AD | none | 0 |
//! | IED | notional and rate set from terms | `-notional` |
//! | MD | notional and accrued cleared | `notional + accrued` |
//! | PRD | none | `-sign * price` |
//! | IP | accrued cleared (annuities also redeem principal) | `accrued (+ principal)` |
//! | IPCI | accrued added to notional | 0 |
//! | RR / RRF | rate from overlay, else fixed reset rate | 0 |
//! | FP | fee accrued cleared | `fee accrued` |
//! | SC | none | 0 |
//! | TD | notional and accrued cleared | `sign * price + accrued` |

use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

use cadence_core::daycounts::DayCount;
use cadence_core::types::Date;
use cadence_scenarios::ScenarioOverlay;

use crate::event::{ContractEvent, EventKind};
use crate::state::ContractState;
use crate::terms::{ContractFamily, ContractTerms};

/// An applied event with its payoff and the state right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedEvent {
    /// The event.
    pub event: ContractEvent,
    /// Signed cash flow of the event.
    pub payoff: Decimal,
    /// Notional after the event.
    pub notional_after: Decimal,
    /// Nominal rate after the event.
    pub rate_after: Decimal,
    /// Accrued interest after the event.
    pub accrued_after: Decimal,
}

/// Replays events for one contract, optionally under a scenario overlay.
#[derive(Debug, Clone, Copy)]
pub struct ContractStateMachine<'a> {
    terms: &'a ContractTerms,
    overlay: Option<&'a ScenarioOverlay>,
}

/// Running values the machine tracks besides the state itself.
struct Cursor {
    period_start: Date,
    remaining_payments: usize,
}

impl<'a> ContractStateMachine<'a> {
    /// Creates a machine for `terms` with no overlay.
    #[must_use]
    pub fn new(terms: &'a ContractTerms) -> Self {
        Self {
            terms,
            overlay: None,
        }
    }

    /// Sets the scenario overlay consulted at rate resets.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Option<&'a ScenarioOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    /// Applies every event to `state` in order.
    ///
    /// With a purchase date, events before it (analysis dates excepted) are
    /// first removed from `events`.
    pub fn apply(&self, events: &mut Vec<ContractEvent>, state: &mut ContractState) {
        self.run(events, state, |_, _, _| {});
    }

    /// Like [`apply`](Self::apply), returning one [`AppliedEvent`] per event.
    pub fn replay(&self, events: &mut Vec<ContractEvent>, state: &mut ContractState) -> Vec<AppliedEvent> {
        let mut applied = Vec::with_capacity(events.len());
        self.run(events, state, |event, payoff, state| {
            applied.push(AppliedEvent {
                event: event.clone(),
                payoff,
                notional_after: state.notional,
                rate_after: state.nominal_rate,
                accrued_after: state.accrued_interest,
            });
        });
        applied
    }

    /// Removes events before the purchase date, keeping analysis dates.
    pub fn prune_before_purchase(&self, events: &mut Vec<ContractEvent>) {
        if let Some(prd) = self.terms.purchase_date {
            events.retain(|e| e.kind == EventKind::Analysis || e.date >= prd);
        }
    }

    fn run(
        &self,
        events: &mut Vec<ContractEvent>,
        state: &mut ContractState,
        mut observe: impl FnMut(&ContractEvent, Decimal, &ContractState),
    ) {
        self.prune_before_purchase(events);

        let mut cursor = Cursor {
            period_start: state.status_date,
            remaining_payments: events
                .iter()
                .filter(|e| e.kind == EventKind::InterestPayment)
                .count(),
        };

        for event in events.iter() {
            debug_assert_eq!(event.contract_id, state.contract_id);
            let payoff = self.transition(event, state, &mut cursor);
            observe(event, payoff, state);
        }
    }

    fn transition(&self, event: &ContractEvent, state: &mut ContractState, cursor: &mut Cursor) -> Decimal {
        if event.kind == EventKind::Analysis {
            return Decimal::ZERO;
        }
        self.accrue(state, event.date);

        let terms = self.terms;
        let sign = terms.sign();
        let payoff = match event.kind {
            EventKind::Analysis => Decimal::ZERO,
            EventKind::InitialExchange => {
                state.notional = sign * terms.notional_principal;
                state.nominal_rate = terms.nominal_interest_rate.unwrap_or(Decimal::ZERO);
                cursor.period_start = event.date;
                -state.notional
            }
            EventKind::Maturity => {
                let payoff = state.notional + state.accrued_interest;
                state.notional = Decimal::ZERO;
                state.accrued_interest = Decimal::ZERO;
                payoff
            }
            EventKind::PurchaseDate => terms
                .purchase_price
                .map_or(-state.notional, |price| -sign * price),
            EventKind::InterestPayment => {
                let interest = state.accrued_interest;
                state.accrued_interest = Decimal::ZERO;
                let principal = match terms.family {
                    ContractFamily::Annuity => self.annuity_principal(state, cursor, event.date),
                    ContractFamily::PrincipalAtMaturity => Decimal::ZERO,
                };
                state.notional -= principal;
                cursor.remaining_payments = cursor.remaining_payments.saturating_sub(1);
                cursor.period_start = event.date;
                interest + principal
            }
            EventKind::InterestCapitalization => {
                state.notional += state.accrued_interest;
                state.accrued_interest = Decimal::ZERO;
                cursor.period_start = event.date;
                Decimal::ZERO
            }
            EventKind::RateReset | EventKind::RateResetFixed => {
                self.reset_rate(event, state);
                Decimal::ZERO
            }
            EventKind::FeePayment => std::mem::take(&mut state.fee_accrued),
            EventKind::ScalingIndex => Decimal::ZERO,
            EventKind::Termination => {
                let price = terms.termination_price.map_or(state.notional, |p| sign * p);
                let payoff = price + state.accrued_interest;
                state.notional = Decimal::ZERO;
                state.accrued_interest = Decimal::ZERO;
                payoff
            }
        };

        state.status_date = event.date;
        payoff
    }

    fn accrue(&self, state: &mut ContractState, to: Date) {
        if to <= state.status_date {
            return;
        }
        let yf = self.terms.day_count.year_fraction(state.status_date, to);
        state.accrued_interest += state.notional * state.nominal_rate * yf;
        if let Some(fee_rate) = self.terms.fee_rate {
            state.fee_accrued += state.notional * fee_rate * yf;
        }
    }

    fn reset_rate(&self, event: &ContractEvent, state: &mut ContractState) {
        let scenario_rate = self
            .overlay
            .and_then(|overlay| overlay.try_rate_override(&state.contract_id, event.date));

        if let Some(rate) = scenario_rate {
            log::trace!("{}: scenario rate {} on {}", state.contract_id, rate, event.date);
            state.nominal_rate = rate;
        } else if event.kind == EventKind::RateResetFixed {
            if let Some(rate) = self.terms.next_reset_rate {
                state.nominal_rate = rate;
            }
        }
    }

    /// Principal part of the level payment `N·i / (1 − (1+i)^−k)`.
    fn annuity_principal(&self, state: &ContractState, cursor: &Cursor, date: Date) -> Decimal {
        let notional = state.notional;
        let k = cursor.remaining_payments;
        if k == 0 || notional.is_zero() {
            return Decimal::ZERO;
        }
        if k == 1 {
            return notional;
        }

        let rate = state.nominal_rate * self.terms.day_count.year_fraction(cursor.period_start, date);
        let periods = Decimal::from(k as u64);
        let level = if rate.is_zero() {
            notional / periods
        } else {
            match (Decimal::ONE + rate).checked_powi(k as i64) {
                Some(growth) if growth > Decimal::ONE => {
                    notional * rate / (Decimal::ONE - Decimal::ONE / growth)
                }
                _ => notional / periods + notional * rate,
            }
        };

        let principal = level - notional * rate;
        if principal.abs() > notional.abs() {
            notional
        } else {
            principal
        }
    }
}
