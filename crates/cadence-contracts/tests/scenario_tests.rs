//! End-to-end scheduling and replay of reference contracts.

use cadence_contracts::prelude::*;
use cadence_core::types::Date;
use cadence_scenarios::{ScenarioDefinition, ScenarioEvent, ScenarioOverlay, ScenarioWindow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

/// Five-year quarterly bullet loan starting 2024-01-01.
fn reference_loan() -> ContractTermsBuilder {
    ContractTerms::builder()
        .contract_id("REF-1")
        .status_date(d(2024, 1, 1))
        .initial_exchange_date(d(2024, 1, 1))
        .maturity_date(d(2029, 1, 1))
        .notional_principal(dec!(1000000))
        .nominal_interest_rate(dec!(0.05))
        .role(ContractRole::Payer)
        .interest_cycle(Some(d(2024, 4, 1)), "P3M")
}

fn count(events: &[ContractEvent], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

// =============================================================================
// Reference contract
// =============================================================================

#[test]
fn reference_loan_schedules_and_runs_off() {
    let terms = reference_loan().build().unwrap();
    let mut events = ContractEventScheduler::new()
        .schedule(&terms, d(2030, 1, 1))
        .unwrap();

    assert_eq!(count(&events, EventKind::InitialExchange), 1);
    assert_eq!(count(&events, EventKind::Maturity), 1);
    let maturity = events.iter().find(|e| e.kind == EventKind::Maturity).unwrap();
    assert_eq!(maturity.date, d(2029, 1, 1));
    assert!(count(&events, EventKind::InterestPayment) >= 15);
    assert_eq!(count(&events, EventKind::InterestPayment), 20);

    let mut state = ContractState::init_from(&terms);
    ContractStateMachine::new(&terms).apply(&mut events, &mut state);
    assert_eq!(state.notional, Decimal::ZERO);
    assert_eq!(state.accrued_interest, Decimal::ZERO);
}

#[test]
fn reference_loan_capitalizes_until_end_date() {
    let terms = reference_loan()
        .capitalization_end_date(d(2026, 1, 1))
        .build()
        .unwrap();
    let events = ContractEventScheduler::new()
        .schedule(&terms, d(2030, 1, 1))
        .unwrap();

    let interest: Vec<&ContractEvent> = events.iter().filter(|e| e.kind.is_interest()).collect();
    assert_eq!(interest.len(), 20);
    for event in interest {
        if event.date <= d(2026, 1, 1) {
            assert_eq!(event.kind, EventKind::InterestCapitalization, "{event}");
        } else {
            assert_eq!(event.kind, EventKind::InterestPayment, "{event}");
        }
    }
}

#[test]
fn capitalized_interest_is_repaid_at_maturity() {
    let terms = reference_loan()
        .capitalization_end_date(d(2026, 1, 1))
        .build()
        .unwrap();
    let mut events = ContractEventScheduler::new()
        .schedule(&terms, d(2030, 1, 1))
        .unwrap();
    let mut state = ContractState::init_from(&terms);
    let applied = ContractStateMachine::new(&terms).replay(&mut events, &mut state);

    let capitalized = applied
        .iter()
        .filter(|a| a.event.kind == EventKind::InterestCapitalization)
        .last()
        .unwrap();
    assert!(capitalized.notional_after > dec!(1000000));

    let md = applied.iter().find(|a| a.event.kind == EventKind::Maturity).unwrap();
    assert!(md.payoff > capitalized.notional_after);
    assert_eq!(state.notional, Decimal::ZERO);
}

// =============================================================================
// Scenario overlay
// =============================================================================

#[test]
fn overlapping_shocks_set_reset_rate() {
    let terms = reference_loan()
        .rate_reset_cycle(Some(d(2025, 1, 1)), "P1Y")
        .build()
        .unwrap();
    let scenario = ScenarioDefinition::new("overlap")
        .with_event(
            ScenarioEvent::rate_shock_bps("a", dec!(50))
                .within(ScenarioWindow::between(d(2024, 12, 1), d(2025, 2, 1)).unwrap()),
        )
        .with_event(ScenarioEvent::rate_shock_bps("b", dec!(100)).within(ScenarioWindow::until(d(2025, 1, 1))));
    let overlay = ScenarioOverlay::from_definition(&scenario);

    let mut events = ContractEventScheduler::new()
        .schedule(&terms, d(2030, 1, 1))
        .unwrap();
    let mut state = ContractState::init_from(&terms);
    let applied = ContractStateMachine::new(&terms)
        .with_overlay(Some(&overlay))
        .replay(&mut events, &mut state);

    let reset = applied
        .iter()
        .find(|a| a.event.kind == EventKind::RateReset && a.event.date == d(2025, 1, 1))
        .unwrap();
    assert_eq!(reset.rate_after, dec!(0.015));
}

#[test]
fn empty_overlay_matches_no_overlay() {
    let terms = reference_loan()
        .next_reset_rate(dec!(0.045))
        .rate_reset_cycle(None, "P6M")
        .fee_rate(dec!(0.001))
        .fee_cycle(None, "P1Y")
        .build()
        .unwrap();
    let horizon = d(2030, 1, 1);

    let mut plain_events = ContractEventScheduler::new().schedule(&terms, horizon).unwrap();
    let mut plain = ContractState::init_from(&terms);
    ContractStateMachine::new(&terms).apply(&mut plain_events, &mut plain);

    let empty = ScenarioOverlay::from_definition(&ScenarioDefinition::no_op());
    let mut overlay_events = ContractEventScheduler::new().schedule(&terms, horizon).unwrap();
    let mut overlaid = ContractState::init_from(&terms);
    ContractStateMachine::new(&terms)
        .with_overlay(Some(&empty))
        .apply(&mut overlay_events, &mut overlaid);

    assert_eq!(plain, overlaid);
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn malformed_cycle_fails_only_that_contract() {
    let bad = reference_loan().contract_id("BAD").fee_cycle(None, "P0M").build().unwrap();
    let good = reference_loan().build().unwrap();
    let scheduler = ContractEventScheduler::new();

    assert!(matches!(
        scheduler.schedule(&bad, d(2030, 1, 1)),
        Err(ContractError::Core(_))
    ));
    assert!(scheduler.schedule(&good, d(2030, 1, 1)).is_ok());
}
