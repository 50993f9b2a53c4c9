//! Overlay behaviour across windows, targeting and editing.

use cadence_core::types::Date;
use cadence_scenarios::{ScenarioDefinition, ScenarioEvent, ScenarioOverlay, ScenarioWindow};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

// =============================================================================
// Window boundaries
// =============================================================================

#[test]
fn rate_shock_window_is_inclusive_on_both_ends() {
    let window = ScenarioWindow::between(d(2024, 6, 1), d(2024, 12, 1)).unwrap();
    let scenario = ScenarioDefinition::new("window")
        .with_event(ScenarioEvent::rate_shock_bps("shock", dec!(100)).within(window));
    let overlay = ScenarioOverlay::from_definition(&scenario);

    assert_eq!(overlay.try_rate_override("C1", d(2024, 5, 31)), None);
    assert_eq!(overlay.try_rate_override("C1", d(2024, 6, 1)), Some(dec!(0.01)));
    assert_eq!(overlay.try_rate_override("C1", d(2024, 12, 1)), Some(dec!(0.01)));
    assert_eq!(overlay.try_rate_override("C1", d(2024, 12, 2)), None);
}

#[test]
fn overlapping_shocks_are_additive() {
    let scenario = ScenarioDefinition::new("overlap")
        .with_event(
            ScenarioEvent::rate_shock_bps("a", dec!(50))
                .within(ScenarioWindow::from(d(2024, 1, 1))),
        )
        .with_event(
            ScenarioEvent::rate_shock_bps("b", dec!(100))
                .within(ScenarioWindow::until(d(2025, 6, 30))),
        );
    let overlay = ScenarioOverlay::from_definition(&scenario);

    assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), Some(dec!(0.015)));
    assert_eq!(overlay.try_rate_override("C1", d(2023, 6, 1)), Some(dec!(0.01)));
    assert_eq!(overlay.try_rate_override("C1", d(2026, 1, 1)), Some(dec!(0.005)));
}

#[test]
fn value_adjustments_add_in_percentage_points() {
    let scenario = ScenarioDefinition::new("haircuts")
        .with_event(ScenarioEvent::value_adjustment("a", dec!(-5)))
        .with_event(
            ScenarioEvent::value_adjustment("b", dec!(-2.5))
                .within(ScenarioWindow::from(d(2025, 1, 1))),
        );
    let overlay = ScenarioOverlay::from_definition(&scenario);

    assert_eq!(overlay.try_value_adjustment("C1", d(2024, 12, 31)), Some(dec!(-5)));
    assert_eq!(overlay.try_value_adjustment("C1", d(2025, 1, 1)), Some(dec!(-7.5)));
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn removing_an_event_changes_the_overlay() {
    let mut scenario = ScenarioDefinition::new("edit")
        .with_event(ScenarioEvent::rate_shock_bps("a", dec!(50)))
        .with_event(ScenarioEvent::rate_shock_bps("b", dec!(100)));
    scenario.remove_event("b").unwrap();

    let overlay = ScenarioOverlay::from_definition(&scenario);
    assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), Some(dec!(0.005)));
}

#[test]
fn loads_scenario_from_json() {
    let json = r#"{
        "name": "json",
        "events": [
            {"id": "r", "type": "rate_shock", "bps": 75, "window": {"start": "2024-01-01"}},
            {"id": "v", "type": "value_adjustment", "percent": -1, "contract_id": "C7"}
        ]
    }"#;
    let scenario: ScenarioDefinition = serde_json::from_str(json).unwrap();
    let overlay = ScenarioOverlay::from_definition(&scenario);

    assert_eq!(overlay.try_rate_override("C1", d(2024, 1, 1)), Some(dec!(0.0075)));
    assert_eq!(overlay.try_value_adjustment("C7", d(2024, 1, 1)), Some(dec!(-1)));
    assert_eq!(overlay.try_value_adjustment("C1", d(2024, 1, 1)), None);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn rate_override_is_sum_of_bps(shocks in proptest::collection::vec(-500i64..500, 1..8)) {
        let mut scenario = ScenarioDefinition::new("sum");
        for (i, bps) in shocks.iter().enumerate() {
            scenario
                .add_event(ScenarioEvent::rate_shock_bps(format!("s{i}"), Decimal::from(*bps)))
                .unwrap();
        }
        let overlay = ScenarioOverlay::from_definition(&scenario);
        let expected = Decimal::from(shocks.iter().sum::<i64>()) / Decimal::from(10_000);

        prop_assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), Some(expected));
    }
}
