//! Scenario overlay queried during event application and valuation.

use cadence_core::types::Date;
use rust_decimal::Decimal;

use crate::definition::{ScenarioDefinition, ScenarioEvent, ScenarioEventKind};

/// Read-only override table built from a [`ScenarioDefinition`].
///
/// Queries sum every active entry for the contract and date. An overlay with
/// no matching entries answers `None`.
///
/// # Example
///
/// ```rust
/// use cadence_core::types::Date;
/// use cadence_scenarios::{ScenarioDefinition, ScenarioEvent, ScenarioOverlay};
/// use rust_decimal_macros::dec;
///
/// let scenario = ScenarioDefinition::new("shock")
///     .with_event(ScenarioEvent::rate_shock_bps("a", dec!(50)))
///     .with_event(ScenarioEvent::rate_shock_bps("b", dec!(100)));
/// let overlay = ScenarioOverlay::from_definition(&scenario);
///
/// let date = Date::from_ymd(2025, 1, 1).unwrap();
/// assert_eq!(overlay.try_rate_override("C1", date), Some(dec!(0.015)));
/// assert_eq!(overlay.try_value_adjustment("C1", date), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverlay {
    name: String,
    rate_shocks: Vec<ScenarioEvent>,
    value_adjustments: Vec<ScenarioEvent>,
}

impl ScenarioOverlay {
    /// An overlay with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the overlay for a scenario.
    #[must_use]
    pub fn from_definition(definition: &ScenarioDefinition) -> Self {
        let (rate_shocks, value_adjustments) = definition
            .events()
            .iter()
            .cloned()
            .partition(|e| matches!(e.kind, ScenarioEventKind::RateShock { .. }));

        Self {
            name: definition.name().to_string(),
            rate_shocks,
            value_adjustments,
        }
    }

    /// Returns the originating scenario name (empty for [`ScenarioOverlay::empty`]).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the overlay has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rate_shocks.is_empty() && self.value_adjustments.is_empty()
    }

    /// Rate that replaces the contract's rate on `date`: the summed active
    /// shocks in basis points, as a decimal rate.
    #[must_use]
    pub fn try_rate_override(&self, contract_id: &str, date: Date) -> Option<Decimal> {
        sum_active(&self.rate_shocks, contract_id, date, ScenarioEvent::rate_bps)
            .map(|bps| bps / Decimal::from(10_000))
    }

    /// Summed active value adjustments in percentage points.
    #[must_use]
    pub fn try_value_adjustment(&self, contract_id: &str, date: Date) -> Option<Decimal> {
        sum_active(
            &self.value_adjustments,
            contract_id,
            date,
            ScenarioEvent::adjustment_percent,
        )
    }
}

fn sum_active(
    entries: &[ScenarioEvent],
    contract_id: &str,
    date: Date,
    amount: fn(&ScenarioEvent) -> Option<Decimal>,
) -> Option<Decimal> {
    entries
        .iter()
        .filter(|e| e.is_active(contract_id, date))
        .filter_map(amount)
        .fold(None, |acc, x| Some(acc.unwrap_or(Decimal::ZERO) + x))
}

impl From<&ScenarioDefinition> for ScenarioOverlay {
    fn from(definition: &ScenarioDefinition) -> Self {
        Self::from_definition(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::ScenarioWindow;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_empty_overlay_answers_none() {
        let overlay = ScenarioOverlay::empty();
        assert!(overlay.is_empty());
        assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), None);
        assert_eq!(overlay.try_value_adjustment("C1", d(2025, 1, 1)), None);
    }

    #[test]
    fn test_kinds_are_kept_apart() {
        let def = ScenarioDefinition::new("mixed")
            .with_event(ScenarioEvent::rate_shock_bps("r", dec!(25)))
            .with_event(ScenarioEvent::value_adjustment("v", dec!(-4)))
            .with_event(ScenarioEvent::value_adjustment("w", dec!(1.5)));
        let overlay = ScenarioOverlay::from(&def);

        assert_eq!(overlay.name(), "mixed");
        assert_eq!(overlay.try_rate_override("X", d(2025, 1, 1)), Some(dec!(0.0025)));
        assert_eq!(overlay.try_value_adjustment("X", d(2025, 1, 1)), Some(dec!(-2.5)));
    }

    #[test]
    fn test_contract_targeting() {
        let def = ScenarioDefinition::new("targeted")
            .with_event(ScenarioEvent::rate_shock_bps("all", dec!(10)))
            .with_event(ScenarioEvent::rate_shock_bps("one", dec!(40)).for_contract("C1"));
        let overlay = ScenarioOverlay::from_definition(&def);

        assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), Some(dec!(0.005)));
        assert_eq!(overlay.try_rate_override("C2", d(2025, 1, 1)), Some(dec!(0.001)));
    }

    #[test]
    fn test_inactive_entries_yield_none() {
        let window = ScenarioWindow::until(d(2020, 1, 1));
        let def = ScenarioDefinition::new("past")
            .with_event(ScenarioEvent::rate_shock_bps("r", dec!(10)).within(window));
        let overlay = ScenarioOverlay::from_definition(&def);

        assert!(!overlay.is_empty());
        assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), None);
    }

    #[test]
    fn test_offsetting_shocks_override_to_zero() {
        let def = ScenarioDefinition::new("flat")
            .with_event(ScenarioEvent::rate_shock_bps("up", dec!(50)))
            .with_event(ScenarioEvent::rate_shock_bps("down", dec!(-50)));
        let overlay = ScenarioOverlay::from_definition(&def);

        assert_eq!(overlay.try_rate_override("C1", d(2025, 1, 1)), Some(Decimal::ZERO));
    }
}
