//! Scenario definitions.
//!
//! A [`ScenarioDefinition`] is a named list of [`ScenarioEvent`] entries.
//! Each entry is windowed by a [`ScenarioWindow`], may be restricted to a
//! single contract, and is either a rate shock or a value adjustment.

use cadence_core::types::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};
use crate::window::ScenarioWindow;

/// Name of the implicit scenario used when none are supplied.
pub const BASE_SCENARIO: &str = "base";

/// What a scenario entry does while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEventKind {
    /// Signed rate shock in basis points. Active shocks add up.
    RateShock {
        /// Shock size in basis points.
        bps: Decimal,
    },
    /// Signed value adjustment in percentage points. Active adjustments add up.
    ValueAdjustment {
        /// Adjustment in percent (e.g. `-5` is a 5% haircut).
        percent: Decimal,
    },
}

/// A single entry of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEvent {
    /// Identifier, unique within its definition.
    pub id: String,
    /// Target contract id; `None` applies to every contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    /// Activity window.
    #[serde(default)]
    pub window: ScenarioWindow,
    /// Effect while active.
    #[serde(flatten)]
    pub kind: ScenarioEventKind,
}

impl ScenarioEvent {
    /// Creates a rate shock expressed in basis points.
    #[must_use]
    pub fn rate_shock_bps(id: impl Into<String>, bps: Decimal) -> Self {
        Self::new(id, ScenarioEventKind::RateShock { bps })
    }

    /// Creates a rate shock from an absolute rate (`0.0125` is 125 bps).
    #[must_use]
    pub fn rate_shock_absolute(id: impl Into<String>, rate: Decimal) -> Self {
        Self::rate_shock_bps(id, rate * Decimal::from(10_000))
    }

    /// Creates a value adjustment in percent.
    #[must_use]
    pub fn value_adjustment(id: impl Into<String>, percent: Decimal) -> Self {
        Self::new(id, ScenarioEventKind::ValueAdjustment { percent })
    }

    fn new(id: impl Into<String>, kind: ScenarioEventKind) -> Self {
        Self {
            id: id.into(),
            contract_id: None,
            window: ScenarioWindow::always(),
            kind,
        }
    }

    /// Restricts the entry to one contract.
    #[must_use]
    pub fn for_contract(mut self, contract_id: impl Into<String>) -> Self {
        self.contract_id = Some(contract_id.into());
        self
    }

    /// Sets the activity window.
    #[must_use]
    pub fn within(mut self, window: ScenarioWindow) -> Self {
        self.window = window;
        self
    }

    /// Returns true if the entry applies to `contract_id` on `date`.
    #[must_use]
    pub fn is_active(&self, contract_id: &str, date: Date) -> bool {
        self.contract_id.as_deref().map_or(true, |id| id == contract_id)
            && self.window.contains(date)
    }

    /// Shock in basis points, if this is a rate shock.
    #[must_use]
    pub fn rate_bps(&self) -> Option<Decimal> {
        match self.kind {
            ScenarioEventKind::RateShock { bps } => Some(bps),
            ScenarioEventKind::ValueAdjustment { .. } => None,
        }
    }

    /// Adjustment in percent, if this is a value adjustment.
    #[must_use]
    pub fn adjustment_percent(&self) -> Option<Decimal> {
        match self.kind {
            ScenarioEventKind::ValueAdjustment { percent } => Some(percent),
            ScenarioEventKind::RateShock { .. } => None,
        }
    }
}

/// A named scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    events: Vec<ScenarioEvent>,
}

impl ScenarioDefinition {
    /// Creates an empty scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            events: Vec::new(),
        }
    }

    /// The implicit scenario with no entries.
    #[must_use]
    pub fn no_op() -> Self {
        Self::new(BASE_SCENARIO).with_description("No market overrides")
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Adds an entry, replacing any existing entry with the same id.
    #[must_use]
    pub fn with_event(mut self, event: ScenarioEvent) -> Self {
        match self.position(&event.id) {
            Some(idx) => self.events[idx] = event,
            None => self.events.push(event),
        }
        self
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::DuplicateEvent` if the id is already used.
    pub fn add_event(&mut self, event: ScenarioEvent) -> ScenarioResult<()> {
        if self.position(&event.id).is_some() {
            return Err(ScenarioError::duplicate_event(event.id));
        }
        self.events.push(event);
        Ok(())
    }

    /// Removes and returns the entry with `id`.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::EventNotFound` if no entry has that id.
    pub fn remove_event(&mut self, id: &str) -> ScenarioResult<ScenarioEvent> {
        let idx = self
            .position(id)
            .ok_or_else(|| ScenarioError::event_not_found(id))?;
        Ok(self.events.remove(idx))
    }

    /// Replaces the entry sharing `event.id`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::EventNotFound` if no entry has that id.
    pub fn update_event(&mut self, event: ScenarioEvent) -> ScenarioResult<ScenarioEvent> {
        let idx = self
            .position(&event.id)
            .ok_or_else(|| ScenarioError::event_not_found(event.id.clone()))?;
        Ok(std::mem::replace(&mut self.events[idx], event))
    }

    /// Looks up an entry by id.
    #[must_use]
    pub fn event(&self, id: &str) -> Option<&ScenarioEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    /// Returns the scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the entries in declaration order.
    #[must_use]
    pub fn events(&self) -> &[ScenarioEvent] {
        &self.events
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the scenario has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Commonly used scenarios.
pub mod standard {
    use super::*;

    /// Portfolio-wide rate shock active on every date.
    #[must_use]
    pub fn parallel_shock(bps: i64) -> ScenarioDefinition {
        let sign = if bps >= 0 { "+" } else { "" };
        ScenarioDefinition::new(format!("Rates {sign}{bps}bp"))
            .with_description(format!("Rate resets shocked by {bps} basis points"))
            .with_event(ScenarioEvent::rate_shock_bps("parallel", Decimal::from(bps)))
    }

    /// Portfolio-wide value haircut in percent, active on every date.
    #[must_use]
    pub fn haircut(percent: i64) -> ScenarioDefinition {
        ScenarioDefinition::new(format!("Haircut {percent}%"))
            .with_description(format!("Present values reduced by {percent}%"))
            .with_event(ScenarioEvent::value_adjustment(
                "haircut",
                -Decimal::from(percent),
            ))
    }

    /// Rates up and down 100bp.
    #[must_use]
    pub fn rates_up_down_100() -> Vec<ScenarioDefinition> {
        vec![parallel_shock(100), parallel_shock(-100)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_no_op_is_named_base() {
        let base = ScenarioDefinition::no_op();
        assert_eq!(base.name(), BASE_SCENARIO);
        assert!(base.is_empty());
    }

    #[test]
    fn test_absolute_shock_stored_as_bps() {
        let event = ScenarioEvent::rate_shock_absolute("abs", dec!(0.0125));
        assert_eq!(event.rate_bps(), Some(dec!(125)));
        assert_eq!(event.adjustment_percent(), None);
    }

    #[test]
    fn test_with_event_replaces_same_id() {
        let def = ScenarioDefinition::new("s")
            .with_event(ScenarioEvent::rate_shock_bps("a", dec!(10)))
            .with_event(ScenarioEvent::rate_shock_bps("a", dec!(20)));
        assert_eq!(def.len(), 1);
        assert_eq!(def.event("a").and_then(ScenarioEvent::rate_bps), Some(dec!(20)));
    }

    #[test]
    fn test_add_event_rejects_duplicate() {
        let mut def = ScenarioDefinition::new("s");
        def.add_event(ScenarioEvent::rate_shock_bps("a", dec!(10))).unwrap();
        let err = def
            .add_event(ScenarioEvent::value_adjustment("a", dec!(1)))
            .unwrap_err();
        assert_eq!(err, ScenarioError::duplicate_event("a"));
        assert_eq!(def.len(), 1);
    }

    #[test]
    fn test_remove_and_update() {
        let mut def = ScenarioDefinition::new("s")
            .with_event(ScenarioEvent::rate_shock_bps("a", dec!(10)))
            .with_event(ScenarioEvent::value_adjustment("b", dec!(-3)));

        let previous = def
            .update_event(ScenarioEvent::rate_shock_bps("a", dec!(75)))
            .unwrap();
        assert_eq!(previous.rate_bps(), Some(dec!(10)));
        assert_eq!(def.event("a").and_then(ScenarioEvent::rate_bps), Some(dec!(75)));

        let removed = def.remove_event("b").unwrap();
        assert_eq!(removed.adjustment_percent(), Some(dec!(-3)));
        assert_eq!(def.len(), 1);

        assert_eq!(
            def.remove_event("b").unwrap_err(),
            ScenarioError::event_not_found("b")
        );
        assert!(def
            .update_event(ScenarioEvent::rate_shock_bps("zz", dec!(1)))
            .is_err());
    }

    #[test]
    fn test_targeting() {
        let window = ScenarioWindow::from(d(2024, 1, 1));
        let event = ScenarioEvent::rate_shock_bps("a", dec!(10))
            .for_contract("C1")
            .within(window);
        assert!(event.is_active("C1", d(2024, 1, 1)));
        assert!(!event.is_active("C2", d(2024, 1, 1)));
        assert!(!event.is_active("C1", d(2023, 12, 31)));

        let global = ScenarioEvent::rate_shock_bps("g", dec!(10));
        assert!(global.is_active("anything", d(1999, 1, 1)));
    }

    #[test]
    fn test_standard_scenarios() {
        let up = standard::parallel_shock(100);
        assert_eq!(up.name(), "Rates +100bp");
        assert_eq!(up.events()[0].rate_bps(), Some(dec!(100)));

        let haircut = standard::haircut(5);
        assert_eq!(haircut.events()[0].adjustment_percent(), Some(dec!(-5)));

        assert_eq!(standard::rates_up_down_100().len(), 2);
    }

    #[test]
    fn test_json_roundtrip() {
        let def = ScenarioDefinition::new("stress")
            .with_event(
                ScenarioEvent::rate_shock_bps("r1", dec!(50))
                    .within(ScenarioWindow::between(d(2024, 6, 1), d(2024, 12, 1)).unwrap()),
            )
            .with_event(ScenarioEvent::value_adjustment("v1", dec!(-2)).for_contract("C9"));

        let json = serde_json::to_string(&def).unwrap();
        let parsed: ScenarioDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, def);
    }
}
