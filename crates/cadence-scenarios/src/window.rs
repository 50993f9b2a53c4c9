//! Date windows for scenario entries.

use cadence_core::types::Date;
use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};

/// Inclusive date window during which a scenario entry is active.
///
/// Either bound may be open:
///
/// | start | end | active on |
/// |---|---|---|
/// | none | none | every date |
/// | `s` | none | `date >= s` |
/// | none | `e` | `date <= e` |
/// | `s` | `e` | `s <= date <= e` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds", into = "WindowBounds")]
pub struct ScenarioWindow {
    start: Option<Date>,
    end: Option<Date>,
}

#[derive(Serialize, Deserialize)]
struct WindowBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<Date>,
}

impl ScenarioWindow {
    /// Creates a window, rejecting a start after the end.
    pub fn new(start: Option<Date>, end: Option<Date>) -> ScenarioResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ScenarioError::InvalidWindow { start: s, end: e });
            }
        }
        Ok(Self { start, end })
    }

    /// A window that is always active.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Active from `start` onward.
    #[must_use]
    pub fn from(start: Date) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Active up to and including `end`.
    #[must_use]
    pub fn until(end: Date) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Active on the closed interval `[start, end]`.
    pub fn between(start: Date, end: Date) -> ScenarioResult<Self> {
        Self::new(Some(start), Some(end))
    }

    /// Returns the start bound.
    #[must_use]
    pub fn start(&self) -> Option<Date> {
        self.start
    }

    /// Returns the end bound.
    #[must_use]
    pub fn end(&self) -> Option<Date> {
        self.end
    }

    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

impl TryFrom<WindowBounds> for ScenarioWindow {
    type Error = ScenarioError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl From<ScenarioWindow> for WindowBounds {
    fn from(window: ScenarioWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}
