//! Progress reporting for valuation runs.
//!
//! Progress is advisory: sinks receive updates at coarse checkpoints and
//! nothing they do can influence the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Checkpoint at which an update is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    /// Run accepted, before any scheduling.
    Started,
    /// A scenario begins.
    Scenario,
    /// Bucket totals are being computed.
    Aggregating,
    /// Run finished.
    Completed,
}

impl ProgressStage {
    /// Returns the stage label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStage::Started => "started",
            ProgressStage::Scenario => "scenario",
            ProgressStage::Aggregating => "aggregating",
            ProgressStage::Completed => "completed",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Checkpoint.
    pub stage: ProgressStage,
    /// Units of work done (scenarios).
    pub processed: usize,
    /// Total units of work.
    pub total: usize,
    /// `processed / total` as a percentage; 100 when there is no work.
    pub percent_complete: f64,
    /// Human-readable description.
    pub message: String,
}

impl ProgressUpdate {
    /// Creates an update, deriving the percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(stage: ProgressStage, processed: usize, total: usize, message: impl Into<String>) -> Self {
        let percent_complete = if total == 0 {
            100.0
        } else {
            (processed.min(total) as f64 / total as f64) * 100.0
        };
        Self {
            stage,
            processed,
            total,
            percent_complete,
            message: message.into(),
        }
    }
}

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    /// Handles one update. Must not block.
    fn report(&self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        self(update);
    }
}

impl ProgressSink for UnboundedSender<ProgressUpdate> {
    fn report(&self, update: ProgressUpdate) {
        // A dropped receiver only means nobody is listening.
        let _ = self.send(update);
    }
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _update: ProgressUpdate) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    #[test]
    fn test_percentage() {
        assert_relative_eq!(ProgressUpdate::new(ProgressStage::Scenario, 1, 4, "").percent_complete, 25.0);
        assert_relative_eq!(ProgressUpdate::new(ProgressStage::Completed, 0, 0, "").percent_complete, 100.0);
        assert_relative_eq!(ProgressUpdate::new(ProgressStage::Completed, 9, 3, "").percent_complete, 100.0);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |u: ProgressUpdate| seen.lock().unwrap().push(u.stage);
        sink.report(ProgressUpdate::new(ProgressStage::Started, 0, 1, "go"));
        assert_eq!(*seen.lock().unwrap(), vec![ProgressStage::Started]);
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.report(ProgressUpdate::new(ProgressStage::Started, 0, 2, "go"));
        assert_eq!(rx.try_recv().unwrap().stage, ProgressStage::Started);

        drop(rx);
        tx.report(ProgressUpdate::new(ProgressStage::Completed, 2, 2, "done"));
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(ProgressStage::Aggregating.to_string(), "aggregating");
        assert_eq!(
            serde_json::to_string(&ProgressStage::Completed).unwrap(),
            "\"completed\""
        );
    }
}
