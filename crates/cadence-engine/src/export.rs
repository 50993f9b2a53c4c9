//! Flattening runs to report rows.

use rust_decimal::Decimal;
use serde::Serialize;
use std::io;

use cadence_core::types::{Currency, Date};

use crate::error::EngineResult;
use crate::run::ValuationRun;

/// Column names written by [`ValuationRun::write_csv`].
pub const CSV_HEADER: [&str; 8] = [
    "scenario",
    "date",
    "contract_id",
    "contract_type",
    "event_kind",
    "payoff",
    "present_value",
    "currency",
];

/// One event as a flat report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    /// Scenario name.
    pub scenario: String,
    /// Event date.
    pub date: Date,
    /// Contract identifier.
    pub contract_id: String,
    /// Family code (`PAM`, `ANN`).
    pub contract_type: String,
    /// Event code (`IP`, `MD`, ...).
    pub event_kind: String,
    /// Signed cash flow.
    pub payoff: Decimal,
    /// Present value.
    pub present_value: Decimal,
    /// Settlement currency.
    pub currency: Currency,
}

impl ExportRow {
    fn record(&self) -> [String; 8] {
        [
            self.scenario.clone(),
            self.date.to_string(),
            self.contract_id.clone(),
            self.contract_type.clone(),
            self.event_kind.clone(),
            self.payoff.to_string(),
            self.present_value.to_string(),
            self.currency.to_string(),
        ]
    }
}

impl ValuationRun {
    /// Flattens every bucket, sorted by date, then scenario, then contract.
    ///
    /// The sort is stable, so one contract's same-day events keep their
    /// event order.
    #[must_use]
    pub fn to_rows(&self) -> Vec<ExportRow> {
        let mut rows: Vec<ExportRow> = self
            .buckets
            .iter()
            .flat_map(|b| &b.events)
            .map(|e| ExportRow {
                scenario: e.scenario.clone(),
                date: e.date,
                contract_id: e.contract_id.clone(),
                contract_type: e.contract_type.code().to_string(),
                event_kind: e.kind.code().to_string(),
                payoff: e.payoff,
                present_value: e.present_value,
                currency: e.currency,
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.date, &a.scenario, &a.contract_id).cmp(&(b.date, &b.scenario, &b.contract_id))
        });
        rows
    }

    /// Writes [`to_rows`](Self::to_rows) as CSV with a header line.
    ///
    /// Amounts are written as exact decimals.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> EngineResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(CSV_HEADER)?;
        for row in self.to_rows() {
            wtr.write_record(row.record())?;
        }
        wtr.flush()?;
        Ok(())
    }
}
