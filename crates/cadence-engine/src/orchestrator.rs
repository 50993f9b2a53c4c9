//! Portfolio x scenario valuation.
//!
//! A run walks scenarios in order, and within each scenario every registered
//! processor in chunks of `chunk_size` contracts. Each chunk is one work
//! unit: contracts inside it may be derived in parallel, and their events
//! are folded into the day buckets on the coordinating thread once the chunk
//! is complete. Cancellation is checked between units, and the async driver
//! yields to the runtime there.

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use cadence_contracts::ContractTerms;
use cadence_scenarios::{ScenarioDefinition, ScenarioOverlay};

use crate::bucket::BucketMap;
use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::processor::{ContractTypeProcessor, DerivationContext, Horizon, ProcessorRegistry};
use crate::progress::{ProgressSink, ProgressStage, ProgressUpdate};
use crate::run::{SkippedContract, ValuationRun};

/// Values a portfolio under a set of scenarios.
///
/// # Example
///
/// ```rust
/// use cadence_contracts::ContractTerms;
/// use cadence_core::types::Date;
/// use cadence_engine::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let loan = ContractTerms::builder()
///     .contract_id("L1")
///     .status_date(Date::from_ymd(2024, 1, 1).unwrap())
///     .initial_exchange_date(Date::from_ymd(2024, 1, 1).unwrap())
///     .maturity_date(Date::from_ymd(2026, 1, 1).unwrap())
///     .notional_principal(dec!(1000))
///     .nominal_interest_rate(dec!(0.05))
///     .interest_cycle(None, "P1Y")
///     .build()
///     .unwrap();
///
/// let run = ValuationOrchestrator::default()
///     .run(vec![loan], &[], 5, &CancellationToken::new(), &NoopProgress)
///     .unwrap();
///
/// assert_eq!(run.scenario_count, 1);
/// assert!(!run.buckets.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValuationOrchestrator {
    config: EngineConfig,
}

impl ValuationOrchestrator {
    /// Creates an orchestrator with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the valuation to completion on the calling thread.
    ///
    /// With no scenarios the implicit base scenario is used. Returns
    /// [`EngineError::Cancelled`] if `cancel` fires; partial results are
    /// discarded.
    pub fn run(
        &self,
        portfolio: impl IntoIterator<Item = ContractTerms>,
        scenarios: &[ScenarioDefinition],
        horizon_years: u32,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> EngineResult<ValuationRun> {
        let registry = ProcessorRegistry::from_portfolio(portfolio);
        self.run_registry(&registry, scenarios, horizon_years, cancel, progress)
    }

    /// Like [`run`](Self::run), over an already-built registry.
    pub fn run_registry(
        &self,
        registry: &ProcessorRegistry,
        scenarios: &[ScenarioDefinition],
        horizon_years: u32,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> EngineResult<ValuationRun> {
        let mut job = match Job::start(&self.config, registry, scenarios, horizon_years, cancel, progress)? {
            Start::Empty(run) => return Ok(run),
            Start::Ready(job) => job,
        };
        while job.step()? == Step::Continue {}
        Ok(job.finish())
    }

    /// Runs the valuation, yielding to the tokio runtime between work units.
    pub async fn run_async(
        &self,
        portfolio: impl IntoIterator<Item = ContractTerms>,
        scenarios: &[ScenarioDefinition],
        horizon_years: u32,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> EngineResult<ValuationRun> {
        let registry = ProcessorRegistry::from_portfolio(portfolio);
        let mut job = match Job::start(&self.config, &registry, scenarios, horizon_years, cancel, progress)? {
            Start::Empty(run) => return Ok(run),
            Start::Ready(job) => job,
        };
        while job.step()? == Step::Continue {
            tokio::task::yield_now().await;
        }
        Ok(job.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
}

enum Start<'a> {
    Empty(ValuationRun),
    Ready(Job<'a>),
}

/// Position of the next work unit.
#[derive(Debug, Default)]
struct Cursor {
    scenario: usize,
    processor: usize,
    offset: usize,
    announced: bool,
}

impl Cursor {
    fn next_processor(&mut self) {
        self.processor += 1;
        self.offset = 0;
    }

    fn next_scenario(&mut self) {
        self.scenario += 1;
        self.processor = 0;
        self.offset = 0;
        self.announced = false;
    }
}

/// State of one run, advanced one work unit per [`Job::step`].
struct Job<'a> {
    run_id: Uuid,
    started: Instant,
    config: &'a EngineConfig,
    registry: &'a ProcessorRegistry,
    processors: Vec<&'a dyn ContractTypeProcessor>,
    overlays: Vec<ScenarioOverlay>,
    horizon: Horizon,
    cancel: &'a CancellationToken,
    progress: &'a dyn ProgressSink,
    cursor: Cursor,
    buckets: BucketMap,
    skipped: Vec<SkippedContract>,
}

impl<'a> Job<'a> {
    fn start(
        config: &'a EngineConfig,
        registry: &'a ProcessorRegistry,
        scenarios: &[ScenarioDefinition],
        horizon_years: u32,
        cancel: &'a CancellationToken,
        progress: &'a dyn ProgressSink,
    ) -> EngineResult<Start<'a>> {
        config.validate()?;
        let started = Instant::now();

        let overlays: Vec<ScenarioOverlay> = if scenarios.is_empty() {
            vec![ScenarioOverlay::from_definition(&ScenarioDefinition::no_op())]
        } else {
            scenarios.iter().map(ScenarioOverlay::from_definition).collect()
        };

        let horizon = match config.valuation_date.or_else(|| registry.earliest_status_date()) {
            Some(start) => {
                let years = i32::try_from(horizon_years)
                    .map_err(|_| EngineError::config(format!("horizon of {horizon_years} years is too long")))?;
                let end = start
                    .add_years(years)
                    .map_err(|e| EngineError::config(format!("horizon end out of range: {e}")))?;
                Some(Horizon::new(start, end))
            }
            None => None,
        };

        let contract_count = registry.contract_count();
        let horizon = match horizon {
            Some(h) if contract_count > 0 => h,
            _ => {
                debug!("empty portfolio, nothing to value");
                progress.report(ProgressUpdate::new(
                    ProgressStage::Completed,
                    0,
                    0,
                    "empty portfolio",
                ));
                return Ok(Start::Empty(ValuationRun::empty(horizon, overlays.len(), started.elapsed())));
            }
        };

        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            contracts = contract_count,
            scenarios = overlays.len(),
            horizon_start = %horizon.start,
            horizon_end = %horizon.end,
            "valuation run started"
        );
        progress.report(ProgressUpdate::new(
            ProgressStage::Started,
            0,
            overlays.len(),
            format!(
                "valuing {contract_count} contracts under {} scenarios",
                overlays.len()
            ),
        ));

        Ok(Start::Ready(Job {
            run_id,
            started,
            config,
            registry,
            processors: registry.iter().collect(),
            overlays,
            horizon,
            cancel,
            progress,
            cursor: Cursor::default(),
            buckets: BucketMap::default(),
            skipped: Vec::new(),
        }))
    }

    /// Processes the next work unit.
    fn step(&mut self) -> EngineResult<Step> {
        self.cancel.check()?;

        let total = self.overlays.len();
        let Some(overlay) = self.overlays.get(self.cursor.scenario) else {
            return Ok(Step::Done);
        };

        if !self.cursor.announced {
            debug!(run_id = %self.run_id, scenario = overlay.name(), "scenario started");
            self.progress.report(ProgressUpdate::new(
                ProgressStage::Scenario,
                self.cursor.scenario,
                total,
                format!(
                    "scenario '{}' ({}/{total})",
                    overlay.name(),
                    self.cursor.scenario + 1
                ),
            ));
            self.cursor.announced = true;
        }

        let Some(&processor) = self.processors.get(self.cursor.processor) else {
            self.cursor.next_scenario();
            return Ok(Step::Continue);
        };

        let contracts = processor.contracts();
        let start = self.cursor.offset;
        if start >= contracts.len() {
            self.cursor.next_processor();
            return Ok(Step::Continue);
        }
        let end = (start + self.config.chunk_size.max(1)).min(contracts.len());
        let chunk = &contracts[start..end];

        debug!(
            scenario = overlay.name(),
            family = %processor.family(),
            from = start,
            to = end,
            "deriving chunk"
        );
        let ctx = DerivationContext {
            scenario: overlay.name(),
            overlay: Some(overlay),
            horizon: self.horizon,
            discount_rate: self.config.discount_rate,
        };
        let outcomes = processor.derive_chunk(chunk, &ctx, self.config);
        self.cancel.check()?;

        for (terms, outcome) in chunk.iter().zip(outcomes) {
            match outcome {
                Ok(events) => self.buckets.insert_all(events),
                Err(source) if self.config.skip_failed_contracts => {
                    warn!(
                        contract_id = %terms.contract_id,
                        scenario = overlay.name(),
                        error = %source,
                        "skipping contract"
                    );
                    self.skipped.push(SkippedContract {
                        contract_id: terms.contract_id.clone(),
                        scenario: overlay.name().to_string(),
                        reason: source.to_string(),
                    });
                }
                Err(source) => {
                    return Err(EngineError::contract_failed(terms.contract_id.clone(), source));
                }
            }
        }

        self.cursor.offset = end;
        Ok(Step::Continue)
    }

    /// Computes bucket totals and builds the result.
    fn finish(self) -> ValuationRun {
        let total = self.overlays.len();
        self.progress.report(ProgressUpdate::new(
            ProgressStage::Aggregating,
            total,
            total,
            "aggregating day buckets",
        ));
        let buckets = self.buckets.finish();

        let run = ValuationRun {
            run_id: self.run_id,
            contract_count: self.registry.contract_count(),
            scenario_count: total,
            horizon: Some(self.horizon),
            elapsed: self.started.elapsed(),
            buckets,
            contracts_by_type: self.registry.counts_by_family(),
            skipped: self.skipped,
            empty_portfolio: false,
        };

        info!(
            run_id = %run.run_id,
            buckets = run.buckets.len(),
            events = run.event_count(),
            skipped = run.skipped.len(),
            elapsed_ms = run.elapsed.as_millis() as u64,
            "valuation run completed"
        );
        self.progress.report(ProgressUpdate::new(
            ProgressStage::Completed,
            total,
            total,
            format!("valuation complete: {} day buckets", run.buckets.len()),
        ));
        run
    }
}
