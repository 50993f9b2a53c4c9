//! # Cadence Engine
//!
//! Portfolio x scenario valuation on top of `cadence-contracts`.
//!
//! - [`ContractTypeProcessor`]: one per contract family, collected in a
//!   [`ProcessorRegistry`]
//! - [`ValuationOrchestrator`]: runs every scenario over every processor and
//!   buckets the resulting events by date
//! - [`CancellationToken`] and [`ProgressSink`]: cooperative cancellation
//!   and advisory progress
//! - [`EngineConfig`]: valuation date, discounting, parallelism, loadable
//!   from TOML
//!
//! ## Features
//!
//! - `parallel` (default): derive contracts of a chunk with rayon

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]

pub mod bucket;
pub mod cancel;
pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod parallel;
pub mod processor;
pub mod progress;
pub mod run;

pub use bucket::{DayBucket, MonetaryEvent};
pub use cancel::CancellationToken;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use export::ExportRow;
pub use orchestrator::ValuationOrchestrator;
pub use processor::{
    AnnuityProcessor, ContractTypeProcessor, DerivationContext, Horizon,
    PrincipalAtMaturityProcessor, ProcessorOutput, ProcessorRegistry,
};
pub use progress::{NoopProgress, ProgressSink, ProgressStage, ProgressUpdate};
pub use run::{SkippedContract, ValuationRun};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bucket::{DayBucket, MonetaryEvent};
    pub use crate::cancel::CancellationToken;
    pub use crate::config::EngineConfig;
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::orchestrator::ValuationOrchestrator;
    pub use crate::processor::{ContractTypeProcessor, ProcessorRegistry};
    pub use crate::progress::{NoopProgress, ProgressSink, ProgressStage, ProgressUpdate};
    pub use crate::run::ValuationRun;
}
