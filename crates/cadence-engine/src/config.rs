//! Configuration for valuation runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cadence_core::types::Date;

use crate::error::{EngineError, EngineResult};

/// Configuration for a valuation run.
///
/// Controls the valuation date, discounting, parallelism and how failed
/// contracts are handled. Every key is optional when loading from TOML.
///
/// # Example
///
/// ```rust
/// use cadence_engine::EngineConfig;
///
/// let config = EngineConfig::from_toml_str(
///     r#"
///     valuation_date = "2024-01-01"
///     discount_rate = 0.03
///     chunk_size = 128
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.chunk_size, 128);
/// assert!(config.skip_failed_contracts);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Horizon start. Defaults to the earliest status date in the portfolio.
    pub valuation_date: Option<Date>,

    /// Flat annual rate for present values (ACT/365F, annual compounding).
    pub discount_rate: Decimal,

    /// Enable parallel processing (requires 'parallel' feature).
    pub parallel: bool,

    /// Minimum chunk length to trigger parallel processing.
    pub parallel_threshold: usize,

    /// Contracts per cooperative work unit. Cancellation is checked and the
    /// async driver yields between units.
    pub chunk_size: usize,

    /// Record and skip contracts that fail to schedule instead of failing
    /// the run.
    pub skip_failed_contracts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            valuation_date: None,
            discount_rate: Decimal::ZERO,
            parallel: true,
            parallel_threshold: 64,
            chunk_size: 256,
            skip_failed_contracts: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always derives events sequentially.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings for values the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.chunk_size == 0 {
            return Err(EngineError::config("chunk_size must be positive"));
        }
        if self.discount_rate <= -Decimal::ONE {
            return Err(EngineError::config(format!(
                "discount_rate {} must be greater than -1",
                self.discount_rate
            )));
        }
        Ok(())
    }

    /// Sets the valuation date.
    #[must_use]
    pub fn with_valuation_date(mut self, date: Date) -> Self {
        self.valuation_date = Some(date);
        self
    }

    /// Sets the discount rate.
    #[must_use]
    pub fn with_discount_rate(mut self, rate: Decimal) -> Self {
        self.discount_rate = rate;
        self
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets the number of contracts per work unit.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets whether failed contracts are skipped.
    #[must_use]
    pub fn with_skip_failed_contracts(mut self, skip: bool) -> Self {
        self.skip_failed_contracts = skip;
        self
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }
}
