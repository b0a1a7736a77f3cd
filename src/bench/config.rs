//! Benchmark harness configuration.

use crate::error::{NeatError, Result};

/// Configuration for the benchmark harness.
///
/// # Defaults
///
/// ```
/// use u_neatbench::bench::BenchmarkConfig;
///
/// let config = BenchmarkConfig::default();
/// assert_eq!(config.trials, 10);
/// assert_eq!(config.warmup_trials, 1);
/// assert!(config.seed.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BenchmarkConfig {
    /// Measured trials per case.
    pub trials: usize,

    /// Unrecorded trials run before measuring, to warm caches and the
    /// allocator.
    pub warmup_trials: usize,

    /// Seed given to every trial's descriptor.
    ///
    /// `None` leaves seeding to the experiment (random by default).
    pub seed: Option<u64>,

    /// Whether to run trials concurrently using rayon.
    ///
    /// Memory is not measured in this mode. Ignored when the `parallel`
    /// feature is disabled.
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            warmup_trials: 1,
            seed: None,
            parallel: false,
        }
    }
}

impl BenchmarkConfig {
    /// Sets the number of measured trials.
    pub fn with_trials(mut self, n: usize) -> Self {
        self.trials = n;
        self
    }

    /// Sets the number of warmup trials.
    pub fn with_warmup_trials(mut self, n: usize) -> Self {
        self.warmup_trials = n;
        self
    }

    /// Sets the per-trial seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables concurrent trials.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(NeatError::Configuration(
                "trials must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = BenchmarkConfig::default()
            .with_trials(5)
            .with_warmup_trials(0)
            .with_seed(42)
            .with_parallel(true);
        assert_eq!(config.trials, 5);
        assert_eq!(config.warmup_trials, 0);
        assert_eq!(config.seed, Some(42));
        assert!(config.parallel);
    }

    #[test]
    fn test_validate() {
        assert!(BenchmarkConfig::default().validate().is_ok());
        assert!(BenchmarkConfig::default()
            .with_trials(0)
            .validate()
            .unwrap_err()
            .is_configuration());
    }
}
