//! Trial execution and per-case aggregation.

use super::config::BenchmarkConfig;
use super::memory::{MemoryProbe, MemoryUsage, NoMemoryProbe};
use super::registry::{BenchmarkCase, BenchmarkRegistry};
use crate::driver::{run_experiment, Termination};
use crate::error::{NeatError, Result};
use crate::experiment::{ExperimentDescriptor, ExperimentFactory};
use std::time::{Duration, Instant};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Measurements of one successful trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeasurementRecord {
    /// Case name.
    pub case: String,
    /// Trial index within the case, starting at 0.
    pub trial: usize,
    /// Generations completed.
    pub generations: usize,
    /// Wall-clock time from descriptor creation to the last generation.
    pub wall_time: Duration,
    /// Best fitness of the final generation.
    pub best_fitness: f64,
    /// First generation that reached the fitness threshold, if any.
    pub solved_at: Option<usize>,
    /// Heap usage, when a memory probe was active.
    pub memory: Option<MemoryUsage>,
}

impl MeasurementRecord {
    /// Whether the run found a solution.
    pub fn solved(&self) -> bool {
        self.solved_at.is_some()
    }
}

/// A trial that ended in an error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("trial {trial} failed: {error}")]
pub struct TrialFailure {
    /// Trial index within the case.
    pub trial: usize,
    /// Error that ended the trial.
    #[source]
    pub error: NeatError,
}

/// Factory adapter pinning the seed of every descriptor it creates.
#[derive(Clone, Copy)]
pub struct SeededFactory<'a> {
    inner: &'a dyn ExperimentFactory,
    seed: u64,
}

impl<'a> SeededFactory<'a> {
    /// Wraps `inner`, seeding its descriptors with `seed`.
    pub fn new(inner: &'a dyn ExperimentFactory, seed: u64) -> Self {
        Self { inner, seed }
    }
}

impl ExperimentFactory for SeededFactory<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn create(&self) -> ExperimentDescriptor {
        self.inner.create().with_seed(self.seed)
    }
}

/// Runs one measured trial on a brand-new algorithm instance.
///
/// The timer covers descriptor creation, assembly, initialization and
/// every generation. Memory is the difference between probe snapshots
/// taken before and after the run.
///
/// # Examples
///
/// ```
/// use u_neatbench::bench::{run_trial, NoMemoryProbe};
/// use u_neatbench::driver::Termination;
/// use u_neatbench::experiment::XorExperimentFactory;
///
/// let factory = XorExperimentFactory;
/// let record = run_trial("xor_short", 0, &factory, Termination::Generations(3), &NoMemoryProbe)
///     .unwrap();
/// assert_eq!(record.case, "xor_short");
/// assert_eq!(record.generations, 3);
/// assert!(record.memory.is_none());
/// ```
pub fn run_trial(
    case: &str,
    trial: usize,
    factory: &dyn ExperimentFactory,
    termination: Termination,
    probe: &dyn MemoryProbe,
) -> std::result::Result<MeasurementRecord, TrialFailure> {
    let before = probe.snapshot();
    let start = Instant::now();

    let summary =
        run_experiment(factory, termination).map_err(|error| TrialFailure { trial, error })?;

    let wall_time = start.elapsed();
    let memory = match (before, probe.snapshot()) {
        (Some(b), Some(a)) => Some(MemoryUsage::between(&b, &a)),
        _ => None,
    };

    Ok(MeasurementRecord {
        case: case.to_string(),
        trial,
        generations: summary.generations,
        wall_time,
        best_fitness: summary.last.best_fitness,
        solved_at: summary.solved_at,
        memory,
    })
}

/// Outcome of every trial of one case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    /// Case name.
    pub case: String,
    /// Successful trials in trial order.
    pub records: Vec<MeasurementRecord>,
    /// Failed trials in trial order.
    pub failures: Vec<TrialFailure>,
}

impl CaseReport {
    /// Number of failed trials.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of successful trials.
    pub fn success_count(&self) -> usize {
        self.records.len()
    }

    /// Mean wall time of successful trials.
    pub fn mean_wall_time(&self) -> Option<Duration> {
        if self.records.is_empty() {
            return None;
        }
        let total: Duration = self.records.iter().map(|r| r.wall_time).sum();
        Some(total / self.records.len() as u32)
    }

    /// Median wall time of successful trials.
    pub fn median_wall_time(&self) -> Option<Duration> {
        let mut times: Vec<Duration> = self.records.iter().map(|r| r.wall_time).collect();
        if times.is_empty() {
            return None;
        }
        times.sort_unstable();
        let mid = times.len() / 2;
        if times.len() % 2 == 0 {
            Some((times[mid - 1] + times[mid]) / 2)
        } else {
            Some(times[mid])
        }
    }

    /// Mean generation count of successful trials.
    pub fn mean_generations(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let total: usize = self.records.iter().map(|r| r.generations).sum();
        Some(total as f64 / self.records.len() as f64)
    }

    /// Bytes allocated over all measured trials, if any trial was probed.
    pub fn total_allocated_bytes(&self) -> Option<u64> {
        self.records
            .iter()
            .filter_map(|r| r.memory)
            .map(|m| m.allocated_bytes)
            .reduce(|a, b| a + b)
    }

    /// Fraction of successful trials that found a solution.
    pub fn solve_rate(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let solved = self.records.iter().filter(|r| r.solved()).count();
        Some(solved as f64 / self.records.len() as f64)
    }
}

/// Runs benchmark cases as repeated independent trials.
///
/// # Examples
///
/// ```
/// use u_neatbench::bench::{BenchmarkCase, BenchmarkConfig, BenchmarkHarness, NoMemoryProbe};
/// use u_neatbench::driver::Termination;
/// use u_neatbench::experiment::XorExperimentFactory;
///
/// let harness = BenchmarkHarness::new(
///     BenchmarkConfig::default().with_trials(2).with_warmup_trials(0).with_seed(1),
/// ).unwrap();
/// let case = BenchmarkCase::new("xor_short", XorExperimentFactory, Termination::Generations(2));
/// let report = harness.run_case(&case, &NoMemoryProbe);
/// assert_eq!(report.records.len(), 2);
/// assert_eq!(report.failure_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
}

impl BenchmarkHarness {
    /// Creates a harness, validating the configuration.
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Harness configuration.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Runs the warmup and measured trials of one case.
    ///
    /// `probe` is consulted only for sequential trials; parallel trials
    /// record no memory.
    pub fn run_case(&self, case: &BenchmarkCase, probe: &dyn MemoryProbe) -> CaseReport {
        let seeded = self.config.seed.map(|s| SeededFactory::new(case.factory(), s));
        let factory: &dyn ExperimentFactory = match &seeded {
            Some(f) => f,
            None => case.factory(),
        };
        let termination = case.termination();

        for w in 0..self.config.warmup_trials {
            if let Err(failure) = run_trial(case.name(), w, factory, termination, &NoMemoryProbe) {
                log::warn!("{}: warmup {}", case.name(), failure);
            }
        }

        let outcomes = self.run_trials(case.name(), factory, termination, probe);

        let mut report = CaseReport {
            case: case.name().to_string(),
            records: Vec::with_capacity(outcomes.len()),
            failures: Vec::new(),
        };
        for outcome in outcomes {
            match outcome {
                Ok(record) => {
                    log::debug!(
                        "{} trial {}: {} generations in {:?}",
                        case.name(),
                        record.trial,
                        record.generations,
                        record.wall_time
                    );
                    report.records.push(record);
                }
                Err(failure) => {
                    log::warn!("{}: {}", case.name(), failure);
                    report.failures.push(failure);
                }
            }
        }

        log::info!(
            "{}: {}/{} trials succeeded, mean {:?}",
            case.name(),
            report.success_count(),
            self.config.trials,
            report.mean_wall_time()
        );
        report
    }

    /// Runs every case of `registry` in registration order.
    pub fn run_all(
        &self,
        registry: &BenchmarkRegistry,
        probe: &dyn MemoryProbe,
    ) -> Vec<CaseReport> {
        registry
            .cases()
            .iter()
            .map(|case| self.run_case(case, probe))
            .collect()
    }

    fn run_trials(
        &self,
        case: &str,
        factory: &dyn ExperimentFactory,
        termination: Termination,
        probe: &dyn MemoryProbe,
    ) -> Vec<std::result::Result<MeasurementRecord, TrialFailure>> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return (0..self.config.trials)
                    .into_par_iter()
                    .map(|t| run_trial(case, t, factory, termination, &NoMemoryProbe))
                    .collect();
            }
        }

        (0..self.config.trials)
            .map(|t| run_trial(case, t, factory, termination, probe))
            .collect()
    }
}
