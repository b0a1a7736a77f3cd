//! Driver states, termination rules and run summaries.

use crate::engine::GenerationStats;
use crate::error::{NeatError, Result};

/// Generation budget used when none is given.
pub const DEFAULT_GENERATIONS: usize = 100;

/// Lifecycle state of a [`Driver`](super::Driver).
///
/// `Uninitialized → Initialized → Stepping ↺ → Completed`. A failed step
/// moves to `Failed` from `Initialized` or `Stepping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DriverState {
    /// Assembled, `initialize` not yet called.
    Uninitialized,
    /// Initialized, no generation stepped yet.
    Initialized,
    /// At least one generation stepped, termination rule not met.
    Stepping,
    /// Termination rule met; no further steps allowed.
    Completed,
    /// A step failed; the instance must be reassembled.
    Failed,
}

/// When a driven run stops.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// Run exactly this many generations.
    Generations(usize),

    /// Stop at the first generation whose best fitness exceeds
    /// `threshold`, or after `max_generations`.
    FitnessThreshold {
        /// Fitness that ends the run.
        threshold: f64,
        /// Hard cap on generations.
        max_generations: usize,
    },

    /// Never completes on its own; the caller decides when to stop
    /// stepping. Not accepted by [`Driver::run`](super::Driver::run).
    Unbounded,
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Generations(DEFAULT_GENERATIONS)
    }
}

impl Termination {
    /// Whether the run is complete after `generation` steps, the last of
    /// which produced `stats`.
    pub fn is_met(&self, generation: usize, stats: &GenerationStats) -> bool {
        match *self {
            Termination::Generations(n) => generation >= n,
            Termination::FitnessThreshold {
                threshold,
                max_generations,
            } => stats.best_fitness > threshold || generation >= max_generations,
            Termination::Unbounded => false,
        }
    }

    /// Upper bound on generations, if any.
    pub fn max_generations(&self) -> Option<usize> {
        match *self {
            Termination::Generations(n) => Some(n),
            Termination::FitnessThreshold {
                max_generations, ..
            } => Some(max_generations),
            Termination::Unbounded => None,
        }
    }

    /// Validates the rule.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Termination::Generations(0) => Err(NeatError::Configuration(
                "generation budget must be at least 1".into(),
            )),
            Termination::FitnessThreshold {
                threshold,
                max_generations,
            } => {
                if !threshold.is_finite() {
                    return Err(NeatError::Configuration(
                        "termination threshold must be finite".into(),
                    ));
                }
                if max_generations == 0 {
                    return Err(NeatError::Configuration(
                        "max_generations must be at least 1".into(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of [`Driver::run`](super::Driver::run).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunSummary {
    /// Generations stepped.
    pub generations: usize,

    /// Stats of the final generation.
    pub last: GenerationStats,

    /// First generation at which the engine reported a solution.
    pub solved_at: Option<usize>,
}
