//! Lifecycle-checked stepping of one evolutionary run.

use super::types::{DriverState, RunSummary, Termination};
use crate::assembler::assemble;
use crate::engine::{EvolutionAlgorithm, GenerationStats};
use crate::error::{LifecycleError, NeatError, Result};
use crate::experiment::ExperimentFactory;

/// Owns one algorithm instance and steps it through its lifecycle.
///
/// The driver keeps its own generation counter, incremented once per
/// successful [`step`](Self::step). Errors from the engine are never
/// swallowed: runtime failures move the driver to [`DriverState::Failed`]
/// and are reported with the counter value at the point of failure.
///
/// # Usage
///
/// ```
/// use u_neatbench::assembler::assemble;
/// use u_neatbench::driver::{Driver, DriverState, Termination};
/// use u_neatbench::experiment::{ExperimentFactory, XorExperimentFactory};
///
/// let algo = assemble(&XorExperimentFactory.create().with_seed(3)).unwrap();
/// let mut driver = Driver::new(algo, Termination::Generations(5)).unwrap();
/// let summary = driver.run().unwrap();
/// assert_eq!(summary.generations, 5);
/// assert_eq!(driver.state(), DriverState::Completed);
/// ```
#[derive(Debug)]
pub struct Driver<A> {
    algorithm: A,
    termination: Termination,
    state: DriverState,
    generation: usize,
    last: Option<GenerationStats>,
    solved_at: Option<usize>,
}

impl<A: EvolutionAlgorithm> Driver<A> {
    /// Wraps an assembled, un-initialized algorithm.
    ///
    /// Fails with [`NeatError::Configuration`] for an invalid termination
    /// rule. An algorithm that was already initialized elsewhere is
    /// rejected with [`LifecycleError::AlreadyInitialized`].
    pub fn new(algorithm: A, termination: Termination) -> Result<Self> {
        termination.validate()?;
        if algorithm.is_initialized() {
            return Err(LifecycleError::AlreadyInitialized.into());
        }
        Ok(Self {
            algorithm,
            termination,
            state: DriverState::Uninitialized,
            generation: 0,
            last: None,
            solved_at: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Generations stepped successfully.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Termination rule.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Stats of the most recent successful step.
    pub fn last_stats(&self) -> Option<&GenerationStats> {
        self.last.as_ref()
    }

    /// First generation at which the engine reported a solution.
    pub fn solved_at(&self) -> Option<usize> {
        self.solved_at
    }

    /// Borrows the driven algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Gives the algorithm back, ending the driver.
    pub fn into_algorithm(self) -> A {
        self.algorithm
    }

    /// Performs the algorithm's one-time setup.
    ///
    /// Valid only in [`DriverState::Uninitialized`]; a second call fails
    /// with [`LifecycleError::AlreadyInitialized`] and leaves the state
    /// unchanged.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            DriverState::Uninitialized => {}
            DriverState::Failed => return Err(LifecycleError::Failed.into()),
            _ => return Err(LifecycleError::AlreadyInitialized.into()),
        }

        self.algorithm
            .initialize()
            .map_err(|err| self.on_engine_error(err))?;
        self.state = DriverState::Initialized;
        Ok(())
    }

    /// Runs one generation.
    ///
    /// Valid only in [`DriverState::Initialized`] or
    /// [`DriverState::Stepping`]. On success the counter grows by exactly
    /// one and the state becomes `Stepping`, or `Completed` once the
    /// termination rule is met. On error the counter is unchanged.
    pub fn step(&mut self) -> Result<GenerationStats> {
        match self.state {
            DriverState::Initialized | DriverState::Stepping => {}
            DriverState::Uninitialized => return Err(LifecycleError::NotInitialized.into()),
            DriverState::Completed => return Err(LifecycleError::Completed.into()),
            DriverState::Failed => return Err(LifecycleError::Failed.into()),
        }

        let stats = self
            .algorithm
            .perform_one_generation()
            .map_err(|err| self.on_engine_error(err))?;

        self.generation += 1;
        self.state = DriverState::Stepping;
        if stats.solved && self.solved_at.is_none() {
            self.solved_at = Some(self.generation);
            log::info!(
                "solution found at generation {} (fitness {:.4})",
                self.generation,
                stats.best_fitness
            );
        }
        log::debug!(
            "generation {}: best={:.4} mean={:.4} species={}",
            self.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.species_count
        );

        if self.termination.is_met(self.generation, &stats) {
            self.state = DriverState::Completed;
            log::info!("run completed after {} generations", self.generation);
        }
        self.last = Some(stats.clone());
        Ok(stats)
    }

    /// Initializes if needed, then steps until the termination rule is met.
    ///
    /// Fails with [`NeatError::Configuration`] for
    /// [`Termination::Unbounded`], and with a lifecycle error if the run
    /// already completed or failed.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.termination == Termination::Unbounded {
            return Err(NeatError::Configuration(
                "run() needs a bounded termination rule".into(),
            ));
        }
        match self.state {
            DriverState::Uninitialized => self.initialize()?,
            DriverState::Completed => return Err(LifecycleError::Completed.into()),
            DriverState::Failed => return Err(LifecycleError::Failed.into()),
            DriverState::Initialized | DriverState::Stepping => {}
        }

        let mut last = self.step()?;
        while self.state != DriverState::Completed {
            last = self.step()?;
        }

        Ok(RunSummary {
            generations: self.generation,
            last,
            solved_at: self.solved_at,
        })
    }

    fn on_engine_error(&mut self, err: NeatError) -> NeatError {
        match err {
            NeatError::Runtime { reason, .. } => {
                self.state = DriverState::Failed;
                log::error!("generation {} failed: {}", self.generation + 1, reason);
                NeatError::Runtime {
                    generation: self.generation,
                    reason,
                }
            }
            other => other,
        }
    }
}

/// Builds a descriptor from `factory`, assembles it and runs it to
/// completion.
pub fn run_experiment(
    factory: &dyn ExperimentFactory,
    termination: Termination,
) -> Result<RunSummary> {
    let descriptor = factory.create();
    let mut driver = Driver::new(assemble(&descriptor)?, termination)?;
    driver.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{HyperparameterOverrides, XorExperimentFactory};
    use crate::neat::NeatAlgorithm;
    use proptest::prelude::*;

    /// Engine stub that fails on a chosen generation.
    #[derive(Debug, Default)]
    struct Scripted {
        initialized: bool,
        steps: usize,
        fail_init: bool,
        fail_on: Option<usize>,
        solve_on: Option<usize>,
    }

    impl EvolutionAlgorithm for Scripted {
        fn initialize(&mut self) -> Result<()> {
            if self.initialized {
                return Err(LifecycleError::AlreadyInitialized.into());
            }
            if self.fail_init {
                return Err(NeatError::Runtime {
                    generation: 0,
                    reason: "evaluator unavailable".into(),
                });
            }
            self.initialized = true;
            Ok(())
        }

        fn perform_one_generation(&mut self) -> Result<GenerationStats> {
            if !self.initialized {
                return Err(LifecycleError::NotInitialized.into());
            }
            if self.fail_on == Some(self.steps + 1) {
                return Err(NeatError::Runtime {
                    generation: 999,
                    reason: "numeric instability".into(),
                });
            }
            self.steps += 1;
            let solved = self.solve_on.is_some_and(|g| self.steps >= g);
            Ok(GenerationStats {
                generation: self.steps,
                best_fitness: if solved { 16.0 } else { self.steps as f64 / 10.0 },
                mean_fitness: 0.0,
                species_count: 1,
                evaluations: self.steps,
                solved,
                champion_nodes: 4,
                champion_connections: 3,
            })
        }

        fn is_initialized(&self) -> bool {
            self.initialized
        }
    }

    fn xor(population: usize, seed: u64) -> NeatAlgorithm {
        let d = XorExperimentFactory.create().with_overrides(
            HyperparameterOverrides::default()
                .with_population_size(population)
                .with_fitness_threshold(15.5)
                .with_seed(seed),
        );
        assemble(&d).unwrap()
    }

    #[test]
    fn test_xor_hundred_generations() {
        let algo = assemble(&XorExperimentFactory.create().with_seed(42)).unwrap();
        let mut driver = Driver::new(algo, Termination::Unbounded).unwrap();
        driver.initialize().unwrap();
        for _ in 0..100 {
            driver.step().unwrap();
        }
        assert_eq!(driver.generation(), 100);
        assert_eq!(driver.state(), DriverState::Stepping);
        let best = driver.last_stats().unwrap().best_fitness;
        assert!(best > 4.0, "XOR best fitness after 100 generations: {best}");
    }

    #[test]
    fn test_budget_transitions_to_completed() {
        let mut driver = Driver::new(xor(20, 1), Termination::Generations(3)).unwrap();
        driver.initialize().unwrap();
        assert_eq!(driver.state(), DriverState::Initialized);
        driver.step().unwrap();
        assert_eq!(driver.state(), DriverState::Stepping);
        driver.step().unwrap();
        driver.step().unwrap();
        assert_eq!(driver.state(), DriverState::Completed);

        assert_eq!(
            driver.step().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::Completed)
        );
        assert_eq!(driver.generation(), 3);
    }

    #[test]
    fn test_step_before_initialize() {
        let mut driver = Driver::new(xor(20, 1), Termination::default()).unwrap();
        assert_eq!(
            driver.step().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::NotInitialized)
        );
        assert_eq!(driver.generation(), 0);
        assert_eq!(driver.state(), DriverState::Uninitialized);
    }

    #[test]
    fn test_initialize_twice_keeps_state() {
        let mut driver = Driver::new(xor(20, 1), Termination::default()).unwrap();
        driver.initialize().unwrap();
        assert!(driver.initialize().unwrap_err().is_lifecycle());
        assert_eq!(driver.state(), DriverState::Initialized);

        driver.step().unwrap();
        assert_eq!(
            driver.initialize().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::AlreadyInitialized)
        );
        assert_eq!(driver.state(), DriverState::Stepping);
        assert_eq!(driver.generation(), 1);
    }

    #[test]
    fn test_new_rejects_initialized_algorithm() {
        let mut algo = xor(20, 1);
        algo.initialize().unwrap();
        assert!(Driver::new(algo, Termination::default())
            .unwrap_err()
            .is_lifecycle());
    }

    #[test]
    fn test_new_rejects_invalid_termination() {
        assert!(Driver::new(xor(20, 1), Termination::Generations(0))
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_independent_drivers() {
        let mut a = Driver::new(xor(20, 5), Termination::Unbounded).unwrap();
        let mut b = Driver::new(xor(20, 5), Termination::Unbounded).unwrap();
        a.initialize().unwrap();
        b.initialize().unwrap();
        for _ in 0..4 {
            a.step().unwrap();
        }
        assert_eq!(a.generation(), 4);
        assert_eq!(b.generation(), 0);
        assert_eq!(b.algorithm().generation(), 0);
    }

    #[test]
    fn test_runtime_failure_reports_generation() {
        let engine = Scripted {
            fail_on: Some(4),
            ..Scripted::default()
        };
        let mut driver = Driver::new(engine, Termination::Generations(10)).unwrap();
        let err = driver.run().unwrap_err();
        assert_eq!(
            err,
            NeatError::Runtime {
                generation: 3,
                reason: "numeric instability".into()
            }
        );
        assert_eq!(driver.state(), DriverState::Failed);
        assert_eq!(driver.generation(), 3);

        // No retry on a poisoned run.
        assert_eq!(
            driver.step().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::Failed)
        );
        assert_eq!(
            driver.run().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::Failed)
        );
        assert_eq!(driver.generation(), 3);
    }

    #[test]
    fn test_initialize_failure_reports_no_completed_generation() {
        let engine = Scripted {
            fail_init: true,
            ..Scripted::default()
        };
        let mut driver = Driver::new(engine, Termination::Generations(5)).unwrap();
        let err = driver.initialize().unwrap_err();
        assert_eq!(
            err.to_string(),
            "runtime error at generation 0: evaluator unavailable"
        );
        assert_eq!(driver.state(), DriverState::Failed);
        assert_eq!(driver.generation(), 0);
        assert!(driver.last_stats().is_none());
        assert_eq!(
            driver.run().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::Failed)
        );
    }

    #[test]
    fn test_fitness_threshold_stops_early() {
        let engine = Scripted {
            solve_on: Some(7),
            ..Scripted::default()
        };
        let termination = Termination::FitnessThreshold {
            threshold: 15.5,
            max_generations: 50,
        };
        let mut driver = Driver::new(engine, termination).unwrap();
        let summary = driver.run().unwrap();
        assert_eq!(summary.generations, 7);
        assert_eq!(summary.solved_at, Some(7));
        assert!(summary.last.solved);
        assert_eq!(driver.state(), DriverState::Completed);
    }

    #[test]
    fn test_fitness_threshold_cap() {
        let termination = Termination::FitnessThreshold {
            threshold: 1e9,
            max_generations: 12,
        };
        let mut driver = Driver::new(Scripted::default(), termination).unwrap();
        let summary = driver.run().unwrap();
        assert_eq!(summary.generations, 12);
        assert_eq!(summary.solved_at, None);
    }

    #[test]
    fn test_run_rejects_unbounded() {
        let mut driver = Driver::new(Scripted::default(), Termination::Unbounded).unwrap();
        assert!(driver.run().unwrap_err().is_configuration());
        assert_eq!(driver.state(), DriverState::Uninitialized);
    }

    #[test]
    fn test_run_after_completion_fails() {
        let mut driver = Driver::new(Scripted::default(), Termination::Generations(2)).unwrap();
        driver.run().unwrap();
        assert_eq!(
            driver.run().unwrap_err(),
            NeatError::Lifecycle(LifecycleError::Completed)
        );
    }

    #[test]
    fn test_run_experiment() {
        let summary = run_experiment(&XorExperimentFactory, Termination::Generations(2)).unwrap();
        assert_eq!(summary.generations, 2);
        assert_eq!(summary.last.generation, 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_counter_equals_successful_steps(n in 0usize..60) {
            let mut driver = Driver::new(Scripted::default(), Termination::Unbounded).unwrap();
            driver.initialize().unwrap();
            for _ in 0..n {
                driver.step().unwrap();
            }
            prop_assert_eq!(driver.generation(), n);
            prop_assert_eq!(driver.algorithm().steps, n);
        }
    }
}
