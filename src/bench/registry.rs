//! Explicit list of benchmark cases.

use crate::driver::Termination;
use crate::error::{NeatError, Result};
use crate::experiment::{ExperimentFactory, XorExperimentFactory};
use std::fmt;
use std::sync::Arc;

/// A named, repeatable benchmark: one experiment run under one
/// termination rule.
#[derive(Clone)]
pub struct BenchmarkCase {
    name: String,
    factory: Arc<dyn ExperimentFactory>,
    termination: Termination,
}

impl fmt::Debug for BenchmarkCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkCase")
            .field("name", &self.name)
            .field("experiment", &self.factory.name())
            .field("termination", &self.termination)
            .finish()
    }
}

impl BenchmarkCase {
    /// Creates a case.
    pub fn new(
        name: impl Into<String>,
        factory: impl ExperimentFactory + 'static,
        termination: Termination,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            termination,
        }
    }

    /// Case name, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Experiment factory each trial builds its descriptor from.
    pub fn factory(&self) -> &dyn ExperimentFactory {
        self.factory.as_ref()
    }

    /// Termination rule of every trial.
    pub fn termination(&self) -> Termination {
        self.termination
    }
}

/// Ordered set of benchmark cases the harness iterates.
///
/// [`BenchmarkRegistry::default`] registers the built-in cases; use
/// [`BenchmarkRegistry::new`] for an empty list.
///
/// # Examples
///
/// ```
/// use u_neatbench::bench::BenchmarkRegistry;
///
/// let registry = BenchmarkRegistry::default();
/// assert!(registry.get("neat_xor").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct BenchmarkRegistry {
    cases: Vec<BenchmarkCase>,
}

impl Default for BenchmarkRegistry {
    fn default() -> Self {
        Self {
            cases: vec![BenchmarkCase::new(
                "neat_xor",
                XorExperimentFactory,
                Termination::default(),
            )],
        }
    }
}

impl BenchmarkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Adds a case. Names must be unique.
    pub fn register(&mut self, case: BenchmarkCase) -> Result<()> {
        case.termination.validate()?;
        if self.get(case.name()).is_some() {
            return Err(NeatError::Configuration(format!(
                "benchmark case '{}' is already registered",
                case.name()
            )));
        }
        self.cases.push(case);
        Ok(())
    }

    /// Looks a case up by name.
    pub fn get(&self, name: &str) -> Option<&BenchmarkCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Cases in registration order.
    pub fn cases(&self) -> &[BenchmarkCase] {
        &self.cases
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether no case is registered.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
