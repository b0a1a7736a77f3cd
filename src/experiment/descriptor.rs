//! Experiment descriptor and hyperparameter overrides.

use crate::neat::{FitnessEvaluator, NeatConfig};
use std::fmt;
use std::sync::Arc;

/// Hyperparameters an experiment may pin instead of taking the engine
/// defaults.
///
/// Values are copied verbatim onto the base [`NeatConfig`] during
/// assembly and validated there; nothing is clamped, so an out-of-range
/// override surfaces as a configuration error.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HyperparameterOverrides {
    /// Population size.
    pub population_size: Option<usize>,
    /// Probability of weight mutation per offspring.
    pub weight_mutation_rate: Option<f64>,
    /// Probability of an add-node mutation per offspring.
    pub add_node_rate: Option<f64>,
    /// Probability of an add-connection mutation per offspring.
    pub add_connection_rate: Option<f64>,
    /// Probability of crossover per offspring.
    pub crossover_rate: Option<f64>,
    /// Speciation distance threshold.
    pub compatibility_threshold: Option<f64>,
    /// Species stagnation limit in generations.
    pub species_stagnation_limit: Option<usize>,
    /// Fitness marking a solution.
    pub fitness_threshold: Option<f64>,
    /// Random seed.
    pub seed: Option<u64>,
}

impl HyperparameterOverrides {
    /// Overrides the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = Some(n);
        self
    }

    /// Overrides the weight mutation rate.
    pub fn with_weight_mutation_rate(mut self, rate: f64) -> Self {
        self.weight_mutation_rate = Some(rate);
        self
    }

    /// Overrides the add-node rate.
    pub fn with_add_node_rate(mut self, rate: f64) -> Self {
        self.add_node_rate = Some(rate);
        self
    }

    /// Overrides the add-connection rate.
    pub fn with_add_connection_rate(mut self, rate: f64) -> Self {
        self.add_connection_rate = Some(rate);
        self
    }

    /// Overrides the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = Some(rate);
        self
    }

    /// Overrides the compatibility threshold.
    pub fn with_compatibility_threshold(mut self, threshold: f64) -> Self {
        self.compatibility_threshold = Some(threshold);
        self
    }

    /// Overrides the species stagnation limit.
    pub fn with_species_stagnation_limit(mut self, limit: usize) -> Self {
        self.species_stagnation_limit = Some(limit);
        self
    }

    /// Overrides the fitness threshold.
    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = Some(threshold);
        self
    }

    /// Overrides the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Copies every set override onto `base`.
    pub fn apply_to(&self, mut base: NeatConfig) -> NeatConfig {
        if let Some(v) = self.population_size {
            base.population_size = v;
        }
        if let Some(v) = self.weight_mutation_rate {
            base.weight_mutation_rate = v;
        }
        if let Some(v) = self.add_node_rate {
            base.add_node_rate = v;
        }
        if let Some(v) = self.add_connection_rate {
            base.add_connection_rate = v;
        }
        if let Some(v) = self.crossover_rate {
            base.crossover_rate = v;
        }
        if let Some(v) = self.compatibility_threshold {
            base.compatibility_threshold = v;
        }
        if let Some(v) = self.species_stagnation_limit {
            base.species_stagnation_limit = v;
        }
        if self.fitness_threshold.is_some() {
            base.fitness_threshold = self.fitness_threshold;
        }
        if self.seed.is_some() {
            base.seed = self.seed;
        }
        base
    }
}

/// Immutable description of a problem domain.
///
/// Binds a name, the network dimensions, a fitness evaluator and any
/// hyperparameter overrides. Built by an
/// [`ExperimentFactory`](super::ExperimentFactory) and consumed by
/// [`assemble`](crate::assembler::assemble). The `with_*` methods consume
/// the descriptor and return a new one.
///
/// # Examples
///
/// ```
/// use u_neatbench::experiment::{ExperimentDescriptor, XorEvaluator};
/// use std::sync::Arc;
///
/// let d = ExperimentDescriptor::new("xor", 2, 1, Arc::new(XorEvaluator)).with_seed(7);
/// assert_eq!(d.name(), "xor");
/// assert_eq!(d.overrides().seed, Some(7));
/// ```
#[derive(Clone)]
pub struct ExperimentDescriptor {
    name: String,
    input_count: usize,
    output_count: usize,
    evaluator: Arc<dyn FitnessEvaluator>,
    overrides: HyperparameterOverrides,
}

impl fmt::Debug for ExperimentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentDescriptor")
            .field("name", &self.name)
            .field("input_count", &self.input_count)
            .field("output_count", &self.output_count)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

impl ExperimentDescriptor {
    /// Creates a descriptor with no overrides.
    pub fn new(
        name: impl Into<String>,
        input_count: usize,
        output_count: usize,
        evaluator: Arc<dyn FitnessEvaluator>,
    ) -> Self {
        Self {
            name: name.into(),
            input_count,
            output_count,
            evaluator,
            overrides: HyperparameterOverrides::default(),
        }
    }

    /// Replaces the overrides.
    pub fn with_overrides(mut self, overrides: HyperparameterOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Pins the random seed, keeping other overrides.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.overrides.seed = Some(seed);
        self
    }

    /// Problem name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sensor inputs (the engine adds a bias on top).
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Number of network outputs.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Fitness evaluator shared by every genome of a run.
    pub fn evaluator(&self) -> &Arc<dyn FitnessEvaluator> {
        &self.evaluator
    }

    /// Hyperparameter overrides.
    pub fn overrides(&self) -> &HyperparameterOverrides {
        &self.overrides
    }
}
