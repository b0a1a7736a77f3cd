//! NEAT configuration.
//!
//! [`NeatConfig`] holds every hyperparameter the engine reads during a run.

use crate::error::{NeatError, Result};

/// Configuration for the NEAT engine.
///
/// Controls population size, structural and weight mutation, mating,
/// speciation and stagnation.
///
/// # Defaults
///
/// ```
/// use u_neatbench::neat::NeatConfig;
///
/// let config = NeatConfig::default();
/// assert_eq!(config.population_size, 150);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_neatbench::neat::NeatConfig;
///
/// let config = NeatConfig::default()
///     .with_population_size(200)
///     .with_add_node_rate(0.05)
///     .with_compatibility_threshold(2.5)
///     .with_seed(7);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeatConfig {
    /// Number of genomes in the population. Constant across generations.
    pub population_size: usize,

    /// Probability that an offspring has its connection weights mutated.
    pub weight_mutation_rate: f64,

    /// Per-connection probability of perturbing (rather than replacing)
    /// a weight during weight mutation.
    pub weight_perturb_rate: f64,

    /// Maximum absolute perturbation applied to a weight.
    pub weight_perturb_power: f64,

    /// Initial and replacement weights are drawn from
    /// `[-weight_init_range, weight_init_range]`.
    pub weight_init_range: f64,

    /// Probability that an offspring gains a hidden node by splitting an
    /// enabled connection.
    pub add_node_rate: f64,

    /// Probability that an offspring gains a new feed-forward connection.
    pub add_connection_rate: f64,

    /// Probability that an offspring is produced by crossover rather than
    /// by cloning a single parent.
    pub crossover_rate: f64,

    /// Probability that the second crossover parent is drawn from another
    /// species.
    pub interspecies_mating_rate: f64,

    /// Fraction of each species (best first) allowed to become parents.
    pub survival_threshold: f64,

    /// Number of top genomes per species copied unchanged into the next
    /// generation.
    pub species_elitism: usize,

    /// Genomes closer than this distance to a species representative join
    /// that species.
    pub compatibility_threshold: f64,

    /// Weight of disjoint and excess genes in the compatibility distance.
    pub disjoint_coefficient: f64,

    /// Weight of the mean weight difference of matching genes in the
    /// compatibility distance.
    pub weight_coefficient: f64,

    /// Generations without improvement after which a species stops
    /// receiving offspring (0 disables the rule).
    ///
    /// The species holding the population champion is never removed.
    pub species_stagnation_limit: usize,

    /// Fitness the champion must exceed to count as a solution.
    ///
    /// `None` means the run never reports itself as solved.
    pub fitness_threshold: Option<f64>,

    /// Whether to evaluate genomes in parallel using rayon.
    ///
    /// Ignored when the `parallel` feature is disabled.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            population_size: 150,
            weight_mutation_rate: 0.8,
            weight_perturb_rate: 0.9,
            weight_perturb_power: 0.5,
            weight_init_range: 2.0,
            add_node_rate: 0.03,
            add_connection_rate: 0.05,
            crossover_rate: 0.75,
            interspecies_mating_rate: 0.001,
            survival_threshold: 0.2,
            species_elitism: 1,
            compatibility_threshold: 3.0,
            disjoint_coefficient: 1.0,
            weight_coefficient: 0.4,
            species_stagnation_limit: 15,
            fitness_threshold: None,
            parallel: true,
            seed: None,
        }
    }
}

impl NeatConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the weight mutation rate.
    pub fn with_weight_mutation_rate(mut self, rate: f64) -> Self {
        self.weight_mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the add-node rate.
    pub fn with_add_node_rate(mut self, rate: f64) -> Self {
        self.add_node_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the add-connection rate.
    pub fn with_add_connection_rate(mut self, rate: f64) -> Self {
        self.add_connection_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the compatibility threshold used for speciation.
    pub fn with_compatibility_threshold(mut self, threshold: f64) -> Self {
        self.compatibility_threshold = threshold;
        self
    }

    /// Sets the species stagnation limit (0 to disable).
    pub fn with_species_stagnation_limit(mut self, limit: usize) -> Self {
        self.species_stagnation_limit = limit;
        self
    }

    /// Sets the fitness threshold that marks a solution.
    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = Some(threshold);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick runs: small population, eager structural mutation.
    ///
    /// - Population: 50, add-node: 0.05, add-connection: 0.1
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            add_node_rate: 0.05,
            add_connection_rate: 0.1,
            species_stagnation_limit: 10,
            ..Self::default()
        }
    }

    /// Preset matching the classic XOR benchmark settings.
    ///
    /// - Population: 150, compatibility threshold: 3.0, stagnation: 15
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// Returns [`NeatError::Configuration`] naming the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(invalid("population_size must be at least 2"));
        }
        for (name, rate) in [
            ("weight_mutation_rate", self.weight_mutation_rate),
            ("weight_perturb_rate", self.weight_perturb_rate),
            ("add_node_rate", self.add_node_rate),
            ("add_connection_rate", self.add_connection_rate),
            ("crossover_rate", self.crossover_rate),
            ("interspecies_mating_rate", self.interspecies_mating_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(format!("{name} must be in [0, 1], got {rate}")));
            }
        }
        if !(self.survival_threshold > 0.0 && self.survival_threshold <= 1.0) {
            return Err(invalid("survival_threshold must be in (0, 1]"));
        }
        if self.species_elitism >= self.population_size {
            return Err(invalid(
                "species_elitism too high: elites fill entire population",
            ));
        }
        if !(self.compatibility_threshold.is_finite() && self.compatibility_threshold > 0.0) {
            return Err(invalid("compatibility_threshold must be positive"));
        }
        if self.disjoint_coefficient < 0.0 || self.weight_coefficient < 0.0 {
            return Err(invalid("distance coefficients must be non-negative"));
        }
        if !(self.weight_perturb_power.is_finite() && self.weight_perturb_power >= 0.0) {
            return Err(invalid("weight_perturb_power must be non-negative"));
        }
        if !(self.weight_init_range.is_finite() && self.weight_init_range > 0.0) {
            return Err(invalid("weight_init_range must be positive"));
        }
        if let Some(t) = self.fitness_threshold {
            if !t.is_finite() {
                return Err(invalid("fitness_threshold must be finite"));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> NeatError {
    NeatError::Configuration(msg.into())
}
