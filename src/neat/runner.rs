//! NEAT generation loop.
//!
//! [`NeatAlgorithm`] owns one evolutionary run: initialization seeds and
//! evaluates a population of minimal genomes, and every generation then
//! performs reproduction → evaluation → speciation.

use super::config::NeatConfig;
use super::genome::{Genome, InnovationTracker};
use super::network::Network;
use super::species::{allocate_offspring, speciate, Species};
use super::types::FitnessEvaluator;
use crate::engine::{EvolutionAlgorithm, GenerationStats};
use crate::error::{LifecycleError, NeatError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Ready,
    Failed,
}

/// One NEAT run.
///
/// Holds its own population, species, innovation history and RNG; nothing
/// is shared with other instances.
///
/// # Usage
///
/// ```
/// use std::sync::Arc;
/// use u_neatbench::engine::EvolutionAlgorithm;
/// use u_neatbench::neat::{FitnessEvaluator, NeatAlgorithm, NeatConfig, Network};
/// use u_neatbench::EvaluationError;
///
/// struct Follow;
/// impl FitnessEvaluator for Follow {
///     fn evaluate(&self, net: &Network) -> Result<f64, EvaluationError> {
///         Ok(net.activate(&[1.0])?[0])
///     }
/// }
///
/// let config = NeatConfig::fast().with_seed(1);
/// let mut algo = NeatAlgorithm::new("follow", 1, 1, Arc::new(Follow), config).unwrap();
/// algo.initialize().unwrap();
/// let stats = algo.perform_one_generation().unwrap();
/// assert_eq!(stats.generation, 1);
/// ```
pub struct NeatAlgorithm {
    name: String,
    config: NeatConfig,
    input_count: usize,
    output_count: usize,
    evaluator: Arc<dyn FitnessEvaluator>,
    rng: StdRng,
    tracker: InnovationTracker,
    population: Vec<Genome>,
    species: Vec<Species>,
    next_species_id: usize,
    generation: usize,
    evaluations: usize,
    champion: Option<Genome>,
    phase: Phase,
}

impl fmt::Debug for NeatAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeatAlgorithm")
            .field("name", &self.name)
            .field("inputs", &self.input_count)
            .field("outputs", &self.output_count)
            .field("generation", &self.generation)
            .field("population", &self.population.len())
            .field("species", &self.species.len())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl NeatAlgorithm {
    /// Creates an un-initialized run.
    ///
    /// Fails with [`NeatError::Configuration`] if `config` is invalid or the
    /// network would have no inputs or no outputs.
    pub fn new(
        name: impl Into<String>,
        input_count: usize,
        output_count: usize,
        evaluator: Arc<dyn FitnessEvaluator>,
        config: NeatConfig,
    ) -> Result<Self> {
        config.validate()?;
        if input_count == 0 || output_count == 0 {
            return Err(NeatError::Configuration(format!(
                "network needs at least one input and one output, got {input_count}x{output_count}"
            )));
        }

        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));

        Ok(Self {
            name: name.into(),
            input_count,
            output_count,
            evaluator,
            rng,
            tracker: InnovationTracker::new(input_count, output_count),
            population: Vec::with_capacity(config.population_size),
            species: Vec::new(),
            next_species_id: 0,
            generation: 0,
            evaluations: 0,
            champion: None,
            phase: Phase::Fresh,
            config,
        })
    }

    /// Experiment name this run was assembled for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective configuration.
    pub fn config(&self) -> &NeatConfig {
        &self.config
    }

    /// Completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fitness evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Current population (empty before initialization).
    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    /// Current species.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Best genome seen during the run.
    pub fn champion(&self) -> Option<&Genome> {
        self.champion.as_ref()
    }

    fn evaluate_population(&mut self) -> std::result::Result<(), String> {
        let evaluator = self.evaluator.as_ref();

        #[cfg(feature = "parallel")]
        let outcome = if self.config.parallel {
            self.population
                .par_iter_mut()
                .try_for_each(|g| evaluate_genome(evaluator, g))
        } else {
            self.population
                .iter_mut()
                .try_for_each(|g| evaluate_genome(evaluator, g))
        };

        #[cfg(not(feature = "parallel"))]
        let outcome = self
            .population
            .iter_mut()
            .try_for_each(|g| evaluate_genome(evaluator, g));

        outcome?;
        self.evaluations += self.population.len();
        Ok(())
    }

    fn best_index(&self) -> usize {
        self.population
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.fitness()
                    .partial_cmp(&b.fitness())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn update_champion(&mut self) {
        let best = &self.population[self.best_index()];
        let improved = self
            .champion
            .as_ref()
            .map_or(true, |c| best.fitness() > c.fitness());
        if improved {
            self.champion = Some(best.clone());
        }
    }

    fn reproduce(&mut self) -> Vec<Genome> {
        let pop_size = self.config.population_size;
        let champion_idx = self.best_index();

        let limit = self.config.species_stagnation_limit;
        let generation = self.generation;
        self.species
            .retain(|s| !s.is_stagnant(generation, limit) || s.members.contains(&champion_idx));

        let protect = self
            .species
            .iter()
            .position(|s| s.members.contains(&champion_idx));
        let counts = allocate_offspring(&self.population, &self.species, pop_size, protect);

        let plans: Vec<(Vec<usize>, usize)> = self
            .species
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(s, count)| {
                let mut ranked = s.members.clone();
                ranked.sort_by(|&a, &b| {
                    self.population[b]
                        .fitness()
                        .partial_cmp(&self.population[a].fitness())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                (ranked, count)
            })
            .collect();

        let mut next = Vec::with_capacity(pop_size);
        for (ranked, count) in plans {
            let elites = self.config.species_elitism.min(count).min(ranked.len());
            for &i in &ranked[..elites] {
                next.push(self.population[i].clone());
            }

            let survivors = ((ranked.len() as f64 * self.config.survival_threshold).ceil()
                as usize)
                .clamp(1, ranked.len());
            let parents = &ranked[..survivors];
            for _ in elites..count {
                next.push(breed(
                    &self.population,
                    parents,
                    &self.config,
                    &mut self.rng,
                    &mut self.tracker,
                ));
            }
        }
        next
    }

    fn stats(&self) -> GenerationStats {
        let best = &self.population[self.best_index()];
        let mean = self.population.iter().map(|g| g.fitness()).sum::<f64>()
            / self.population.len() as f64;
        let champion = self.champion.as_ref().unwrap_or(best);
        let solved = self
            .config
            .fitness_threshold
            .is_some_and(|t| champion.fitness() > t);

        GenerationStats {
            generation: self.generation,
            best_fitness: best.fitness(),
            mean_fitness: mean,
            species_count: self.species.len(),
            evaluations: self.evaluations,
            solved,
            champion_nodes: champion.nodes().len(),
            champion_connections: champion.enabled_connections(),
        }
    }

    fn fail(&mut self, reason: String) -> NeatError {
        self.phase = Phase::Failed;
        NeatError::Runtime {
            generation: self.generation,
            reason,
        }
    }
}

impl EvolutionAlgorithm for NeatAlgorithm {
    fn initialize(&mut self) -> Result<()> {
        match self.phase {
            Phase::Fresh => {}
            Phase::Ready => return Err(LifecycleError::AlreadyInitialized.into()),
            Phase::Failed => return Err(LifecycleError::Failed.into()),
        }

        self.population = (0..self.config.population_size)
            .map(|_| {
                Genome::minimal(
                    self.input_count,
                    self.output_count,
                    &mut self.tracker,
                    self.config.weight_init_range,
                    &mut self.rng,
                )
            })
            .collect();

        if let Err(reason) = self.evaluate_population() {
            return Err(self.fail(reason));
        }
        speciate(
            &self.population,
            &mut self.species,
            &mut self.next_species_id,
            &self.config,
            self.generation,
        );
        self.update_champion();
        self.phase = Phase::Ready;

        log::debug!(
            "{}: initialized {} genomes in {} species",
            self.name,
            self.population.len(),
            self.species.len()
        );
        Ok(())
    }

    fn perform_one_generation(&mut self) -> Result<GenerationStats> {
        match self.phase {
            Phase::Ready => {}
            Phase::Fresh => return Err(LifecycleError::NotInitialized.into()),
            Phase::Failed => return Err(LifecycleError::Failed.into()),
        }

        self.population = self.reproduce();
        if let Err(reason) = self.evaluate_population() {
            return Err(self.fail(reason));
        }

        self.generation += 1;
        speciate(
            &self.population,
            &mut self.species,
            &mut self.next_species_id,
            &self.config,
            self.generation,
        );
        self.update_champion();

        let stats = self.stats();
        log::trace!(
            "{}: generation {} best={:.4} mean={:.4} species={}",
            self.name,
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.species_count
        );
        Ok(stats)
    }

    fn is_initialized(&self) -> bool {
        self.phase != Phase::Fresh
    }
}

/// Decode, evaluate and store the fitness of one genome.
fn evaluate_genome(
    evaluator: &dyn FitnessEvaluator,
    genome: &mut Genome,
) -> std::result::Result<(), String> {
    let network = Network::from_genome(genome).map_err(|e| e.to_string())?;
    let fitness = evaluator.evaluate(&network).map_err(|e| e.to_string())?;
    if !fitness.is_finite() {
        return Err(format!("fitness evaluator returned non-finite value {fitness}"));
    }
    genome.set_fitness(fitness);
    Ok(())
}

/// Produce one offspring from a species' parent pool.
fn breed(
    population: &[Genome],
    parents: &[usize],
    config: &NeatConfig,
    rng: &mut StdRng,
    tracker: &mut InnovationTracker,
) -> Genome {
    let p1 = &population[parents[rng.random_range(0..parents.len())]];

    let mut child = if rng.random_bool(config.crossover_rate) {
        let p2 = if rng.random_bool(config.interspecies_mating_rate) {
            &population[rng.random_range(0..population.len())]
        } else {
            &population[parents[rng.random_range(0..parents.len())]]
        };
        if p2.fitness() > p1.fitness() {
            Genome::crossover(p2, p1, rng)
        } else {
            Genome::crossover(p1, p2, rng)
        }
    } else {
        let mut clone = p1.clone();
        clone.set_fitness(f64::NEG_INFINITY);
        clone
    };

    if rng.random_bool(config.add_node_rate) {
        child.mutate_add_node(tracker, rng);
    } else if rng.random_bool(config.add_connection_rate) {
        child.mutate_add_connection(tracker, config.weight_init_range, rng);
    }
    if rng.random_bool(config.weight_mutation_rate) {
        child.mutate_weights(
            config.weight_perturb_rate,
            config.weight_perturb_power,
            config.weight_init_range,
            rng,
        );
    }
    child
}

// ============================================================================
// Tests
// ============================================================================
