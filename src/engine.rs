//! Contract between the driver layer and an evolutionary engine.
//!
//! The driver and the benchmark harness see an engine only through
//! [`EvolutionAlgorithm`]. Genome encoding, speciation and reproduction
//! stay behind this trait.

use crate::error::Result;

/// Summary of one completed generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Engine-side generation number (1 for the first step).
    pub generation: usize,

    /// Best fitness in the current population (higher is better).
    pub best_fitness: f64,

    /// Mean fitness of the current population.
    pub mean_fitness: f64,

    /// Number of species after speciation.
    pub species_count: usize,

    /// Total fitness evaluations performed so far, including the
    /// initial population.
    pub evaluations: usize,

    /// Whether the champion reached the experiment's fitness threshold.
    pub solved: bool,

    /// Node count of the champion genome.
    pub champion_nodes: usize,

    /// Enabled connection count of the champion genome.
    pub champion_connections: usize,
}

/// An evolutionary run that can be initialized once and stepped
/// generation by generation.
///
/// Implementations own all their population state. A step is atomic from
/// the caller's point of view: it either returns stats for a complete
/// generation or fails with [`NeatError::Runtime`](crate::NeatError::Runtime),
/// after which the instance must be discarded.
pub trait EvolutionAlgorithm {
    /// Performs one-time setup, such as seeding and evaluating the
    /// initial population.
    ///
    /// Fails with [`LifecycleError::AlreadyInitialized`](crate::LifecycleError::AlreadyInitialized)
    /// when called twice.
    fn initialize(&mut self) -> Result<()>;

    /// Runs one full cycle of reproduction, evaluation and speciation.
    ///
    /// Fails with [`LifecycleError::NotInitialized`](crate::LifecycleError::NotInitialized)
    /// before [`initialize`](Self::initialize).
    fn perform_one_generation(&mut self) -> Result<GenerationStats>;

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    fn is_initialized(&self) -> bool;
}
