//! NEAT (NeuroEvolution of Augmenting Topologies) engine.
//!
//! A compact engine that evolves feed-forward networks by growing their
//! topology from a minimal start. The driver layer reaches it only through
//! [`EvolutionAlgorithm`](crate::engine::EvolutionAlgorithm); a problem plugs in
//! by implementing [`FitnessEvaluator`].
//!
//! # Key Types
//!
//! - [`NeatConfig`]: Hyperparameters (population, mutation, speciation)
//! - [`NeatAlgorithm`]: One evolutionary run, stepped generation by generation
//! - [`Genome`]: Node and connection genes with innovation markers
//! - [`Network`]: Feed-forward phenotype handed to evaluators
//!
//! # References
//!
//! - Stanley & Miikkulainen (2002), "Evolving Neural Networks through
//!   Augmenting Topologies", *Evolutionary Computation* 10(2), 99–127

mod config;
pub mod genome;
mod network;
mod runner;
pub mod species;
mod types;

pub use config::NeatConfig;
pub use genome::{ConnectionGene, Genome, InnovationTracker, NodeGene, NodeKind};
pub use network::{Network, NetworkError};
pub use runner::NeatAlgorithm;
pub use types::FitnessEvaluator;
