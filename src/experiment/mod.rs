//! Pluggable experiments.
//!
//! An experiment says *what* to evolve a solution for; the engine decides
//! *how*. Each problem domain implements [`ExperimentFactory`], which
//! builds an immutable [`ExperimentDescriptor`]: name, network
//! dimensions, fitness evaluator and hyperparameter overrides.
//!
//! # Domains
//!
//! - [`XorExperimentFactory`]: two-input exclusive-or

mod descriptor;
mod types;
mod xor;

pub use crate::neat::FitnessEvaluator;
pub use descriptor::{ExperimentDescriptor, HyperparameterOverrides};
pub use types::ExperimentFactory;
pub use xor::{
    XorEvaluator, XorExperimentFactory, XOR_FITNESS_THRESHOLD, XOR_MAX_FITNESS,
    XOR_POPULATION_SIZE,
};
