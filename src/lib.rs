//! NEAT benchmark harness.
//!
//! Runs NeuroEvolution of Augmenting Topologies on pluggable problem
//! domains and measures how long, and how much memory, a fixed number of
//! generations takes.
//!
//! - **Experiments**: An [`ExperimentFactory`](experiment::ExperimentFactory)
//!   describes a problem domain (XOR ships built in).
//! - **Assembler**: Turns an experiment descriptor into a ready-to-initialize
//!   engine instance.
//! - **Engine**: A NEAT implementation behind the
//!   [`EvolutionAlgorithm`](engine::EvolutionAlgorithm) contract.
//! - **Driver**: Lifecycle-checked stepping with a generation counter and a
//!   termination rule.
//! - **Bench**: Repeated, independent trials with timing and heap statistics.
//!
//! # Quick Start
//!
//! ```
//! use u_neatbench::driver::{run_experiment, Termination};
//! use u_neatbench::experiment::XorExperimentFactory;
//!
//! let summary = run_experiment(&XorExperimentFactory, Termination::Generations(5)).unwrap();
//! assert_eq!(summary.generations, 5);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): rayon fitness evaluation and concurrent trials
//! - `serde`: serialization for configs and measurement records
//! - `dhat-heap`: heap profiling through `dhat` in the binaries

pub mod assembler;
pub mod bench;
pub mod driver;
pub mod engine;
mod error;
pub mod experiment;
pub mod neat;

pub use error::{EvaluationError, LifecycleError, NeatError, Result};
