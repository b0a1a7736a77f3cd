//! Logical XOR task.
//!
//! The classic NEAT sanity check: a network with two inputs and one output
//! must learn exclusive-or, which needs at least one hidden node.

use super::descriptor::{ExperimentDescriptor, HyperparameterOverrides};
use super::types::ExperimentFactory;
use crate::error::EvaluationError;
use crate::neat::{FitnessEvaluator, Network};
use std::sync::Arc;

/// Highest reachable XOR fitness, `(4 - 0)^2`.
pub const XOR_MAX_FITNESS: f64 = 16.0;

/// Fitness above which a network counts as solving XOR.
pub const XOR_FITNESS_THRESHOLD: f64 = 15.5;

/// Default population size for the XOR experiment.
pub const XOR_POPULATION_SIZE: usize = 150;

const TRUTH_TABLE: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

/// Scores a network on the four XOR cases.
///
/// `fitness = (4 - Σ|target - output|)^2`, so a perfect network scores 16
/// and a network answering 0.5 everywhere scores 4.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorEvaluator;

impl FitnessEvaluator for XorEvaluator {
    fn evaluate(&self, network: &Network) -> Result<f64, EvaluationError> {
        let mut error_sum = 0.0;
        for (inputs, target) in TRUTH_TABLE {
            let out = network.activate(&inputs)?;
            let y = out
                .first()
                .copied()
                .ok_or_else(|| EvaluationError::new("XOR network has no output"))?;
            error_sum += (target - y).abs();
        }
        Ok((4.0 - error_sum).powi(2))
    }
}

/// Factory for the XOR experiment.
///
/// # Examples
///
/// ```
/// use u_neatbench::experiment::{ExperimentFactory, XorExperimentFactory};
///
/// let d = XorExperimentFactory.create();
/// assert_eq!(d.input_count(), 2);
/// assert_eq!(d.output_count(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct XorExperimentFactory;

impl ExperimentFactory for XorExperimentFactory {
    fn name(&self) -> &str {
        "xor"
    }

    fn create(&self) -> ExperimentDescriptor {
        ExperimentDescriptor::new(self.name(), 2, 1, Arc::new(XorEvaluator)).with_overrides(
            HyperparameterOverrides::default()
                .with_population_size(XOR_POPULATION_SIZE)
                .with_fitness_threshold(XOR_FITNESS_THRESHOLD),
        )
    }
}
