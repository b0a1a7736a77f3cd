//! Problem-side trait for the NEAT engine.

use super::network::Network;
use crate::error::EvaluationError;

/// Scores a decoded network on a task.
///
/// Higher fitness is better. Implementations must be referentially
/// transparent: the same network always gets the same score, and
/// evaluation has no side effects on the rest of the system.
///
/// # Thread Safety
///
/// `FitnessEvaluator` must be `Send + Sync` because the engine may
/// evaluate genomes in parallel using rayon.
///
/// # Implementing
///
/// ```
/// use u_neatbench::neat::{FitnessEvaluator, Network};
/// use u_neatbench::EvaluationError;
///
/// struct AlwaysOn;
///
/// impl FitnessEvaluator for AlwaysOn {
///     fn evaluate(&self, network: &Network) -> Result<f64, EvaluationError> {
///         let out = network.activate(&[1.0])?;
///         Ok(out[0])
///     }
/// }
/// ```
pub trait FitnessEvaluator: Send + Sync {
    /// Returns the fitness of `network`.
    fn evaluate(&self, network: &Network) -> Result<f64, EvaluationError>;
}

impl From<super::network::NetworkError> for EvaluationError {
    fn from(err: super::network::NetworkError) -> Self {
        EvaluationError(err.to_string())
    }
}
