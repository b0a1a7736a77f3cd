//! Error taxonomy shared by the engine, the driver and the harness.
//!
//! Three kinds of failure exist, and each propagates unchanged to the
//! immediate caller of the failing operation:
//!
//! - [`NeatError::Configuration`]: rejected hyperparameters, detected at
//!   assembly time.
//! - [`NeatError::Lifecycle`]: an operation called in the wrong state.
//! - [`NeatError::Runtime`]: a generation step failed; the instance is
//!   unusable afterwards.

use thiserror::Error;

/// Errors produced while assembling, initializing or stepping an
/// evolutionary run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NeatError {
    /// Invalid or internally inconsistent hyperparameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was called in a state that does not allow it.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// A generation step failed.
    ///
    /// `generation` is the number of generations completed before the
    /// failing step.
    #[error("runtime error at generation {generation}: {reason}")]
    Runtime {
        /// Completed generations at the point of failure.
        generation: usize,
        /// Human-readable cause.
        reason: String,
    },
}

impl NeatError {
    /// Returns `true` for [`NeatError::Lifecycle`].
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, NeatError::Lifecycle(_))
    }

    /// Returns `true` for [`NeatError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, NeatError::Configuration(_))
    }

    /// Returns `true` for [`NeatError::Runtime`].
    pub fn is_runtime(&self) -> bool {
        matches!(self, NeatError::Runtime { .. })
    }
}

/// Lifecycle contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// `initialize` was called on an instance that is already initialized.
    #[error("algorithm is already initialized")]
    AlreadyInitialized,

    /// A generation was requested before `initialize`.
    #[error("algorithm has not been initialized")]
    NotInitialized,

    /// A generation was requested after the termination rule was met.
    #[error("run has already completed")]
    Completed,

    /// A generation was requested after a failed step.
    #[error("run failed earlier and must be reassembled")]
    Failed,
}

/// Error returned by a fitness evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fitness evaluation failed: {0}")]
pub struct EvaluationError(pub String);

impl EvaluationError {
    /// Creates an evaluation error with the given message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, NeatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_message_names_generation() {
        let err = NeatError::Runtime {
            generation: 37,
            reason: "fitness is NaN".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("generation 37"), "got {msg}");
        assert!(msg.contains("fitness is NaN"), "got {msg}");
    }

    #[test]
    fn test_lifecycle_from() {
        let err: NeatError = LifecycleError::NotInitialized.into();
        assert!(err.is_lifecycle());
        assert!(!err.is_runtime());
        assert_eq!(err, NeatError::Lifecycle(LifecycleError::NotInitialized));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(NeatError::Configuration("x".into()).is_configuration());
        assert!(NeatError::Runtime {
            generation: 0,
            reason: String::new()
        }
        .is_runtime());
    }
}
