//! Binds an experiment to a fresh engine instance.
//!
//! Assembly starts from a base [`NeatConfig`] (the engine defaults unless
//! the caller supplies one), applies the descriptor's overrides and
//! validates the result. Every configuration problem is reported here,
//! never at step time.

use crate::error::Result;
use crate::experiment::ExperimentDescriptor;
use crate::neat::{NeatAlgorithm, NeatConfig};

/// Builds an un-initialized [`NeatAlgorithm`] for `descriptor` using the
/// default engine configuration.
///
/// # Errors
///
/// [`NeatError::Configuration`](crate::NeatError::Configuration) if the
/// merged hyperparameters are invalid or the descriptor has no inputs or
/// outputs.
///
/// # Examples
///
/// ```
/// use u_neatbench::assembler::assemble;
/// use u_neatbench::engine::EvolutionAlgorithm;
/// use u_neatbench::experiment::{ExperimentFactory, XorExperimentFactory};
///
/// let algo = assemble(&XorExperimentFactory.create()).unwrap();
/// assert!(!algo.is_initialized());
/// assert_eq!(algo.config().population_size, 150);
/// ```
pub fn assemble(descriptor: &ExperimentDescriptor) -> Result<NeatAlgorithm> {
    assemble_with(descriptor, NeatConfig::default())
}

/// Like [`assemble`], but starts from `base` instead of the defaults.
pub fn assemble_with(descriptor: &ExperimentDescriptor, base: NeatConfig) -> Result<NeatAlgorithm> {
    let config = descriptor.overrides().apply_to(base);
    config.validate()?;

    log::debug!(
        "assembling '{}' ({} inputs, {} outputs, population {})",
        descriptor.name(),
        descriptor.input_count(),
        descriptor.output_count(),
        config.population_size
    );

    NeatAlgorithm::new(
        descriptor.name(),
        descriptor.input_count(),
        descriptor.output_count(),
        descriptor.evaluator().clone(),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EvolutionAlgorithm;
    use crate::experiment::{
        ExperimentFactory, HyperparameterOverrides, XorEvaluator, XorExperimentFactory,
        XOR_FITNESS_THRESHOLD,
    };
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_assemble_xor_defaults() {
        let algo = assemble(&XorExperimentFactory.create()).unwrap();
        assert_eq!(algo.name(), "xor");
        assert_eq!(algo.config().population_size, 150);
        assert_eq!(algo.config().fitness_threshold, Some(XOR_FITNESS_THRESHOLD));
        assert!(!algo.is_initialized());
        assert_eq!(algo.generation(), 0);
        assert!(algo.population().is_empty());
    }

    #[test]
    fn test_assemble_with_base() {
        let base = NeatConfig::fast().with_parallel(false);
        let algo = assemble_with(&XorExperimentFactory.create(), base).unwrap();
        // Descriptor override wins over the preset.
        assert_eq!(algo.config().population_size, 150);
        assert!(!algo.config().parallel);
        assert!((algo.config().add_connection_rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_population_is_configuration_error() {
        let d = XorExperimentFactory
            .create()
            .with_overrides(HyperparameterOverrides::default().with_population_size(0));
        assert!(assemble(&d).unwrap_err().is_configuration());
    }

    #[test]
    fn test_inconsistent_rate_is_configuration_error() {
        let d = XorExperimentFactory
            .create()
            .with_overrides(HyperparameterOverrides::default().with_add_node_rate(-0.1));
        let err = assemble(&d).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("add_node_rate"), "{err}");
    }

    #[test]
    fn test_zero_inputs_is_configuration_error() {
        let d = ExperimentDescriptor::new("empty", 0, 1, Arc::new(XorEvaluator));
        assert!(assemble(&d).unwrap_err().is_configuration());
    }

    #[test]
    fn test_instances_are_independent() {
        let factory = XorExperimentFactory;
        let mut a = assemble(&factory.create().with_seed(1)).unwrap();
        let b = assemble(&factory.create().with_seed(1)).unwrap();
        a.initialize().unwrap();
        a.perform_one_generation().unwrap();
        assert_eq!(a.generation(), 1);
        assert!(!b.is_initialized());
        assert!(b.population().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_well_formed_overrides_assemble(
            pop in 2usize..500,
            node in 0.0f64..=1.0,
            conn in 0.0f64..=1.0,
            cross in 0.0f64..=1.0,
            threshold in 0.1f64..10.0,
            seed in any::<u64>(),
        ) {
            let overrides = HyperparameterOverrides::default()
                .with_population_size(pop)
                .with_add_node_rate(node)
                .with_add_connection_rate(conn)
                .with_crossover_rate(cross)
                .with_compatibility_threshold(threshold)
                .with_seed(seed);
            let d = XorExperimentFactory.create().with_overrides(overrides);
            prop_assert!(assemble(&d).is_ok());
        }
    }
}
