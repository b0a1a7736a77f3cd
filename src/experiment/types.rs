//! Experiment factory trait.

use super::descriptor::ExperimentDescriptor;

/// Produces the [`ExperimentDescriptor`] for one problem domain.
///
/// Adding a domain means adding an implementation of this trait; the
/// assembler, driver and benchmark harness work with any of them.
///
/// `create` is pure data assembly: it performs no I/O, has no side
/// effects and cannot fail.
pub trait ExperimentFactory: Send + Sync {
    /// Short, stable name of the problem domain (e.g. `"xor"`).
    fn name(&self) -> &str;

    /// Builds a fresh descriptor.
    fn create(&self) -> ExperimentDescriptor;
}
