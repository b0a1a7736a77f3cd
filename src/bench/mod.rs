//! Benchmark harness.
//!
//! Repeats a named experiment as independent trials, each on a brand-new
//! algorithm instance, and records wall-clock time, generation count and
//! (when heap profiling is on) memory per trial. Trials that fail are
//! kept apart from the measurements so aggregates only cover complete
//! runs.
//!
//! # Key Types
//!
//! - [`BenchmarkRegistry`]: Explicit list of [`BenchmarkCase`]s
//! - [`BenchmarkHarness`]: Runs a case for [`BenchmarkConfig::trials`] trials
//! - [`CaseReport`]: Per-trial [`MeasurementRecord`]s, failures, aggregates
//! - [`MemoryProbe`]: Allocator counters; [`NoMemoryProbe`] or `DhatProbe`

mod config;
mod harness;
mod memory;
mod registry;

pub use config::BenchmarkConfig;
pub use harness::{
    run_trial, BenchmarkHarness, CaseReport, MeasurementRecord, SeededFactory, TrialFailure,
};
#[cfg(feature = "dhat-heap")]
pub use memory::DhatProbe;
pub use memory::{MemoryProbe, MemorySnapshot, MemoryUsage, NoMemoryProbe};
pub use registry::{BenchmarkCase, BenchmarkRegistry};
