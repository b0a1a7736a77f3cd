//! Driver loop.
//!
//! A [`Driver`] owns exactly one algorithm instance and enforces its
//! lifecycle as a state machine:
//!
//! ```text
//! Uninitialized --initialize--> Initialized --step--> Stepping --step--> ...
//!                                                        |
//!                                       termination met  v
//!                                                    Completed
//! ```
//!
//! A failing step moves the driver to `Failed`; the run must then be
//! reassembled. There is no process-wide "current algorithm": callers pass
//! the driver around by reference.
//!
//! # Key Types
//!
//! - [`Driver`]: Lifecycle-checked stepping with a generation counter
//! - [`Termination`]: Generation budget or fitness predicate
//! - [`RunSummary`]: Outcome of [`Driver::run`]

mod runner;
mod types;

pub use runner::{run_experiment, Driver};
pub use types::{DriverState, RunSummary, Termination, DEFAULT_GENERATIONS};
