//! Runs the XOR experiment for the default generation budget.
//!
//! Exits non-zero when assembly or any generation fails. Set `RUST_LOG`
//! for progress output, e.g. `RUST_LOG=debug`.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::process::ExitCode;
use std::time::Instant;
use u_neatbench::assembler::assemble;
use u_neatbench::driver::{Driver, Termination};
use u_neatbench::experiment::{ExperimentFactory, XorExperimentFactory};

fn main() -> ExitCode {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let factory = XorExperimentFactory;
    let descriptor = factory.create();
    let algorithm = match assemble(&descriptor) {
        Ok(a) => a,
        Err(err) => {
            eprintln!("neatbench: {}: {}", descriptor.name(), err);
            return ExitCode::FAILURE;
        }
    };
    let mut driver = match Driver::new(algorithm, Termination::default()) {
        Ok(d) => d,
        Err(err) => {
            eprintln!("neatbench: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    if let Err(err) = driver.initialize() {
        eprintln!("neatbench: initialization failed: {}", err);
        return ExitCode::FAILURE;
    }
    match driver.run() {
        Ok(summary) => {
            let elapsed = start.elapsed();
            println!("Experiment:     {}", descriptor.name());
            println!("Generations:    {}", summary.generations);
            println!("Elapsed:        {:.3}s", elapsed.as_secs_f64());
            println!("Best fitness:   {:.4}", summary.last.best_fitness);
            println!("Species:        {}", summary.last.species_count);
            match summary.solved_at {
                Some(g) => println!("Solved at:      generation {}", g),
                None => println!("Solved at:      -"),
            }
            println!(
                "Champion:       {} nodes, {} enabled connections",
                summary.last.champion_nodes, summary.last.champion_connections
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("neatbench: {}", err);
            ExitCode::FAILURE
        }
    }
}
