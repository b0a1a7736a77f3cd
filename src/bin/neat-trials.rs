//! Runs every registered benchmark case as repeated trials and prints one
//! measurement record per trial.
//!
//! Takes no arguments; `RUST_LOG` controls log output. Build with
//! `--features dhat-heap` to record heap usage.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::process::ExitCode;
use u_neatbench::bench::{BenchmarkConfig, BenchmarkHarness, BenchmarkRegistry, CaseReport};

fn main() -> ExitCode {
    #[cfg(feature = "dhat-heap")]
    let profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let harness = match BenchmarkHarness::new(BenchmarkConfig::default()) {
        Ok(h) => h,
        Err(err) => {
            eprintln!("neat-trials: {}", err);
            return ExitCode::FAILURE;
        }
    };

    #[cfg(feature = "dhat-heap")]
    let probe = u_neatbench::bench::DhatProbe::new(&profiler);
    #[cfg(not(feature = "dhat-heap"))]
    let probe = u_neatbench::bench::NoMemoryProbe;

    let reports = harness.run_all(&BenchmarkRegistry::default(), &probe);
    for report in &reports {
        print_report(report);
    }

    if reports.iter().any(|r| r.failure_count() > 0) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_report(report: &CaseReport) {
    println!("=== {} ===\n", report.case);
    println!(
        "{:>5}  {:>11}  {:>10}  {:>8}  {:>9}  {:>14}  {:>11}  {:>10}",
        "trial",
        "generations",
        "time (ms)",
        "best",
        "solved at",
        "allocated (B)",
        "allocations",
        "peak (B)"
    );
    for r in &report.records {
        let dash = || "-".to_string();
        let solved = r.solved_at.map_or_else(dash, |g| g.to_string());
        let bytes = r.memory.map_or_else(dash, |m| m.allocated_bytes.to_string());
        let blocks = r.memory.map_or_else(dash, |m| m.allocations.to_string());
        let peak = r
            .memory
            .and_then(|m| m.peak_bytes)
            .map_or_else(dash, |p| p.to_string());
        println!(
            "{:>5}  {:>11}  {:>10.2}  {:>8.4}  {:>9}  {:>14}  {:>11}  {:>10}",
            r.trial,
            r.generations,
            r.wall_time.as_secs_f64() * 1e3,
            r.best_fitness,
            solved,
            bytes,
            blocks,
            peak
        );
    }
    for f in &report.failures {
        println!("{:>5}  FAILED: {}", f.trial, f.error);
    }
    println!();
    if let (Some(mean), Some(median)) = (report.mean_wall_time(), report.median_wall_time()) {
        println!("  Mean time:      {:.2}ms", mean.as_secs_f64() * 1e3);
        println!("  Median time:    {:.2}ms", median.as_secs_f64() * 1e3);
    }
    if let Some(g) = report.mean_generations() {
        println!("  Mean gens:      {:.1}", g);
    }
    if let Some(rate) = report.solve_rate() {
        println!("  Solve rate:     {:.0}%", rate * 100.0);
    }
    if let Some(bytes) = report.total_allocated_bytes() {
        println!("  Allocated:      {} bytes", bytes);
    }
    println!("  Failures:       {}", report.failure_count());
    println!();
}
