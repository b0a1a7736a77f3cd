//! Criterion benchmarks for the registered NEAT cases.
//!
//! Each registry case becomes one benchmark: a full run (assembly,
//! initialization and every generation) on a fresh instance per
//! iteration, with a fixed seed so iterations do the same work.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_neatbench::bench::{run_trial, BenchmarkRegistry, NoMemoryProbe, SeededFactory};
use u_neatbench::driver::Termination;
use u_neatbench::experiment::XorExperimentFactory;

fn bench_registry(c: &mut Criterion) {
    let registry = BenchmarkRegistry::default();
    let mut group = c.benchmark_group("neat");
    group.sample_size(10);

    for case in registry.cases() {
        let factory = SeededFactory::new(case.factory(), 42);
        group.bench_function(case.name(), |b| {
            b.iter(|| {
                let record = run_trial(
                    case.name(),
                    0,
                    black_box(&factory),
                    case.termination(),
                    &NoMemoryProbe,
                );
                black_box(record)
            })
        });
    }
    group.finish();
}

fn bench_xor_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("neat_xor_generations");
    group.sample_size(10);

    for gens in [10usize, 50, 100] {
        let factory = SeededFactory::new(&XorExperimentFactory, 42);
        group.bench_with_input(BenchmarkId::from_parameter(gens), &gens, |b, &g| {
            b.iter(|| {
                let termination = Termination::Generations(g);
                let record = run_trial("neat_xor", 0, &factory, termination, &NoMemoryProbe);
                black_box(record)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_registry, bench_xor_generations);
criterion_main!(benches);
