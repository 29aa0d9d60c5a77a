use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use episim::{ParametersBuilder, Simulation, TimeSeries};

static SEED: u64 = 123;
static MAX_DAYS: usize = 365;

fn simulation(population_size: usize) -> Simulation {
    let parameters = ParametersBuilder::default()
        .population_size(population_size)
        .seed(SEED)
        .build()
        .expect("valid parameters");
    Simulation::new(parameters).expect("failed to create simulation")
}

fn full_run(population_size: usize) -> TimeSeries {
    let mut simulation = simulation(population_size);
    simulation.run(Some(MAX_DAYS));
    simulation.into_time_series()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    for population_size in [100, 1000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(population_size),
            &population_size,
            |bencher, &population_size| bencher.iter_with_large_drop(|| full_run(population_size)),
        );
    }
    group.finish();

    c.bench_function("step_day 10000", |bencher| {
        bencher.iter_batched(
            || simulation(10_000),
            |mut simulation| simulation.step_day(),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(simulation_benches, criterion_benchmark);
criterion_main!(simulation_benches);
