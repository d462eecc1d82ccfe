#[cfg(feature = "benchmarks")]
pub mod config {
    use criterion::{black_box, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion};
    #[cfg(not(target_os = "windows"))]
    use pprof::criterion::{Output, PProfProfiler};
    use rayon::ThreadPoolBuilder;
    use std::time::Duration;

    use crate::error::Result;
    use crate::harness::{Benchmark, Combination, EntryBody, MeasureKind, Runner};

    #[cfg(not(target_os = "windows"))]
    pub fn get_default_profiling_configs() -> Criterion {
        Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
    }

    pub fn set_default_benchmark_configs(benchmark: &mut BenchmarkGroup<WallTime>) {
        let sample_size: usize = 10;
        let measurement_time: Duration = Duration::new(20, 0);
        let confidence_level: f64 = 0.97;
        let warm_up_time: Duration = Duration::new(3, 0);
        let noise_threshold: f64 = 0.05;

        benchmark
            .sample_size(sample_size)
            .measurement_time(measurement_time)
            .confidence_level(confidence_level)
            .warm_up_time(warm_up_time)
            .noise_threshold(noise_threshold);
    }

    /// Register every selected `time_*` entry point of `B` in its own group, one benchmark per
    /// combination and `n_jobs` value
    pub fn bench_suite<B: Benchmark>(c: &mut Criterion, runner: &Runner) -> Result<()> {
        let mut group = c.benchmark_group(B::NAME);
        set_default_benchmark_configs(&mut group);

        let entries: Vec<_> = B::entry_points()
            .into_iter()
            .filter(|entry| runner.selects(B::NAME, entry.name()))
            .collect();

        for combination in B::param_grid().combinations() {
            for &n_jobs in runner.params().n_jobs() {
                let pool = ThreadPoolBuilder::new().num_threads(n_jobs).build()?;

                for entry in &entries {
                    let f = match (entry.kind()?, entry.body()) {
                        (MeasureKind::Time, EntryBody::Run(f)) => *f,
                        _ => continue,
                    };
                    let suite = B::setup(&combination, &runner.common(n_jobs))?;
                    // fail before sampling, errors cannot leave the timing loop
                    pool.install(|| f(&suite))?;

                    let id = BenchmarkId::new(
                        entry.name(),
                        format!("{}/n_jobs={}", Combination(&combination), n_jobs),
                    );
                    group.bench_function(id, |b| {
                        b.iter(|| black_box(pool.install(|| f(&suite))))
                    });
                }
            }
        }

        group.finish();
        Ok(())
    }
}
