use criterion::{criterion_group, criterion_main, Criterion};
use linfa::ParamGuard;
use linfa_bench::benchmarks::config;
use linfa_bench::config::HarnessParams;
use linfa_bench::harness::Runner;
use linfa_bench::suites::{KMeansBench, KMeansPlusPlusBench};

fn runner() -> Runner {
    let params = HarnessParams::new()
        .china_samples(Some(20_000))
        .newsgroups_documents(500)
        .n_jobs(vec![1, 4])
        .bench_filter(Some("time_".to_string()))
        .check_unwrap();
    Runner::new(params).unwrap()
}

fn cluster_bench(c: &mut Criterion) {
    let runner = runner();
    config::bench_suite::<KMeansBench>(c, &runner).unwrap();
    config::bench_suite::<KMeansPlusPlusBench>(c, &runner).unwrap();
}

#[cfg(not(target_os = "windows"))]
criterion_group! {
    name = benches;
    config = config::get_default_profiling_configs();
    targets = cluster_bench
}
#[cfg(target_os = "windows")]
criterion_group!(benches, cluster_bench);

criterion_main!(benches);
