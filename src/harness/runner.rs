use std::time::Instant;

use rayon::ThreadPoolBuilder;
use regex::Regex;
use tracing::{debug, info, info_span};

use super::{
    Benchmark, BenchmarkResult, Combination, Common, EntryBody, EntryPoint, MeasureKind, Outcome,
    TimingStats,
};
use crate::config::{HarnessParamsError, HarnessValidParams};
use crate::datasets::Datasets;
use crate::error::{Error, Result};
use crate::memory;

/// Walks the parameter grid of a suite and measures its entry points.
///
/// Every entry point of every combination gets its own `setup` call and runs inside a thread
/// pool sized by the `n_jobs` value of the combination. The first failure aborts the run.
#[derive(Debug)]
pub struct Runner {
    params: HarnessValidParams,
    datasets: Datasets,
    filter: Option<Regex>,
}

impl Runner {
    pub fn new(params: HarnessValidParams) -> Result<Self> {
        let filter = params
            .bench_filter()
            .map(Regex::new)
            .transpose()
            .map_err(HarnessParamsError::from)?;

        Ok(Runner {
            datasets: Datasets::new(params.clone()),
            params,
            filter,
        })
    }

    pub fn params(&self) -> &HarnessValidParams {
        &self.params
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// Whether the filter selects `<suite>.<entry>`
    pub fn selects(&self, suite: &str, entry: &str) -> bool {
        match &self.filter {
            Some(filter) => filter.is_match(&format!("{}.{}", suite, entry)),
            None => true,
        }
    }

    /// Global parameters for one `n_jobs` value
    pub fn common(&self, n_jobs: usize) -> Common<'_> {
        Common {
            n_jobs,
            seed: self.params.seed(),
            batch_size: self.params.batch_size(),
            datasets: &self.datasets,
        }
    }

    /// Measure every selected entry point of `B` for every combination
    pub fn run<B: Benchmark>(&self) -> Result<Vec<BenchmarkResult>> {
        let entries: Vec<EntryPoint<B>> = B::entry_points()
            .into_iter()
            .filter(|entry| self.selects(B::NAME, entry.name()))
            .collect();
        let kinds = entries
            .iter()
            .map(EntryPoint::kind)
            .collect::<Result<Vec<_>>>()?;

        let mut results = Vec::new();
        if entries.is_empty() {
            debug!(suite = B::NAME, "no entry point selected");
            return Ok(results);
        }

        for combination in B::param_grid().combinations() {
            let params: Vec<String> = combination.iter().map(ToString::to_string).collect();

            for &n_jobs in self.params.n_jobs() {
                let pool = ThreadPoolBuilder::new().num_threads(n_jobs).build()?;
                let common = self.common(n_jobs);

                for (entry, &kind) in entries.iter().zip(&kinds) {
                    let _span = info_span!(
                        "benchmark",
                        suite = B::NAME,
                        entry = entry.name(),
                        params = %Combination(&combination),
                        n_jobs
                    )
                    .entered();

                    let start = Instant::now();
                    let suite = B::setup(&combination, &common)?;
                    debug!(secs = start.elapsed().as_secs_f64(), "setup done");

                    let outcome = pool.install(|| self.measure(&suite, entry, kind))?;
                    let result = BenchmarkResult {
                        suite: B::NAME.to_string(),
                        entry: entry.name().to_string(),
                        kind,
                        params: params.clone(),
                        n_jobs,
                        outcome,
                    };
                    info!("{}", result);
                    results.push(result);
                }
            }
        }

        Ok(results)
    }

    fn measure<B: Benchmark>(
        &self,
        suite: &B,
        entry: &EntryPoint<B>,
        kind: MeasureKind,
    ) -> Result<Outcome> {
        match (kind, entry.body()) {
            (MeasureKind::Time, EntryBody::Run(f)) => {
                for _ in 0..self.params.warmup() {
                    f(suite)?;
                }

                let mut durations = Vec::with_capacity(self.params.repeat());
                for sample in 0..self.params.repeat() {
                    let start = Instant::now();
                    f(suite)?;
                    let elapsed = start.elapsed();
                    debug!(sample, secs = elapsed.as_secs_f64(), "timed call");
                    durations.push(elapsed);
                }

                TimingStats::from_durations(&durations)
                    .map(Outcome::Time)
                    .ok_or(Error::HarnessParams(HarnessParamsError::Repeat))
            }
            (MeasureKind::PeakMem, EntryBody::Run(f)) => {
                let (output, peak_bytes, baseline_bytes) = memory::measure_peak(|| f(suite))?;
                output?;
                Ok(Outcome::PeakMemory {
                    peak_bytes,
                    baseline_bytes,
                })
            }
            (MeasureKind::Track, EntryBody::Track(f)) => Ok(Outcome::Track { value: f(suite)? }),
            _ => Err(Error::InvalidEntryPoint {
                name: entry.name().to_string(),
                reason: format!("body does not produce a {} measurement", kind),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessParams;
    use crate::harness::ParamGrid;
    use linfa::ParamGuard;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // setup runs on the test thread, entry points on the pool threads
    thread_local! {
        static SETUPS: Cell<usize> = Cell::new(0);
    }
    static TIMED_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Counting {
        value: u64,
    }

    impl Counting {
        fn time_noop(&self) -> Result<()> {
            TIMED_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn track_value(&self) -> Result<u64> {
            Ok(self.value)
        }
    }

    impl Benchmark for Counting {
        const NAME: &'static str = "Counting_bench";
        type Param = u64;

        fn param_grid() -> ParamGrid<u64> {
            ParamGrid::new()
                .axis("a", vec![1, 2])
                .axis("b", vec![10, 20, 30])
        }

        fn setup(params: &[u64], common: &Common<'_>) -> Result<Self> {
            SETUPS.with(|setups| setups.set(setups.get() + 1));
            Ok(Counting {
                value: params[0] * params[1] + common.n_jobs as u64,
            })
        }

        fn entry_points() -> Vec<EntryPoint<Self>> {
            vec![
                EntryPoint::run("time_noop", Counting::time_noop),
                EntryPoint::track("track_value", Counting::track_value),
            ]
        }
    }

    struct Misnamed;

    impl Benchmark for Misnamed {
        const NAME: &'static str = "Misnamed_bench";
        type Param = u64;

        fn param_grid() -> ParamGrid<u64> {
            ParamGrid::new()
        }

        fn setup(_: &[u64], _: &Common<'_>) -> Result<Self> {
            Err(Error::InvalidParams("setup must not run".into()))
        }

        fn entry_points() -> Vec<EntryPoint<Self>> {
            vec![EntryPoint::run("bench_noop", |_| Ok(()))]
        }
    }

    struct Failing;

    impl Benchmark for Failing {
        const NAME: &'static str = "Failing_bench";
        type Param = &'static str;

        fn param_grid() -> ParamGrid<&'static str> {
            ParamGrid::new().axis("representation", vec!["dense", "unknown"])
        }

        fn setup(params: &[&'static str], _: &Common<'_>) -> Result<Self> {
            match params {
                ["dense"] => Ok(Failing),
                other => Err(Error::InvalidParams(format!("{:?}", other))),
            }
        }

        fn entry_points() -> Vec<EntryPoint<Self>> {
            vec![EntryPoint::track("track_one", |_| Ok(1))]
        }
    }

    fn runner(params: HarnessParams) -> Runner {
        Runner::new(params.check_unwrap()).unwrap()
    }

    #[test]
    fn setup_runs_once_per_entry_and_combination() {
        let runner = runner(HarnessParams::new().repeat(3).warmup(2).n_jobs(vec![1, 2]));
        let results = runner.run::<Counting>().unwrap();

        // 6 combinations, 2 n_jobs values, 2 entry points
        assert_eq!(results.len(), 24);
        assert_eq!(SETUPS.with(Cell::get), 24);
        // 12 timed measurements of 2 warm-up and 3 timed calls each
        assert_eq!(TIMED_CALLS.load(Ordering::SeqCst), 60);

        let last = results.last().unwrap();
        assert_eq!(last.entry, "track_value");
        assert_eq!(last.params, vec!["2", "30"]);
        assert_eq!(last.n_jobs, 2);
        assert_eq!(last.outcome, Outcome::Track { value: 62 });

        for result in results.iter().filter(|r| r.kind == MeasureKind::Time) {
            match &result.outcome {
                Outcome::Time(stats) => assert_eq!(stats.samples, 3),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn filter_selects_entry_points() {
        let runner = runner(HarnessParams::new().bench_filter(Some("Counting_bench.track_".into())));
        let results = runner.run::<Counting>().unwrap();

        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.kind == MeasureKind::Track));
        assert!(runner.selects("Counting_bench", "track_value"));
        assert!(!runner.selects("Counting_bench", "time_noop"));
    }

    #[test]
    fn misnamed_entry_points_are_rejected_before_setup() {
        let res = runner(HarnessParams::new()).run::<Misnamed>();
        assert!(matches!(res, Err(Error::InvalidEntryPoint { .. })));
    }

    #[test]
    fn setup_failures_propagate() {
        let res = runner(HarnessParams::new()).run::<Failing>();
        assert!(matches!(res, Err(Error::InvalidParams(_))));
    }
}
