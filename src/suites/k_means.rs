use std::fmt;
use std::sync::Arc;

use linfa::traits::{Fit, FitWith};
use linfa::{DatasetBase, ParamGuard};
use linfa_clustering::{IncrKMeansError, KMeans, KMeansError, KMeansInit, KMeansParams};
use linfa_nn::distance::{Distance, L2Dist};
use ndarray::{s, Array2, ArrayView2};
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use tracing::debug;

use crate::datasets::TextRecords;
use crate::error::{Error, Result};
use crate::harness::{Benchmark, Common, EntryPoint, ParamGrid};

/// Number of clusters searched in the pixels
pub const DENSE_CLUSTERS: usize = 64;
/// Number of clusters searched in the posts, one per group
pub const SPARSE_CLUSTERS: usize = 20;

/// Iteration budget of the `*_iterations` entry points
pub const FIXED_ITERATIONS: u64 = 10;
/// Iteration budget of the `*_convergence` entry points
pub const MAX_ITERATIONS: u64 = 300;
/// Convergence threshold of the `*_convergence` entry points
pub const TOLERANCE: f64 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Representation {
    Dense,
    Sparse,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Dense => f.write_str("dense"),
            Representation::Sparse => f.write_str("sparse"),
        }
    }
}

/// Variant of the k-means algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Batch updates over the whole dataset
    Lloyd,
    /// Incremental updates, one batch of rows per iteration
    MiniBatch,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Lloyd => f.write_str("lloyd"),
            Algorithm::MiniBatch => f.write_str("minibatch"),
        }
    }
}

/// One value of the `params` axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KMeansCase {
    pub representation: Representation,
    pub algorithm: Algorithm,
}

impl KMeansCase {
    pub fn new(representation: Representation, algorithm: Algorithm) -> Self {
        KMeansCase {
            representation,
            algorithm,
        }
    }
}

impl fmt::Display for KMeansCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.representation, self.algorithm)
    }
}

/// Settings handed to the clustering routine
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansSettings {
    pub n_clusters: usize,
    pub algorithm: Algorithm,
    pub n_runs: usize,
    pub n_jobs: usize,
    pub seed: u64,
    pub batch_size: usize,
}

/// When a fit stops
#[derive(Clone, Debug)]
struct Regime {
    init: KMeansInit<f64>,
    max_n_iterations: u64,
    tolerance: f64,
}

impl Regime {
    /// Random centroids and a budget of [`FIXED_ITERATIONS`]. The tolerance is the smallest
    /// accepted one, so only a fit whose centroids stop moving ends early.
    fn fixed_iterations() -> Self {
        Regime {
            init: KMeansInit::Random,
            max_n_iterations: FIXED_ITERATIONS,
            tolerance: f64::MIN_POSITIVE,
        }
    }

    /// k-means++ centroids, run until the centroids move less than [`TOLERANCE`]
    fn convergence() -> Self {
        Regime {
            init: KMeansInit::KMeansPlusPlus,
            max_n_iterations: MAX_ITERATIONS,
            tolerance: TOLERANCE,
        }
    }
}

#[derive(Debug)]
enum Observations {
    Pixels(Arc<Array2<f64>>),
    Posts(Arc<TextRecords>),
}

impl Observations {
    fn view(&self) -> ArrayView2<'_, f64> {
        match self {
            Observations::Pixels(pixels) => pixels.view(),
            Observations::Posts(posts) => posts.dense.view(),
        }
    }
}

/// Benchmarks of a complete k-means fit.
///
/// Dense input are the colour pixels searched for 64 clusters, sparse input the TF-IDF vectors
/// of the posts searched for 20 clusters. The clustering routine only accepts dense records,
/// so the posts are densified once when the dataset is loaded.
#[derive(Debug)]
pub struct KMeansBench {
    observations: Observations,
    settings: KMeansSettings,
}

impl KMeansBench {
    pub fn settings(&self) -> &KMeansSettings {
        &self.settings
    }

    pub fn time_iterations(&self) -> Result<()> {
        self.fit(&Regime::fixed_iterations())
    }

    pub fn peakmem_iterations(&self) -> Result<()> {
        self.fit(&Regime::fixed_iterations())
    }

    pub fn track_iterations(&self) -> Result<u64> {
        self.iterations(&Regime::fixed_iterations())
    }

    pub fn time_convergence(&self) -> Result<()> {
        self.fit(&Regime::convergence())
    }

    pub fn peakmem_convergence(&self) -> Result<()> {
        self.fit(&Regime::convergence())
    }

    pub fn track_convergence(&self) -> Result<u64> {
        self.iterations(&Regime::convergence())
    }

    fn params(
        &self,
        init: KMeansInit<f64>,
        max_n_iterations: u64,
        tolerance: f64,
    ) -> KMeansParams<f64, Isaac64Rng, L2Dist> {
        KMeans::params_with_rng(
            self.settings.n_clusters,
            Isaac64Rng::seed_from_u64(self.settings.seed),
        )
        .n_runs(self.settings.n_runs)
        .init_method(init)
        .max_n_iterations(max_n_iterations)
        .tolerance(tolerance)
    }

    fn fit(&self, regime: &Regime) -> Result<()> {
        debug!(
            algorithm = %self.settings.algorithm,
            n_clusters = self.settings.n_clusters,
            n_jobs = self.settings.n_jobs,
            "fitting"
        );
        match self.settings.algorithm {
            Algorithm::Lloyd => {
                self.fit_lloyd(
                    regime.init.clone(),
                    regime.max_n_iterations,
                    regime.tolerance,
                )?;
            }
            Algorithm::MiniBatch => {
                let (n_iter, converged) = self.fit_minibatch(regime)?;
                debug!(n_iter, converged, "mini-batch fit done");
            }
        }
        Ok(())
    }

    /// Number of iterations the fit runs before stopping
    fn iterations(&self, regime: &Regime) -> Result<u64> {
        match self.settings.algorithm {
            Algorithm::Lloyd => self.lloyd_iterations(regime),
            Algorithm::MiniBatch => Ok(self.fit_minibatch(regime)?.0),
        }
    }

    /// Centroids of a batch fit stopped after at most `max_n_iterations`
    fn fit_lloyd(
        &self,
        init: KMeansInit<f64>,
        max_n_iterations: u64,
        tolerance: f64,
    ) -> Result<Array2<f64>> {
        let dataset = DatasetBase::from(self.observations.view());
        let fitted: std::result::Result<_, KMeansError> = self
            .params(init, max_n_iterations, tolerance)
            .fit(&dataset);
        Ok(fitted?.centroids().to_owned())
    }

    /// The batch fit does not report its iteration count, so it is replayed one iteration at a
    /// time. Between iterations the fit only carries its centroids, so restarting from the
    /// previous centroids continues the same trajectory. The initial centroids are drawn inside
    /// the first step and never observed, that step always counts.
    fn lloyd_iterations(&self, regime: &Regime) -> Result<u64> {
        let mut centroids = self.fit_lloyd(regime.init.clone(), 1, regime.tolerance)?;
        let mut n_iter = 1;

        while n_iter < regime.max_n_iterations {
            let next = self.fit_lloyd(
                KMeansInit::Precomputed(centroids.clone()),
                1,
                regime.tolerance,
            )?;
            n_iter += 1;

            let shift = L2Dist.distance(centroids.view(), next.view());
            centroids = next;
            if shift < regime.tolerance {
                break;
            }
        }

        Ok(n_iter)
    }

    /// Run one incremental update per batch of rows, cycling through the dataset, until
    /// convergence or the iteration budget is spent. Returns the number of updates and whether
    /// the fit converged.
    fn fit_minibatch(&self, regime: &Regime) -> Result<(u64, bool)> {
        let max_n_iterations = regime.max_n_iterations;
        let params = self
            .params(regime.init.clone(), max_n_iterations, regime.tolerance)
            .check()?;
        let observations = self.observations.view();
        let n_samples = observations.nrows();
        let batch_size = self.settings.batch_size.min(n_samples);

        let mut model = None;
        for iteration in 0..max_n_iterations {
            let start = (iteration as usize * batch_size) % n_samples;
            let end = (start + batch_size).min(n_samples);
            let batch = DatasetBase::from(observations.slice(s![start..end, ..]));

            match params.fit_with(model.take(), &batch) {
                Ok(_) => return Ok((iteration + 1, true)),
                Err(IncrKMeansError::NotConverged(partial)) => model = Some(partial),
                Err(err) => return Err(Error::IncrementalFit(err.to_string())),
            }
        }

        Ok((max_n_iterations, false))
    }
}

impl Benchmark for KMeansBench {
    const NAME: &'static str = "KMeans_bench";
    type Param = KMeansCase;

    fn param_grid() -> ParamGrid<KMeansCase> {
        use Algorithm::*;
        use Representation::*;

        ParamGrid::new().axis(
            "params",
            vec![
                KMeansCase::new(Dense, Lloyd),
                KMeansCase::new(Dense, MiniBatch),
                KMeansCase::new(Sparse, Lloyd),
            ],
        )
    }

    fn setup(params: &[KMeansCase], common: &Common<'_>) -> Result<Self> {
        let case = match params {
            [case] => *case,
            other => {
                return Err(Error::InvalidParams(format!(
                    "expected a single `params` value, got {}",
                    other.len()
                )))
            }
        };

        let (observations, n_clusters) = match case.representation {
            Representation::Dense => (
                Observations::Pixels(common.datasets.china()?),
                DENSE_CLUSTERS,
            ),
            Representation::Sparse => (
                Observations::Posts(common.datasets.newsgroups()?),
                SPARSE_CLUSTERS,
            ),
        };

        let n_samples = observations.view().nrows();
        if n_samples < n_clusters {
            return Err(Error::InvalidParams(format!(
                "{} samples cannot form {} clusters",
                n_samples, n_clusters
            )));
        }
        if case.algorithm == Algorithm::MiniBatch && common.batch_size < n_clusters {
            return Err(Error::InvalidParams(format!(
                "batches of {} rows cannot seed {} clusters",
                common.batch_size, n_clusters
            )));
        }

        Ok(KMeansBench {
            observations,
            settings: KMeansSettings {
                n_clusters,
                algorithm: case.algorithm,
                n_runs: 1,
                n_jobs: common.n_jobs,
                seed: common.seed,
                batch_size: common.batch_size,
            },
        })
    }

    fn entry_points() -> Vec<EntryPoint<Self>> {
        vec![
            EntryPoint::run("time_iterations", KMeansBench::time_iterations),
            EntryPoint::run("peakmem_iterations", KMeansBench::peakmem_iterations),
            EntryPoint::track("track_iterations", KMeansBench::track_iterations),
            EntryPoint::run("time_convergence", KMeansBench::time_convergence),
            EntryPoint::run("peakmem_convergence", KMeansBench::peakmem_convergence),
            EntryPoint::track("track_convergence", KMeansBench::track_convergence),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessParams;
    use crate::harness::{MeasureKind, Outcome, Runner};
    use approx::assert_abs_diff_eq;

    fn runner(filter: &str) -> Runner {
        Runner::new(
            HarnessParams::new()
                .china_samples(Some(1000))
                .newsgroups_documents(60)
                .batch_size(256)
                .repeat(1)
                .warmup(0)
                .bench_filter(Some(filter.to_string()))
                .check_unwrap(),
        )
        .unwrap()
    }

    fn setup(runner: &Runner, case: KMeansCase) -> KMeansBench {
        KMeansBench::setup(&[case], &runner.common(1)).unwrap()
    }

    #[test]
    fn grid_matches_the_declared_cases() {
        let grid = KMeansBench::param_grid();
        assert_eq!(grid.names(), vec!["params"]);
        assert_eq!(
            grid.combinations()
                .iter()
                .map(|c| c[0].to_string())
                .collect::<Vec<_>>(),
            vec!["(dense, lloyd)", "(dense, minibatch)", "(sparse, lloyd)"]
        );
    }

    #[test]
    fn entry_point_names_are_valid() {
        for entry in KMeansBench::entry_points() {
            assert!(entry.kind().is_ok(), "{}", entry.name());
        }
    }

    #[test]
    fn setup_selects_dataset_and_clusters() {
        let runner = runner(".*");
        let dense = setup(&runner, KMeansCase::new(Representation::Dense, Algorithm::Lloyd));
        assert_eq!(dense.settings().n_clusters, DENSE_CLUSTERS);
        assert_eq!(dense.settings().n_runs, 1);
        assert_eq!(dense.settings().n_jobs, 1);
        assert_eq!(dense.observations.view().dim(), (1000, 3));

        let sparse = setup(&runner, KMeansCase::new(Representation::Sparse, Algorithm::Lloyd));
        assert_eq!(sparse.settings().n_clusters, SPARSE_CLUSTERS);
        assert_eq!(sparse.observations.view().nrows(), 60);
    }

    #[test]
    fn setup_expects_one_value() {
        let runner = runner(".*");
        let res = KMeansBench::setup(&[], &runner.common(1));
        assert!(matches!(res, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn small_batches_are_rejected() {
        let runner = Runner::new(
            HarnessParams::new()
                .china_samples(Some(1000))
                .batch_size(16)
                .check_unwrap(),
        )
        .unwrap();
        let case = KMeansCase::new(Representation::Dense, Algorithm::MiniBatch);
        let res = KMeansBench::setup(&[case], &runner.common(1));
        assert!(matches!(res, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn iteration_counts_are_bounded_and_reproducible() {
        let runner = runner(".*");
        for case in KMeansBench::param_grid().combinations() {
            let bench = setup(&runner, case[0]);

            let iterations = bench.track_iterations().unwrap();
            assert!((1..=FIXED_ITERATIONS).contains(&iterations), "{}", case[0]);
            assert_eq!(bench.track_iterations().unwrap(), iterations);

            let convergence = bench.track_convergence().unwrap();
            assert!((1..=MAX_ITERATIONS).contains(&convergence), "{}", case[0]);
            assert_eq!(bench.track_convergence().unwrap(), convergence);
        }
    }

    #[test]
    fn lloyd_count_matches_stepped_fits() {
        let runner = runner(".*");
        let bench = setup(&runner, KMeansCase::new(Representation::Dense, Algorithm::Lloyd));
        let dataset = DatasetBase::from(bench.observations.view());

        let fit = |init: KMeansInit<f64>, max_n_iterations: u64| -> Array2<f64> {
            let fitted: std::result::Result<_, KMeansError> =
                KMeans::params_with_rng(DENSE_CLUSTERS, Isaac64Rng::seed_from_u64(0))
                    .n_runs(1)
                    .init_method(init)
                    .max_n_iterations(max_n_iterations)
                    .tolerance(TOLERANCE)
                    .fit(&dataset);
            fitted.unwrap().centroids().to_owned()
        };

        let mut centroids = fit(KMeansInit::KMeansPlusPlus, 1);
        let mut steps = 1;
        while steps < MAX_ITERATIONS {
            let next = fit(KMeansInit::Precomputed(centroids.clone()), 1);
            steps += 1;
            let shift = L2Dist.distance(centroids.view(), next.view());
            centroids = next;
            if shift < TOLERANCE {
                break;
            }
        }

        assert!(steps > 1);
        assert_eq!(bench.track_convergence().unwrap(), steps);
        // one fit with that budget ends on the stepped centroids
        assert_abs_diff_eq!(
            fit(KMeansInit::KMeansPlusPlus, steps),
            centroids,
            epsilon = 1e-9
        );
    }

    #[test]
    fn lloyd_counts_more_than_one_iteration() {
        let runner = runner(".*");
        let bench = setup(&runner, KMeansCase::new(Representation::Dense, Algorithm::Lloyd));

        assert!(bench.track_iterations().unwrap() > 1);
        assert!(bench.track_convergence().unwrap() > 1);
    }

    #[test]
    fn minibatch_runs_the_full_budget_without_tolerance() {
        let runner = runner(".*");
        let bench = setup(
            &runner,
            KMeansCase::new(Representation::Dense, Algorithm::MiniBatch),
        );
        // with 1000 rows and batches of 256 the centroids keep moving between batches
        assert_eq!(bench.track_iterations().unwrap(), FIXED_ITERATIONS);
    }

    #[test]
    fn timed_fits_succeed() {
        let runner = runner(".*");
        let bench = setup(&runner, KMeansCase::new(Representation::Dense, Algorithm::Lloyd));
        bench.time_iterations().unwrap();
        bench.time_convergence().unwrap();
    }

    #[test]
    fn runner_tracks_every_case() {
        let runner = runner("KMeans_bench.track_iterations");
        let results = runner.run::<KMeansBench>().unwrap();

        assert_eq!(results.len(), 3);
        for result in results {
            assert_eq!(result.kind, MeasureKind::Track);
            assert!(matches!(result.outcome, Outcome::Track { value } if value >= 1));
        }
    }
}
