use std::sync::Arc;

use linfa::traits::FitWith;
use linfa::{DatasetBase, ParamGuard};
use linfa_clustering::{IncrKMeansError, KMeans, KMeansInit};
use ndarray::Array2;
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;

use super::k_means::DENSE_CLUSTERS;
use crate::error::{Error, Result};
use crate::harness::{Benchmark, Common, EntryPoint, ParamGrid};

/// Benchmarks of the k-means++ seeding alone, on the colour pixels.
///
/// The seeding routine is only reachable through a fit, so the measured call is a single
/// incremental update over the whole dataset. Seeding 64 centroids takes 64 distance passes
/// over the pixels, the update that follows takes one.
#[derive(Debug)]
pub struct KMeansPlusPlusBench {
    pixels: Arc<Array2<f64>>,
    n_clusters: usize,
    seed: u64,
}

impl KMeansPlusPlusBench {
    pub fn time_kmeansplusplus(&self) -> Result<()> {
        self.seed_centroids().map(|_| ())
    }

    pub fn peakmem_kmeansplusplus(&self) -> Result<()> {
        self.seed_centroids().map(|_| ())
    }

    /// Centroids seeded with k-means++ and moved by one update
    pub fn seed_centroids(&self) -> Result<Array2<f64>> {
        let params = KMeans::params_with_rng(self.n_clusters, Isaac64Rng::seed_from_u64(self.seed))
            .n_runs(1)
            .init_method(KMeansInit::KMeansPlusPlus)
            .check()?;
        let dataset = DatasetBase::from(self.pixels.view());

        let model = match params.fit_with(None, &dataset) {
            Ok(model) | Err(IncrKMeansError::NotConverged(model)) => model,
            Err(err) => return Err(Error::IncrementalFit(err.to_string())),
        };
        Ok(model.centroids().to_owned())
    }
}

impl Benchmark for KMeansPlusPlusBench {
    const NAME: &'static str = "KMeansPlusPlus_bench";
    type Param = &'static str;

    fn param_grid() -> ParamGrid<&'static str> {
        ParamGrid::new()
    }

    fn setup(params: &[&'static str], common: &Common<'_>) -> Result<Self> {
        if !params.is_empty() {
            return Err(Error::InvalidParams(format!(
                "expected no parameters, got {:?}",
                params
            )));
        }

        let pixels = common.datasets.china()?;
        if pixels.nrows() < DENSE_CLUSTERS {
            return Err(Error::InvalidParams(format!(
                "{} samples cannot seed {} clusters",
                pixels.nrows(),
                DENSE_CLUSTERS
            )));
        }

        Ok(KMeansPlusPlusBench {
            pixels,
            n_clusters: DENSE_CLUSTERS,
            seed: common.seed,
        })
    }

    fn entry_points() -> Vec<EntryPoint<Self>> {
        vec![
            EntryPoint::run(
                "time_kmeansplusplus",
                KMeansPlusPlusBench::time_kmeansplusplus,
            ),
            EntryPoint::run(
                "peakmem_kmeansplusplus",
                KMeansPlusPlusBench::peakmem_kmeansplusplus,
            ),
        ]
    }
}
