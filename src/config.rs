use std::path::PathBuf;

use linfa::ParamGuard;
use linfa_bench_datasets::{ChinaSource, NewsgroupsSource};
use regex::Regex;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use thiserror::Error;

/// An error when running the harness with an invalid setting
#[derive(Error, Debug, Clone)]
pub enum HarnessParamsError {
    #[error("repeat cannot be 0")]
    Repeat,
    #[error("at least one n_jobs value is required")]
    EmptyNJobs,
    #[error("n_jobs cannot be 0")]
    NJobs,
    #[error("batch_size cannot be 0")]
    BatchSize,
    #[error("china_samples cannot be 0")]
    ChinaSamples,
    #[error("newsgroups_documents cannot be 0")]
    NewsgroupsDocuments,
    #[error("invalid benchmark filter: {0}")]
    BenchFilter(#[from] regex::Error),
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The checked settings of a benchmark run.
pub struct HarnessValidParams {
    /// Number of timed calls of every `time_*` entry point
    repeat: usize,
    /// Number of untimed calls before the timed ones
    warmup: usize,
    /// Degrees of parallelism, every combination runs once per value
    n_jobs: Vec<usize>,
    /// Seed of every random number generator, the `random_state` of the benchmarks
    seed: u64,
    /// Only entry points whose `<suite>.<entry>` name matches are run
    bench_filter: Option<String>,
    /// Batch size of the mini-batch k-means variant
    batch_size: usize,
    /// Pixel file replacing the built-in picture
    china_csv: Option<PathBuf>,
    /// Number of pixels kept, all of them when `None`
    china_samples: Option<usize>,
    /// Directory of posts replacing the generated corpus
    newsgroups_dir: Option<PathBuf>,
    /// Number of posts kept
    newsgroups_documents: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// A helper struct used to construct a set of [valid settings](HarnessValidParams) for the
/// [runner](crate::harness::Runner) (using the builder pattern).
pub struct HarnessParams(HarnessValidParams);

impl Default for HarnessParams {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessParams {
    /// Defaults are provided for every setting:
    /// * `repeat = 5`
    /// * `warmup = 1`
    /// * `n_jobs = [1]`
    /// * `seed = 0`
    /// * `batch_size = 1024`
    /// * the built-in picture with all of its pixels
    /// * 2000 generated posts
    pub fn new() -> Self {
        Self(HarnessValidParams {
            repeat: 5,
            warmup: 1,
            n_jobs: vec![1],
            seed: 0,
            bench_filter: None,
            batch_size: 1024,
            china_csv: None,
            china_samples: None,
            newsgroups_dir: None,
            newsgroups_documents: 2000,
        })
    }

    pub fn repeat(mut self, repeat: usize) -> Self {
        self.0.repeat = repeat;
        self
    }

    pub fn warmup(mut self, warmup: usize) -> Self {
        self.0.warmup = warmup;
        self
    }

    pub fn n_jobs(mut self, n_jobs: Vec<usize>) -> Self {
        self.0.n_jobs = n_jobs;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Regular expression matched against `<suite>.<entry>`
    pub fn bench_filter(mut self, filter: Option<String>) -> Self {
        self.0.bench_filter = filter;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.0.batch_size = batch_size;
        self
    }

    pub fn china_csv(mut self, path: Option<PathBuf>) -> Self {
        self.0.china_csv = path;
        self
    }

    pub fn china_samples(mut self, n_samples: Option<usize>) -> Self {
        self.0.china_samples = n_samples;
        self
    }

    pub fn newsgroups_dir(mut self, path: Option<PathBuf>) -> Self {
        self.0.newsgroups_dir = path;
        self
    }

    pub fn newsgroups_documents(mut self, n_documents: usize) -> Self {
        self.0.newsgroups_documents = n_documents;
        self
    }
}

impl ParamGuard for HarnessParams {
    type Checked = HarnessValidParams;
    type Error = HarnessParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.repeat == 0 {
            Err(HarnessParamsError::Repeat)
        } else if self.0.n_jobs.is_empty() {
            Err(HarnessParamsError::EmptyNJobs)
        } else if self.0.n_jobs.contains(&0) {
            Err(HarnessParamsError::NJobs)
        } else if self.0.batch_size == 0 {
            Err(HarnessParamsError::BatchSize)
        } else if self.0.china_samples == Some(0) {
            Err(HarnessParamsError::ChinaSamples)
        } else if self.0.newsgroups_documents == 0 {
            Err(HarnessParamsError::NewsgroupsDocuments)
        } else {
            if let Some(filter) = &self.0.bench_filter {
                Regex::new(filter)?;
            }
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl HarnessValidParams {
    pub fn repeat(&self) -> usize {
        self.repeat
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn n_jobs(&self) -> &[usize] {
        &self.n_jobs
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn bench_filter(&self) -> Option<&str> {
        self.bench_filter.as_deref()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn china_source(&self) -> ChinaSource {
        match &self.china_csv {
            Some(path) => ChinaSource::Csv(path.clone()),
            None => ChinaSource::Synthetic,
        }
    }

    pub fn china_samples(&self) -> Option<usize> {
        self.china_samples
    }

    pub fn newsgroups_source(&self) -> NewsgroupsSource {
        match &self.newsgroups_dir {
            Some(path) => NewsgroupsSource::Directory(path.clone()),
            None => NewsgroupsSource::Synthetic,
        }
    }

    pub fn newsgroups_documents(&self) -> usize {
        self.newsgroups_documents
    }
}
