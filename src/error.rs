//! Error types in linfa-bench
//!

use linfa_bench_datasets::DatasetError;
use linfa_clustering::{KMeansError, KMeansParamsError};
use thiserror::Error;

use crate::config::HarnessParamsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid harness parameters: {0}")]
    HarnessParams(#[from] HarnessParamsError),
    #[error("invalid benchmark parameters: {0}")]
    InvalidParams(String),
    #[error("invalid entry point `{name}`: {reason}")]
    InvalidEntryPoint { name: String, reason: String },
    #[error("peak memory requested but no tracking allocator is installed")]
    AllocatorNotInstalled,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    KMeans(#[from] KMeansError),
    #[error("incremental k-means failed: {0}")]
    IncrementalFit(String),
    #[error(transparent)]
    KMeansParams(#[from] KMeansParamsError),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
