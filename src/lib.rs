//! `linfa-bench` measures the k-means implementation of
//! [`linfa-clustering`](https://docs.rs/linfa-clustering).
//!
//! Two suites are provided:
//!
//! * `KMeans_bench` fits k-means on the colour pixels of a picture (dense) and on the TF-IDF
//!   vectors of newsgroup posts (sparse), for a fixed budget of 10 iterations and until
//!   convergence
//! * `KMeansPlusPlus_bench` seeds 64 centroids on the pixels with k-means++
//!
//! Every suite declares a grid of parameters and a list of entry points. The prefix of an entry
//! point selects what is measured: `time_*` entry points are timed, `peakmem_*` entry points
//! report the peak heap usage of a call and `track_*` entry points return a number of
//! iterations.
//!
//! ```no_run
//! use linfa::ParamGuard;
//! use linfa_bench::prelude::*;
//!
//! let params = HarnessParams::new()
//!     .n_jobs(vec![1, 4])
//!     .bench_filter(Some("track_".to_string()))
//!     .check()?;
//! let runner = Runner::new(params)?;
//!
//! for suite in Suite::ALL.iter() {
//!     for result in suite.run(&runner)? {
//!         println!("{}", result);
//!     }
//! }
//! # Ok::<(), linfa_bench::Error>(())
//! ```
//!
//! Peak memory is read from a [`memory::TrackingAllocator`], which has to be installed as the
//! global allocator of the binary running the suites.

#[cfg(feature = "benchmarks")]
pub mod benchmarks;
pub mod config;
pub mod datasets;
pub mod error;
pub mod harness;
pub mod memory;
pub mod prelude;
pub mod suites;

pub use error::{Error, Result};
