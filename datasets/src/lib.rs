//! `linfa-bench-datasets` provides the two fixed datasets used by the clustering benchmarks.
//!
//! ## The Big Picture
//!
//! The benchmarks exercise k-means in two regimes which stress different parts of the
//! algorithm:
//!
//! * [`china`] : colour pixels of a photograph, many observations with three features
//! * [`newsgroups`] : TF-IDF vectors of Usenet posts, few observations with thousands of mostly
//!   empty features
//!
//! Both loaders are deterministic for a given source, size and seed, so repeated benchmark runs
//! see matrices of identical shape and content.
//!
//! ## Using a dataset
//!
//! ```ignore
//! use linfa_bench_datasets::{china, ChinaSource};
//!
//! let pixels = china(&ChinaSource::Synthetic, Some(10_000), 0)?;
//! assert_eq!(pixels.ncols(), 3);
//! ```

mod china;
mod dataset;
pub mod error;
mod newsgroups;

pub use china::{china, ChinaSource, HEIGHT, N_CHANNELS, WIDTH};
pub use dataset::{array_from_csv, array_from_gz_csv, array_from_path};
pub use error::{DatasetError, Result};
pub use newsgroups::{newsgroups, NewsgroupsSource, TextDataset, CATEGORIES, DEFAULT_DOCUMENTS};
