//! The benchmark contract.
//!
//! A suite implements [`Benchmark`]: it declares a [`ParamGrid`], builds itself once per
//! parameter combination in [`Benchmark::setup`] and exposes measurement [`EntryPoint`]s whose
//! name prefix selects what is measured:
//!
//! * `time_*` : wall-clock time of the call
//! * `peakmem_*` : peak heap usage during the call
//! * `track_*` : a number returned by the call
//!
//! The [`Runner`] walks the grid and calls `setup` anew before every entry point, so entry
//! points never observe state left behind by another measurement.
use std::fmt;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::datasets::Datasets;
use crate::error::{Error, Result};

mod grid;
mod report;
mod runner;

pub use grid::{Axis, Combination, ParamGrid};
pub use report::{BenchmarkResult, Outcome, TimingStats};
pub use runner::Runner;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeasureKind {
    Time,
    PeakMem,
    Track,
}

impl MeasureKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MeasureKind::Time => "time_",
            MeasureKind::PeakMem => "peakmem_",
            MeasureKind::Track => "track_",
        }
    }

    /// Kind selected by the prefix of an entry point name
    pub fn from_entry_name(name: &str) -> Option<Self> {
        [MeasureKind::Time, MeasureKind::PeakMem, MeasureKind::Track]
            .iter()
            .copied()
            .find(|kind| name.starts_with(kind.prefix()) && name.len() > kind.prefix().len())
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('_'))
    }
}

/// Global parameters shared by every combination of a run
#[derive(Clone, Copy, Debug)]
pub struct Common<'a> {
    /// Degree of parallelism granted to the measured routine
    pub n_jobs: usize,
    pub seed: u64,
    /// Rows per batch of incremental algorithms
    pub batch_size: usize,
    pub datasets: &'a Datasets,
}

pub enum EntryBody<B> {
    Run(fn(&B) -> Result<()>),
    Track(fn(&B) -> Result<u64>),
}

impl<B> Clone for EntryBody<B> {
    fn clone(&self) -> Self {
        match self {
            EntryBody::Run(f) => EntryBody::Run(*f),
            EntryBody::Track(f) => EntryBody::Track(*f),
        }
    }
}

/// A named measurement of a suite
pub struct EntryPoint<B> {
    name: &'static str,
    body: EntryBody<B>,
}

impl<B> Clone for EntryPoint<B> {
    fn clone(&self) -> Self {
        EntryPoint {
            name: self.name,
            body: self.body.clone(),
        }
    }
}

impl<B> fmt::Debug for EntryPoint<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("name", &self.name)
            .finish()
    }
}

impl<B> EntryPoint<B> {
    /// A `time_*` or `peakmem_*` entry point
    pub fn run(name: &'static str, f: fn(&B) -> Result<()>) -> Self {
        EntryPoint {
            name,
            body: EntryBody::Run(f),
        }
    }

    /// A `track_*` entry point
    pub fn track(name: &'static str, f: fn(&B) -> Result<u64>) -> Self {
        EntryPoint {
            name,
            body: EntryBody::Track(f),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn body(&self) -> &EntryBody<B> {
        &self.body
    }

    /// The kind selected by the name, checked against the body
    pub fn kind(&self) -> Result<MeasureKind> {
        let invalid = |reason: &str| Error::InvalidEntryPoint {
            name: self.name.to_string(),
            reason: reason.to_string(),
        };

        match (MeasureKind::from_entry_name(self.name), &self.body) {
            (None, _) => Err(invalid(
                "name has to start with `time_`, `peakmem_` or `track_`",
            )),
            (Some(MeasureKind::Track), EntryBody::Run(_)) => {
                Err(invalid("`track_` entry points have to return a value"))
            }
            (Some(kind), EntryBody::Track(_)) if kind != MeasureKind::Track => {
                Err(invalid("only `track_` entry points return a value"))
            }
            (Some(kind), _) => Ok(kind),
        }
    }
}

/// A benchmark suite.
///
/// `setup` receives one value per axis of [`Benchmark::param_grid`], in axis order, followed
/// by the global parameters.
pub trait Benchmark: Sized + Sync {
    /// Name of the suite in reports
    const NAME: &'static str;

    /// Value type of the grid axes
    type Param: Clone + fmt::Display;

    fn param_grid() -> ParamGrid<Self::Param>;

    fn setup(params: &[Self::Param], common: &Common<'_>) -> Result<Self>;

    fn entry_points() -> Vec<EntryPoint<Self>>;
}
