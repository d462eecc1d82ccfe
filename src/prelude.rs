//! linfa-bench prelude.
//!
//! This module contains the types needed to configure and run the suites, to import them as a
//! group.
//!

#[doc(no_inline)]
pub use crate::error::{Error, Result};

#[doc(no_inline)]
pub use crate::config::{HarnessParams, HarnessParamsError, HarnessValidParams};

#[doc(no_inline)]
pub use crate::harness::{
    Benchmark, BenchmarkResult, Common, EntryPoint, MeasureKind, Outcome, ParamGrid, Runner,
    TimingStats,
};

#[doc(no_inline)]
pub use crate::suites::{KMeansBench, KMeansPlusPlusBench, Suite};
