//! The clustering benchmark suites.
//!
//! * [`KMeansBench`] fits k-means on dense pixels and sparse text, either for a fixed number
//!   of iterations or until convergence
//! * [`KMeansPlusPlusBench`] measures the k-means++ seeding on the pixels
use std::fmt;

use crate::error::Result;
use crate::harness::{Benchmark, BenchmarkResult, Runner};

mod k_means;
mod k_means_plus_plus;

pub use k_means::{
    Algorithm, KMeansBench, KMeansCase, KMeansSettings, Representation, DENSE_CLUSTERS,
    FIXED_ITERATIONS, MAX_ITERATIONS, SPARSE_CLUSTERS, TOLERANCE,
};
pub use k_means_plus_plus::KMeansPlusPlusBench;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Suite {
    KMeans,
    KMeansPlusPlus,
}

impl Suite {
    pub const ALL: [Suite; 2] = [Suite::KMeans, Suite::KMeansPlusPlus];

    pub fn name(&self) -> &'static str {
        match self {
            Suite::KMeans => KMeansBench::NAME,
            Suite::KMeansPlusPlus => KMeansPlusPlusBench::NAME,
        }
    }

    pub fn run(&self, runner: &Runner) -> Result<Vec<BenchmarkResult>> {
        match self {
            Suite::KMeans => runner.run::<KMeansBench>(),
            Suite::KMeansPlusPlus => runner.run::<KMeansPlusPlusBench>(),
        }
    }

    pub fn describe(&self) -> SuiteDescription {
        match self {
            Suite::KMeans => SuiteDescription::of::<KMeansBench>(),
            Suite::KMeansPlusPlus => SuiteDescription::of::<KMeansPlusPlusBench>(),
        }
    }
}

/// Axes and entry points of a suite, as printed by `--list`
#[derive(Clone, Debug, PartialEq)]
pub struct SuiteDescription {
    pub name: &'static str,
    pub axes: Vec<(&'static str, Vec<String>)>,
    pub entry_points: Vec<&'static str>,
}

impl SuiteDescription {
    fn of<B: Benchmark>() -> Self {
        SuiteDescription {
            name: B::NAME,
            axes: B::param_grid()
                .axes()
                .iter()
                .map(|axis| {
                    let values = axis.values().iter().map(ToString::to_string).collect();
                    (axis.name(), values)
                })
                .collect(),
            entry_points: B::entry_points().iter().map(|e| e.name()).collect(),
        }
    }
}

impl fmt::Display for SuiteDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (name, values) in &self.axes {
            writeln!(f, "  {}: {}", name, values.join(" | "))?;
        }
        for entry in &self.entry_points {
            writeln!(f, "  - {}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suites_are_described() {
        let description = Suite::KMeans.describe();
        assert_eq!(description.name, "KMeans_bench");
        assert_eq!(
            description.axes,
            vec![(
                "params",
                vec![
                    "(dense, lloyd)".to_string(),
                    "(dense, minibatch)".to_string(),
                    "(sparse, lloyd)".to_string()
                ]
            )]
        );
        assert_eq!(description.entry_points.len(), 6);

        let description = Suite::KMeansPlusPlus.describe();
        assert!(description.axes.is_empty());
        assert_eq!(
            description.entry_points,
            vec!["time_kmeansplusplus", "peakmem_kmeansplusplus"]
        );
    }

    #[test]
    fn names_are_unique() {
        assert_ne!(Suite::ALL[0].name(), Suite::ALL[1].name());
    }
}
