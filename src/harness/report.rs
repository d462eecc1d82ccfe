use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::MeasureKind;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// Summary of the timed calls of a `time_*` entry point, in seconds
pub struct TimingStats {
    pub samples: usize,
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

impl TimingStats {
    /// Summarize the durations, `None` when there are none
    pub fn from_durations(durations: &[Duration]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let mut secs: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
        secs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = secs.len();
        let median = if n % 2 == 1 {
            secs[n / 2]
        } else {
            (secs[n / 2 - 1] + secs[n / 2]) / 2.
        };

        Some(TimingStats {
            samples: n,
            min: secs[0],
            median,
            mean: secs.iter().sum::<f64>() / n as f64,
            max: secs[n - 1],
        })
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// What a single entry point measured
pub enum Outcome {
    Time(TimingStats),
    PeakMemory {
        peak_bytes: usize,
        baseline_bytes: usize,
    },
    Track {
        value: u64,
    },
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// One entry point measured for one parameter combination
pub struct BenchmarkResult {
    pub suite: String,
    pub entry: String,
    pub kind: MeasureKind,
    /// Positional parameters, in axis order
    pub params: Vec<String>,
    pub n_jobs: usize,
    pub outcome: Outcome,
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ({}; n_jobs={}): ",
            self.suite,
            self.entry,
            self.params.join(", "),
            self.n_jobs
        )?;
        match &self.outcome {
            Outcome::Time(stats) => write!(
                f,
                "median {:.6}s, min {:.6}s, max {:.6}s over {} samples",
                stats.median, stats.min, stats.max, stats.samples
            ),
            Outcome::PeakMemory {
                peak_bytes,
                baseline_bytes,
            } => write!(
                f,
                "peak {:.1} MiB (baseline {:.1} MiB)",
                *peak_bytes as f64 / MIB,
                *baseline_bytes as f64 / MIB
            ),
            Outcome::Track { value } => write!(f, "{}", value),
        }
    }
}

const MIB: f64 = 1024. * 1024.;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn stats_of_odd_sample_count() {
        let durations = [3, 1, 2].map(Duration::from_millis);
        let stats = TimingStats::from_durations(&durations).unwrap();

        assert_eq!(stats.samples, 3);
        assert_abs_diff_eq!(stats.min, 0.001);
        assert_abs_diff_eq!(stats.median, 0.002);
        assert_abs_diff_eq!(stats.mean, 0.002);
        assert_abs_diff_eq!(stats.max, 0.003);
    }

    #[test]
    fn median_of_even_sample_count() {
        let durations = [4, 1, 2, 3].map(Duration::from_millis);
        let stats = TimingStats::from_durations(&durations).unwrap();
        assert_abs_diff_eq!(stats.median, 0.0025);
    }

    #[test]
    fn no_samples_no_stats() {
        assert!(TimingStats::from_durations(&[]).is_none());
    }

    #[test]
    fn display_track_result() {
        let result = BenchmarkResult {
            suite: "KMeans_bench".into(),
            entry: "track_iterations".into(),
            kind: MeasureKind::Track,
            params: vec!["(dense, lloyd)".into()],
            n_jobs: 2,
            outcome: Outcome::Track { value: 10 },
        };
        assert_eq!(
            result.to_string(),
            "KMeans_bench.track_iterations ((dense, lloyd); n_jobs=2): 10"
        );
    }
}
