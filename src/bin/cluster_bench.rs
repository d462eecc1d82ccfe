//! Runs the clustering suites and reports their measurements.
//!
//! ## Usage
//!
//! ```bash
//! # every suite, every entry point
//! cargo run --release --bin cluster-bench
//!
//! # iteration counts of the k-means suite with 1 and 4 threads, written to a file
//! cargo run --release --bin cluster-bench -- \
//!   --suite k-means --bench 'track_' --n-jobs 1 --n-jobs 4 --output tracks.json
//!
//! # pixels read from a file instead of the built-in picture
//! cargo run --release --bin cluster-bench -- --china-csv china.csv.gz
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use linfa::ParamGuard;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use linfa_bench::config::HarnessParams;
use linfa_bench::harness::Runner;
use linfa_bench::memory::TrackingAllocator;
use linfa_bench::suites::Suite;

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator::system();

/// Timing, peak memory and iteration benchmarks of linfa's k-means
#[derive(Parser, Debug)]
#[command(name = "cluster-bench")]
struct Args {
    /// Suites to run, all of them when omitted
    #[arg(long, value_enum)]
    suite: Vec<Suite>,

    /// Only run entry points whose `<suite>.<entry>` name matches this regex
    #[arg(long)]
    bench: Option<String>,

    /// Timed calls per `time_*` entry point
    #[arg(long, default_value = "5")]
    repeat: usize,

    /// Untimed calls before the timed ones
    #[arg(long, default_value = "1")]
    warmup: usize,

    /// Threads granted to the clustering routine, repeat to run several values
    #[arg(long = "n-jobs", default_values_t = vec![1])]
    n_jobs: Vec<usize>,

    /// Random seed of the datasets and of the fits
    #[arg(long, default_value = "0")]
    seed: u64,

    /// CSV file of RGB pixels (optionally gzipped) replacing the built-in picture
    #[arg(long)]
    china_csv: Option<PathBuf>,

    /// Number of pixels kept (0 = all)
    #[arg(long, default_value = "0")]
    china_samples: usize,

    /// Directory of posts laid out as `<category>/<post>` replacing the generated corpus
    #[arg(long)]
    newsgroups_dir: Option<PathBuf>,

    /// Number of posts kept
    #[arg(long, default_value = "2000")]
    newsgroups_documents: usize,

    /// Rows per batch of the mini-batch algorithm
    #[arg(long, default_value = "1024")]
    batch_size: usize,

    /// Write the results as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// List suites, parameters and entry points, then exit
    #[arg(long)]
    list: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn suites(&self) -> Vec<Suite> {
        if self.suite.is_empty() {
            Suite::ALL.to_vec()
        } else {
            self.suite.clone()
        }
    }

    fn harness_params(&self) -> HarnessParams {
        HarnessParams::new()
            .repeat(self.repeat)
            .warmup(self.warmup)
            .n_jobs(self.n_jobs.clone())
            .seed(self.seed)
            .bench_filter(self.bench.clone())
            .batch_size(self.batch_size)
            .china_csv(self.china_csv.clone())
            .china_samples(Some(self.china_samples).filter(|&n| n > 0))
            .newsgroups_dir(self.newsgroups_dir.clone())
            .newsgroups_documents(self.newsgroups_documents)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.list {
        for suite in args.suites() {
            print!("{}", suite.describe());
        }
        return Ok(());
    }

    let runner = Runner::new(args.harness_params().check()?)?;

    let start = Instant::now();
    let mut results = Vec::new();
    for suite in args.suites() {
        info!(suite = suite.name(), "running suite");
        results.extend(suite.run(&runner)?);
    }
    info!(
        results = results.len(),
        secs = start.elapsed().as_secs_f64(),
        "all suites done"
    );

    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &results)?;
        info!(path = %path.display(), "results written");
    }

    Ok(())
}
