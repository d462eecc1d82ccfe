use std::sync::{Mutex, MutexGuard, PoisonError};

use linfa::ParamGuard;
use linfa_bench::config::HarnessParams;
use linfa_bench::harness::{MeasureKind, Outcome, Runner};
use linfa_bench::memory::{self, TrackingAllocator};
use linfa_bench::suites::{KMeansBench, KMeansPlusPlusBench};

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator::system();

const MIB: usize = 1024 * 1024;

// the peak counter is process-wide, measurements must not overlap
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

#[test]
fn allocator_is_detected() {
    assert!(memory::is_installed());
}

#[test]
fn peak_covers_the_allocations_of_the_call() {
    let _serial = serial();
    let (len, peak, baseline) = memory::measure_peak(|| {
        let buffer = vec![1u8; 4 * MIB];
        std::hint::black_box(&buffer).len()
    })
    .unwrap();

    assert_eq!(len, 4 * MIB);
    assert!(peak >= baseline + 4 * MIB);
}

#[test]
fn freed_memory_still_counts_towards_the_peak() {
    let _serial = serial();
    let (_, peak, baseline) = memory::measure_peak(|| {
        for _ in 0..3 {
            drop(std::hint::black_box(vec![0u64; MIB]));
        }
    })
    .unwrap();

    assert!(peak >= baseline + 8 * MIB);
}

fn runner(filter: &str) -> Runner {
    let params = HarnessParams::new()
        .china_samples(Some(2000))
        .newsgroups_documents(60)
        .batch_size(256)
        .bench_filter(Some(filter.to_string()))
        .check_unwrap();
    Runner::new(params).unwrap()
}

#[test]
fn seeding_reports_a_peak_above_its_centroids() {
    let _serial = serial();
    let results = runner("peakmem_").run::<KMeansPlusPlusBench>().unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, MeasureKind::PeakMem);
    match results[0].outcome {
        Outcome::PeakMemory {
            peak_bytes,
            baseline_bytes,
        } => {
            // 64 centroids of 3 features
            assert!(peak_bytes >= baseline_bytes + 64 * 3 * 8);
        }
        ref other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn every_k_means_case_reports_a_peak() {
    let _serial = serial();
    let results = runner("KMeans_bench.peakmem_iterations")
        .run::<KMeansBench>()
        .unwrap();

    assert_eq!(results.len(), 3);
    for result in results {
        assert!(matches!(
            result.outcome,
            Outcome::PeakMemory { peak_bytes, baseline_bytes } if peak_bytes > baseline_bytes
        ));
    }
}
