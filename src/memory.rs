//! Peak heap usage of a single call.
//!
//! The process-wide counters are only maintained when a [`TrackingAllocator`] is installed as
//! the global allocator of the final binary:
//!
//! ```ignore
//! use linfa_bench::memory::TrackingAllocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: TrackingAllocator = TrackingAllocator::system();
//! ```
use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

static CURRENT: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);
static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

/// Wraps an allocator and records the number of live bytes and their high-water mark.
pub struct TrackingAllocator<A = System> {
    inner: A,
}

impl<A> TrackingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl TrackingAllocator<System> {
    pub const fn system() -> Self {
        Self::new(System)
    }
}

fn grow(size: usize) {
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    let live = CURRENT.fetch_add(size, Ordering::Relaxed) + size;
    PEAK.fetch_max(live, Ordering::Relaxed);
}

fn shrink(size: usize) {
    CURRENT.fetch_sub(size, Ordering::Relaxed);
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.inner.dealloc(ptr, layout);
        shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size > old_size {
                grow(new_size - old_size);
            } else {
                shrink(old_size - new_size);
            }
        }
        new_ptr
    }
}

/// Whether a [`TrackingAllocator`] serves the allocations of this process
pub fn is_installed() -> bool {
    let before = ALLOCATIONS.load(Ordering::Relaxed);
    drop(black_box(Box::new([0u8; 64])));
    ALLOCATIONS.load(Ordering::Relaxed) != before
}

/// Live heap bytes
pub fn current_bytes() -> usize {
    CURRENT.load(Ordering::Relaxed)
}

/// Peak heap usage observed while running `f`.
///
/// Returns the output of `f`, the peak of live bytes during the call and the live bytes before
/// the call. Allocations of other threads running concurrently are counted as well.
pub fn measure_peak<T>(f: impl FnOnce() -> T) -> Result<(T, usize, usize)> {
    if !is_installed() {
        return Err(Error::AllocatorNotInstalled);
    }

    let baseline = CURRENT.load(Ordering::Relaxed);
    PEAK.store(baseline, Ordering::Relaxed);
    let output = f();
    let peak = PEAK.load(Ordering::Relaxed);

    Ok((output, peak.max(baseline), baseline))
}
