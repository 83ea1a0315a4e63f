//! Shared test utilities for array integration tests.

#![allow(dead_code)]

use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use allocator_api2::alloc::{AllocError, Allocator, Global};

/// Initialize tracing subscriber for tests with DEBUG level.
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Allocator that forwards to `Global` until its budget runs out.
///
/// Counts allocations and releases so tests can check for leaks, and
/// refuses any request larger than `max_bytes` (recording its size), so
/// huge requests fail without touching the system allocator.
pub struct BudgetAlloc {
    budget: Cell<usize>,
    max_bytes: usize,
    allocations: Cell<usize>,
    releases: Cell<usize>,
    last_refused: Cell<Option<usize>>,
}

impl BudgetAlloc {
    pub fn new(budget: usize) -> Self {
        Self {
            budget: Cell::new(budget),
            max_bytes: 1 << 20,
            allocations: Cell::new(0),
            releases: Cell::new(0),
            last_refused: Cell::new(None),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn set_budget(&self, budget: usize) {
        self.budget.set(budget);
    }

    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// Allocations not yet released.
    pub fn outstanding(&self) -> usize {
        self.allocations.get() - self.releases.get()
    }

    /// Size in bytes of the last request refused for being too large.
    pub fn last_refused(&self) -> Option<usize> {
        self.last_refused.get()
    }
}

unsafe impl Allocator for BudgetAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() > self.max_bytes {
            self.last_refused.set(Some(layout.size()));
            return Err(AllocError);
        }
        let left = self.budget.get();
        if left == 0 {
            return Err(AllocError);
        }
        self.budget.set(left - 1);
        let block = Global.allocate(layout)?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.releases.set(self.releases.get() + 1);
        unsafe { Global.deallocate(ptr, layout) }
    }
}
