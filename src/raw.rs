//! Allocator-backed slot buffer underneath [`Array`](crate::Array).
//!
//! `RawBuf` owns the memory but never the values in it: it neither
//! initialises nor drops slots. Tracking which slots are live is the
//! caller's job.

#![allow(unsafe_code)]

use core::{
    alloc::Layout,
    marker::PhantomData,
    mem,
    ptr::{self, NonNull},
};

use allocator_api2::alloc::Allocator;

use crate::ArrayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AllocInit {
    Uninit,
    Zeroed,
}

pub(crate) struct RawBuf<T, A: Allocator> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    marker: PhantomData<T>,
}

// SAFETY: RawBuf uniquely owns its allocation, like `Box<[T], A>`.
unsafe impl<T: Send, A: Allocator + Send> Send for RawBuf<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawBuf<T, A> {}

impl<T, A: Allocator> RawBuf<T, A> {
    /// Largest slot count whose layout stays within `isize::MAX` bytes.
    pub(crate) const MAX_CAPACITY: usize = {
        let size = mem::size_of::<T>();
        isize::MAX as usize / if size == 0 { 1 } else { size }
    };

    pub(crate) fn allocate_in(cap: usize, alloc: A, init: AllocInit) -> Result<Self, ArrayError> {
        let ptr = Self::allocate_slots(&alloc, cap, init)?;
        Ok(Self {
            ptr,
            cap,
            alloc,
            marker: PhantomData,
        })
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Moves the first `live` slots into a fresh buffer of `new_cap` slots
    /// and releases the old one.
    ///
    /// On failure nothing changes: the old buffer and capacity stay in place.
    pub(crate) fn reallocate(
        &mut self,
        new_cap: usize,
        live: usize,
        init: AllocInit,
    ) -> Result<(), ArrayError> {
        debug_assert!(live <= self.cap && live <= new_cap);
        let new_ptr = Self::allocate_slots(&self.alloc, new_cap, init)?;

        // SAFETY: both buffers hold at least `live` slots and belong to
        // distinct allocations (or are dangling with zero-sized slots).
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), live);
            self.release();
        }

        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    fn layout(cap: usize) -> Result<Layout, ArrayError> {
        if cap > Self::MAX_CAPACITY {
            return Err(ArrayError::CapacityOverflow);
        }
        Layout::array::<T>(cap).map_err(|_| ArrayError::CapacityOverflow)
    }

    fn allocate_slots(alloc: &A, cap: usize, init: AllocInit) -> Result<NonNull<T>, ArrayError> {
        let layout = Self::layout(cap)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        let block = match init {
            AllocInit::Uninit => alloc.allocate(layout),
            AllocInit::Zeroed => alloc.allocate_zeroed(layout),
        };
        match block {
            Ok(block) => Ok(block.cast()),
            Err(_) => {
                tracing::debug!(capacity = cap, bytes = layout.size(), "buffer allocation failed");
                Err(ArrayError::AllocFailed { capacity: cap })
            }
        }
    }

    /// # Safety
    ///
    /// The buffer must not be used again until `ptr` and `cap` are replaced.
    unsafe fn release(&mut self) {
        if let Ok(layout) = Self::layout(self.cap) {
            if layout.size() != 0 {
                // SAFETY: `ptr` was handed out by `alloc` for exactly this layout.
                unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
            }
        }
    }
}

impl<T, A: Allocator> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        // SAFETY: the buffer is never touched after drop.
        unsafe { self.release() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocator_api2::alloc::Global;

    #[test]
    fn max_capacity_scales_with_slot_size() {
        assert_eq!(RawBuf::<u8, Global>::MAX_CAPACITY, isize::MAX as usize);
        assert_eq!(RawBuf::<u64, Global>::MAX_CAPACITY, isize::MAX as usize / 8);
        assert_eq!(RawBuf::<(), Global>::MAX_CAPACITY, isize::MAX as usize);
    }

    #[test]
    fn zeroed_allocation_is_zeroed() {
        let buf = RawBuf::<u32, Global>::allocate_in(16, Global, AllocInit::Zeroed).unwrap();
        assert_eq!(buf.capacity(), 16);
        let slots = unsafe { core::slice::from_raw_parts(buf.as_ptr(), 16) };
        assert!(slots.iter().all(|&v| v == 0));
    }

    #[test]
    fn reallocate_keeps_live_slots() {
        let mut buf = RawBuf::<u32, Global>::allocate_in(2, Global, AllocInit::Uninit).unwrap();
        unsafe {
            buf.as_mut_ptr().write(7);
            buf.as_mut_ptr().add(1).write(9);
        }
        buf.reallocate(5, 2, AllocInit::Uninit).unwrap();
        assert_eq!(buf.capacity(), 5);
        let live = unsafe { core::slice::from_raw_parts(buf.as_ptr(), 2) };
        assert_eq!(live, &[7, 9]);
    }

    #[test]
    fn oversized_request_is_rejected_before_allocating() {
        let result = RawBuf::<u64, Global>::allocate_in(usize::MAX, Global, AllocInit::Uninit);
        assert!(matches!(result, Err(ArrayError::CapacityOverflow)));
    }

    #[test]
    fn zero_sized_slots_never_allocate() {
        let mut buf = RawBuf::<(), Global>::allocate_in(4, Global, AllocInit::Zeroed).unwrap();
        buf.reallocate(1 << 40, 0, AllocInit::Uninit).unwrap();
        assert_eq!(buf.capacity(), 1 << 40);
    }
}
