#![allow(unsafe_code)]

use core::{cmp::Ordering, fmt, mem, ptr, slice};

use allocator_api2::alloc::{Allocator, Global};
use tracing::debug;

use crate::{
    ArrayConfig, ArrayError, ArrayIter,
    raw::{AllocInit, RawBuf},
};

/// A growable array of element handles.
///
/// Elements live contiguously in `[0, len)` of a buffer holding
/// `capacity` slots. When an insertion finds the buffer full, the capacity
/// is multiplied by the growth factor (see [`Array::append`]). The array
/// never looks inside its elements: equality is only used by the search
/// operations, and ordering only by [`Array::sort`].
///
/// All buffers, including those of arrays derived through
/// [`Array::subrange`] or the copy operations, come from the allocator the
/// array was built with.
///
/// # Example
///
/// ```
/// use melbi_array::{Array, ArrayConfig};
///
/// let mut array = Array::with_config(ArrayConfig::new().with_capacity(2))?;
/// array.append("a")?;
/// array.append("b")?;
/// array.append("c")?;
///
/// assert_eq!(array.capacity(), 4);
/// assert_eq!(array.remove(&"b"), Some("b"));
/// assert_eq!(array.as_slice(), &["a", "c"]);
/// # Ok::<(), melbi_array::ArrayError>(())
/// ```
pub struct Array<T, A: Allocator = Global> {
    buf: RawBuf<T, A>,
    len: usize,
    growth_factor: f32,
}

impl<T> Array<T> {
    /// Creates an empty array with the default configuration.
    pub fn new() -> Result<Self, ArrayError> {
        Self::with_config(ArrayConfig::new())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, ArrayError> {
        Self::with_config(ArrayConfig::new().with_capacity(capacity))
    }
}

impl<T, A: Allocator> Array<T, A> {
    /// Ceiling for the capacity of an array of `T`.
    pub const MAX_CAPACITY: usize = RawBuf::<T, A>::MAX_CAPACITY;

    pub fn new_in(allocator: A) -> Result<Self, ArrayError> {
        Self::with_config(ArrayConfig::new_in(allocator))
    }

    /// Creates an empty array from `config`.
    ///
    /// Fails if the capacity is zero or beyond [`Array::MAX_CAPACITY`], if
    /// the growth factor is so large that the first growth would overflow,
    /// or if the initial buffer cannot be allocated. A growth factor that
    /// does not exceed 1 is replaced by the default, which is then accepted
    /// without the overflow check.
    pub fn with_config(config: ArrayConfig<A>) -> Result<Self, ArrayError> {
        let ArrayConfig {
            capacity,
            growth_factor,
            allocator,
        } = config;

        if capacity == 0 || capacity > Self::MAX_CAPACITY {
            debug!(capacity, "rejected initial capacity");
            return Err(ArrayError::InvalidCapacity { capacity });
        }

        // Only a caller-supplied factor is checked against the ceiling.
        let growth_factor = if growth_factor.is_nan() || growth_factor <= 1.0 {
            debug!(growth_factor, "growth factor must exceed 1, using the default");
            ArrayConfig::DEFAULT_GROWTH_FACTOR
        } else if f64::from(growth_factor) >= (Self::MAX_CAPACITY / capacity) as f64 {
            debug!(growth_factor, capacity, "rejected growth factor");
            return Err(ArrayError::GrowthFactorTooLarge {
                growth_factor,
                capacity,
            });
        } else {
            growth_factor
        };

        let buf = RawBuf::allocate_in(capacity, allocator, AllocInit::Zeroed)?;
        Ok(Self {
            buf,
            len: 0,
            growth_factor,
        })
    }

    /// Builds an empty array that shares this array's growth factor and a
    /// clone of its allocator.
    fn derived(&self, capacity: usize, init: AllocInit) -> Result<Self, ArrayError>
    where
        A: Clone,
    {
        let buf = RawBuf::allocate_in(capacity, self.buf.allocator().clone(), init)?;
        Ok(Self {
            buf,
            len: 0,
            growth_factor: self.growth_factor,
        })
    }

    /// Releases the array, dropping the handles but nothing they refer to.
    pub fn destroy(self) {}

    /// Hands every element to `release`, in index order, then releases the
    /// array.
    pub fn destroy_with(mut self, release: impl FnMut(T)) {
        self.remove_all_with(release);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Same as [`Array::len`].
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn growth_factor(&self) -> f32 {
        self.growth_factor
    }

    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are initialised.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots `[0, len)` are initialised.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns a cursor positioned before the first element.
    pub fn cursor(&mut self) -> ArrayIter<'_, T, A> {
        ArrayIter::new(self)
    }

    /// Appends `element` at index `len`.
    ///
    /// Fails only when the array is full and cannot grow, in which case the
    /// array is left untouched.
    pub fn append(&mut self, element: T) -> Result<(), ArrayError> {
        if self.len == self.capacity() {
            self.grow()?;
        }
        // SAFETY: `len < capacity` after the check above.
        unsafe { ptr::write(self.buf.as_mut_ptr().add(self.len), element) };
        self.len += 1;
        Ok(())
    }

    /// Inserts `element` at `index`, shifting `[index, len)` up by one.
    ///
    /// `index == len` is accepted and behaves like [`Array::append`].
    pub fn insert_at(&mut self, index: usize, element: T) -> Result<(), ArrayError> {
        if index > self.len {
            return Err(ArrayError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        if self.len == self.capacity() {
            self.grow()?;
        }
        // SAFETY: `index <= len < capacity`, so the shifted block stays in bounds.
        unsafe {
            let slot = self.buf.as_mut_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.len - index);
            ptr::write(slot, element);
        }
        self.len += 1;
        Ok(())
    }

    /// Overwrites the element at `index` and returns the previous one.
    pub fn replace_at(&mut self, index: usize, element: T) -> Result<T, ArrayError> {
        let len = self.len;
        match self.as_mut_slice().get_mut(index) {
            Some(slot) => Ok(mem::replace(slot, element)),
            None => Err(ArrayError::OutOfBounds { index, len }),
        }
    }

    /// Removes the first element equal to `element`.
    pub fn remove(&mut self, element: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.index_of(element)?;
        self.remove_at(index)
    }

    /// Removes the element at `index`, shifting `(index, len)` down by one.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`; the slot is read out before being overwritten.
        unsafe {
            let slot = self.buf.as_mut_ptr().add(index);
            let removed = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            Some(removed)
        }
    }

    pub fn remove_last(&mut self) -> Option<T> {
        let last = self.len.checked_sub(1)?;
        self.remove_at(last)
    }

    /// Drops every element. Capacity is unchanged.
    pub fn remove_all(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        // SAFETY: the first `len` slots were initialised and are no longer
        // reachable now that `len` is zero.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr(), len));
        }
    }

    /// Hands every element to `release`, in index order, and empties the
    /// array. Capacity is unchanged.
    pub fn remove_all_with(&mut self, mut release: impl FnMut(T)) {
        let len = mem::replace(&mut self.len, 0);
        let base = self.buf.as_mut_ptr();
        for i in 0..len {
            // SAFETY: each initialised slot is read exactly once.
            release(unsafe { ptr::read(base.add(i)) });
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    pub fn get_last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Index of the first element equal to `element`.
    pub fn index_of(&self, element: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|e| e == element)
    }

    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(element).is_some()
    }

    /// Number of elements equal to `element`.
    pub fn count_occurrences(&self, element: &T) -> usize
    where
        T: PartialEq,
    {
        self.iter().filter(|e| *e == element).count()
    }

    /// Copies the inclusive range `begin..=end` into a new array whose
    /// capacity equals its length.
    pub fn subrange(&self, begin: usize, end: usize) -> Result<Self, ArrayError>
    where
        T: Clone,
        A: Clone,
    {
        if begin > end || end >= self.len {
            return Err(ArrayError::InvalidRange {
                begin,
                end,
                len: self.len,
            });
        }
        let range = &self.as_slice()[begin..=end];
        let mut sub = self.derived(range.len(), AllocInit::Uninit)?;
        sub.fill_from(range.iter().cloned());
        Ok(sub)
    }

    /// Copies the handles into an independent array with the same capacity
    /// and growth factor.
    pub fn shallow_copy(&self) -> Result<Self, ArrayError>
    where
        T: Clone,
        A: Clone,
    {
        self.deep_copy(T::clone)
    }

    /// Like [`Array::shallow_copy`], but each element is produced by `copy`.
    pub fn deep_copy(&self, copy: impl FnMut(&T) -> T) -> Result<Self, ArrayError>
    where
        A: Clone,
    {
        let mut duplicate = self.derived(self.capacity(), AllocInit::Zeroed)?;
        duplicate.fill_from(self.iter().map(copy));
        Ok(duplicate)
    }

    /// Writes elements into spare capacity. The caller guarantees they fit.
    fn fill_from(&mut self, elements: impl Iterator<Item = T>) {
        for element in elements {
            debug_assert!(self.len < self.capacity());
            // SAFETY: every caller allocates at least as many slots as it writes.
            unsafe { ptr::write(self.buf.as_mut_ptr().add(self.len), element) };
            self.len += 1;
        }
    }

    pub fn reverse(&mut self) {
        self.as_mut_slice().reverse();
    }

    /// Shrinks the buffer to `max(len, 1)` slots.
    pub fn trim_to_size(&mut self) -> Result<(), ArrayError> {
        let capacity = self.capacity();
        let target = self.len.max(1);
        if target == capacity {
            return Ok(());
        }
        self.buf.reallocate(target, self.len, AllocInit::Zeroed)?;
        debug!(from = capacity, to = target, "trimmed array");
        Ok(())
    }

    /// Sorts in place with `compare`. Not stable.
    pub fn sort(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.as_mut_slice().sort_unstable_by(compare);
    }

    pub fn for_each(&self, op: impl FnMut(&T)) {
        self.iter().for_each(op);
    }

    /// Multiplies the capacity by the growth factor.
    ///
    /// A product that does not exceed the current capacity (truncation or
    /// overflow) is clamped to [`Array::MAX_CAPACITY`].
    #[cold]
    fn grow(&mut self) -> Result<(), ArrayError> {
        let capacity = self.capacity();
        if capacity == Self::MAX_CAPACITY {
            return Err(ArrayError::CapacityOverflow);
        }

        let grown = (capacity as f64 * f64::from(self.growth_factor)) as usize;
        let new_capacity = if grown <= capacity || grown > Self::MAX_CAPACITY {
            Self::MAX_CAPACITY
        } else {
            grown
        };

        self.buf.reallocate(new_capacity, self.len, AllocInit::Uninit)?;
        debug!(from = capacity, to = new_capacity, len = self.len, "grew array");
        Ok(())
    }
}

impl<T, A: Allocator> Drop for Array<T, A> {
    fn drop(&mut self) {
        self.remove_all();
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Array<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Array<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
