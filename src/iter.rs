//! Mutating cursor over an [`Array`].

use allocator_api2::alloc::{Allocator, Global};

use crate::{Array, ArrayError};

/// Forward cursor that can edit the array around the last yielded element.
///
/// The cursor sits between elements: `next` yields the element after it and
/// moves past it. The last yielded element is the *current* one, which
/// [`remove_current`](Self::remove_current) and
/// [`replace_current`](Self::replace_current) act on, while
/// [`insert_before_current`](Self::insert_before_current) inserts at the
/// cursor itself. Edits keep the cursor consistent, so iteration visits each
/// original element exactly once and never yields inserted ones.
///
/// The cursor holds the array mutably, so nothing else can resize it
/// mid-iteration.
///
/// ```
/// use melbi_array::Array;
///
/// let mut array = Array::new()?;
/// for v in [10, 20, 30] {
///     array.append(v)?;
/// }
///
/// let mut cursor = array.cursor();
/// while let Some(&v) = cursor.next() {
///     if v == 20 {
///         cursor.remove_current();
///     }
/// }
/// assert_eq!(array.as_slice(), &[10, 30]);
/// # Ok::<(), melbi_array::ArrayError>(())
/// ```
pub struct ArrayIter<'a, T, A: Allocator = Global> {
    array: &'a mut Array<T, A>,
    /// Index of the next element to yield.
    cursor: usize,
    /// Index of the last yielded element, if it is still in the array.
    current: Option<usize>,
}

impl<'a, T, A: Allocator> ArrayIter<'a, T, A> {
    pub(crate) fn new(array: &'a mut Array<T, A>) -> Self {
        Self {
            array,
            cursor: 0,
            current: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.array.len()
    }

    /// Yields the next element, or `None` once the end is reached.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        let index = self.cursor;
        if index >= self.array.len() {
            return None;
        }
        self.cursor += 1;
        self.current = Some(index);
        self.array.get(index)
    }

    /// Index of the last yielded element.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Removes the last yielded element.
    ///
    /// The following `next` yields the element that came after it. Returns
    /// `None` if nothing was yielded since the previous removal.
    pub fn remove_current(&mut self) -> Option<T> {
        let index = self.current.take()?;
        let removed = self.array.remove_at(index)?;
        self.cursor -= 1;
        Some(removed)
    }

    /// Inserts `element` at the cursor, just before the element the next
    /// `next` will yield, and moves the cursor past it.
    pub fn insert_before_current(&mut self, element: T) -> Result<(), ArrayError> {
        self.array.insert_at(self.cursor, element)?;
        self.cursor += 1;
        Ok(())
    }

    /// Swaps the last yielded element for `element`, returning the old one.
    pub fn replace_current(&mut self, element: T) -> Result<T, ArrayError> {
        let index = self.current.ok_or(ArrayError::NoCurrentElement)?;
        self.array.replace_at(index, element)
    }
}
