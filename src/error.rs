//! Error type shared by every fallible [`Array`](crate::Array) operation.
//!
//! Failures never leave an array half-modified: when an operation returns
//! `Err`, the array is exactly as it was before the call.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ArrayError {
    /// The allocator refused to hand out a buffer of `capacity` slots.
    #[error("allocation of {capacity} slots failed")]
    AllocFailed { capacity: usize },

    /// Capacity is already at its ceiling, or the requested slot count
    /// cannot be described by a memory layout.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// Initial capacity must be at least one and no more than the ceiling
    /// for the element type.
    #[error("invalid initial capacity {capacity}")]
    InvalidCapacity { capacity: usize },

    /// The very first growth of an array with this capacity would overflow.
    #[error("growth factor {growth_factor} is too large for capacity {capacity}")]
    GrowthFactorTooLarge { growth_factor: f32, capacity: usize },

    #[error("index {index} out of bounds for array of length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// Inclusive range `begin..=end` does not fit inside the array.
    #[error("range {begin}..={end} is invalid for array of length {len}")]
    InvalidRange { begin: usize, end: usize, len: usize },

    /// A cursor edit needed a current element, but nothing was yielded
    /// since the cursor was created or last removed one.
    #[error("cursor has no current element")]
    NoCurrentElement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offending_values() {
        let err = ArrayError::OutOfBounds { index: 4, len: 3 };
        assert_eq!(err.to_string(), "index 4 out of bounds for array of length 3");

        let err = ArrayError::InvalidRange {
            begin: 2,
            end: 1,
            len: 5,
        };
        assert_eq!(err.to_string(), "range 2..=1 is invalid for array of length 5");

        let err = ArrayError::GrowthFactorTooLarge {
            growth_factor: 3.5,
            capacity: 8,
        };
        assert_eq!(
            err.to_string(),
            "growth factor 3.5 is too large for capacity 8"
        );
    }
}
