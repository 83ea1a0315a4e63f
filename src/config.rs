//! Construction parameters for [`Array`](crate::Array).

use allocator_api2::alloc::{Allocator, Global};

/// Configuration for a new array.
///
/// Holds the initial slot count, the factor applied to the capacity each
/// time the array fills up, and the allocator used for every buffer the
/// array (and any array derived from it) ever allocates. Values are
/// validated by [`Array::with_config`](crate::Array::with_config) and are
/// fixed for the lifetime of the array.
#[derive(Clone, Debug)]
pub struct ArrayConfig<A: Allocator = Global> {
    /// Number of slots allocated up front. Must be at least 1.
    pub capacity: usize,

    /// Multiplier applied to the capacity on growth.
    ///
    /// Values `<= 1` are replaced by [`ArrayConfig::DEFAULT_GROWTH_FACTOR`].
    pub growth_factor: f32,

    /// Allocate / zero-allocate / release strategy.
    pub allocator: A,
}

impl ArrayConfig {
    pub const DEFAULT_CAPACITY: usize = 8;

    pub const DEFAULT_GROWTH_FACTOR: f32 = 2.0;

    /// Default configuration backed by the global allocator.
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<A: Allocator> ArrayConfig<A> {
    /// Default capacity and growth factor, allocating through `allocator`.
    pub fn new_in(allocator: A) -> Self {
        Self {
            capacity: ArrayConfig::DEFAULT_CAPACITY,
            growth_factor: ArrayConfig::DEFAULT_GROWTH_FACTOR,
            allocator,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_growth_factor(mut self, growth_factor: f32) -> Self {
        self.growth_factor = growth_factor;
        self
    }
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self::new()
    }
}
