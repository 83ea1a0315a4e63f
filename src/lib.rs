//! Growable, allocator-aware array of opaque element handles.
//!
//! [`Array`] stores elements contiguously and grows its buffer
//! geometrically when it fills up. Unlike `Vec`, the growth policy is part
//! of the contract: the initial capacity and growth factor come from an
//! [`ArrayConfig`], capacities after each growth are predictable, and an
//! allocation failure is reported as an [`ArrayError`] instead of aborting.
//!
//! ```text
//! Array<T, A>
//! ├── RawBuf<T, A>   slots [0, capacity), allocated through A
//! │   └── [0, len)   live elements
//! └── growth_factor  capacity multiplier on growth
//!
//! ArrayIter<'_, T, A>  cursor borrowing the array mutably
//! ```
//!
//! The array never interprets its elements. Search operations compare
//! handles with `PartialEq`, which for handle types such as raw pointers
//! or indices is identity.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use melbi_array::{Array, ArrayConfig};
//!
//! let arena = Bump::new();
//! let config = ArrayConfig::new_in(&arena).with_capacity(2);
//! let mut array = Array::with_config(config)?;
//!
//! for v in [3, 1, 2] {
//!     array.append(v)?;
//! }
//! array.sort(|a, b| a.cmp(b));
//!
//! assert_eq!(array.as_slice(), &[1, 2, 3]);
//! assert_eq!(array.capacity(), 4);
//! # Ok::<(), melbi_array::ArrayError>(())
//! ```

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod array;
mod config;
mod error;
mod iter;
mod raw;

pub use array::Array;
pub use config::ArrayConfig;
pub use error::ArrayError;
pub use iter::ArrayIter;

static_assertions::assert_impl_all!(Array<u64>: Send, Sync);
static_assertions::assert_impl_all!(ArrayError: Send, Sync, Copy);
static_assertions::assert_not_impl_any!(Array<core::cell::Cell<u8>>: Sync);
