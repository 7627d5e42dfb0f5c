//! Small memory containers for systems code that cares about allocation counts.
//!
//! This crate provides four building blocks:
//!
//! * [`Array`] - a growable sequence that stores its first few items inline and only moves to
//!   the heap when it outgrows them, shrinking back (with hysteresis) as items are removed.
//! * [`SortedArray`] - an [`Array`] kept in ascending order by a caller-supplied comparison,
//!   with binary-search lookup and removal.
//! * [`Stack`] - a LIFO stack that grows geometrically by about 1.5x and never shrinks.
//! * [`ObjectPool`] - a slab allocator for uniformly-sized objects. It carves a target count of
//!   objects from lazily allocated slab blocks, recycles returned objects via a LIFO free list
//!   and falls back to standalone heap allocations once the slabs are exhausted.
//!
//! # Examples
//!
//! ## Inline-first array
//!
//! ```
//! use memkit::Array;
//!
//! let mut array = Array::<u32>::new();
//! array.extend([1, 2, 3]);
//!
//! // Up to DEFAULT_INLINE_CAPACITY items need no heap memory.
//! assert!(array.is_inline());
//! assert_eq!(array.as_slice(), &[1, 2, 3]);
//!
//! assert_eq!(array.remove(0), Some(1));
//! assert_eq!(array.as_slice(), &[2, 3]);
//! ```
//!
//! ## Sorted array
//!
//! ```
//! use memkit::SortedArray;
//!
//! let mut numbers = SortedArray::<i32, _>::by_ord();
//!
//! for n in [5, -1, 3, 3, 10] {
//!     numbers.put(n);
//! }
//!
//! assert_eq!(numbers.as_slice(), &[-1, 3, 3, 5, 10]);
//! assert_eq!(numbers.erase(&3), Some(3));
//! assert_eq!(numbers.as_slice(), &[-1, 3, 5, 10]);
//! assert!(!numbers.contains(&4));
//! ```
//!
//! ## Object pool
//!
//! ```
//! use memkit::{ObjectPool, Origin};
//!
//! let mut pool = ObjectPool::<Vec<u8>>::new(2);
//!
//! let mut buffer = pool.get();
//! pool.object_mut(&mut buffer).extend_from_slice(b"hello");
//! assert_eq!(buffer.origin(), Origin::Issued(0));
//!
//! pool.put(buffer);
//!
//! // The same object is handed out again, contents included.
//! let buffer = pool.get();
//! assert_eq!(pool.object(&buffer).as_slice(), b"hello");
//! pool.put(buffer);
//! ```
//!
//! # Logging
//!
//! Storage transitions and slab allocations are reported via the [`tracing`] crate. Array
//! storage changes and slab block allocations are logged at trace level. A pool falling back to
//! standalone allocation is logged at debug level, as it usually means the target count is too
//! small for the workload.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod array;
mod builder;
mod error;
mod layout;
mod object;
mod pool;
mod sorted_array;
mod stack;

pub use array::*;
pub use builder::*;
pub use error::Error;
pub(crate) use error::Result;
pub use layout::*;
pub use object::{Origin, PoolObject};
pub use pool::*;
pub use sorted_array::*;
pub use stack::*;
