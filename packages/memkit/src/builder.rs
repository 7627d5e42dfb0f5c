use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;

use new_zealand::nz;

use crate::{ObjectLayout, ObjectPool, Result};

/// Number of slab objects a pool holds if no target count (or a target count of zero) is given.
pub const DEFAULT_TARGET_COUNT: NonZero<usize> = nz!(16);

/// Slab blocks are at least this many bytes unless configured otherwise.
pub const DEFAULT_MIN_BLOCK_SIZE: NonZero<usize> = nz!(4096);

/// Builder for creating an instance of [`ObjectPool`].
///
/// You only need to use this builder if you want to customize the pool configuration beyond the
/// target count accepted by [`ObjectPool::new()`].
///
/// # Examples
///
/// ```
/// use memkit::ObjectPool;
/// use new_zealand::nz;
///
/// let pool = ObjectPool::<[u64; 4]>::builder()
///     .target_count(1000)
///     .min_block_size(nz!(65_536))
///     .build();
///
/// assert_eq!(pool.capacity(), 1000);
/// assert_eq!(pool.layout().block_size(), 65_536);
/// ```
#[must_use]
pub struct ObjectPoolBuilder<T> {
    target_count: usize,
    min_block_size: NonZero<usize>,

    _object: PhantomData<T>,
}

impl<T> fmt::Debug for ObjectPoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPoolBuilder")
            .field(
                "object_type",
                &format_args!("{}", std::any::type_name::<T>()),
            )
            .field("target_count", &self.target_count)
            .field("min_block_size", &self.min_block_size)
            .finish()
    }
}

impl<T: Default> ObjectPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT.get(),
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            _object: PhantomData,
        }
    }

    /// Sets the number of objects the pool carves from slab blocks. Once that many objects have
    /// been carved and none are free for reuse, the pool allocates standalone objects instead.
    ///
    /// Zero selects [`DEFAULT_TARGET_COUNT`].
    pub fn target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    /// Sets the minimum size of a slab block in bytes. Blocks are larger than this only when a
    /// single object does not fit.
    pub fn min_block_size(mut self, min_block_size: NonZero<usize>) -> Self {
        self.min_block_size = min_block_size;
        self
    }

    /// Validates the options and creates the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LayoutOverflow`][crate::Error::LayoutOverflow] if the slab geometry of
    /// the pool does not fit in the address space.
    pub fn try_build(self) -> Result<ObjectPool<T>> {
        let target_count = NonZero::new(self.target_count).unwrap_or(DEFAULT_TARGET_COUNT);

        let layout = ObjectLayout::of::<T>(target_count, self.min_block_size)?;

        Ok(ObjectPool::new_inner(layout, target_count))
    }

    /// Validates the options and creates the pool.
    ///
    /// # Panics
    ///
    /// Panics if the slab geometry of the pool does not fit in the address space.
    #[must_use]
    pub fn build(self) -> ObjectPool<T> {
        self.try_build()
            .unwrap_or_else(|error| panic!("invalid object pool configuration: {error}"))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::Error;

    assert_impl_all!(ObjectPoolBuilder<u32>: Send, Sync, Debug);

    #[test]
    fn defaults() {
        let pool = ObjectPoolBuilder::<u64>::new().build();

        assert_eq!(pool.capacity(), DEFAULT_TARGET_COUNT.get());
        assert_eq!(pool.layout().block_size(), DEFAULT_MIN_BLOCK_SIZE.get());
    }

    #[test]
    fn zero_target_count_selects_default() {
        let pool = ObjectPoolBuilder::<u64>::new().target_count(0).build();

        assert_eq!(pool.capacity(), DEFAULT_TARGET_COUNT.get());
    }

    #[test]
    fn custom_block_size() {
        let pool = ObjectPoolBuilder::<u64>::new()
            .min_block_size(nz!(128))
            .build();

        assert_eq!(pool.layout().block_size(), 128);
        assert_eq!(pool.layout().object_size(), size_of::<u64>());
    }

    #[test]
    fn try_build_reports_layout_overflow() {
        // With one object per block, the block table would need usize::MAX + 1 entries.
        let result = ObjectPoolBuilder::<[u64; 8]>::new()
            .target_count(usize::MAX)
            .min_block_size(nz!(1))
            .try_build();

        assert!(matches!(
            result,
            Err(Error::LayoutOverflow {
                object_size: 64,
                target_count: usize::MAX,
            })
        ));
    }

    #[test]
    #[should_panic]
    fn build_panics_on_layout_overflow() {
        drop(
            ObjectPoolBuilder::<[u64; 8]>::new()
                .target_count(usize::MAX)
                .min_block_size(nz!(1))
                .build(),
        );
    }
}
