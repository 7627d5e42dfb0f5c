use std::num::NonZero;

use num_integer::Integer;

use crate::object::Tagged;
use crate::{Error, Result};

/// Size of the tag that precedes every object in a pool, in bytes.
pub const HEADER_SIZE: usize = size_of::<usize>();

/// Precalculated slab geometry of an [`ObjectPool`][crate::ObjectPool].
///
/// Every object occupies one `stride` worth of bytes: the size of its record, which is the object and a
/// one-word header, padded to the alignment of both. For objects aligned to at most
/// [`HEADER_SIZE`] that is the object size rounded up to a multiple of [`HEADER_SIZE`], plus one
/// header. Slab blocks are at least the minimum block size but always large enough for one
/// object, and hold as many whole strides as fit.
///
/// # Examples
///
/// ```
/// use memkit::ObjectPool;
///
/// let pool = ObjectPool::<[u8; 20]>::new(100);
/// let layout = pool.layout();
///
/// // 20 bytes rounds up to 24, plus an 8-byte header on 64-bit targets.
/// # #[cfg(target_pointer_width = "64")]
/// assert_eq!(layout.stride(), 32);
/// assert_eq!(layout.block_size(), 4096);
/// # #[cfg(target_pointer_width = "64")]
/// assert_eq!(layout.objects_per_block(), 128);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ObjectLayout {
    object_size: usize,
    stride: NonZero<usize>,
    block_size: NonZero<usize>,
    objects_per_block: NonZero<usize>,

    /// Number of entries in the block table, enough to hold the target count of objects.
    block_count: usize,
}

impl ObjectLayout {
    /// Calculates the slab geometry for `target_count` pooled records holding a `T`.
    pub(crate) fn of<T>(
        target_count: NonZero<usize>,
        min_block_size: NonZero<usize>,
    ) -> Result<Self> {
        Self::new(
            size_of::<T>(),
            size_of::<Tagged<T>>(),
            target_count,
            min_block_size,
        )
    }

    /// Calculates the slab geometry for `target_count` records of `stride` bytes, each holding
    /// an object of `object_size` bytes.
    pub(crate) fn new(
        object_size: usize,
        stride: usize,
        target_count: NonZero<usize>,
        min_block_size: NonZero<usize>,
    ) -> Result<Self> {
        let stride = NonZero::new(stride).expect("every record has a header, so is never empty");

        let block_size = stride.max(min_block_size);

        let objects_per_block =
            NonZero::new(Integer::div_floor(&block_size.get(), &stride.get()))
                .expect("a block is never smaller than one stride");

        // There is always one spare entry, even if the target count divides evenly.
        let block_count = Integer::div_floor(&target_count.get(), &objects_per_block.get())
            .checked_add(1)
            .ok_or(Error::LayoutOverflow {
                object_size,
                target_count: target_count.get(),
            })?;

        Ok(Self {
            object_size,
            stride,
            block_size,
            objects_per_block,
            block_count,
        })
    }

    /// Size of the object type, as requested.
    #[must_use]
    pub fn object_size(&self) -> usize {
        self.object_size
    }

    /// Bytes occupied by each object, including padding and its header.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride.get()
    }

    /// Bytes per slab block, at most. A block only ever uses whole strides of it, and the last
    /// block of a pool only as many as it needs to reach the target count.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// Number of objects carved from each slab block.
    #[must_use]
    pub fn objects_per_block(&self) -> usize {
        self.objects_per_block.get()
    }

    /// Number of slab blocks the pool can allocate before it runs out of capacity.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Translates an issue index into the index of its block and its slot within that block.
    #[must_use]
    pub(crate) fn locate(&self, issue_index: usize) -> (usize, usize) {
        issue_index.div_rem(&self.objects_per_block.get())
    }
}
