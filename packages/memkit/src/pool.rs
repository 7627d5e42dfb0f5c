use std::num::NonZero;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::object::{Location, Tagged};
use crate::{Error, ObjectLayout, ObjectPoolBuilder, Origin, PoolObject, Result, Stack};

/// Global counter for generating unique pool IDs.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique pool ID.
fn generate_pool_id() -> u64 {
    POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A pool of uniformly-sized objects, carved from slab blocks and recycled via a free list.
///
/// The pool has a target count of objects it carves from slab blocks. Blocks are allocated
/// lazily, one at a time, as objects are carved from them. Once the target count has been
/// carved, objects returned to the pool are reused in LIFO order and only when none are
/// available does the pool fall back to allocating standalone objects on the heap.
///
/// Each object carries a tag ([`Origin`]) that records whether it came from a slab (and if so,
/// its issue index) or was allocated standalone. This is what allows [`put()`][Self::put] to
/// decide, with no other bookkeeping, whether to recycle the object or free it.
///
/// Objects are created with `T::default()` when their slab block is allocated (or when they are
/// allocated standalone). A recycled object is handed out again exactly as it was returned - the
/// pool does not reset its value.
///
/// # Examples
///
/// ```
/// use memkit::{ObjectPool, Origin};
///
/// let mut pool = ObjectPool::<[u8; 32]>::new(2);
///
/// let mut a = pool.get();
/// let b = pool.get();
/// let c = pool.get();
///
/// assert_eq!(a.origin(), Origin::Issued(0));
/// assert_eq!(b.origin(), Origin::Issued(1));
/// assert_eq!(c.origin(), Origin::Standalone);
///
/// pool.object_mut(&mut a)[0] = 42;
/// pool.put(a);
///
/// // The recycled object comes back with its contents intact.
/// let again = pool.get();
/// assert_eq!(again.origin(), Origin::Issued(0));
/// assert_eq!(pool.object(&again)[0], 42);
/// # pool.put(again);
/// # pool.put(b);
/// # pool.put(c);
/// ```
///
/// # Thread safety
///
/// The pool performs no internal synchronization. It is [`Send`] and [`Sync`] if `T` is, but
/// mutating it from multiple threads requires external locking (or one pool per thread).
#[derive(Debug)]
pub struct ObjectPool<T> {
    /// We need to uniquely identify each pool to ensure that objects are not returned to the
    /// wrong pool. If the pool ID does not match when an object is returned, we reject it.
    pool_id: u64,

    layout: ObjectLayout,

    /// Number of objects to carve from slab blocks before falling back to standalone objects.
    capacity: NonZero<usize>,

    /// Number of objects carved from slab blocks so far. Also the issue index of the next one.
    issued: usize,

    /// One entry per block the pool may ever allocate, `None` until the first object is carved
    /// from it.
    blocks: Vec<Option<Box<[Tagged<T>]>>>,

    /// Issue indexes of slab objects that have been returned to the pool.
    free: Stack<usize>,
}

impl<T: Default> ObjectPool<T> {
    /// Creates a pool that carves up to `target_count` objects from slab blocks.
    ///
    /// A target count of zero selects [`DEFAULT_TARGET_COUNT`][crate::DEFAULT_TARGET_COUNT].
    ///
    /// # Panics
    ///
    /// Panics if the slab geometry of the pool does not fit in the address space.
    #[must_use]
    pub fn new(target_count: usize) -> Self {
        Self::builder().target_count(target_count).build()
    }

    /// Starts building a new [`ObjectPool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the target count.
    pub fn builder() -> ObjectPoolBuilder<T> {
        ObjectPoolBuilder::new()
    }

    /// Hands out an object.
    ///
    /// In order of preference, this is the most recently returned slab object, a newly carved
    /// slab object or a newly allocated standalone object.
    #[must_use]
    pub fn get(&mut self) -> PoolObject<T> {
        if let Some(issue_index) = self.free.pop() {
            return PoolObject::slab(self.pool_id, issue_index);
        }

        if self.issued < self.capacity.get() {
            return self.carve();
        }

        debug!(
            pool_id = self.pool_id,
            capacity = self.capacity.get(),
            issued = self.issued,
            "slab capacity exhausted, allocating standalone object"
        );

        PoolObject::standalone(self.pool_id, T::default())
    }

    fn carve(&mut self) -> PoolObject<T> {
        let issue_index = self.issued;
        let (block_index, index_in_block) = self.layout.locate(issue_index);

        let block = self
            .blocks
            .get_mut(block_index)
            .expect("the block table has room for every object up to the capacity");

        if block.is_none() {
            debug_assert_eq!(index_in_block, 0, "blocks are allocated by their first object");

            let records = allocate_block(
                issue_index,
                self.layout.objects_per_block(),
                self.capacity.get(),
            );

            trace!(
                pool_id = self.pool_id,
                block_index,
                objects = records.len(),
                bytes = size_of_val::<[Tagged<T>]>(&records),
                "allocated slab block"
            );

            *block = Some(records);
        }

        let record = block
            .as_mut()
            .and_then(|block| block.get_mut(index_in_block))
            .expect("we just ensured the block exists and it has a slot for every object below the capacity");

        // The tag was stamped when the block was allocated; carving must agree with it.
        debug_assert_eq!(record.origin(), Origin::Issued(issue_index));

        self.issued = issue_index
            .checked_add(1)
            .expect("issued is bounded by the capacity, which is a usize");

        PoolObject::slab(self.pool_id, issue_index)
    }
}

impl<T> ObjectPool<T> {
    pub(crate) fn new_inner(layout: ObjectLayout, capacity: NonZero<usize>) -> Self {
        let mut blocks = Vec::new();
        blocks.resize_with(layout.block_count(), || None);

        Self {
            pool_id: generate_pool_id(),
            layout,
            capacity,
            issued: 0,
            blocks,
            free: Stack::new(),
        }
    }

    /// Returns an object to the pool.
    ///
    /// Slab objects are kept for reuse by a later [`get()`][Self::get]. Standalone objects are
    /// freed immediately.
    ///
    /// # Panics
    ///
    /// Panics if the object was issued by a different pool.
    pub fn put(&mut self, object: PoolObject<T>) {
        self.try_put(object)
            .unwrap_or_else(|error| panic!("{error}"));
    }

    /// Returns an object to the pool, like [`put()`][Self::put].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignObject`] if the object was issued by a different pool. The
    /// object is dropped in that case.
    pub fn try_put(&mut self, object: PoolObject<T>) -> Result<()> {
        self.check_owned(&object)?;

        match object.origin() {
            Origin::Standalone => {
                drop(object);

                trace!(pool_id = self.pool_id, "freed standalone object");
            }
            Origin::Issued(issue_index) => {
                debug_assert_eq!(self.record(issue_index).origin(), Origin::Issued(issue_index));

                self.free.push(issue_index);
            }
        }

        Ok(())
    }

    /// Shared access to the value of an object issued by this pool.
    ///
    /// # Panics
    ///
    /// Panics if the object was issued by a different pool.
    #[must_use]
    pub fn object<'a>(&'a self, object: &'a PoolObject<T>) -> &'a T {
        self.assert_owned(object);

        match object.location() {
            Location::Slab { issue_index } => &self.record(*issue_index).value,
            Location::Standalone(record) => &record.value,
        }
    }

    /// Exclusive access to the value of an object issued by this pool.
    ///
    /// # Panics
    ///
    /// Panics if the object was issued by a different pool.
    #[must_use]
    pub fn object_mut<'a>(&'a mut self, object: &'a mut PoolObject<T>) -> &'a mut T {
        self.assert_owned(object);

        match object.location_mut() {
            Location::Slab { issue_index } => &mut self.record_mut(*issue_index).value,
            Location::Standalone(record) => &mut record.value,
        }
    }

    /// The slab geometry of the pool.
    #[must_use]
    pub fn layout(&self) -> ObjectLayout {
        self.layout
    }

    /// Number of objects the pool carves from slab blocks before it allocates standalone ones.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of objects carved from slab blocks so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Number of slab objects that have been returned and are waiting for reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of slab blocks allocated so far.
    #[must_use]
    pub fn allocated_blocks(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_some()).count()
    }

    fn check_owned(&self, object: &PoolObject<T>) -> Result<()> {
        if object.pool_id() == self.pool_id {
            Ok(())
        } else {
            Err(Error::ForeignObject {
                object_pool_id: object.pool_id(),
                pool_id: self.pool_id,
            })
        }
    }

    fn assert_owned(&self, object: &PoolObject<T>) {
        if let Err(error) = self.check_owned(object) {
            panic!("{error}");
        }
    }

    fn record(&self, issue_index: usize) -> &Tagged<T> {
        let (block_index, index_in_block) = self.layout.locate(issue_index);

        self.blocks
            .get(block_index)
            .and_then(Option::as_ref)
            .and_then(|block| block.get(index_in_block))
            .expect("issued objects always live in an allocated block")
    }

    fn record_mut(&mut self, issue_index: usize) -> &mut Tagged<T> {
        let (block_index, index_in_block) = self.layout.locate(issue_index);

        self.blocks
            .get_mut(block_index)
            .and_then(Option::as_mut)
            .and_then(|block| block.get_mut(index_in_block))
            .expect("issued objects always live in an allocated block")
    }
}

/// Allocates the slab block starting at `first_issue_index`, with every record tagged with the
/// issue index it will be carved as.
///
/// A block holds `objects_per_block` records, except that no records are created for issue
/// indexes at or beyond the capacity of the pool.
fn allocate_block<T: Default>(
    first_issue_index: usize,
    objects_per_block: usize,
    capacity: usize,
) -> Box<[Tagged<T>]> {
    let remaining = capacity.saturating_sub(first_issue_index);

    (first_issue_index..)
        .take(objects_per_block.min(remaining))
        .map(|issue_index| Tagged::issued(issue_index, T::default()))
        .collect()
}
