/// Where an object handed out by an [`ObjectPool`][crate::ObjectPool] lives.
///
/// This is the tag stored alongside every pooled object. It decides what happens when the object
/// is returned to the pool: slab objects go onto the free list for reuse, standalone objects are
/// freed on the spot.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "an object is either carved from a slab or allocated on its own, nothing else"
)]
pub enum Origin {
    /// The object was carved from a slab block. The value is its issue index: the position of
    /// the object in the order in which the pool carved its slab objects.
    Issued(usize),

    /// The object was allocated on its own because the pool had run out of slab capacity.
    Standalone,
}

/// Header value of a standalone record. Issue indexes are always below the capacity of the pool,
/// so they never reach it.
const STANDALONE_TAG: usize = usize::MAX;

/// A tagged record: the pooled value preceded by a one-word header that says where it lives.
///
/// The header holds the issue index of a slab object or [`STANDALONE_TAG`] (all bits set, -1 as
/// a signed word) for a standalone one.
#[derive(Debug)]
pub(crate) struct Tagged<T> {
    tag: usize,
    pub(crate) value: T,
}

impl<T> Tagged<T> {
    pub(crate) fn issued(issue_index: usize, value: T) -> Self {
        assert_ne!(
            issue_index, STANDALONE_TAG,
            "the standalone tag is never a valid issue index"
        );

        Self {
            tag: issue_index,
            value,
        }
    }

    pub(crate) fn standalone(value: T) -> Self {
        Self {
            tag: STANDALONE_TAG,
            value,
        }
    }

    pub(crate) fn origin(&self) -> Origin {
        if self.tag == STANDALONE_TAG {
            Origin::Standalone
        } else {
            Origin::Issued(self.tag)
        }
    }
}

/// An object issued by an [`ObjectPool`][crate::ObjectPool].
///
/// The value is accessed via [`ObjectPool::object()`][1] and [`ObjectPool::object_mut()`][2] and
/// the object is given back via [`ObjectPool::put()`][3], which consumes the handle.
///
/// Dropping a handle without giving it back does not return a slab object to the pool - its slot
/// stays issued until the pool itself is dropped. Standalone objects are freed either way.
///
/// [1]: crate::ObjectPool::object
/// [2]: crate::ObjectPool::object_mut
/// [3]: crate::ObjectPool::put
#[derive(Debug)]
pub struct PoolObject<T> {
    pool_id: u64,
    location: Location<T>,
}

#[derive(Debug)]
pub(crate) enum Location<T> {
    /// The record lives in a slab block owned by the pool.
    Slab { issue_index: usize },

    /// The handle owns the record.
    Standalone(Box<Tagged<T>>),
}

impl<T> PoolObject<T> {
    pub(crate) fn slab(pool_id: u64, issue_index: usize) -> Self {
        Self {
            pool_id,
            location: Location::Slab { issue_index },
        }
    }

    pub(crate) fn standalone(pool_id: u64, value: T) -> Self {
        Self {
            pool_id,
            location: Location::Standalone(Box::new(Tagged::standalone(value))),
        }
    }

    /// Where the object lives.
    ///
    /// # Examples
    ///
    /// ```
    /// use memkit::{ObjectPool, Origin};
    ///
    /// let mut pool = ObjectPool::<u64>::new(1);
    ///
    /// let first = pool.get();
    /// let second = pool.get();
    ///
    /// assert_eq!(first.origin(), Origin::Issued(0));
    /// assert_eq!(second.origin(), Origin::Standalone);
    /// # pool.put(first);
    /// # pool.put(second);
    /// ```
    #[must_use]
    pub fn origin(&self) -> Origin {
        match &self.location {
            Location::Slab { issue_index } => Origin::Issued(*issue_index),
            Location::Standalone(record) => record.origin(),
        }
    }

    /// Whether the object was allocated on its own instead of being carved from a slab.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.origin() == Origin::Standalone
    }

    pub(crate) fn pool_id(&self) -> u64 {
        self.pool_id
    }

    pub(crate) fn location(&self) -> &Location<T> {
        &self.location
    }

    pub(crate) fn location_mut(&mut self) -> &mut Location<T> {
        &mut self.location
    }
}
