use thiserror::Error;

/// Errors that can occur when configuring or using an [`ObjectPool`][crate::ObjectPool].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An object was returned to a pool other than the one that issued it.
    #[error("object issued by pool {object_pool_id} cannot be returned to pool {pool_id}")]
    ForeignObject {
        /// The pool that issued the object.
        object_pool_id: u64,

        /// The pool the object was returned to.
        pool_id: u64,
    },

    /// The slab geometry of the requested pool does not fit in the address space.
    #[error(
        "slab layout for {target_count} objects of {object_size} bytes exceeds the address space"
    )]
    LayoutOverflow {
        /// Size of one object, in bytes.
        object_size: usize,

        /// Number of objects the pool was asked to hold in slabs.
        target_count: usize,
    },
}

/// A specialized `Result` type for memkit operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn foreign_object_message_names_both_pools() {
        let error = Error::ForeignObject {
            object_pool_id: 3,
            pool_id: 7,
        };

        assert_eq!(
            error.to_string(),
            "object issued by pool 3 cannot be returned to pool 7"
        );
    }

    #[test]
    fn layout_overflow_message_names_inputs() {
        let error = Error::LayoutOverflow {
            object_size: 123,
            target_count: 45,
        };

        let message = error.to_string();

        assert!(message.contains("45 objects"));
        assert!(message.contains("123 bytes"));
    }
}
