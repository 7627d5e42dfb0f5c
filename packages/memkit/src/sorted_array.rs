use std::cmp::Ordering;
use std::fmt;
use std::slice;

use crate::{Array, DEFAULT_INLINE_CAPACITY};

/// An [`Array`] that keeps its items in ascending order according to a comparator.
///
/// New items are appended and then moved backward into place one swap at a time, so inserting is
/// O(n) in the worst case. This suits small and medium collections that are built up
/// incrementally and need ordered iteration or membership checks. Lookups are binary searches.
///
/// The comparator must define a total order. Items that compare equal are kept in no particular
/// relative order.
///
/// # Examples
///
/// ```
/// use memkit::SortedArray;
///
/// let mut words = SortedArray::<&str, _>::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));
///
/// words.put("three");
/// words.put("a");
/// words.put("bb");
///
/// assert_eq!(words.as_slice(), &["a", "bb", "three"]);
///
/// // Anything of the same length is "equal" to "cc" under this comparator.
/// assert_eq!(words.erase(&"cc"), Some("bb"));
/// assert_eq!(words.as_slice(), &["a", "three"]);
/// ```
pub struct SortedArray<T, C, const INLINE: usize = DEFAULT_INLINE_CAPACITY>
where
    C: Fn(&T, &T) -> Ordering,
{
    items: Array<T, INLINE>,
    cmp: C,
}

impl<T, const INLINE: usize> SortedArray<T, fn(&T, &T) -> Ordering, INLINE>
where
    T: Ord,
{
    /// Creates an empty sorted array ordered by the natural ordering of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use memkit::SortedArray;
    ///
    /// let mut numbers = SortedArray::<i32, _>::by_ord();
    /// numbers.put(3);
    /// numbers.put(-1);
    ///
    /// assert_eq!(numbers.as_slice(), &[-1, 3]);
    /// ```
    #[must_use]
    pub fn by_ord() -> Self {
        Self::new(T::cmp)
    }
}

impl<T, C, const INLINE: usize> SortedArray<T, C, INLINE>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty sorted array ordered by `cmp`.
    #[must_use]
    pub fn new(cmp: C) -> Self {
        Self {
            items: Array::new(),
            cmp,
        }
    }

    /// The number of items in the collection.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Iterates over the items in ascending order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The smallest item, or `None` if the collection is empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// The largest item, or `None` if the collection is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Inserts an item at its ordered position.
    ///
    /// The item is placed after any existing items that compare equal to it.
    pub fn put(&mut self, value: T) {
        self.items.push(value);

        let items = self.items.as_mut_slice();

        for index in (1..items.len()).rev() {
            let previous = index.wrapping_sub(1);

            let (Some(current), Some(preceding)) = (items.get(index), items.get(previous)) else {
                unreachable!("both indexes are within 1..len and 0..len-1 respectively");
            };

            if (self.cmp)(current, preceding) != Ordering::Less {
                break;
            }

            items.swap(index, previous);
        }
    }

    /// Removes an item equal to `target` and returns it.
    ///
    /// Returns `None` and leaves the collection unchanged if no item compares equal to `target`.
    /// If several items compare equal, one of them is removed; which one is unspecified.
    pub fn erase(&mut self, target: &T) -> Option<T> {
        let index = self.position(target)?;

        self.items.remove(index)
    }

    /// Returns the index of an item equal to `target`, or `None` if there is no such item.
    #[must_use]
    pub fn position(&self, target: &T) -> Option<usize> {
        self.items.search_by(target, &self.cmp)
    }

    /// Whether the collection contains an item equal to `target`.
    #[must_use]
    pub fn contains(&self, target: &T) -> bool {
        self.position(target).is_some()
    }

    /// Gives up the ordering guarantee, returning the underlying array.
    #[must_use]
    pub fn into_array(self) -> Array<T, INLINE> {
        self.items
    }
}

impl<T, C, const INLINE: usize> fmt::Debug for SortedArray<T, C, INLINE>
where
    T: fmt::Debug,
    C: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedArray")
            .field("items", &self.items)
            .field("cmp", &format_args!("{}", std::any::type_name::<C>()))
            .finish()
    }
}

impl<'a, T, C, const INLINE: usize> IntoIterator for &'a SortedArray<T, C, INLINE>
where
    C: Fn(&T, &T) -> Ordering,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
