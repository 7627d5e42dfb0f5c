use std::cmp::Ordering;
use std::mem;
use std::slice;

use num_integer::Integer;
use tracing::trace;

/// Number of items an [`Array`] holds inline unless a different `INLINE` is specified.
pub const DEFAULT_INLINE_CAPACITY: usize = 8;

/// A growable sequence that keeps its first `INLINE` items inside the `Array` value itself.
///
/// While the array holds at most `INLINE` items, no heap memory is used. Once it needs to grow
/// beyond that, the items move to a heap buffer whose capacity doubles every time it fills up.
///
/// Popping items shrinks the heap buffer again, with some hysteresis so that alternating pushes
/// and pops near a boundary do not cause an allocation on every call:
///
/// * Nothing happens until fewer than a third of the heap slots are in use.
/// * If the item count is then also below three quarters of `INLINE`, or two thirds of the heap
///   capacity would not exceed `INLINE`, the items move back into the inline buffer and the heap
///   buffer is released.
/// * Otherwise the heap buffer is shrunk to two thirds of its previous capacity.
///
/// The capacity is therefore `INLINE` exactly when the items are stored inline.
///
/// Whether the items are currently inline or on the heap has no effect on the results of any
/// operation. The storage mode is only observable via [`is_inline()`][Self::is_inline],
/// [`capacity()`][Self::capacity] and the number of allocations performed.
///
/// # Examples
///
/// ```
/// use memkit::Array;
///
/// let mut array = Array::<u32, 4>::new();
///
/// for i in 0..5 {
///     array.push(i);
/// }
///
/// // The fifth item no longer fits inline.
/// assert!(!array.is_inline());
/// assert_eq!(array.capacity(), 8);
/// assert_eq!(array.as_slice(), &[0, 1, 2, 3, 4]);
///
/// assert_eq!(array.pop(), Some(4));
/// assert_eq!(array.pop(), Some(3));
/// assert_eq!(array.pop(), Some(2));
/// assert!(!array.is_inline());
///
/// // One item is below a third of the heap capacity and below 3/4 of the inline capacity.
/// assert_eq!(array.pop(), Some(1));
/// assert!(array.is_inline());
/// assert_eq!(array.as_slice(), &[0]);
/// ```
#[derive(Debug)]
pub struct Array<T, const INLINE: usize = DEFAULT_INLINE_CAPACITY> {
    storage: Storage<T, INLINE>,

    /// Equal to `INLINE` whenever the storage is inline. For heap storage this is the capacity
    /// we have committed to, which the backing `Vec` is guaranteed to be able to hold.
    capacity: usize,
}

#[derive(Debug)]
enum Storage<T, const INLINE: usize> {
    Inline(heapless::Vec<T, INLINE>),
    Heap(Vec<T>),
}

impl<T, const INLINE: usize> Array<T, INLINE> {
    /// Creates an empty array using its inline storage.
    #[must_use]
    pub fn new() -> Self {
        const { assert!(INLINE > 0, "Array must have a non-zero inline capacity") };

        Self {
            storage: Storage::Inline(heapless::Vec::new()),
            capacity: INLINE,
        }
    }

    /// The number of items in the array.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the array holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// The number of items the array can hold before it has to grow.
    ///
    /// This is `INLINE` while the items are stored inline.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the items are stored inside the `Array` value rather than in a heap buffer.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// The items of the array, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Inline(items) => items.as_slice(),
            Storage::Heap(items) => items.as_slice(),
        }
    }

    /// The items of the array, in insertion order.
    ///
    /// Items may be modified or reordered in place but the length cannot change.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Inline(items) => items.as_mut_slice(),
            Storage::Heap(items) => items.as_mut_slice(),
        }
    }

    /// Returns the item at `index`, or `None` if the index is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the first item, or `None` if the array is empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Returns the last item, or `None` if the array is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Iterates over the items in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Appends an item, doubling the capacity first if the array is full.
    pub fn push(&mut self, value: T) {
        if self.len() == self.capacity {
            self.grow();
        }

        match &mut self.storage {
            Storage::Inline(items) => {
                if items.push(value).is_err() {
                    unreachable!("we grow out of inline storage before it can become full");
                }
            }
            Storage::Heap(items) => items.push(value),
        }
    }

    /// Removes and returns the last item, or `None` if the array is empty.
    ///
    /// This may shrink the heap buffer or move the items back inline.
    pub fn pop(&mut self) -> Option<T> {
        let value = self.take_last()?;

        self.try_shrink();

        Some(value)
    }

    /// Removes and returns the item at `index`, shifting all later items one position to the
    /// left. Returns `None` (and changes nothing) if the index is out of bounds.
    ///
    /// This may shrink the heap buffer or move the items back inline.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        self.as_mut_slice().get_mut(index..)?.rotate_left(1);

        let value = self.take_last();

        self.try_shrink();

        value
    }

    /// Removes all items and returns to inline storage, releasing any heap buffer.
    ///
    /// This is cheaper than popping the items one by one, as no intermediate shrinking happens.
    pub fn rewind(&mut self) {
        self.storage = Storage::Inline(heapless::Vec::new());
        self.capacity = INLINE;
    }

    /// Binary searches the array for an item equal to `target`.
    ///
    /// The array must be sorted in ascending order according to `cmp`, which is called as
    /// `cmp(target, candidate)`. If several items compare equal to the target, any one of them
    /// may be found.
    ///
    /// Returns the index of a matching item or `None` if there is no such item.
    ///
    /// # Examples
    ///
    /// ```
    /// use memkit::Array;
    ///
    /// let array: Array<u32> = [1, 3, 5, 7].into_iter().collect();
    ///
    /// assert_eq!(array.search_by(&5, u32::cmp), Some(2));
    /// assert_eq!(array.search_by(&4, u32::cmp), None);
    /// ```
    #[must_use]
    pub fn search_by<F>(&self, target: &T, mut cmp: F) -> Option<usize>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let items = self.as_slice();

        // Half-open interval [low, high) of candidates that may still match.
        let mut low = 0;
        let mut high = items.len();

        while low < high {
            let middle = low.midpoint(high);

            let candidate = items
                .get(middle)
                .expect("middle is always within [low, high) which is within bounds");

            match cmp(target, candidate) {
                Ordering::Equal => return Some(middle),
                Ordering::Less => high = middle,
                Ordering::Greater => {
                    low = middle
                        .checked_add(1)
                        .expect("middle is an in-bounds index so cannot be usize::MAX");
                }
            }
        }

        None
    }

    fn take_last(&mut self) -> Option<T> {
        match &mut self.storage {
            Storage::Inline(items) => items.pop(),
            Storage::Heap(items) => items.pop(),
        }
    }

    fn grow(&mut self) {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .expect("an array larger than virtual memory cannot exist, so growth cannot overflow");

        match &mut self.storage {
            Storage::Inline(items) => {
                let mut heap_items = Vec::with_capacity(new_capacity);
                heap_items.extend(mem::take(items));

                self.storage = Storage::Heap(heap_items);

                trace!(capacity = new_capacity, "array moved from inline to heap storage");
            }
            Storage::Heap(items) => {
                items.reserve_exact(new_capacity.saturating_sub(items.len()));
            }
        }

        self.capacity = new_capacity;
    }

    fn try_shrink(&mut self) {
        let Storage::Heap(items) = &mut self.storage else {
            return;
        };

        let one_third = Integer::div_floor(&self.capacity, &3);

        if items.len() >= one_third {
            return;
        }

        let shrunk_capacity = one_third
            .checked_mul(2)
            .expect("two thirds of an existing capacity cannot overflow");

        // A heap buffer is never allowed to be as small as the inline one.
        if items.len() < demotion_threshold(INLINE) || shrunk_capacity <= INLINE {
            let mut inline_items = heapless::Vec::new();

            for item in items.drain(..) {
                if inline_items.push(item).is_err() {
                    unreachable!("the demotion threshold is below the inline capacity");
                }
            }

            self.storage = Storage::Inline(inline_items);
            self.capacity = INLINE;

            trace!(capacity = INLINE, "array moved from heap to inline storage");
        } else {
            items.shrink_to(shrunk_capacity);
            self.capacity = shrunk_capacity;

            trace!(capacity = shrunk_capacity, "array heap storage shrunk");
        }
    }
}

/// Heap storage is only abandoned in favor of inline storage if fewer items than this remain,
/// so that the inline buffer is not immediately full again.
#[must_use]
fn demotion_threshold(inline_capacity: usize) -> usize {
    Integer::div_floor(&inline_capacity, &4)
        .checked_mul(3)
        .expect("three quarters of a capacity cannot overflow")
}

impl<T, const INLINE: usize> Default for Array<T, INLINE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const INLINE: usize> Extend<T> for Array<T, INLINE> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, const INLINE: usize> FromIterator<T> for Array<T, INLINE> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'a, T, const INLINE: usize> IntoIterator for &'a Array<T, INLINE> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Array<u32>: Send, Sync, Debug, Default);

    #[test]
    fn new_array_is_empty_and_inline() {
        let array = Array::<u32>::new();

        assert!(array.is_empty());
        assert!(array.is_inline());
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), DEFAULT_INLINE_CAPACITY);
    }

    #[test]
    fn stays_inline_until_full() {
        let mut array = Array::<u32, 4>::new();

        for i in 0..4 {
            array.push(i);
            assert!(array.is_inline());
        }

        assert_eq!(array.capacity(), 4);
        assert_eq!(array.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn growth_moves_to_heap_and_doubles() {
        let mut array = Array::<u32>::new();
        let mut observed = vec![array.capacity()];

        for i in 0..33 {
            array.push(i);

            if observed.last() != Some(&array.capacity()) {
                observed.push(array.capacity());
            }
        }

        assert_eq!(observed, vec![8, 16, 32, 64]);
        assert!(!array.is_inline());
        assert_eq!(array.as_slice(), (0..33).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut array = Array::<u32>::new();

        assert_eq!(array.pop(), None);

        array.push(1);
        assert_eq!(array.pop(), Some(1));
        assert_eq!(array.pop(), None);
    }

    #[test]
    fn pop_demotes_to_inline_below_threshold() {
        let mut array = Array::<u32>::new();
        array.extend(0..9);

        assert_eq!(array.capacity(), 16);

        // 16 / 3 = 5, so nothing happens while at least 5 items remain.
        for expected in (5..9).rev() {
            assert_eq!(array.pop(), Some(expected));
            assert!(!array.is_inline());
            assert_eq!(array.capacity(), 16);
        }

        // 4 items is below a third and below 8 / 4 * 3 = 6.
        assert_eq!(array.pop(), Some(4));
        assert!(array.is_inline());
        assert_eq!(array.capacity(), DEFAULT_INLINE_CAPACITY);
        assert_eq!(array.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn pop_shrinks_heap_to_two_thirds_above_demotion_threshold() {
        let mut array = Array::<u32>::new();
        array.extend(0..17);

        assert_eq!(array.capacity(), 32);

        for _ in 0..8 {
            _ = array.pop();
        }

        // 9 items is below 32 / 3 = 10 but not below the demotion threshold of 6.
        assert_eq!(array.len(), 9);
        assert!(!array.is_inline());
        assert_eq!(array.capacity(), 20);

        // 20 / 3 = 6, so the shrink check passes at 5 items, which also demotes.
        for _ in 0..3 {
            _ = array.pop();
            assert_eq!(array.capacity(), 20);
        }

        _ = array.pop();
        assert_eq!(array.len(), 5);
        assert!(array.is_inline());
        assert_eq!(array.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn growth_after_shrink_doubles_current_capacity() {
        let mut array = Array::<u32>::new();
        array.extend(0..17);

        for _ in 0..8 {
            _ = array.pop();
        }

        assert_eq!(array.capacity(), 20);

        array.extend(9..21);

        assert_eq!(array.len(), 21);
        assert_eq!(array.capacity(), 40);
        assert_eq!(array.as_slice(), (0..21).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn rewind_releases_heap_storage() {
        let mut array = Array::<u32>::new();
        array.extend(0..100);

        assert!(!array.is_inline());

        array.rewind();

        assert!(array.is_empty());
        assert!(array.is_inline());
        assert_eq!(array.capacity(), DEFAULT_INLINE_CAPACITY);

        array.push(42);
        assert_eq!(array.as_slice(), &[42]);
    }

    #[test]
    fn rewind_inline_clears() {
        let mut array = Array::<u32>::new();
        array.extend([1, 2, 3]);

        array.rewind();

        assert!(array.is_empty());
        assert!(array.is_inline());
    }

    #[test]
    fn remove_shifts_later_items_left() {
        let mut array: Array<char> = "abcde".chars().collect();

        assert_eq!(array.remove(1), Some('b'));
        assert_eq!(array.as_slice(), &['a', 'c', 'd', 'e']);

        assert_eq!(array.remove(3), Some('e'));
        assert_eq!(array.as_slice(), &['a', 'c', 'd']);

        assert_eq!(array.remove(0), Some('a'));
        assert_eq!(array.as_slice(), &['c', 'd']);
    }

    #[test]
    fn remove_out_of_bounds_is_none() {
        let mut array: Array<u32> = [1, 2].into_iter().collect();

        assert_eq!(array.remove(2), None);
        assert_eq!(array.remove(usize::MAX), None);
        assert_eq!(array.as_slice(), &[1, 2]);

        let mut empty = Array::<u32>::new();
        assert_eq!(empty.remove(0), None);
    }

    #[test]
    fn remove_applies_shrink_policy() {
        let mut array = Array::<u32>::new();
        array.extend(0..9);

        for _ in 0..5 {
            _ = array.remove(0);
        }

        assert!(array.is_inline());
        assert_eq!(array.as_slice(), &[5, 6, 7, 8]);
    }

    #[test]
    fn search_finds_every_item() {
        let array: Array<u32> = (0..50).map(|i| i * 2).collect();

        for (index, value) in array.iter().enumerate() {
            assert_eq!(array.search_by(value, u32::cmp), Some(index));
        }
    }

    #[test]
    fn search_missing_is_none() {
        let array: Array<u32> = (0..50).map(|i| i * 2).collect();

        assert_eq!(array.search_by(&1, u32::cmp), None);
        assert_eq!(array.search_by(&99, u32::cmp), None);
        assert_eq!(array.search_by(&1000, u32::cmp), None);

        let empty = Array::<u32>::new();
        assert_eq!(empty.search_by(&0, u32::cmp), None);
    }

    #[test]
    fn search_with_duplicates_finds_one_of_them() {
        let array: Array<u32> = [1, 2, 2, 2, 3].into_iter().collect();

        let index = array.search_by(&2, u32::cmp).unwrap();

        assert_eq!(array.get(index), Some(&2));
    }

    #[test]
    fn accessors_agree_with_slice() {
        let array: Array<u32, 2> = [5, 6, 7].into_iter().collect();

        assert_eq!(array.first(), Some(&5));
        assert_eq!(array.last(), Some(&7));
        assert_eq!(array.get(1), Some(&6));
        assert_eq!(array.get(3), None);
        assert_eq!((&array).into_iter().copied().sum::<u32>(), 18);
    }

    #[test]
    fn as_mut_slice_modifies_in_place() {
        let mut array: Array<u32> = [3, 1, 2].into_iter().collect();

        array.as_mut_slice().sort_unstable();

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn small_inline_capacity_drains_back_to_inline() {
        let mut two = Array::<u32, 2>::new();
        two.extend(0..5);
        assert!(!two.is_inline());

        while two.pop().is_some() {
            assert_eq!(two.is_inline(), two.capacity() == 2);
        }

        assert!(two.is_inline());
        assert_eq!(two.capacity(), 2);

        let mut three = Array::<u32, 3>::new();
        three.extend(0..7);
        assert_eq!(three.capacity(), 12);

        while three.pop().is_some() {
            assert_eq!(three.is_inline(), three.capacity() == 3);
        }

        assert!(three.is_inline());
        assert_eq!(three.capacity(), 3);

        let mut observed = vec![three.capacity()];

        for i in 0..13 {
            three.push(i);

            if observed.last() != Some(&three.capacity()) {
                observed.push(three.capacity());
            }
        }

        assert_eq!(observed, vec![3, 6, 12, 24]);
    }

    #[test]
    fn drops_items_in_both_storage_modes() {
        use std::rc::Rc;

        let tracker = Rc::new(());

        {
            let mut inline = Array::<Rc<()>>::new();
            inline.push(Rc::clone(&tracker));

            let mut heap = Array::<Rc<()>, 1>::new();
            heap.extend([Rc::clone(&tracker), Rc::clone(&tracker)]);

            assert_eq!(Rc::strong_count(&tracker), 4);
        }

        assert_eq!(Rc::strong_count(&tracker), 1);
    }
}
