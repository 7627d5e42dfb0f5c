use num_integer::Integer;

/// Initial capacity of a [`Stack`] created via [`Stack::new()`].
///
/// This is also the initial size of the free list of an [`ObjectPool`][crate::ObjectPool].
pub const DEFAULT_STACK_CAPACITY: usize = 16;

/// A growable LIFO buffer.
///
/// The stack grows by roughly 50% (to `capacity + capacity / 2 + 1` slots) whenever a push finds
/// it full. Unlike [`Array`][crate::Array], it never gives memory back while it is alive - it is
/// meant for free lists and scratch storage, where the peak size is what matters.
///
/// # Examples
///
/// ```
/// use memkit::Stack;
///
/// let mut stack = Stack::with_capacity(2);
///
/// stack.push("a");
/// stack.push("b");
/// stack.push("c");
///
/// assert_eq!(stack.top(), Some(&"c"));
/// assert_eq!(stack.pop(), Some("c"));
/// assert_eq!(stack.pop(), Some("b"));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug)]
pub struct Stack<T> {
    items: Vec<T>,

    /// The number of slots we have committed to. The backing `Vec` always has room for at least
    /// this many items and is only ever grown when a push finds all of them occupied, so the
    /// growth schedule is ours and not whatever `Vec` would choose on its own.
    capacity: usize,
}

impl<T> Stack<T> {
    /// Creates an empty stack with [`DEFAULT_STACK_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STACK_CAPACITY)
    }

    /// Creates an empty stack with room for `capacity` items before the first growth.
    ///
    /// A capacity of zero is valid; the first push then grows the stack to one slot.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The number of items on the stack.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The number of items the stack can hold before it has to grow.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pushes an item onto the top of the stack, growing the stack if it is full.
    pub fn push(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.grow();
        }

        self.items.push(value);
    }

    /// Removes and returns the top item, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns the top item without removing it, or `None` if the stack is empty.
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    fn grow(&mut self) {
        let new_capacity = grown_capacity(self.capacity);

        self.items
            .reserve_exact(new_capacity.saturating_sub(self.items.len()));
        self.capacity = new_capacity;
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
fn grown_capacity(capacity: usize) -> usize {
    capacity
        .checked_add(Integer::div_floor(&capacity, &2))
        .and_then(|capacity| capacity.checked_add(1))
        .expect("a stack larger than virtual memory cannot exist, so growth cannot overflow")
}
