//! The random-access operand stack.
//!
//! Index `0` always denotes the most-recently-pushed (top) item; index `i`
//! denotes the item `i` positions below the top, regardless of how the
//! backing store lays items out. Out-of-range reads return `None` rather
//! than erroring; the stack primitive itself never panics.

use obol_foundation::StackItem;

const INITIAL_CAPACITY: usize = 16;

/// An indexable last-in-first-out container of stack items.
#[derive(Debug, Default)]
pub struct RandomAccessStack {
    /// Backing store with the top item at the end.
    items: Vec<StackItem>,
}

impl RandomAccessStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Returns the number of items on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the stack holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes an item onto the top of the stack.
    pub fn push(&mut self, item: StackItem) {
        self.items.push(item);
    }

    /// Pops the top item, or `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    /// Returns the item at top-relative `index` without removing it.
    #[must_use]
    pub fn peek(&self, index: usize) -> Option<&StackItem> {
        let len = self.items.len();
        if index >= len {
            return None;
        }
        self.items.get(len - index - 1)
    }

    /// Removes and returns the item at top-relative `index`.
    pub fn remove(&mut self, index: usize) -> Option<StackItem> {
        let len = self.items.len();
        if index >= len {
            return None;
        }
        Some(self.items.remove(len - index - 1))
    }

    /// Inserts `item` so that it sits at top-relative `index` afterwards,
    /// below the current top `index` items. A no-op when `index` exceeds
    /// the current length.
    pub fn insert(&mut self, index: usize, item: StackItem) {
        let len = self.items.len();
        if index > len {
            return;
        }
        self.items.insert(len - index, item);
    }

    /// Replaces the item at top-relative `index`. A no-op when out of range.
    pub fn set(&mut self, index: usize, item: StackItem) {
        let len = self.items.len();
        if index >= len {
            return;
        }
        self.items[len - index - 1] = item;
    }

    /// Swaps the items at top-relative indexes `i` and `j`.
    ///
    /// Returns false (leaving the stack untouched) when either index is
    /// out of range.
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        let len = self.items.len();
        if i >= len || j >= len {
            return false;
        }
        self.items.swap(len - i - 1, len - j - 1);
        true
    }

    /// The items in bottom-to-top order.
    #[must_use]
    pub fn items(&self) -> &[StackItem] {
        &self.items
    }
}
