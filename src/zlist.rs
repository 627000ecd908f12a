//! Growable sequence backing every table in the runtime
//!
//! Symbol tables, the literal pool, compiled code, the evaluation stack and
//! the slot storage of [`ZMap`](crate::zmap::ZMap) are all `ZList`s. Appending
//! returns the index the element landed at, which is how the compiler refers
//! to table entries. Storage doubles when full.

use std::ops::{Index, IndexMut};

/// Capacity reserved by [`ZList::new`]
const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct ZList<T> {
    items: Vec<T>,
}

impl<T> Default for ZList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ZList<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Append one element, returning its index
    #[inline]
    pub fn append(&mut self, item: T) -> usize {
        if self.items.len() == self.items.capacity() {
            self.expand();
        }
        let index = self.items.len();
        self.items.push(item);
        index
    }

    /// Double the allocation
    fn expand(&mut self) {
        let extra = self.items.capacity().max(1);
        self.items.reserve_exact(extra);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocated element count
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Remove the last element (stack use)
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Shorten to `len` elements, keeping the allocation
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Take the elements out, leaving an empty list with the same capacity
    pub fn drain_all(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }
}

impl<T> Index<usize> for ZList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for ZList<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a ZList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for ZList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = ZList::new();
        for item in iter {
            list.append(item);
        }
        list
    }
}
