use crate::api::error::{Error, Result};
use log::trace;
use std::mem::{self, size_of};

/// Elastic buffer: contiguous run of fixed-stride elements with an explicit
/// logical capacity that only grows by doubling.
///
/// The plain operations (`append`, `insert_at`) require spare capacity and
/// panic without it; the `checked_*` ones grow first. Index arguments are
/// trusted and panic when out of range; the `try_*` twins (and `get`) report
/// `Error::Index` instead.
pub struct Slice<T> {
    data: Vec<T>,
    cap: usize,
}

impl<T> Slice<T> {
    pub fn make(cap: usize) -> Self {
        Self {
            data: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Size of a single element in bytes.
    pub fn stride(&self) -> usize {
        size_of::<T>()
    }

    /// Reserved storage in bytes.
    pub fn bytes(&self) -> usize {
        self.cap * self.stride()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.cap
    }

    fn grow(&mut self) {
        let cap = (self.cap * 2).max(1);
        self.data.reserve_exact(cap - self.data.len());
        trace!("slice grow: {} -> {} (stride={})", self.cap, cap, self.stride());
        self.cap = cap;
    }

    pub fn append(&mut self, el: T) {
        assert!(
            !self.is_full(),
            "append past capacity: len={} cap={}",
            self.len(),
            self.cap
        );
        self.data.push(el);
    }

    pub fn checked_append(&mut self, el: T) {
        if self.is_full() {
            self.grow();
        }
        self.append(el);
    }

    pub fn insert_at(&mut self, idx: usize, el: T) {
        assert!(
            !self.is_full(),
            "insert past capacity: len={} cap={}",
            self.len(),
            self.cap
        );
        self.data.insert(idx, el);
    }

    pub fn checked_insert_at(&mut self, idx: usize, el: T) {
        if self.is_full() {
            self.grow();
        }
        self.insert_at(idx, el);
    }

    pub fn try_insert_at(&mut self, idx: usize, el: T) -> Result<()> {
        if idx > self.len() {
            return Err(Error::Index(idx, self.len()));
        }
        self.checked_insert_at(idx, el);
        Ok(())
    }

    /// Remove the element at `idx`, shifting the tail one slot left.
    pub fn delete_at(&mut self, idx: usize) -> T {
        self.data.remove(idx)
    }

    pub fn try_delete_at(&mut self, idx: usize) -> Result<T> {
        if idx >= self.len() {
            return Err(Error::Index(idx, self.len()));
        }
        Ok(self.delete_at(idx))
    }

    pub fn replace_at(&mut self, idx: usize, el: T) -> T {
        mem::replace(&mut self.data[idx], el)
    }

    pub fn try_replace_at(&mut self, idx: usize, el: T) -> Result<T> {
        if idx >= self.len() {
            return Err(Error::Index(idx, self.len()));
        }
        Ok(self.replace_at(idx, el))
    }

    /// Truncate by `n` elements keeping the capacity. The truncated elements
    /// are yielded in order; whatever is not consumed is dropped.
    pub fn rewind(&mut self, n: usize) -> std::vec::Drain<'_, T> {
        assert!(n <= self.len(), "rewind {} of {}", n, self.len());
        let at = self.len() - n;
        self.data.drain(at..)
    }

    pub fn take_last(&mut self) -> T {
        self.delete_at(self.len() - 1)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn at(&self, idx: usize) -> &T {
        &self.data[idx]
    }

    pub fn at_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }

    pub fn get(&self, idx: usize) -> Result<&T> {
        self.data.get(idx).ok_or(Error::Index(idx, self.len()))
    }

    pub fn first(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Extend<T> for Slice<T> {
    /// Appends every element; the capacity must already fit them all.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for el in iter {
            self.append(el);
        }
    }
}

impl<T> IntoIterator for Slice<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Slice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}
