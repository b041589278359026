use std::{ops::Deref, slice};

use thiserror::Error;

/// Allocation failure while creating or growing a [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of memory while growing batch")]
pub struct OutOfMemory;

/// Contiguous growable buffer with an explicit doubling growth policy.
///
/// Capacity never shrinks on its own: [`Batch::clear`] keeps the allocation,
/// so a batch refilled every frame stops reallocating once it has seen its
/// peak size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    items: Vec<T>,
}

impl<T> Batch<T> {
    /// Creates an empty batch with room for at least `max(hint, 1)` elements.
    pub fn try_with_capacity(hint: usize) -> Result<Self, OutOfMemory> {
        let mut items = Vec::new();

        items
            .try_reserve_exact(hint.max(1))
            .map_err(|_| OutOfMemory)?;

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Appends `value`, doubling the capacity when the batch is full.
    ///
    /// On reallocation failure the batch keeps its previous contents and
    /// capacity, and `value` is dropped without being appended.
    pub fn try_push(&mut self, value: T) -> Result<(), OutOfMemory> {
        if self.items.len() == self.items.capacity() {
            let additional = self.items.capacity().max(1);

            self.items
                .try_reserve_exact(additional)
                .map_err(|_| OutOfMemory)?;
        }

        self.items.push(value);

        Ok(())
    }

    /// Resets the length to zero without releasing the buffer.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Deref for Batch<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a Batch<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_readback_roundtrip() {
        let mut batch = Batch::try_with_capacity(0).unwrap();

        for i in 0..257usize {
            batch.try_push(i * 3).unwrap();
        }

        assert_eq!(batch.len(), 257);
        for (i, value) in batch.into_iter().enumerate() {
            assert_eq!(*value, i * 3);
        }
    }

    #[test]
    fn zero_hint_still_allocates() {
        let batch: Batch<u8> = Batch::try_with_capacity(0).unwrap();

        assert_eq!(batch.len(), 0);
        assert!(batch.is_empty());
        assert!(batch.capacity() >= 1);
    }

    #[test]
    fn capacity_hint_is_respected() {
        let mut batch = Batch::try_with_capacity(8).unwrap();
        let cap = batch.capacity();
        assert!(cap >= 8);

        for i in 0..8u32 {
            batch.try_push(i).unwrap();
        }

        assert_eq!(batch.capacity(), cap);
    }

    #[test]
    fn capacity_grows_only_by_doubling() {
        let mut batch = Batch::try_with_capacity(1).unwrap();
        let mut last_cap = batch.capacity();

        for i in 0..1000u32 {
            batch.try_push(i).unwrap();

            let cap = batch.capacity();
            assert!(cap >= batch.len());

            if cap != last_cap {
                assert_eq!(cap, last_cap * 2);
                last_cap = cap;
            }
        }
    }

    #[test]
    fn clear_keeps_the_allocation() {
        let mut batch = Batch::try_with_capacity(4).unwrap();

        for i in 0..37u32 {
            batch.try_push(i).unwrap();
        }

        let cap = batch.capacity();
        let ptr = batch.as_slice().as_ptr();

        batch.clear();
        assert_eq!(batch.len(), 0);
        assert_eq!(batch.capacity(), cap);

        for i in 0..37u32 {
            batch.try_push(i + 100).unwrap();
        }

        assert_eq!(batch.capacity(), cap);
        assert_eq!(batch.as_slice().as_ptr(), ptr);
    }

    #[test]
    fn refill_after_clear_matches_a_fresh_batch() {
        let mut reused = Batch::try_with_capacity(0).unwrap();
        for i in 0..50i64 {
            reused.try_push(i * i).unwrap();
        }
        reused.clear();

        let mut fresh = Batch::try_with_capacity(0).unwrap();
        for i in 0..20i64 {
            reused.try_push(-i).unwrap();
            fresh.try_push(-i).unwrap();
        }

        assert_eq!(reused.as_slice(), fresh.as_slice());
    }
}
