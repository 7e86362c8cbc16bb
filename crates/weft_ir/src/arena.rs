//! Append-only object stores.
//!
//! Nothing is ever freed. A detached component and everything it owns stay in
//! their stores, which is what lets a removed subtree be attached again with
//! its handles intact.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A typed slot number.
pub trait Handle: Copy {
    /// The handle of slot `slot`.
    fn at(slot: usize) -> Self;

    /// The slot this handle names.
    fn slot(self) -> usize;
}

/// Objects of one kind, addressed by handle `H`.
#[derive(Debug, Clone)]
pub struct Arena<H, T> {
    slots: Vec<T>,
    handle: PhantomData<H>,
}

impl<H, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            handle: PhantomData,
        }
    }
}

impl<H: Handle, T> Arena<H, T> {
    /// Stores `item` in the next slot.
    pub fn alloc(&mut self, item: T) -> H {
        self.slots.push(item);
        H::at(self.slots.len() - 1)
    }

    /// Number of objects ever stored.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing was stored yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every object with its handle, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots.iter().enumerate().map(|(slot, item)| (H::at(slot), item))
    }
}

// Handles are only issued by `alloc`, so indexing with one never misses.
impl<H: Handle, T> Index<H> for Arena<H, T> {
    type Output = T;

    fn index(&self, handle: H) -> &T {
        &self.slots[handle.slot()]
    }
}

impl<H: Handle, T> IndexMut<H> for Arena<H, T> {
    fn index_mut(&mut self, handle: H) -> &mut T {
        &mut self.slots[handle.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::BlockId;

    #[test]
    fn slots_fill_in_order() {
        let mut blocks: Arena<BlockId, &str> = Arena::default();
        assert!(blocks.is_empty());
        let up1 = blocks.alloc("up1");
        let up2 = blocks.alloc("up2");
        assert_eq!((up1.slot(), up2.slot()), (0, 1));
        blocks[up2] = "seq";
        let names: Vec<_> = blocks.iter().map(|(_, name)| *name).collect();
        assert_eq!(names, ["up1", "seq"]);
        assert_eq!(blocks.len(), 2);
    }
}
