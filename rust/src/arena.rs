//! Slot arena used by the pointer-rich trees.
//!
//! Nodes that are reachable through more than one path (red-black parent
//! links, the B+ leaf chain) live in an arena and refer to each other by
//! `NodeId`. Freed slots are recycled through a free list.

use std::convert::TryFrom;
use std::ops::{Index, IndexMut};

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Id that never refers to a live slot.
pub const NULL_NODE: NodeId = u32::MAX;

/// Statistics for an arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaStats {
    pub total_slots: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub utilization: f64,
}

/// Arena allocator with slot reuse.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    allocated: usize,
}

impl<T> Arena<T> {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            allocated: 0,
        }
    }

    /// Create a new arena with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            allocated: 0,
        }
    }

    /// Allocate a new item in the arena and return its ID
    #[inline]
    pub fn allocate(&mut self, item: T) -> NodeId {
        let index = if let Some(free_index) = self.free_list.pop() {
            self.slots[free_index] = Some(item);
            free_index
        } else {
            self.slots.push(Some(item));
            self.slots.len() - 1
        };
        self.allocated += 1;

        NodeId::try_from(index).expect("arena index should fit in NodeId")
    }

    /// Deallocate an item from the arena and return it
    #[inline]
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let index = Self::index_of(id)?;
        let item = self.slots.get_mut(index)?.take()?;
        self.free_list.push(index);
        self.allocated -= 1;
        Some(item)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        let index = Self::index_of(id)?;
        self.slots.get(index)?.as_ref()
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let index = Self::index_of(id)?;
        self.slots.get_mut(index)?.as_mut()
    }

    /// Check if an ID is valid and allocated
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of allocated items
    pub fn len(&self) -> usize {
        self.allocated
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Get the number of free slots
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Get the number of allocated items
    pub fn allocated_count(&self) -> usize {
        self.allocated
    }

    /// Clear all items from the arena
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.allocated = 0;
    }

    /// Get arena statistics
    pub fn stats(&self) -> ArenaStats {
        let total_slots = self.slots.len();
        let utilization = if total_slots > 0 {
            self.allocated as f64 / total_slots as f64
        } else {
            0.0
        };

        ArenaStats {
            total_slots,
            allocated_count: self.allocated,
            free_count: self.free_list.len(),
            utilization,
        }
    }

    /// Iterate over live slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|item| (index as NodeId, item))
        })
    }

    fn index_of(id: NodeId) -> Option<usize> {
        if id == NULL_NODE {
            return None;
        }
        usize::try_from(id).ok()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: NodeId) -> &T {
        self.get(id).expect("dangling arena id")
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        self.get_mut(id).expect("dangling arena id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_basic_operations() {
        let mut arena = Arena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);
        let id3 = arena.allocate(126);

        assert_eq!(arena.get(id1), Some(&42));
        assert_eq!(arena.get(id2), Some(&84));
        assert_eq!(arena[id3], 126);

        assert!(arena.contains(id1));
        assert!(!arena.contains(NULL_NODE));

        let stats = arena.stats();
        assert_eq!(stats.allocated_count, 3);
        assert_eq!(stats.free_count, 0);
    }

    #[test]
    fn test_slot_reuse() {
        let mut arena: Arena<i32> = Arena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);

        assert_eq!(arena.deallocate(id1), Some(42));
        assert!(!arena.contains(id1));
        assert!(arena.contains(id2));
        assert_eq!(arena.deallocate(id1), None);
        assert_eq!(arena.free_count(), 1);

        let id3 = arena.allocate(168);
        assert_eq!(id3, id1);
        assert_eq!(arena.get(id3), Some(&168));

        let stats = arena.stats();
        assert_eq!(stats.allocated_count, 2);
        assert_eq!(stats.free_count, 0);
    }

    #[test]
    fn test_clear_and_iter() {
        let mut arena = Arena::new();
        let a = arena.allocate("a");
        let b = arena.allocate("b");
        arena.deallocate(a);

        let live: Vec<_> = arena.iter().collect();
        assert_eq!(live, vec![(b, &"b")]);

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.stats().total_slots, 0);
    }

    #[test]
    #[should_panic(expected = "dangling arena id")]
    fn test_index_freed_slot_panics() {
        let mut arena = Arena::new();
        let id = arena.allocate(1);
        arena.deallocate(id);
        let _ = arena[id];
    }
}
