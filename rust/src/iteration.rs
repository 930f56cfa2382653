//! Iterator implementations for BPlusTreeMap.
//!
//! Every iterator walks the leaf chain: it caches a reference to the current
//! leaf and only goes back to the arena when it steps to the next one.

use std::ops::Bound;

use crate::arena::NodeId;
use crate::types::{BPlusTreeMap, LeafNode};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-value pairs in key order.
pub struct ItemIterator<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    current_leaf: Option<&'a LeafNode<K, V>>,
    index: usize,
}

/// Iterator over keys in ascending order.
pub struct KeyIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over values in key order.
pub struct ValueIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over the pairs of a key range.
///
/// The start position is found by one descent; after that the iterator
/// follows the leaf chain until it passes the end bound.
pub struct RangeIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
    end: Bound<K>,
    finished: bool,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<K, V> BPlusTreeMap<K, V> {
    /// Returns an iterator over all key-value pairs in sorted order.
    pub fn items(&self) -> ItemIterator<'_, K, V> {
        ItemIterator::new(self)
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> ValueIterator<'_, K, V> {
        ValueIterator {
            items: self.items(),
        }
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> ItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        let first = tree.first_leaf_id().and_then(|id| tree.get_leaf(id));
        Self {
            tree,
            current_leaf: first,
            index: 0,
        }
    }

    /// Start at slot `index` of leaf `leaf_id`.
    pub(crate) fn from_position(tree: &'a BPlusTreeMap<K, V>, leaf_id: NodeId, index: usize) -> Self {
        Self {
            tree,
            current_leaf: tree.get_leaf(leaf_id),
            index,
        }
    }

    /// An iterator that yields nothing.
    pub(crate) fn empty(tree: &'a BPlusTreeMap<K, V>) -> Self {
        Self {
            tree,
            current_leaf: None,
            index: 0,
        }
    }
}

impl<'a, K, V> Iterator for ItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.current_leaf?;
            if let Some(entry) = leaf.entry(self.index) {
                self.index += 1;
                return Some(entry);
            }
            // Only arena access during iteration.
            self.current_leaf = leaf.next_leaf().and_then(|id| self.tree.get_leaf(id));
            self.index = 0;
        }
    }
}

impl<K, V> std::iter::FusedIterator for ItemIterator<'_, K, V> {}

// ============================================================================
// KEYITERATOR / VALUEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K, V> Iterator for ValueIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

// ============================================================================
// RANGEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord, V> RangeIterator<'a, K, V> {
    pub(crate) fn new(items: ItemIterator<'a, K, V>, end: Bound<K>) -> Self {
        Self {
            items,
            end,
            finished: false,
        }
    }

    fn beyond_end(&self, key: &K) -> bool {
        match &self.end {
            Bound::Included(end) => key > end,
            Bound::Excluded(end) => key >= end,
            Bound::Unbounded => false,
        }
    }
}

impl<'a, K: Ord, V> Iterator for RangeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let (key, value) = self.items.next()?;
        if self.beyond_end(key) {
            self.finished = true;
            return None;
        }
        Some((key, value))
    }
}

impl<K: Ord, V> std::iter::FusedIterator for RangeIterator<'_, K, V> {}

// ============================================================================
// STD TRAITS
// ============================================================================

impl<'a, K, V> IntoIterator for &'a BPlusTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ItemIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BPlusTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BPlusTreeMap<K, V> {
    /// Collect into a tree of the default minimum degree.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_follow_leaf_chain() {
        let tree: BPlusTreeMap<i32, i32> = (0..50).rev().map(|k| (k, k * k)).collect();
        assert!(tree.leaf_count() > 1);

        let items: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<_> = (0..50).map(|k| (k, k * k)).collect();
        assert_eq!(items, expected);
    }

    #[test]
    fn test_keys_and_values() {
        let mut tree = BPlusTreeMap::new(2).unwrap();
        tree.extend([(3, 'c'), (1, 'a'), (2, 'b'), (5, 'e'), (4, 'd')]);

        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
        assert_eq!(tree.values().copied().collect::<String>(), "abcde");
        assert_eq!((&tree).into_iter().count(), 5);
    }

    #[test]
    fn test_empty_iteration() {
        let tree = BPlusTreeMap::<i32, ()>::new(3).unwrap();
        assert_eq!(tree.items().next(), None);
        assert_eq!(tree.keys().next(), None);
        assert_eq!(ItemIterator::empty(&tree).next(), None);
    }

    #[test]
    fn test_iteration_after_removals() {
        let mut tree: BPlusTreeMap<i32, i32> = (0..40).map(|k| (k, k)).collect();
        for key in (0..40).filter(|k| k % 3 != 0) {
            tree.remove(&key);
        }
        let keys: Vec<_> = tree.keys().copied().collect();
        assert_eq!(keys, (0..40).filter(|k| k % 3 == 0).collect::<Vec<_>>());
    }
}
