//! Range query operations for BPlusTreeMap.

use std::ops::{Bound, RangeBounds};

use crate::iteration::{ItemIterator, RangeIterator};
use crate::types::BPlusTreeMap;

// ============================================================================
// RANGE QUERY OPERATIONS
// ============================================================================

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Returns an iterator over key-value pairs in a range using Rust's range syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(2).unwrap();
    /// for i in 0..10 {
    ///     tree.insert(i, i * 100);
    /// }
    ///
    /// let keys: Vec<_> = tree.range(3..7).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 4, 5, 6]);
    ///
    /// let keys: Vec<_> = tree.range(3..=7).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 4, 5, 6, 7]);
    ///
    /// let keys: Vec<_> = tree.range(..2).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [0, 1]);
    ///
    /// assert_eq!(tree.range(8..).count(), 2);
    /// ```
    pub fn range<R>(&self, range: R) -> RangeIterator<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let start = match range.start_bound() {
            Bound::Included(key) => self.find_leaf_position(key),
            Bound::Excluded(key) => self.find_leaf_position(key).map(|(leaf_id, index)| {
                let on_key = self
                    .get_leaf(leaf_id)
                    .and_then(|leaf| leaf.keys.get(index))
                    .is_some_and(|found| found == key);
                (leaf_id, if on_key { index + 1 } else { index })
            }),
            Bound::Unbounded => self.first_leaf_id().map(|id| (id, 0)),
        };

        let items = match start {
            Some((leaf_id, index)) => ItemIterator::from_position(self, leaf_id, index),
            None => ItemIterator::empty(self),
        };
        RangeIterator::new(items, range.end_bound().cloned())
    }

    /// Values whose keys lie in `[start, end]`, in key order.
    ///
    /// An inverted range yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(3).unwrap();
    /// for (key, value) in (2..=20).step_by(2).zip('A'..='J') {
    ///     tree.insert(key, value);
    /// }
    /// assert_eq!(tree.range_query(&8, &16), [&'D', &'E', &'F', &'G', &'H']);
    /// assert_eq!(tree.range_query(&15, &20), [&'H', &'I', &'J']);
    /// ```
    pub fn range_query(&self, start: &K, end: &K) -> Vec<&V> {
        self.range((Bound::Included(start), Bound::Included(end)))
            .map(|(_, value)| value)
            .collect()
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    /// Returns the first key-value pair in the tree.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.items().next()
    }

    /// Returns the last key-value pair in the tree.
    pub fn last(&self) -> Option<(&K, &V)> {
        let leaf = self.get_leaf(self.last_leaf_id()?)?;
        leaf.entry(leaf.len().checked_sub(1)?)
    }
}
