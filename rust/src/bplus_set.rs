//! Set facade over the B+ tree map.

use std::ops::RangeBounds;

use crate::error::TreeResult;
use crate::iteration::{KeyIterator, RangeIterator};
use crate::types::{BPlusTreeSet, SearchTree};

impl<K: Ord + Clone> BPlusTreeSet<K> {
    /// Insert a key. Returns `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.map.insert(key, ()).is_none()
    }

    /// Remove `key`, returning the stored key.
    pub fn delete(&mut self, key: &K) -> Option<K> {
        self.map.remove_entry(key).map(|(stored, ())| stored)
    }

    pub fn search(&self, key: &K) -> Option<&K> {
        self.map.get_key_value(key).map(|(stored, _)| stored)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Keys inside `range`, ascending.
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> SetRange<'_, K> {
        SetRange {
            inner: self.map.range(range),
        }
    }

    /// Keys in `[start, end]`.
    pub fn range_query(&self, start: &K, end: &K) -> Vec<&K> {
        self.range((std::ops::Bound::Included(start), std::ops::Bound::Included(end)))
            .collect()
    }
}

impl<K> BPlusTreeSet<K> {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> KeyIterator<'_, K, ()> {
        self.map.keys()
    }

    pub fn first(&self) -> Option<&K> {
        self.map.first().map(|(key, _)| key)
    }

    pub fn last(&self) -> Option<&K> {
        self.map.last().map(|(key, _)| key)
    }

    pub fn leaf_count(&self) -> usize {
        self.map.leaf_count()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// The underlying map with unit values.
    pub fn as_map(&self) -> &crate::types::BPlusTreeMap<K, ()> {
        &self.map
    }
}

/// Keys of a [`BPlusTreeSet`] range.
pub struct SetRange<'a, K> {
    inner: RangeIterator<'a, K, ()>,
}

impl<'a, K: Ord> Iterator for SetRange<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

impl<K: Ord + Clone> SearchTree<K> for BPlusTreeSet<K> {
    type Iter<'a>
        = KeyIterator<'a, K, ()>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> bool {
        BPlusTreeSet::insert(self, key)
    }

    fn delete(&mut self, key: &K) -> Option<K> {
        BPlusTreeSet::delete(self, key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        BPlusTreeSet::search(self, key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.map.keys()
    }

    fn check_invariants(&self) -> TreeResult<()> {
        self.map.validate()
    }

    fn min(&self) -> Option<&K> {
        self.first()
    }

    fn max(&self) -> Option<&K> {
        self.last()
    }
}

impl<K: Ord + Clone> Extend<K> for BPlusTreeSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + Clone> FromIterator<K> for BPlusTreeSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_semantics() {
        let mut set = BPlusTreeSet::new(2).unwrap();
        assert!(set.insert(5));
        assert!(set.insert(1));
        assert!(!set.insert(5));
        assert_eq!(set.len(), 2);

        assert_eq!(set.search(&5), Some(&5));
        assert_eq!(set.delete(&5), Some(5));
        assert_eq!(set.delete(&5), None);
        assert!(!set.contains(&5));
    }

    #[test]
    fn test_set_ranges() {
        let set: BPlusTreeSet<u32> = (0..30).map(|k| k * 2).collect();
        assert_eq!(set.range(10..16).copied().collect::<Vec<_>>(), [10, 12, 14]);
        assert_eq!(set.range_query(&55, &60), [&56, &58]);
        assert_eq!(set.first(), Some(&0));
        assert_eq!(set.last(), Some(&58));
    }

    #[test]
    fn test_search_tree_contract() {
        fn exercise<T: SearchTree<i32>>(tree: &mut T) {
            for key in [4, 2, 6, 1, 3, 5, 7] {
                assert!(tree.insert(key));
            }
            assert_eq!(tree.min(), Some(&1));
            assert_eq!(tree.max(), Some(&7));
            assert!(tree.try_delete(&9).is_err());
            assert_eq!(tree.try_delete(&4), Ok(4));
            tree.check_invariants().unwrap();
        }

        let mut set = BPlusTreeSet::new(2).unwrap();
        exercise(&mut set);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
    }
}
