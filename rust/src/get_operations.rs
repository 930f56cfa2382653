//! GET operations for BPlusTreeMap.
//!
//! Point lookups descend from the root to a single leaf. Arena accessors used
//! by the rest of the tree also live here.

use crate::arena::NodeId;
use crate::error::{KeyResult, TreeError};
use crate::types::{BPlusTreeMap, BranchNode, LeafNode, NodeRef};

impl<K: Ord, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(3).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let leaf_id = self.find_leaf(key)?;
        self.get_leaf(leaf_id)?.get(key)
    }

    /// Get the stored key and its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let leaf = self.get_leaf(self.find_leaf(key)?)?;
        let index = leaf.keys.binary_search(key).ok()?;
        leaf.entry(index)
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get value for a key, reporting absence as [`TreeError::KeyNotFound`].
    pub fn get_item(&self, key: &K) -> KeyResult<&V> {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    /// Get a mutable reference to the value for a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(3).unwrap();
    /// tree.insert(1, "one");
    /// if let Some(value) = tree.get_mut(&1) {
    ///     *value = "ONE";
    /// }
    /// assert_eq!(tree.get(&1), Some(&"ONE"));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf_id = self.find_leaf(key)?;
        self.get_leaf_mut(leaf_id)?.get_mut(key)
    }

    // ============================================================================
    // NAVIGATION HELPERS
    // ============================================================================

    /// Descend to the leaf whose key range covers `key`.
    pub(crate) fn find_leaf(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Branch(id, _) => current = self.get_branch(id)?.get_child(key)?,
            }
        }
    }

    /// Leaf and slot where `key` is, or would be inserted.
    pub(crate) fn find_leaf_position(&self, key: &K) -> Option<(NodeId, usize)> {
        let leaf_id = self.find_leaf(key)?;
        let index = match self.get_leaf(leaf_id)?.keys.binary_search(key) {
            Ok(index) | Err(index) => index,
        };
        Some((leaf_id, index))
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // ARENA ACCESS METHODS
    // ============================================================================

    /// Get a reference to a leaf node in the arena.
    pub fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.leaf_arena.get(id)
    }

    pub(crate) fn get_leaf_mut(&mut self, id: NodeId) -> Option<&mut LeafNode<K, V>> {
        self.leaf_arena.get_mut(id)
    }

    /// Get a reference to a branch node in the arena.
    pub fn get_branch(&self, id: NodeId) -> Option<&BranchNode<K, V>> {
        self.branch_arena.get(id)
    }

    pub(crate) fn get_branch_mut(&mut self, id: NodeId) -> Option<&mut BranchNode<K, V>> {
        self.branch_arena.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BPlusTreeMap<i32, &'static str> {
        let mut tree = BPlusTreeMap::new(2).unwrap();
        for (key, value) in [(1, "one"), (2, "two"), (3, "three"), (4, "four"), (5, "five")] {
            tree.insert(key, value);
        }
        tree
    }

    #[test]
    fn test_basic_get_operations() {
        let tree = sample();
        assert!(!tree.root.is_leaf());

        assert_eq!(tree.get(&1), Some(&"one"));
        assert_eq!(tree.get(&5), Some(&"five"));
        assert_eq!(tree.get(&6), None);
        assert!(tree.contains_key(&3));
        assert!(!tree.contains_key(&0));
        assert_eq!(tree.get_key_value(&2), Some((&2, &"two")));
    }

    #[test]
    fn test_get_on_empty_tree() {
        let tree = BPlusTreeMap::<i32, i32>::new(3).unwrap();
        assert_eq!(tree.get(&1), None);
        assert!(matches!(tree.get_item(&1), Err(TreeError::KeyNotFound)));
    }

    #[test]
    fn test_get_item() {
        let tree = sample();
        assert_eq!(tree.get_item(&2).unwrap(), &"two");
        assert_eq!(tree.get_item(&9), Err(TreeError::KeyNotFound));
    }

    #[test]
    fn test_get_mut() {
        let mut tree = sample();
        if let Some(value) = tree.get_mut(&4) {
            *value = "FOUR";
        }
        assert_eq!(tree.get(&4), Some(&"FOUR"));
        assert_eq!(tree.get_mut(&40), None);
    }

    #[test]
    fn test_find_leaf_position() {
        let tree = sample();
        let (leaf_id, index) = tree.find_leaf_position(&3).unwrap();
        let leaf = tree.get_leaf(leaf_id).unwrap();
        assert_eq!(leaf.keys()[index], 3);
    }
}
