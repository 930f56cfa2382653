//! INSERT operations for BPlusTreeMap.
//!
//! Insertion descends to the target leaf and reports splits back up the
//! recursion. A node that overflows hands its upper half to a freshly
//! allocated sibling; when the root itself splits the tree grows a level.

use crate::arena::NodeId;
use crate::types::{BPlusTreeMap, BranchNode, InsertResult, NodeRef};

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // PUBLIC INSERT OPERATIONS
    // ============================================================================

    /// Insert a key-value pair, returning the previous value for the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(3).unwrap();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.get(&1), Some(&"uno"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.insert_recursive(self.root, key, value) {
            InsertResult::Updated(old_value) => old_value,
            InsertResult::Split { separator, right } => {
                self.grow_root(separator, right);
                None
            }
        }
    }

    // ============================================================================
    // INSERT HELPERS
    // ============================================================================

    fn insert_recursive(&mut self, node: NodeRef<K, V>, key: K, value: V) -> InsertResult<K, V> {
        match node {
            NodeRef::Leaf(id, _) => self.insert_into_leaf(id, key, value),
            NodeRef::Branch(id, _) => {
                let Some((index, child)) = self.get_branch(id).and_then(|branch| {
                    let index = branch.find_child_index(&key);
                    branch.children.get(index).map(|&child| (index, child))
                }) else {
                    return InsertResult::Updated(None);
                };

                match self.insert_recursive(child, key, value) {
                    InsertResult::Updated(old_value) => InsertResult::Updated(old_value),
                    InsertResult::Split { separator, right } => {
                        self.insert_into_branch(id, index, separator, right)
                    }
                }
            }
        }
    }

    fn insert_into_leaf(&mut self, id: NodeId, key: K, value: V) -> InsertResult<K, V> {
        let Some(leaf) = self.get_leaf_mut(id) else {
            return InsertResult::Updated(None);
        };

        let old_value = leaf.insert(key, value);
        if !leaf.needs_split() {
            return InsertResult::Updated(old_value);
        }

        let right = leaf.split();
        // The separator is a copy: the key itself stays in the right leaf.
        let separator = right.keys[0].clone();
        let right_id = self.leaf_arena.allocate(right);
        self.leaf_arena[id].next = right_id;
        log::trace!("b+ tree: split leaf {} into {}", id, right_id);

        InsertResult::Split {
            separator,
            right: NodeRef::leaf(right_id),
        }
    }

    fn insert_into_branch(
        &mut self,
        id: NodeId,
        index: usize,
        separator: K,
        new_child: NodeRef<K, V>,
    ) -> InsertResult<K, V> {
        let Some(branch) = self.get_branch_mut(id) else {
            return InsertResult::Updated(None);
        };

        branch.insert_child(index, separator, new_child);
        if !branch.needs_split() {
            return InsertResult::Updated(None);
        }

        let (right, promoted) = branch.split();
        let right_id = self.branch_arena.allocate(right);
        log::trace!("b+ tree: split branch {} into {}", id, right_id);

        InsertResult::Split {
            separator: promoted,
            right: NodeRef::branch(right_id),
        }
    }

    /// Put a new branch above the old root after the root split.
    fn grow_root(&mut self, separator: K, right: NodeRef<K, V>) {
        let mut new_root = BranchNode::new(self.capacity());
        new_root.keys.push(separator);
        new_root.children.push(self.root);
        new_root.children.push(right);

        let root_id = self.branch_arena.allocate(new_root);
        self.root = NodeRef::branch(root_id);
        log::trace!("b+ tree: root split, new root branch {}", root_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_insert_without_split() {
        let mut tree = BPlusTreeMap::new(3).unwrap();
        for key in [3, 1, 2] {
            assert_eq!(tree.insert(key, key * 10), None);
        }
        assert!(tree.root.is_leaf());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut tree = BPlusTreeMap::new(2).unwrap();
        tree.insert("a", 1);
        assert_eq!(tree.insert("a", 2), Some(1));
        assert_eq!(tree.get(&"a"), Some(&2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_leaf_split_grows_root() {
        // t = 2: leaves hold at most 3 keys.
        let mut tree = BPlusTreeMap::new(2).unwrap();
        for key in 1..=4 {
            tree.insert(key, ());
        }

        let NodeRef::Branch(root_id, _) = tree.root else {
            panic!("root should be a branch after the first split");
        };
        let root = tree.get_branch(root_id).unwrap();
        assert_eq!(root.keys(), [3]);
        assert_eq!(tree.leaf_count(), 2);

        // The separator is copied: 3 is still stored in the right leaf.
        assert_eq!(tree.get(&3), Some(&()));
        tree.validate().unwrap();
    }

    #[test]
    fn test_branch_split_promotes_separator() {
        let mut tree = BPlusTreeMap::new(2).unwrap();
        for key in 1..=20 {
            tree.insert(key, key);
            tree.validate().unwrap();
        }
        assert!(tree.depth() >= 3);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_descending_inserts() {
        let mut tree = BPlusTreeMap::new(3).unwrap();
        for key in (0..100).rev() {
            tree.insert(key, key.to_string());
        }
        tree.validate().unwrap();
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.first(), Some((&0, &"0".to_string())));
        assert_eq!(tree.last(), Some((&99, &"99".to_string())));
    }
}
