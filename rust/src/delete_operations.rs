//! DELETE operations for BPlusTreeMap.
//!
//! Removal happens in a leaf. Each branch on the way back up checks whether
//! the child it descended into fell below minimum occupancy and repairs it,
//! first by borrowing from a sibling, then by merging with one. Separators
//! are left alone when a leaf loses its first key; they still route correctly
//! because every key in a right subtree is at least its separator.

use crate::arena::NodeId;
use crate::types::{BPlusTreeMap, NodeRef, RemoveResult};

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // PUBLIC DELETE OPERATIONS
    // ============================================================================

    /// Remove a key from the tree, returning its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(2).unwrap();
    /// for key in 0..10 {
    ///     tree.insert(key, key * 10);
    /// }
    /// assert_eq!(tree.remove(&4), Some(40));
    /// assert_eq!(tree.remove(&4), None);
    /// assert_eq!(tree.len(), 9);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove a key, returning the stored key together with its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let RemoveResult::Updated(removed, _) = self.remove_recursive(self.root, key);
        if removed.is_some() {
            self.collapse_root();
        }
        removed
    }

    // ============================================================================
    // DELETE HELPERS
    // ============================================================================

    fn remove_recursive(&mut self, node: NodeRef<K, V>, key: &K) -> RemoveResult<(K, V)> {
        match node {
            NodeRef::Leaf(id, _) => match self.get_leaf_mut(id) {
                Some(leaf) => {
                    let removed = leaf.remove(key);
                    RemoveResult::Updated(removed, leaf.is_underfull())
                }
                None => RemoveResult::Updated(None, false),
            },
            NodeRef::Branch(id, _) => {
                let Some((index, child)) = self.get_branch(id).and_then(|branch| {
                    let index = branch.find_child_index(key);
                    branch.children.get(index).map(|&child| (index, child))
                }) else {
                    return RemoveResult::Updated(None, false);
                };

                let RemoveResult::Updated(removed, child_underfull) =
                    self.remove_recursive(child, key);
                if removed.is_some() && child_underfull {
                    self.rebalance_child(id, index);
                }

                let underfull = self
                    .get_branch(id)
                    .is_some_and(|branch| branch.is_underfull());
                RemoveResult::Updated(removed, underfull)
            }
        }
    }

    /// Repair `children[index]` of branch `parent_id` after it ran low.
    fn rebalance_child(&mut self, parent_id: NodeId, index: usize) {
        let Some(parent) = self.get_branch(parent_id) else {
            return;
        };
        let child = parent.children[index];
        let left = index.checked_sub(1).map(|i| parent.children[i]);
        let right = parent.children.get(index + 1).copied();

        // Siblings always share the child's kind.
        match child {
            NodeRef::Leaf(child_id, _) => {
                let left = left.map(|node| node.id());
                let right = right.map(|node| node.id());
                self.rebalance_leaf(parent_id, index, child_id, left, right);
            }
            NodeRef::Branch(child_id, _) => {
                let left = left.map(|node| node.id());
                let right = right.map(|node| node.id());
                self.rebalance_branch(parent_id, index, child_id, left, right);
            }
        }
    }

    // ============================================================================
    // LEAF REBALANCING
    // ============================================================================

    fn rebalance_leaf(
        &mut self,
        parent_id: NodeId,
        index: usize,
        child_id: NodeId,
        left_id: Option<NodeId>,
        right_id: Option<NodeId>,
    ) {
        if let Some(left_id) = left_id {
            if self.leaf_arena[left_id].can_donate() {
                self.borrow_leaf_from_left(parent_id, index, child_id, left_id);
                return;
            }
        }
        if let Some(right_id) = right_id {
            if self.leaf_arena[right_id].can_donate() {
                self.borrow_leaf_from_right(parent_id, index, child_id, right_id);
                return;
            }
        }

        if let Some(left_id) = left_id {
            self.merge_leaves(parent_id, index - 1, left_id, child_id);
        } else if let Some(right_id) = right_id {
            self.merge_leaves(parent_id, index, child_id, right_id);
        }
    }

    fn borrow_leaf_from_left(
        &mut self,
        parent_id: NodeId,
        index: usize,
        child_id: NodeId,
        left_id: NodeId,
    ) {
        let Some((key, value)) = self.leaf_arena[left_id].pop_last() else {
            return;
        };
        let separator = key.clone();
        self.leaf_arena[child_id].push_front(key, value);
        self.branch_arena[parent_id].keys[index - 1] = separator;
        log::trace!("b+ tree: leaf {} borrowed from left leaf {}", child_id, left_id);
    }

    fn borrow_leaf_from_right(
        &mut self,
        parent_id: NodeId,
        index: usize,
        child_id: NodeId,
        right_id: NodeId,
    ) {
        let right = &mut self.leaf_arena[right_id];
        let Some((key, value)) = right.pop_first() else {
            return;
        };
        let Some(separator) = right.keys.first().cloned() else {
            return;
        };
        self.leaf_arena[child_id].push_back(key, value);
        self.branch_arena[parent_id].keys[index] = separator;
        log::trace!("b+ tree: leaf {} borrowed from right leaf {}", child_id, right_id);
    }

    /// Fold leaf `right_id` into `left_id`, splicing it out of the leaf chain
    /// and releasing its slot. `separator_index` is the parent key between them.
    fn merge_leaves(
        &mut self,
        parent_id: NodeId,
        separator_index: usize,
        left_id: NodeId,
        right_id: NodeId,
    ) {
        let Some(right) = self.leaf_arena.deallocate(right_id) else {
            return;
        };
        self.leaf_arena[left_id].absorb(right);

        let parent = &mut self.branch_arena[parent_id];
        parent.keys.remove(separator_index);
        parent.children.remove(separator_index + 1);
        log::trace!("b+ tree: merged leaf {} into {}", right_id, left_id);
    }

    // ============================================================================
    // BRANCH REBALANCING
    // ============================================================================

    fn rebalance_branch(
        &mut self,
        parent_id: NodeId,
        index: usize,
        child_id: NodeId,
        left_id: Option<NodeId>,
        right_id: Option<NodeId>,
    ) {
        if let Some(left_id) = left_id {
            if self.branch_arena[left_id].can_donate() {
                self.borrow_branch_from_left(parent_id, index, child_id, left_id);
                return;
            }
        }
        if let Some(right_id) = right_id {
            if self.branch_arena[right_id].can_donate() {
                self.borrow_branch_from_right(parent_id, index, child_id, right_id);
                return;
            }
        }

        if let Some(left_id) = left_id {
            self.merge_branches(parent_id, index - 1, left_id, child_id);
        } else if let Some(right_id) = right_id {
            self.merge_branches(parent_id, index, child_id, right_id);
        }
    }

    /// Rotate the left sibling's last child through the parent separator.
    fn borrow_branch_from_left(
        &mut self,
        parent_id: NodeId,
        index: usize,
        child_id: NodeId,
        left_id: NodeId,
    ) {
        let Some((key, moved_child)) = self.branch_arena[left_id].pop_last() else {
            return;
        };
        let separator = std::mem::replace(&mut self.branch_arena[parent_id].keys[index - 1], key);

        let child = &mut self.branch_arena[child_id];
        child.keys.insert(0, separator);
        child.children.insert(0, moved_child);
        log::trace!("b+ tree: branch {} borrowed from left branch {}", child_id, left_id);
    }

    /// Rotate the right sibling's first child through the parent separator.
    fn borrow_branch_from_right(
        &mut self,
        parent_id: NodeId,
        index: usize,
        child_id: NodeId,
        right_id: NodeId,
    ) {
        let Some((key, moved_child)) = self.branch_arena[right_id].pop_first() else {
            return;
        };
        let separator = std::mem::replace(&mut self.branch_arena[parent_id].keys[index], key);

        let child = &mut self.branch_arena[child_id];
        child.keys.push(separator);
        child.children.push(moved_child);
        log::trace!("b+ tree: branch {} borrowed from right branch {}", child_id, right_id);
    }

    fn merge_branches(
        &mut self,
        parent_id: NodeId,
        separator_index: usize,
        left_id: NodeId,
        right_id: NodeId,
    ) {
        let Some(right) = self.branch_arena.deallocate(right_id) else {
            return;
        };
        let parent = &mut self.branch_arena[parent_id];
        let separator = parent.keys.remove(separator_index);
        parent.children.remove(separator_index + 1);

        self.branch_arena[left_id].absorb(separator, right);
        log::trace!("b+ tree: merged branch {} into {}", right_id, left_id);
    }

    /// Replace a branch root that has lost its last separator by its only child.
    fn collapse_root(&mut self) {
        while let NodeRef::Branch(root_id, _) = self.root {
            let only_child = match self.get_branch(root_id) {
                Some(root) if root.keys.is_empty() => root.children.first().copied(),
                _ => return,
            };
            let Some(child) = only_child else {
                return;
            };
            self.branch_arena.deallocate(root_id);
            self.root = child;
            log::trace!("b+ tree: root branch {} collapsed", root_id);
        }
    }
}
