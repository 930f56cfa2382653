//! Node-level operations for the B+ tree.
//!
//! Nodes never touch the arenas: they report when they overflow or run low
//! and hand split halves back to the tree, which allocates them and fixes up
//! the links.

use crate::arena::{NodeId, NULL_NODE};
use crate::types::{BranchNode, LeafNode, NodeRef};

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> LeafNode<K, V> {
    // ============================================================================
    // GET OPERATIONS
    // ============================================================================

    /// Get a value by key from this leaf node.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.keys
            .binary_search(key)
            .ok()
            .map(|index| &self.values[index])
    }

    /// Get a mutable reference to a value by key from this leaf node.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.keys
            .binary_search(key)
            .ok()
            .map(|index| &mut self.values[index])
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert or overwrite a pair, returning the previous value.
    ///
    /// The leaf may end up one key over capacity; the caller checks
    /// [`needs_split`](Self::needs_split) afterwards.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.keys.binary_search(&key) {
            Ok(index) => Some(std::mem::replace(&mut self.values[index], value)),
            Err(index) => {
                self.keys.insert(index, key);
                self.values.insert(index, value);
                None
            }
        }
    }

    /// Move the upper half into a new right sibling.
    ///
    /// The right sibling inherits this leaf's `next`; the caller must point
    /// this leaf at the sibling once it has an id.
    pub fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.keys.len() / 2;
        let right = LeafNode {
            capacity: self.capacity,
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            next: self.next,
        };
        self.next = NULL_NODE;
        right
    }

    // ============================================================================
    // DELETE OPERATIONS
    // ============================================================================

    /// Remove a key, returning the stored pair.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.keys.binary_search(key).ok()?;
        Some((self.keys.remove(index), self.values.remove(index)))
    }
}

impl<K, V> LeafNode<K, V> {
    /// Returns the number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Key/value pair at `index`.
    #[inline]
    pub fn entry(&self, index: usize) -> Option<(&K, &V)> {
        Some((self.keys.get(index)?, self.values.get(index)?))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Next leaf in key order, if any.
    pub fn next_leaf(&self) -> Option<NodeId> {
        (self.next != NULL_NODE).then_some(self.next)
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Returns the minimum number of keys a non-root leaf keeps.
    pub fn min_keys(&self) -> usize {
        self.capacity / 2
    }

    pub fn needs_split(&self) -> bool {
        self.keys.len() > self.capacity
    }

    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this leaf can give a pair away and stay legal.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Take the last pair (this leaf is the left sibling of the borrower).
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    /// Take the first pair (this leaf is the right sibling of the borrower).
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.values.remove(0)))
    }

    pub fn push_front(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    pub fn push_back(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Absorb a right sibling, taking over its `next` link.
    pub fn absorb(&mut self, right: LeafNode<K, V>) {
        self.keys.extend(right.keys);
        self.values.extend(right.values);
        self.next = right.next;
    }
}

// ============================================================================
// BRANCH NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> BranchNode<K, V> {
    /// Find the index of the child that should contain the given key.
    ///
    /// A key equal to a separator belongs to the separator's right child.
    pub fn find_child_index(&self, key: &K) -> usize {
        match self.keys.binary_search(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Get the child node for a given key.
    pub fn get_child(&self, key: &K) -> Option<NodeRef<K, V>> {
        self.children.get(self.find_child_index(key)).copied()
    }
}

impl<K, V> BranchNode<K, V> {
    /// Returns the number of separator keys in this branch.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn children(&self) -> &[NodeRef<K, V>] {
        &self.children
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Link `child` to the right of `children[index]`, separated by `separator`.
    pub fn insert_child(&mut self, index: usize, separator: K, child: NodeRef<K, V>) {
        self.keys.insert(index, separator);
        self.children.insert(index + 1, child);
    }

    /// Split an overflowing branch, returning the new right sibling and the
    /// key promoted to the parent.
    ///
    /// The promoted key moves up rather than being copied, so the two halves
    /// hold one key fewer between them than before.
    pub fn split(&mut self) -> (BranchNode<K, V>, K) {
        let mid = self.keys.len() / 2;
        let mut right_keys = self.keys.split_off(mid);
        let promoted = right_keys.remove(0);
        let right_children = self.children.split_off(mid + 1);

        let right = BranchNode {
            capacity: self.capacity,
            keys: right_keys,
            children: right_children,
        };
        (right, promoted)
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    pub fn min_keys(&self) -> usize {
        self.capacity / 2
    }

    pub fn needs_split(&self) -> bool {
        self.keys.len() > self.capacity
    }

    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Take the last key and child (this branch is the left sibling).
    pub fn pop_last(&mut self) -> Option<(K, NodeRef<K, V>)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Take the first key and child (this branch is the right sibling).
    pub fn pop_first(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Absorb a right sibling; `separator` comes down from the parent.
    pub fn absorb(&mut self, separator: K, right: BranchNode<K, V>) {
        self.keys.push(separator);
        self.keys.extend(right.keys);
        self.children.extend(right.children);
    }
}
