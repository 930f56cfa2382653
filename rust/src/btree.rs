//! B-tree and 2-3-4 tree operations.
//!
//! Both mutation paths are single pass from the root. Insertion splits any
//! full node before entering it, so a split never has to travel back up.
//! Deletion tops up any child holding only `t - 1` keys before entering it,
//! so a removal never leaves a node underfull.

use std::mem;

use crate::error::TreeResult;
use crate::types::{BTree, BTreeNode, SearchTree, TwoThreeFourTree};

impl<K: Ord> BTree<K> {
    // ============================================================================
    // LOOKUP
    // ============================================================================

    /// Find the stored key equal to `key`.
    pub fn search(&self, key: &K) -> Option<&K> {
        let mut node = &self.root;
        loop {
            match node.keys.binary_search(key) {
                Ok(index) => return Some(&node.keys[index]),
                Err(_) if node.leaf => return None,
                Err(index) => node = &node.children[index],
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    // ============================================================================
    // INSERT
    // ============================================================================

    /// Insert a key. Returns `false` and leaves the tree untouched if the key
    /// is already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.contains(&key) {
            return false;
        }

        let t = self.min_degree;
        if self.root.keys.len() == 2 * t - 1 {
            let old_root = mem::replace(&mut self.root, BTreeNode::new_internal(t));
            self.root.children.push(old_root);
            split_child(&mut self.root, 0, t);
            log::trace!("b-tree: root split, height now {}", self.height());
        }

        insert_non_full(&mut self.root, key, t);
        self.len += 1;
        true
    }

    // ============================================================================
    // DELETE
    // ============================================================================

    /// Remove `key`, returning it. Absent keys leave the tree untouched.
    pub fn delete(&mut self, key: &K) -> Option<K> {
        if !self.contains(key) {
            return None;
        }

        let removed = delete_from(&mut self.root, key, self.min_degree);

        if self.root.keys.is_empty() && !self.root.leaf {
            if let Some(child) = self.root.children.pop() {
                self.root = child;
                log::trace!("b-tree: root collapsed");
            }
        }

        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn min(&self) -> Option<&K> {
        let mut node = &self.root;
        while !node.leaf {
            node = node.children.first()?;
        }
        node.keys.first()
    }

    pub fn max(&self) -> Option<&K> {
        let mut node = &self.root;
        while !node.leaf {
            node = node.children.last()?;
        }
        node.keys.last()
    }
}

impl<K> BTree<K> {
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; a lone root leaf has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(child) = node.children.first() {
            node = child;
            height += 1;
        }
        height
    }

    pub fn root(&self) -> &BTreeNode<K> {
        &self.root
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> BTreeIter<'_, K> {
        BTreeIter::new(&self.root)
    }

    pub fn clear(&mut self) {
        self.root = BTreeNode::new_leaf(self.min_degree);
        self.len = 0;
    }
}

impl<K> BTreeNode<K> {
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn children(&self) -> &[BTreeNode<K>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }
}

// ============================================================================
// NODE HELPERS
// ============================================================================

/// Split the full child at `index`, lifting its median into `parent`.
///
/// The child keeps its first `t - 1` keys and the new right sibling takes the
/// last `t - 1`; for internal nodes the children divide at `t`.
fn split_child<K>(parent: &mut BTreeNode<K>, index: usize, t: usize) {
    let child = &mut parent.children[index];
    let mut right_keys = child.keys.split_off(t - 1);
    let median = right_keys.remove(0);
    let right_children = if child.leaf {
        Vec::new()
    } else {
        child.children.split_off(t)
    };

    let right = BTreeNode {
        keys: right_keys,
        children: right_children,
        leaf: child.leaf,
    };

    parent.keys.insert(index, median);
    parent.children.insert(index + 1, right);
    log::trace!("b-tree: split child {}", index);
}

fn insert_non_full<K: Ord>(node: &mut BTreeNode<K>, key: K, t: usize) {
    let mut index = match node.keys.binary_search(&key) {
        Ok(index) | Err(index) => index,
    };

    if node.leaf {
        node.keys.insert(index, key);
        return;
    }

    if node.children[index].keys.len() == 2 * t - 1 {
        split_child(node, index, t);
        if key > node.keys[index] {
            index += 1;
        }
    }
    insert_non_full(&mut node.children[index], key, t);
}

fn delete_from<K: Ord>(node: &mut BTreeNode<K>, key: &K, t: usize) -> Option<K> {
    match node.keys.binary_search(key) {
        Ok(index) if node.leaf => Some(node.keys.remove(index)),
        Ok(index) => delete_internal(node, index, key, t),
        Err(_) if node.leaf => None,
        Err(index) => {
            let index = fill(node, index, t);
            delete_from(&mut node.children[index], key, t)
        }
    }
}

/// Remove `keys[index]` of an internal node.
fn delete_internal<K: Ord>(node: &mut BTreeNode<K>, index: usize, key: &K, t: usize) -> Option<K> {
    if node.children[index].keys.len() >= t {
        let predecessor = pop_max(&mut node.children[index], t)?;
        return Some(mem::replace(&mut node.keys[index], predecessor));
    }
    if node.children[index + 1].keys.len() >= t {
        let successor = pop_min(&mut node.children[index + 1], t)?;
        return Some(mem::replace(&mut node.keys[index], successor));
    }

    // Both neighbours are minimal: fold the key into their merge.
    merge(node, index);
    delete_from(&mut node.children[index], key, t)
}

fn pop_max<K>(node: &mut BTreeNode<K>, t: usize) -> Option<K> {
    if node.leaf {
        return node.keys.pop();
    }
    let index = fill(node, node.keys.len(), t);
    pop_max(&mut node.children[index], t)
}

fn pop_min<K>(node: &mut BTreeNode<K>, t: usize) -> Option<K> {
    if node.leaf {
        return (!node.keys.is_empty()).then(|| node.keys.remove(0));
    }
    let index = fill(node, 0, t);
    pop_min(&mut node.children[index], t)
}

/// Make sure `children[index]` holds at least `t` keys before descending.
///
/// Returns the index of the child to descend into, which moves one to the
/// left when the child is merged into its left sibling.
fn fill<K>(node: &mut BTreeNode<K>, index: usize, t: usize) -> usize {
    if node.children[index].keys.len() >= t {
        return index;
    }

    if index > 0 && node.children[index - 1].keys.len() >= t {
        borrow_from_prev(node, index);
        index
    } else if index < node.keys.len() && node.children[index + 1].keys.len() >= t {
        borrow_from_next(node, index);
        index
    } else if index < node.keys.len() {
        merge(node, index);
        index
    } else {
        merge(node, index - 1);
        index - 1
    }
}

/// Rotate the last key of the left sibling through the parent.
fn borrow_from_prev<K>(node: &mut BTreeNode<K>, index: usize) {
    let (before, after) = node.children.split_at_mut(index);
    let sibling = &mut before[index - 1];
    let child = &mut after[0];

    let Some(sibling_key) = sibling.keys.pop() else {
        return;
    };
    let separator = mem::replace(&mut node.keys[index - 1], sibling_key);
    child.keys.insert(0, separator);
    if !child.leaf {
        if let Some(grandchild) = sibling.children.pop() {
            child.children.insert(0, grandchild);
        }
    }
    log::trace!("b-tree: child {} borrowed from left sibling", index);
}

/// Rotate the first key of the right sibling through the parent.
fn borrow_from_next<K>(node: &mut BTreeNode<K>, index: usize) {
    let (before, after) = node.children.split_at_mut(index + 1);
    let child = &mut before[index];
    let sibling = &mut after[0];

    if sibling.keys.is_empty() {
        return;
    }
    let sibling_key = sibling.keys.remove(0);
    let separator = mem::replace(&mut node.keys[index], sibling_key);
    child.keys.push(separator);
    if !child.leaf && !sibling.children.is_empty() {
        child.children.push(sibling.children.remove(0));
    }
    log::trace!("b-tree: child {} borrowed from right sibling", index);
}

/// Merge `children[index + 1]` and the separator `keys[index]` into
/// `children[index]`.
fn merge<K>(node: &mut BTreeNode<K>, index: usize) {
    let right = node.children.remove(index + 1);
    let separator = node.keys.remove(index);
    let left = &mut node.children[index];
    left.keys.push(separator);
    left.keys.extend(right.keys);
    left.children.extend(right.children);
    log::trace!("b-tree: merged children {} and {}", index, index + 1);
}

// ============================================================================
// ITERATION
// ============================================================================

/// In-order iterator over a [`BTree`].
#[derive(Debug, Clone)]
pub struct BTreeIter<'a, K> {
    // Each frame holds a node and the index of its next key to yield.
    stack: Vec<(&'a BTreeNode<K>, usize)>,
}

impl<'a, K> BTreeIter<'a, K> {
    fn new(root: &'a BTreeNode<K>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_leftmost(root);
        iter
    }

    fn push_leftmost(&mut self, mut node: &'a BTreeNode<K>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) if !node.leaf => node = child,
                _ => break,
            }
        }
    }
}

impl<'a, K> Iterator for BTreeIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let (node, index) = *frame;
            if index >= node.keys.len() {
                self.stack.pop();
                continue;
            }
            frame.1 += 1;
            if !node.leaf {
                if let Some(child) = node.children.get(index + 1) {
                    self.push_leftmost(child);
                }
            }
            return Some(&node.keys[index]);
        }
    }
}

impl<K> std::iter::FusedIterator for BTreeIter<'_, K> {}

// ============================================================================
// 2-3-4 TREE
// ============================================================================

impl<K: Ord> TwoThreeFourTree<K> {
    /// Insert a key; `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.inner.insert(key)
    }

    pub fn delete(&mut self, key: &K) -> Option<K> {
        self.inner.delete(key)
    }

    pub fn search(&self, key: &K) -> Option<&K> {
        self.inner.search(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    pub fn min(&self) -> Option<&K> {
        self.inner.min()
    }

    pub fn max(&self) -> Option<&K> {
        self.inner.max()
    }
}

impl<K> TwoThreeFourTree<K> {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.height()
    }

    pub fn iter(&self) -> BTreeIter<'_, K> {
        self.inner.iter()
    }

    pub fn root(&self) -> &BTreeNode<K> {
        self.inner.root()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// View as the underlying degree-2 [`BTree`].
    pub fn as_btree(&self) -> &BTree<K> {
        &self.inner
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl<K: Ord> SearchTree<K> for BTree<K> {
    type Iter<'a>
        = BTreeIter<'a, K>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> bool {
        BTree::insert(self, key)
    }

    fn delete(&mut self, key: &K) -> Option<K> {
        BTree::delete(self, key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        BTree::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> Self::Iter<'_> {
        BTree::iter(self)
    }

    fn check_invariants(&self) -> TreeResult<()> {
        self.validate()
    }

    fn min(&self) -> Option<&K> {
        BTree::min(self)
    }

    fn max(&self) -> Option<&K> {
        BTree::max(self)
    }
}

impl<K: Ord> SearchTree<K> for TwoThreeFourTree<K> {
    type Iter<'a>
        = BTreeIter<'a, K>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> bool {
        self.inner.insert(key)
    }

    fn delete(&mut self, key: &K) -> Option<K> {
        self.inner.delete(key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        self.inner.search(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.inner.iter()
    }

    fn check_invariants(&self) -> TreeResult<()> {
        self.inner.validate()
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = BTreeIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> Extend<K> for TwoThreeFourTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<K: Ord> FromIterator<K> for TwoThreeFourTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn sample() -> BTree<i32> {
        let mut tree = BTree::new(3).unwrap();
        tree.extend([10, 20, 5, 6, 12, 30, 7, 17]);
        tree
    }

    fn shape(node: &BTreeNode<i32>) -> Vec<Vec<i32>> {
        node.children().iter().map(|c| c.keys().to_vec()).collect()
    }

    #[test]
    fn test_insert_splits_root() {
        let tree = sample();
        assert_eq!(tree.root().keys(), [10]);
        assert_eq!(shape(tree.root()), [vec![5, 6, 7], vec![12, 17, 20, 30]]);
        assert_eq!(tree.height(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn test_delete_scenario() {
        let mut tree = sample();

        assert_eq!(tree.delete(&6), Some(6));
        assert_eq!(tree.search(&6), None);
        for key in [10, 20, 5, 12, 30, 7, 17] {
            assert_eq!(tree.search(&key), Some(&key));
        }
        tree.validate().unwrap();

        assert_eq!(tree.delete(&13), None);
        assert_eq!(tree.len(), 7);

        // [5, 7] is minimal, so the right sibling lends 12 through the root.
        assert_eq!(tree.delete(&7), Some(7));
        assert_eq!(tree.root().keys(), [12]);
        assert_eq!(shape(tree.root()), [vec![5, 10], vec![17, 20, 30]]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut tree = sample();
        assert!(!tree.insert(12));
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.iter().filter(|&&k| k == 12).count(), 1);
    }

    #[test]
    fn test_delete_internal_key_uses_predecessor() {
        let mut tree = sample();
        // Left child [5, 6, 7] has t keys, so 7 replaces 10 at the root.
        assert_eq!(tree.delete(&10), Some(10));
        assert_eq!(tree.root().keys(), [7]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_merge_collapses_root() {
        let mut tree = BTree::new(2).unwrap();
        tree.extend([1, 2, 3, 4]);
        assert_eq!(tree.height(), 2);

        for key in [4, 3] {
            tree.delete(&key);
            tree.validate().unwrap();
        }
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.root().keys(), [1, 2]);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut tree = BTree::new(2).unwrap();
        let keys: Vec<i32> = (0..200).map(|i| (i * 37) % 200).collect();
        tree.extend(keys);
        let collected: Vec<_> = tree.iter().copied().collect();
        assert_eq!(collected, (0..200).collect::<Vec<_>>());
        assert_eq!(tree.min(), Some(&0));
        assert_eq!(tree.max(), Some(&199));
    }

    #[test]
    fn test_drain_in_random_order() {
        let mut tree = BTree::new(3).unwrap();
        tree.extend(0..300);
        for key in (0..300).map(|i| (i * 101) % 300) {
            assert_eq!(tree.delete(&key), Some(key));
            tree.validate().unwrap();
        }
        assert!(tree.is_empty());
        assert!(tree.root().is_leaf());
        assert_eq!(tree.iter().next(), None);
    }

    #[test]
    fn test_two_three_four() {
        let mut tree: TwoThreeFourTree<i32> = (1..=10).collect();
        assert_eq!(tree.as_btree().min_degree(), 2);
        for node in std::iter::once(tree.root()).chain(tree.root().children()) {
            assert!(node.keys().len() <= 3);
        }
        assert_eq!(tree.delete(&5), Some(5));
        assert!(!tree.contains(&5));
        assert_eq!(tree.len(), 9);
        tree.check_invariants().unwrap();

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
    }
}
