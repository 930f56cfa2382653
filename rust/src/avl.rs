//! AVL tree operations.
//!
//! Mutation is written as functional update: each recursive step takes an
//! owned subtree and hands back the (possibly rotated) root of that subtree
//! for the caller to re-attach.

use std::cmp::Ordering;

use crate::error::TreeResult;
use crate::traversal::{BinaryCursor, Traverse};
use crate::types::{AvlNode, AvlTree, SearchTree, TraversalOrder};

type Link<K> = Option<Box<AvlNode<K>>>;

/// Which child an insertion descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl<K: Ord> AvlTree<K> {
    // ============================================================================
    // PUBLIC OPERATIONS
    // ============================================================================

    /// Insert a key and rebalance.
    ///
    /// Keys equal to an existing key go to its right subtree; duplicates are
    /// kept, so this always returns `true`.
    pub fn insert(&mut self, key: K) -> bool {
        let (root, _) = insert_node(self.root.take(), key);
        self.root = Some(root);
        self.len += 1;
        true
    }

    /// Remove one occurrence of `key`, returning it. Absent keys are a no-op.
    pub fn delete(&mut self, key: &K) -> Option<K> {
        let (root, removed) = delete_node(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Find the stored key equal to `key`.
    pub fn search(&self, key: &K) -> Option<&K> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Some(&node.key),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Smallest key.
    pub fn min(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Largest key.
    pub fn max(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }
}

impl<K> AvlTree<K> {
    /// Lazy depth-first walk in the requested order.
    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_, &AvlNode<K>> {
        Traverse::new(self.root.as_deref(), order)
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> Traverse<'_, &AvlNode<K>> {
        self.traverse(TraversalOrder::InOrder)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn root(&self) -> Option<&AvlNode<K>> {
        self.root.as_deref()
    }

    pub fn root_key(&self) -> Option<&K> {
        self.root.as_deref().map(|node| &node.key)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }
}

impl<K> AvlNode<K> {
    fn leaf(key: K) -> Box<Self> {
        Box::new(Self {
            key,
            left: None,
            right: None,
            height: 1,
        })
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn left(&self) -> Option<&AvlNode<K>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&AvlNode<K>> {
        self.right.as_deref()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// height(left) - height(right)
    pub fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }
}

impl<'a, K> BinaryCursor<'a> for &'a AvlNode<K> {
    type Key = K;

    fn key(self) -> &'a K {
        &self.key
    }

    fn left(self) -> Option<Self> {
        self.left.as_deref()
    }

    fn right(self) -> Option<Self> {
        self.right.as_deref()
    }
}

// ============================================================================
// RECURSIVE HELPERS
// ============================================================================

pub(crate) fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance<K>(link: &Link<K>) -> isize {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

fn rotate_left<K>(mut z: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    let Some(mut y) = z.right.take() else {
        return z;
    };
    z.right = y.left.take();
    z.update_height();
    y.left = Some(z);
    y.update_height();
    log::trace!("avl: rotate left");
    y
}

fn rotate_right<K>(mut y: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    log::trace!("avl: rotate right");
    x
}

/// Insert below `link`, returning the new subtree root and the side taken at
/// that root (`None` for a freshly created leaf).
fn insert_node<K: Ord>(link: Link<K>, key: K) -> (Box<AvlNode<K>>, Option<Side>) {
    let Some(mut node) = link else {
        return (AvlNode::leaf(key), None);
    };

    // `child_side` is the outcome of comparing the inserted key with the
    // child's key, which selects the rotation case below.
    let (side, child_side) = if key < node.key {
        let (child, child_side) = insert_node(node.left.take(), key);
        node.left = Some(child);
        (Side::Left, child_side)
    } else {
        let (child, child_side) = insert_node(node.right.take(), key);
        node.right = Some(child);
        (Side::Right, child_side)
    };

    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        if child_side == Some(Side::Right) {
            // Left-Right
            node.left = node.left.take().map(rotate_left);
        }
        // Left-Left
        return (rotate_right(node), Some(side));
    }
    if balance < -1 {
        if child_side == Some(Side::Left) {
            // Right-Left
            node.right = node.right.take().map(rotate_right);
        }
        // Right-Right
        return (rotate_left(node), Some(side));
    }

    (node, Some(side))
}

/// Restore balance after a removal below `node`, choosing the rotation from
/// the heavy child's own balance factor.
fn rebalance_after_delete<K>(mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        if self::balance(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        if self::balance(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn delete_node<K: Ord>(link: Link<K>, key: &K) -> (Link<K>, Option<K>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let removed = match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, removed) = delete_node(node.left.take(), key);
            node.left = left;
            removed
        }
        Ordering::Greater => {
            let (right, removed) = delete_node(node.right.take(), key);
            node.right = right;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, right) => return (right, Some(node.key)),
            (left, None) => return (left, Some(node.key)),
            (Some(left), Some(right)) => {
                // Two children: the in-order successor takes this slot.
                let (right, successor) = take_min(right);
                node.left = Some(left);
                node.right = right;
                Some(std::mem::replace(&mut node.key, successor))
            }
        },
    };

    if removed.is_none() {
        return (Some(node), None);
    }
    (Some(rebalance_after_delete(node)), removed)
}

/// Detach the minimum node of a subtree, returning the rebalanced remainder
/// and the detached key.
fn take_min<K>(mut node: Box<AvlNode<K>>) -> (Link<K>, K) {
    match node.left.take() {
        None => (node.right.take(), node.key),
        Some(left) => {
            let (left, min) = take_min(left);
            node.left = left;
            (Some(rebalance_after_delete(node)), min)
        }
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl<K: Ord> SearchTree<K> for AvlTree<K> {
    type Iter<'a>
        = Traverse<'a, &'a AvlNode<K>>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> bool {
        AvlTree::insert(self, key)
    }

    fn delete(&mut self, key: &K) -> Option<K> {
        AvlTree::delete(self, key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        AvlTree::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> Self::Iter<'_> {
        AvlTree::iter(self)
    }

    fn check_invariants(&self) -> TreeResult<()> {
        self.validate()
    }

    fn min(&self) -> Option<&K> {
        AvlTree::min(self)
    }

    fn max(&self) -> Option<&K> {
        AvlTree::max(self)
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = Traverse<'a, &'a AvlNode<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
