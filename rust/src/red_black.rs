//! Red-black tree operations.
//!
//! Nodes live in an arena. Slot [`NIL`] holds the black sentinel that stands
//! in for every missing child, so the fixup loops can read the colour and
//! parent of an absent node without special cases. The sentinel's parent is
//! scratch space written by `transplant` during deletion.

use std::fmt;

use crate::arena::NodeId;
use crate::error::TreeResult;
use crate::traversal::{BinaryCursor, Traverse};
use crate::types::{Color, RbNode, RedBlackTree, SearchTree, TraversalOrder};

/// Arena slot of the shared sentinel.
pub const NIL: NodeId = 0;

// ============================================================================
// NODE ACCESS
// ============================================================================

impl<K> RedBlackTree<K> {
    #[inline]
    pub(crate) fn key_of(&self, id: NodeId) -> &K {
        self.nodes[id]
            .key
            .as_ref()
            .expect("sentinel has no key")
    }

    #[inline]
    pub(crate) fn left_of(&self, id: NodeId) -> NodeId {
        self.nodes[id].left
    }

    #[inline]
    pub(crate) fn right_of(&self, id: NodeId) -> NodeId {
        self.nodes[id].right
    }

    #[inline]
    pub(crate) fn parent_of(&self, id: NodeId) -> NodeId {
        self.nodes[id].parent
    }

    #[inline]
    pub(crate) fn color_of(&self, id: NodeId) -> Color {
        self.nodes[id].color
    }

    #[inline]
    fn set_color(&mut self, id: NodeId, color: Color) {
        self.nodes[id].color = color;
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while self.left_of(id) != NIL {
            id = self.left_of(id);
        }
        id
    }

    fn maximum(&self, mut id: NodeId) -> NodeId {
        while self.right_of(id) != NIL {
            id = self.right_of(id);
        }
        id
    }

    // ============================================================================
    // ROTATIONS
    // ============================================================================

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right_of(x);
        let y_left = self.left_of(y);

        self.nodes[x].right = y_left;
        if y_left != NIL {
            self.nodes[y_left].parent = x;
        }

        let parent = self.parent_of(x);
        self.nodes[y].parent = parent;
        if parent == NIL {
            self.root = y;
        } else if x == self.left_of(parent) {
            self.nodes[parent].left = y;
        } else {
            self.nodes[parent].right = y;
        }

        self.nodes[y].left = x;
        self.nodes[x].parent = y;
        log::trace!("red-black: rotate left at node {}", x);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let y = self.left_of(x);
        let y_right = self.right_of(y);

        self.nodes[x].left = y_right;
        if y_right != NIL {
            self.nodes[y_right].parent = x;
        }

        let parent = self.parent_of(x);
        self.nodes[y].parent = parent;
        if parent == NIL {
            self.root = y;
        } else if x == self.right_of(parent) {
            self.nodes[parent].right = y;
        } else {
            self.nodes[parent].left = y;
        }

        self.nodes[y].right = x;
        self.nodes[x].parent = y;
        log::trace!("red-black: rotate right at node {}", x);
    }

    /// Put `v` where `u` hangs from its parent. `v` may be the sentinel.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.parent_of(u);
        if parent == NIL {
            self.root = v;
        } else if u == self.left_of(parent) {
            self.nodes[parent].left = v;
        } else {
            self.nodes[parent].right = v;
        }
        self.nodes[v].parent = parent;
    }

    // ============================================================================
    // QUERIES
    // ============================================================================

    /// Lazy depth-first walk in the requested order.
    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_, RbCursor<'_, K>> {
        Traverse::new(self.cursor(self.root), order)
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> Traverse<'_, RbCursor<'_, K>> {
        self.traverse(TraversalOrder::InOrder)
    }

    /// Cursor onto the root, for inspecting shape and colours.
    pub fn root(&self) -> Option<RbCursor<'_, K>> {
        self.cursor(self.root)
    }

    fn cursor(&self, id: NodeId) -> Option<RbCursor<'_, K>> {
        (id != NIL).then_some(RbCursor { tree: self, id })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root_key(&self) -> Option<&K> {
        (self.root != NIL).then(|| self.key_of(self.root))
    }

    pub fn min(&self) -> Option<&K> {
        (self.root != NIL).then(|| self.key_of(self.minimum(self.root)))
    }

    pub fn max(&self) -> Option<&K> {
        (self.root != NIL).then(|| self.key_of(self.maximum(self.root)))
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = Vec::new();
        if self.root != NIL {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in [self.left_of(id), self.right_of(id)] {
                if child != NIL {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Black nodes on every root-to-leaf path, sentinel excluded.
    ///
    /// Returns `None` if the paths disagree or a red node has a red child.
    pub fn black_height(&self) -> Option<usize> {
        self.black_height_from(self.root)
    }

    pub(crate) fn black_height_from(&self, id: NodeId) -> Option<usize> {
        if id == NIL {
            return Some(0);
        }
        let color = self.color_of(id);
        let (left, right) = (self.left_of(id), self.right_of(id));
        if color == Color::Red
            && (self.color_of(left) == Color::Red || self.color_of(right) == Color::Red)
        {
            return None;
        }

        let left_height = self.black_height_from(left)?;
        let right_height = self.black_height_from(right)?;
        if left_height != right_height {
            return None;
        }
        Some(left_height + usize::from(color == Color::Black))
    }

    /// Remove every key; the sentinel stays in slot [`NIL`].
    pub fn clear(&mut self) {
        self.nodes.clear();
        let nil = self.nodes.allocate(RbNode::sentinel());
        debug_assert_eq!(nil, NIL);
        self.root = NIL;
        self.len = 0;
    }
}

impl<K: Ord> RedBlackTree<K> {
    fn find(&self, key: &K) -> NodeId {
        let mut current = self.root;
        while current != NIL {
            let node_key = self.key_of(current);
            current = if key == node_key {
                return current;
            } else if key < node_key {
                self.left_of(current)
            } else {
                self.right_of(current)
            };
        }
        NIL
    }

    pub fn search(&self, key: &K) -> Option<&K> {
        let id = self.find(key);
        (id != NIL).then(|| self.key_of(id))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key) != NIL
    }

    // ============================================================================
    // INSERT
    // ============================================================================

    /// Insert a key as a red leaf and repair the colouring.
    ///
    /// Equal keys descend to the right, so duplicates are kept and this always
    /// returns `true`.
    pub fn insert(&mut self, key: K) -> bool {
        let mut parent = NIL;
        let mut current = self.root;
        let mut goes_left = false;
        while current != NIL {
            parent = current;
            goes_left = key < *self.key_of(current);
            current = if goes_left {
                self.left_of(current)
            } else {
                self.right_of(current)
            };
        }

        let id = self.nodes.allocate(RbNode::red(key, parent));
        if parent == NIL {
            self.root = id;
        } else if goes_left {
            self.nodes[parent].left = id;
        } else {
            self.nodes[parent].right = id;
        }
        self.len += 1;

        self.insert_fixup(id);
        true
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color_of(self.parent_of(z)) == Color::Red {
            let parent = self.parent_of(z);
            let grandparent = self.parent_of(parent);

            if parent == self.left_of(grandparent) {
                let uncle = self.right_of(grandparent);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.right_of(parent) {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.parent_of(z);
                    let grandparent = self.parent_of(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left_of(grandparent);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.left_of(parent) {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.parent_of(z);
                    let grandparent = self.parent_of(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    // ============================================================================
    // DELETE
    // ============================================================================

    /// Remove one occurrence of `key`, returning it. Absent keys are a no-op.
    pub fn delete(&mut self, key: &K) -> Option<K> {
        let z = self.find(key);
        if z == NIL {
            return None;
        }

        let mut removed_color = self.color_of(z);
        let x;
        if self.left_of(z) == NIL {
            x = self.right_of(z);
            self.transplant(z, x);
        } else if self.right_of(z) == NIL {
            x = self.left_of(z);
            self.transplant(z, x);
        } else {
            // The in-order successor moves into z's position.
            let y = self.minimum(self.right_of(z));
            removed_color = self.color_of(y);
            x = self.right_of(y);
            if self.parent_of(y) == z {
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                let z_right = self.right_of(z);
                self.nodes[y].right = z_right;
                self.nodes[z_right].parent = y;
            }
            self.transplant(z, y);
            let z_left = self.left_of(z);
            self.nodes[y].left = z_left;
            self.nodes[z_left].parent = y;
            let z_color = self.color_of(z);
            self.set_color(y, z_color);
        }

        if removed_color == Color::Black {
            self.delete_fixup(x);
        }

        self.len -= 1;
        self.nodes.deallocate(z).and_then(|node| node.key)
    }

    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color_of(x) == Color::Black {
            let parent = self.parent_of(x);
            if x == self.left_of(parent) {
                let mut sibling = self.right_of(parent);
                if self.color_of(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right_of(self.parent_of(x));
                }

                if self.color_of(self.left_of(sibling)) == Color::Black
                    && self.color_of(self.right_of(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = self.parent_of(x);
                } else {
                    if self.color_of(self.right_of(sibling)) == Color::Black {
                        let near = self.left_of(sibling);
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right_of(self.parent_of(x));
                    }
                    let parent = self.parent_of(x);
                    let parent_color = self.color_of(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.right_of(sibling);
                    self.set_color(far, Color::Black);
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.left_of(parent);
                if self.color_of(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left_of(self.parent_of(x));
                }

                if self.color_of(self.right_of(sibling)) == Color::Black
                    && self.color_of(self.left_of(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = self.parent_of(x);
                } else {
                    if self.color_of(self.left_of(sibling)) == Color::Black {
                        let near = self.right_of(sibling);
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left_of(self.parent_of(x));
                    }
                    let parent = self.parent_of(x);
                    let parent_color = self.color_of(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.left_of(sibling);
                    self.set_color(far, Color::Black);
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// Handle onto a live node of a [`RedBlackTree`], used for traversal.
pub struct RbCursor<'a, K> {
    tree: &'a RedBlackTree<K>,
    id: NodeId,
}

impl<'a, K> RbCursor<'a, K> {
    pub fn color(&self) -> Color {
        self.tree.color_of(self.id)
    }
}

impl<K> Clone for RbCursor<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RbCursor<'_, K> {}

impl<K> fmt::Debug for RbCursor<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbCursor").field("id", &self.id).finish()
    }
}

impl<'a, K> BinaryCursor<'a> for RbCursor<'a, K> {
    type Key = K;

    fn key(self) -> &'a K {
        self.tree.key_of(self.id)
    }

    fn left(self) -> Option<Self> {
        self.tree.cursor(self.tree.left_of(self.id))
    }

    fn right(self) -> Option<Self> {
        self.tree.cursor(self.tree.right_of(self.id))
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl<K: Ord> SearchTree<K> for RedBlackTree<K> {
    type Iter<'a>
        = Traverse<'a, RbCursor<'a, K>>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> bool {
        RedBlackTree::insert(self, key)
    }

    fn delete(&mut self, key: &K) -> Option<K> {
        RedBlackTree::delete(self, key)
    }

    fn search(&self, key: &K) -> Option<&K> {
        RedBlackTree::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> Self::Iter<'_> {
        RedBlackTree::iter(self)
    }

    fn check_invariants(&self) -> TreeResult<()> {
        self.validate()
    }

    fn min(&self) -> Option<&K> {
        RedBlackTree::min(self)
    }

    fn max(&self) -> Option<&K> {
        RedBlackTree::max(self)
    }
}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RedBlackTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn in_order(tree: &RedBlackTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    fn colors_pre_order(tree: &RedBlackTree<i32>) -> Vec<(i32, Color)> {
        let mut out = Vec::new();
        let mut stack = vec![tree.root];
        while let Some(id) = stack.pop() {
            if id == NIL {
                continue;
            }
            out.push((*tree.key_of(id), tree.color_of(id)));
            stack.push(tree.right_of(id));
            stack.push(tree.left_of(id));
        }
        out
    }

    #[test]
    fn test_insert_recolours_and_rotates() {
        let tree: RedBlackTree<i32> = [20, 15, 25, 10, 5, 1].into_iter().collect();

        use Color::*;
        assert_eq!(
            colors_pre_order(&tree),
            [
                (20, Black),
                (10, Red),
                (5, Black),
                (1, Red),
                (15, Black),
                (25, Black)
            ]
        );
        assert_eq!(tree.black_height(), Some(2));
        tree.validate().unwrap();
    }

    #[test]
    fn test_delete_scenario() {
        let mut tree: RedBlackTree<i32> = [20, 15, 25, 10, 5, 1].into_iter().collect();

        assert_eq!(tree.delete(&10), Some(10));
        assert_eq!(in_order(&tree), [1, 5, 15, 20, 25]);
        assert!(tree.black_height().is_some());
        tree.validate().unwrap();

        assert_eq!(tree.delete(&20), Some(20));
        assert_eq!(in_order(&tree), [1, 5, 15, 25]);
        assert!(tree.black_height().is_some());
        tree.validate().unwrap();
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut tree: RedBlackTree<i32> = (0..20).collect();
        let before = colors_pre_order(&tree);
        assert_eq!(tree.delete(&100), None);
        assert_eq!(colors_pre_order(&tree), before);
        assert_eq!(tree.len(), 20);
    }

    #[test]
    fn test_delete_everything() {
        let mut tree: RedBlackTree<i32> = (0..64).collect();
        for key in (0..64).rev().step_by(3) {
            assert_eq!(tree.delete(&key), Some(key));
            tree.validate().unwrap();
        }
        for key in 0..64 {
            tree.delete(&key);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root, NIL);
        // Only the sentinel is left allocated.
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_sentinel_stays_black() {
        let mut tree: RedBlackTree<i32> = (0..32).collect();
        for key in 0..16 {
            tree.delete(&(key * 2));
            assert_eq!(tree.color_of(NIL), Color::Black);
        }
    }

    #[test]
    fn test_traversal_orders() {
        let tree: RedBlackTree<i32> = [2, 1, 3].into_iter().collect();
        let collect = |order| tree.traverse(order).copied().collect::<Vec<_>>();
        assert_eq!(collect(TraversalOrder::PreOrder), [2, 1, 3]);
        assert_eq!(collect(TraversalOrder::InOrder), [1, 2, 3]);
        assert_eq!(collect(TraversalOrder::PostOrder), [1, 3, 2]);
    }

    #[test]
    fn test_duplicates_and_bounds() {
        let mut tree: RedBlackTree<i32> = [7, 3, 7, 9, 7].into_iter().collect();
        assert_eq!(in_order(&tree), [3, 7, 7, 7, 9]);
        assert_eq!(tree.min(), Some(&3));
        assert_eq!(tree.max(), Some(&9));
        assert_eq!(tree.delete(&7), Some(7));
        assert_eq!(in_order(&tree), [3, 7, 7, 9]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_height_bound() {
        let tree: RedBlackTree<u32> = (0..1000).collect();
        // 2 * log2(n + 1)
        assert!(tree.height() <= 20);
        assert!(tree.black_height().is_some());
    }

    #[test]
    fn test_clear_reseeds_sentinel() {
        let mut tree: RedBlackTree<i32> = (0..10).collect();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.root_key(), None);
        tree.insert(4);
        assert_eq!(tree.root_key(), Some(&4));
        assert_eq!(tree.color_of(tree.root), Color::Black);
    }
}
