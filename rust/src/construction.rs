//! Construction and initialization logic for every tree variant.
//!
//! Multiway trees take their minimum degree at construction time and reject
//! degrees below [`MIN_DEGREE`]. Binary trees need no configuration.

use crate::arena::{Arena, NULL_NODE};
use crate::error::{InitResult, TreeError};
use crate::red_black::NIL;
use crate::types::{
    AvlTree, BPlusTreeMap, BPlusTreeSet, BTree, BTreeNode, BranchNode, Color, LeafNode, NodeRef,
    RbNode, RedBlackTree, TwoThreeFourTree, DEFAULT_MIN_DEGREE, MIN_DEGREE,
};

impl<K> AvlTree<K> {
    /// Create an empty AVL tree.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K> RedBlackTree<K> {
    /// Create an empty red-black tree.
    ///
    /// The arena is seeded with the black sentinel so that it occupies
    /// slot [`NIL`].
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let nil = nodes.allocate(RbNode::sentinel());
        debug_assert_eq!(nil, NIL);

        Self {
            nodes,
            root: NIL,
            len: 0,
        }
    }
}

impl<K> RbNode<K> {
    pub(crate) fn sentinel() -> Self {
        Self {
            key: None,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
        }
    }

    /// Fresh red node whose children are both the sentinel.
    pub(crate) fn red(key: K, parent: crate::arena::NodeId) -> Self {
        Self {
            key: Some(key),
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent,
        }
    }
}

impl<K> BTree<K> {
    /// Create a B-tree with the given minimum degree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BTree;
    ///
    /// let tree = BTree::<i32>::new(3).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BTree::<i32>::new(1).is_err());
    /// ```
    pub fn new(min_degree: usize) -> InitResult<Self> {
        validation::validate_degree(min_degree)?;
        log::debug!("creating B-tree with minimum degree {}", min_degree);

        Ok(Self {
            min_degree,
            root: BTreeNode::new_leaf(min_degree),
            len: 0,
        })
    }

    /// Create a B-tree with [`DEFAULT_MIN_DEGREE`].
    pub fn with_default_degree() -> InitResult<Self> {
        Self::new(DEFAULT_MIN_DEGREE)
    }
}

impl<K> BTreeNode<K> {
    pub(crate) fn new_leaf(min_degree: usize) -> Self {
        Self {
            keys: Vec::with_capacity(2 * min_degree - 1),
            children: Vec::new(),
            leaf: true,
        }
    }

    pub(crate) fn new_internal(min_degree: usize) -> Self {
        Self {
            keys: Vec::with_capacity(2 * min_degree - 1),
            children: Vec::with_capacity(2 * min_degree),
            leaf: false,
        }
    }
}

impl<K> TwoThreeFourTree<K> {
    /// Create an empty 2-3-4 tree.
    pub fn new() -> Self {
        Self {
            inner: BTree {
                min_degree: MIN_DEGREE,
                root: BTreeNode::new_leaf(MIN_DEGREE),
                len: 0,
            },
        }
    }
}

impl<K, V> BPlusTreeMap<K, V> {
    /// Create a B+ tree with the given minimum degree.
    ///
    /// # Arguments
    ///
    /// * `min_degree` - `t`; every node holds at most `2t - 1` keys (minimum 2)
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_trees::BPlusTreeMap;
    ///
    /// let tree = BPlusTreeMap::<i32, String>::new(4).unwrap();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new(min_degree: usize) -> InitResult<Self> {
        validation::validate_degree(min_degree)?;
        log::debug!("creating B+ tree with minimum degree {}", min_degree);

        let mut leaf_arena = Arena::new();
        let root_id = leaf_arena.allocate(LeafNode::new(2 * min_degree - 1));

        Ok(Self {
            min_degree,
            root: NodeRef::leaf(root_id),
            leaf_arena,
            branch_arena: Arena::new(),
        })
    }

    /// Create a B+ tree with [`DEFAULT_MIN_DEGREE`].
    pub fn with_default_degree() -> InitResult<Self> {
        Self::new(DEFAULT_MIN_DEGREE)
    }

    /// Maximum number of keys per node (`2t - 1`).
    pub fn capacity(&self) -> usize {
        2 * self.min_degree - 1
    }
}

impl<K> BPlusTreeSet<K> {
    /// Create a B+ tree set with the given minimum degree.
    pub fn new(min_degree: usize) -> InitResult<Self> {
        Ok(Self {
            map: BPlusTreeMap::new(min_degree)?,
        })
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new leaf node with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        // One spare slot: a leaf briefly overflows before it splits.
        Self {
            capacity,
            keys: Vec::with_capacity(capacity + 1),
            values: Vec::with_capacity(capacity + 1),
            next: NULL_NODE,
        }
    }
}

impl<K, V> BranchNode<K, V> {
    /// Creates a new branch node with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            keys: Vec::with_capacity(capacity + 1),
            children: Vec::with_capacity(capacity + 2),
        }
    }
}

// Default implementations
impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Default for TwoThreeFourTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Default for BTree<K> {
    /// Create a B-tree with default minimum degree.
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
            root: BTreeNode::new_leaf(DEFAULT_MIN_DEGREE),
            len: 0,
        }
    }
}

impl<K, V> Default for BPlusTreeMap<K, V> {
    /// Create a B+ tree with default minimum degree.
    fn default() -> Self {
        let mut leaf_arena = Arena::new();
        let root_id = leaf_arena.allocate(LeafNode::new(2 * DEFAULT_MIN_DEGREE - 1));
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
            root: NodeRef::leaf(root_id),
            leaf_arena,
            branch_arena: Arena::new(),
        }
    }
}

impl<K> Default for BPlusTreeSet<K> {
    fn default() -> Self {
        Self {
            map: BPlusTreeMap::default(),
        }
    }
}

/// Validation utilities for construction
pub mod validation {
    use super::*;

    /// Validate that a minimum degree is usable by a multiway tree.
    pub fn validate_degree(min_degree: usize) -> InitResult<()> {
        if min_degree < MIN_DEGREE {
            Err(TreeError::invalid_degree(min_degree, MIN_DEGREE))
        } else {
            Ok(())
        }
    }

    /// Get the recommended minimum degree for an expected number of keys.
    ///
    /// Always at least [`MIN_DEGREE`].
    pub fn recommended_degree(expected_keys: usize) -> usize {
        if expected_keys < 100 {
            MIN_DEGREE
        } else if expected_keys < 10_000 {
            8
        } else if expected_keys < 1_000_000 {
            16
        } else {
            32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btree_construction() {
        let tree = BTree::<i32>::new(3).unwrap();
        assert_eq!(tree.min_degree, 3);
        assert!(tree.root.leaf);
        assert_eq!(tree.len, 0);
    }

    #[test]
    fn test_invalid_degree() {
        let err = BTree::<i32>::new(1).unwrap_err();
        assert!(err.is_degree_error());
        assert!(BPlusTreeMap::<i32, String>::new(0).is_err());
        assert!(BPlusTreeSet::<i32>::new(1).is_err());
    }

    #[test]
    fn test_defaults() {
        let btree = BTree::<i32>::default();
        assert_eq!(btree.min_degree, DEFAULT_MIN_DEGREE);

        let bplus = BPlusTreeMap::<i32, String>::default();
        assert_eq!(bplus.min_degree, DEFAULT_MIN_DEGREE);
        assert_eq!(bplus.capacity(), 2 * DEFAULT_MIN_DEGREE - 1);
        assert!(bplus.root.is_leaf());

        let two_three_four = TwoThreeFourTree::<i32>::default();
        assert_eq!(two_three_four.inner.min_degree, 2);
    }

    #[test]
    fn test_red_black_sentinel_slot() {
        let tree = RedBlackTree::<i32>::new();
        assert_eq!(tree.root, NIL);
        assert_eq!(tree.nodes[NIL].color, Color::Black);
        assert!(tree.nodes[NIL].key.is_none());
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_leaf_construction() {
        let leaf = LeafNode::<i32, String>::new(5);
        assert_eq!(leaf.capacity, 5);
        assert!(leaf.keys.is_empty());
        assert_eq!(leaf.next, NULL_NODE);
    }

    #[test]
    fn test_branch_construction() {
        let branch = BranchNode::<i32, String>::new(5);
        assert_eq!(branch.capacity, 5);
        assert!(branch.keys.is_empty());
        assert!(branch.children.is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(validation::validate_degree(2).is_ok());
        assert!(validation::validate_degree(16).is_ok());
        assert!(validation::validate_degree(1).is_err());
    }

    #[test]
    fn test_recommended_degree() {
        assert_eq!(validation::recommended_degree(50), MIN_DEGREE);
        assert_eq!(validation::recommended_degree(5000), 8);
        assert_eq!(validation::recommended_degree(500_000), 16);
        assert_eq!(validation::recommended_degree(5_000_000), 32);
    }
}
