//! Core types and data structures for the tree family.
//!
//! This module contains the node and tree structs of every variant, the
//! ordered-container contract they share, and the constants used throughout
//! the crate. Operations live in the per-variant modules.

use std::marker::PhantomData;

use crate::arena::{Arena, NodeId};
use crate::error::{KeyResult, TreeError, TreeResult};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest minimum degree a multiway tree supports (a 2-3-4 tree).
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used by the `Default` constructors.
pub const DEFAULT_MIN_DEGREE: usize = 3;

// ============================================================================
// CONTRACT
// ============================================================================

/// Ordered container over totally ordered keys.
///
/// Every tree in the crate implements this contract, so callers can swap
/// variants to compare their trade-offs. A missing key is a normal outcome:
/// `search` and `delete` return `None` rather than an error.
pub trait SearchTree<K: Ord> {
    /// Ascending iterator over the stored keys.
    type Iter<'a>: Iterator<Item = &'a K>
    where
        Self: 'a,
        K: 'a;

    /// Insert a key. Returns `true` if the container grew.
    fn insert(&mut self, key: K) -> bool;

    /// Remove one occurrence of `key`, returning the stored key.
    fn delete(&mut self, key: &K) -> Option<K>;

    /// Look up the stored key equal to `key`.
    fn search(&self, key: &K) -> Option<&K>;

    /// Number of keys currently stored.
    fn len(&self) -> usize;

    /// Keys in ascending order.
    fn iter(&self) -> Self::Iter<'_>;

    /// Verify every structural invariant of the variant.
    fn check_invariants(&self) -> TreeResult<()>;

    fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like `search`, but reports absence as `TreeError::KeyNotFound`.
    fn try_search(&self, key: &K) -> KeyResult<&K> {
        self.search(key).ok_or(TreeError::KeyNotFound)
    }

    /// Like `delete`, but reports absence as `TreeError::KeyNotFound`.
    fn try_delete(&mut self, key: &K) -> KeyResult<K> {
        self.delete(key).ok_or(TreeError::KeyNotFound)
    }

    fn min(&self) -> Option<&K> {
        self.iter().next()
    }

    fn max(&self) -> Option<&K> {
        self.iter().last()
    }
}

/// Depth-first visiting order for binary trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    PreOrder,
    InOrder,
    PostOrder,
}

// ============================================================================
// AVL TREE
// ============================================================================

/// Height-balanced binary search tree.
///
/// Every node keeps |height(left) - height(right)| <= 1. Keys equal to an
/// existing key are routed to its right subtree, so the tree behaves as a
/// multiset.
///
/// # Examples
///
/// ```
/// use balanced_trees::{AvlTree, TraversalOrder};
///
/// let mut tree = AvlTree::new();
/// for key in [10, 20, 30, 40, 50, 25] {
///     tree.insert(key);
/// }
///
/// let pre: Vec<_> = tree.traverse(TraversalOrder::PreOrder).copied().collect();
/// assert_eq!(pre, [30, 20, 10, 25, 40, 50]);
/// assert_eq!(tree.search(&25), Some(&25));
/// ```
#[derive(Debug, Clone)]
pub struct AvlTree<K> {
    pub(crate) root: Option<Box<AvlNode<K>>>,
    pub(crate) len: usize,
}

/// Node of an [`AvlTree`].
#[derive(Debug, Clone)]
pub struct AvlNode<K> {
    pub(crate) key: K,
    pub(crate) left: Option<Box<AvlNode<K>>>,
    pub(crate) right: Option<Box<AvlNode<K>>>,
    /// Height of the subtree rooted here; a leaf has height 1.
    pub(crate) height: usize,
}

// ============================================================================
// RED-BLACK TREE
// ============================================================================

/// Node colour of a [`RedBlackTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Colour-balanced binary search tree.
///
/// Nodes live in an arena; slot [`NIL`](crate::red_black::NIL) is the shared
/// black sentinel standing in for every absent child. Parent links are plain
/// ids and never own anything.
///
/// # Examples
///
/// ```
/// use balanced_trees::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// for key in [20, 15, 25, 10, 5, 1] {
///     tree.insert(key);
/// }
/// assert_eq!(tree.delete(&10), Some(10));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 5, 15, 20, 25]);
/// assert!(tree.black_height().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RedBlackTree<K> {
    pub(crate) nodes: Arena<RbNode<K>>,
    pub(crate) root: NodeId,
    pub(crate) len: usize,
}

/// Arena slot of a [`RedBlackTree`]. Only the sentinel has no key.
#[derive(Debug, Clone)]
pub struct RbNode<K> {
    pub(crate) key: Option<K>,
    pub(crate) color: Color,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) parent: NodeId,
}

// ============================================================================
// B-TREE
// ============================================================================

/// Multiway balanced tree of minimum degree `t`.
///
/// Every non-root node holds between `t - 1` and `2t - 1` keys and all leaves
/// sit at the same depth. Keys are unique.
///
/// # Examples
///
/// ```
/// use balanced_trees::BTree;
///
/// let mut tree = BTree::new(3).unwrap();
/// for key in [10, 20, 5, 6, 12, 30, 7, 17] {
///     tree.insert(key);
/// }
/// assert_eq!(tree.delete(&6), Some(6));
/// assert_eq!(tree.search(&6), None);
/// assert_eq!(tree.len(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct BTree<K> {
    pub(crate) min_degree: usize,
    pub(crate) root: BTreeNode<K>,
    pub(crate) len: usize,
}

/// Node of a [`BTree`]. Children are owned by value.
#[derive(Debug, Clone)]
pub struct BTreeNode<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<BTreeNode<K>>,
    pub(crate) leaf: bool,
}

/// 2-3-4 tree: a [`BTree`] fixed at minimum degree 2.
#[derive(Debug, Clone)]
pub struct TwoThreeFourTree<K> {
    pub(crate) inner: BTree<K>,
}

// ============================================================================
// B+ TREE
// ============================================================================

/// B+ tree map.
///
/// Values are stored only in leaves and the leaves are chained in key order,
/// so range scans walk the chain instead of the tree. Branch keys are routing
/// copies. Nodes live in two arenas, one per node kind.
///
/// # Examples
///
/// ```
/// use balanced_trees::BPlusTreeMap;
///
/// let mut tree = BPlusTreeMap::new(3).unwrap();
/// tree.insert(1, "one");
/// tree.insert(2, "two");
/// tree.insert(3, "three");
///
/// assert_eq!(tree.get(&2), Some(&"two"));
/// assert_eq!(tree.len(), 3);
///
/// let range: Vec<_> = tree.range(1..3).collect();
/// assert_eq!(range, [(&1, &"one"), (&2, &"two")]);
/// ```
///
/// # Performance Characteristics
///
/// - **Insertion**: O(log n)
/// - **Lookup**: O(log n)
/// - **Deletion**: O(log n)
/// - **Range queries**: O(log n + k) where k is the number of items in range
#[derive(Debug)]
pub struct BPlusTreeMap<K, V> {
    /// Minimum degree `t`; nodes hold at most `2t - 1` keys.
    pub(crate) min_degree: usize,
    /// The root node of the tree.
    pub(crate) root: NodeRef<K, V>,
    pub(crate) leaf_arena: Arena<LeafNode<K, V>>,
    pub(crate) branch_arena: Arena<BranchNode<K, V>>,
}

/// Leaf node containing key-value pairs.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    /// Maximum number of keys this node can hold.
    pub(crate) capacity: usize,
    /// Sorted list of keys.
    pub(crate) keys: Vec<K>,
    /// List of values corresponding to keys.
    pub(crate) values: Vec<V>,
    /// Next leaf node in the chain (for range queries).
    pub(crate) next: NodeId,
}

/// Internal (branch) node containing routing keys and child pointers.
#[derive(Debug, Clone)]
pub struct BranchNode<K, V> {
    /// Maximum number of keys this node can hold.
    pub(crate) capacity: usize,
    /// Sorted list of separator keys.
    pub(crate) keys: Vec<K>,
    /// List of child nodes (leaves or other branches).
    pub(crate) children: Vec<NodeRef<K, V>>,
}

/// Set facade over a [`BPlusTreeMap`] with unit values.
#[derive(Debug)]
pub struct BPlusTreeSet<K> {
    pub(crate) map: BPlusTreeMap<K, ()>,
}

/// Node reference that can be either a leaf or branch node
#[derive(Debug, PartialEq, Eq)]
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Branch(NodeId, PhantomData<(K, V)>),
}

impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> NodeRef<K, V> {
    pub(crate) fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub(crate) fn branch(id: NodeId) -> Self {
        NodeRef::Branch(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Branch(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}

/// Result of an insertion into a B+ subtree.
pub(crate) enum InsertResult<K, V> {
    /// Insertion completed without splitting. Contains the old value if key existed.
    Updated(Option<V>),
    /// The subtree root split; the caller must link `right` after `separator`.
    Split { separator: K, right: NodeRef<K, V> },
}

/// Result of a removal from a B+ subtree.
pub(crate) enum RemoveResult<V> {
    /// Contains the removed value if the key existed. The bool is set when the
    /// subtree root fell below minimum occupancy.
    Updated(Option<V>, bool),
}
