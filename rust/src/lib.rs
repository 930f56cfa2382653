//! Self-balancing search trees in Rust.
//!
//! Five ordered containers share one contract, [`SearchTree`]: insert, delete,
//! search and ascending traversal.
//!
//! - [`AvlTree`]: height-balanced binary tree with rotations.
//! - [`RedBlackTree`]: colour-balanced binary tree over an arena with a
//!   shared black sentinel.
//! - [`BTree`]: multiway tree of configurable minimum degree.
//! - [`TwoThreeFourTree`]: a [`BTree`] of minimum degree 2.
//! - [`BPlusTreeMap`] and [`BPlusTreeSet`]: values in chained leaves, with
//!   range scans that walk the chain.
//!
//! ```
//! use balanced_trees::{AvlTree, BPlusTreeSet, SearchTree};
//!
//! fn fill<T: SearchTree<i32>>(tree: &mut T) {
//!     for key in [5, 3, 8, 1] {
//!         tree.insert(key);
//!     }
//! }
//!
//! let mut avl = AvlTree::new();
//! let mut bplus = BPlusTreeSet::new(2).unwrap();
//! fill(&mut avl);
//! fill(&mut bplus);
//! assert!(avl.iter().eq(SearchTree::iter(&bplus)));
//! ```

mod arena;
mod avl;
mod bplus_set;
mod btree;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod range_queries;
mod red_black;
mod traversal;
mod tree_structure;
mod types;
mod validation;

pub use arena::{Arena, ArenaStats, NodeId, NULL_NODE};
pub use bplus_set::SetRange;
pub use btree::BTreeIter;
pub use construction::validation::{recommended_degree, validate_degree};
pub use error::{InitResult, KeyResult, TreeError, TreeResult, TreeResultExt};
pub use iteration::{ItemIterator, KeyIterator, RangeIterator, ValueIterator};
pub use red_black::{RbCursor, NIL};
pub use traversal::{BinaryCursor, Traverse};
pub use types::{
    AvlNode, AvlTree, BPlusTreeMap, BPlusTreeSet, BTree, BTreeNode, BranchNode, Color, LeafNode,
    NodeRef, RbNode, RedBlackTree, SearchTree, TraversalOrder, TwoThreeFourTree,
    DEFAULT_MIN_DEGREE, MIN_DEGREE,
};
