//! Tree structure management operations for BPlusTreeMap.
//!
//! Size queries, clearing, node counting and navigation to the ends of the
//! leaf chain.

use std::fmt::{self, Write as _};

use crate::arena::{ArenaStats, NodeId};
use crate::types::{BPlusTreeMap, LeafNode, NodeRef};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K, V> BPlusTreeMap<K, V> {
    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len_recursive(&self.root)
    }

    fn len_recursive(&self, node: &NodeRef<K, V>) -> usize {
        match node {
            NodeRef::Leaf(id, _) => self.get_leaf(*id).map_or(0, |leaf| leaf.len()),
            NodeRef::Branch(id, _) => self.get_branch(*id).map_or(0, |branch| {
                branch
                    .children
                    .iter()
                    .map(|child| self.len_recursive(child))
                    .sum()
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        self.root.is_leaf()
    }

    /// Number of levels; a lone root leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.root;
        while let NodeRef::Branch(id, _) = current {
            match self.get_branch(id).and_then(|branch| branch.children.first()) {
                Some(&child) => current = child,
                None => break,
            }
            depth += 1;
        }
        depth
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.count_nodes_in_tree().0
    }

    /// Count the leaf and branch nodes reachable from the root.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        self.count_nodes_recursive(&self.root)
    }

    fn count_nodes_recursive(&self, node: &NodeRef<K, V>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0),
            NodeRef::Branch(id, _) => {
                let Some(branch) = self.get_branch(*id) else {
                    return (0, 0);
                };
                branch
                    .children
                    .iter()
                    .map(|child| self.count_nodes_recursive(child))
                    .fold((0, 1), |(leaves, branches), (l, b)| (leaves + l, branches + b))
            }
        }
    }

    pub fn leaf_arena_stats(&self) -> ArenaStats {
        self.leaf_arena.stats()
    }

    pub fn branch_arena_stats(&self) -> ArenaStats {
        self.branch_arena.stats()
    }

    /// Clear all items from the tree.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.branch_arena.clear();

        let root_id = self.leaf_arena.allocate(LeafNode::new(self.capacity()));
        self.root = NodeRef::leaf(root_id);
    }

    // ============================================================================
    // TREE NAVIGATION HELPERS
    // ============================================================================

    /// Get the ID of the first (leftmost) leaf in the tree.
    pub fn first_leaf_id(&self) -> Option<NodeId> {
        self.edge_leaf_id(|children| children.first())
    }

    /// Get the ID of the last (rightmost) leaf in the tree.
    pub fn last_leaf_id(&self) -> Option<NodeId> {
        self.edge_leaf_id(|children| children.last())
    }

    fn edge_leaf_id<F>(&self, pick: F) -> Option<NodeId>
    where
        F: Fn(&[NodeRef<K, V>]) -> Option<&NodeRef<K, V>>,
    {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Branch(id, _) => {
                    current = *pick(self.get_branch(id)?.children.as_slice())?;
                }
            }
        }
    }
}

// ============================================================================
// STRUCTURE DUMP
// ============================================================================

impl<K: fmt::Debug, V> BPlusTreeMap<K, V> {
    /// Render the node layout, one node per line, indented by depth.
    ///
    /// ```text
    /// Branch[8]
    ///   Leaf[2, 4, 6]
    ///   Leaf[8, 10]
    /// ```
    pub fn structure(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, &self.root, 0);
        out
    }

    fn write_node(&self, out: &mut String, node: &NodeRef<K, V>, depth: usize) {
        let indent = "  ".repeat(depth);
        match node {
            NodeRef::Leaf(id, _) => {
                if let Some(leaf) = self.get_leaf(*id) {
                    let _ = writeln!(out, "{}Leaf{:?}", indent, leaf.keys);
                }
            }
            NodeRef::Branch(id, _) => {
                if let Some(branch) = self.get_branch(*id) {
                    let _ = writeln!(out, "{}Branch{:?}", indent, branch.keys);
                    for child in &branch.children {
                        self.write_node(out, child, depth + 1);
                    }
                }
            }
        }
    }
}
