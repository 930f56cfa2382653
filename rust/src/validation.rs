//! Invariant checking for every tree variant.
//!
//! These walks are exhaustive and meant for tests and debugging. Each returns
//! the first violation found as [`TreeError::InvariantViolation`].

use crate::arena::{NodeId, NULL_NODE};
use crate::error::{TreeError, TreeResult, TreeResultExt};
use crate::red_black::NIL;
use crate::types::{
    AvlNode, AvlTree, BPlusTreeMap, BTree, BTreeNode, Color, NodeRef, RedBlackTree,
};

/// Fails unless `lo <= key <= hi` (or `<` where `strict`).
fn check_bounds<K: Ord>(key: &K, lo: Option<&K>, hi: Option<&K>, strict: bool) -> bool {
    let above = lo.map_or(true, |lo| if strict { key > lo } else { key >= lo });
    let below = hi.map_or(true, |hi| if strict { key < hi } else { key <= hi });
    above && below
}

// ============================================================================
// AVL TREE
// ============================================================================

impl<K: Ord> AvlTree<K> {
    /// Check ordering, the cached heights and the balance factor of every node.
    pub fn validate(&self) -> TreeResult<()> {
        let (_, count) = check_avl_node(self.root.as_deref(), None, None).with_context("AVL")?;
        if count != self.len {
            return Err(TreeError::invariant(
                "AVL",
                &format!("{} nodes reachable but len is {}", count, self.len),
            ));
        }
        Ok(())
    }
}

/// Returns (height, node count) of the subtree.
fn check_avl_node<K: Ord>(
    node: Option<&AvlNode<K>>,
    lo: Option<&K>,
    hi: Option<&K>,
) -> TreeResult<(usize, usize)> {
    let Some(node) = node else {
        return Ok((0, 0));
    };

    if !check_bounds(&node.key, lo, hi, false) {
        return Err(TreeError::invariant("ordering", "key outside its subtree range"));
    }

    let (left_height, left_count) = check_avl_node(node.left.as_deref(), lo, Some(&node.key))?;
    let (right_height, right_count) =
        check_avl_node(node.right.as_deref(), Some(&node.key), hi)?;

    let height = 1 + left_height.max(right_height);
    if node.height != height {
        return Err(TreeError::invariant(
            "height cache",
            &format!("cached {} but computed {}", node.height, height),
        ));
    }
    if left_height.abs_diff(right_height) > 1 {
        return Err(TreeError::invariant(
            "balance",
            &format!("subtree heights {} and {}", left_height, right_height),
        ));
    }

    Ok((height, left_count + right_count + 1))
}

// ============================================================================
// RED-BLACK TREE
// ============================================================================

impl<K: Ord> RedBlackTree<K> {
    /// Check ordering, parent links and both colour rules.
    pub fn validate(&self) -> TreeResult<()> {
        self.check_red_black().with_context("red-black")
    }

    fn check_red_black(&self) -> TreeResult<()> {
        if self.color_of(NIL) != Color::Black {
            return Err(TreeError::invariant("sentinel", "sentinel is not black"));
        }
        if self.color_of(self.root) != Color::Black {
            return Err(TreeError::invariant("root", "root is not black"));
        }
        if self.root != NIL && self.parent_of(self.root) != NIL {
            return Err(TreeError::invariant("root", "root has a parent"));
        }

        let count = self.check_rb_node(self.root, None, None)?;
        if count != self.len {
            return Err(TreeError::invariant(
                "size",
                &format!("{} nodes reachable but len is {}", count, self.len),
            ));
        }
        // Every live slot apart from the sentinel must be reachable.
        if self.nodes.len() != self.len + 1 {
            return Err(TreeError::invariant(
                "arena",
                &format!("{} live slots for {} keys", self.nodes.len(), self.len),
            ));
        }

        if self.black_height().is_none() {
            return Err(TreeError::invariant(
                "colour",
                "red node with red child or unequal black heights",
            ));
        }
        Ok(())
    }

    fn check_rb_node(&self, id: NodeId, lo: Option<&K>, hi: Option<&K>) -> TreeResult<usize> {
        if id == NIL {
            return Ok(0);
        }
        let key = self.key_of(id);
        if !check_bounds(key, lo, hi, false) {
            return Err(TreeError::invariant(
                "ordering",
                &format!("node {} outside its subtree range", id),
            ));
        }

        let mut count = 1;
        for (child, lo, hi) in [
            (self.left_of(id), lo, Some(key)),
            (self.right_of(id), Some(key), hi),
        ] {
            if child != NIL && self.parent_of(child) != id {
                return Err(TreeError::invariant(
                    "parent link",
                    &format!("node {} does not point back to {}", child, id),
                ));
            }
            count += self.check_rb_node(child, lo, hi)?;
        }
        Ok(count)
    }
}

// ============================================================================
// B-TREE
// ============================================================================

impl<K: Ord> BTree<K> {
    /// Check key order, node occupancy and that all leaves share one depth.
    pub fn validate(&self) -> TreeResult<()> {
        let mut leaf_depth = None;
        let count = self
            .check_btree_node(&self.root, None, None, 0, &mut leaf_depth)
            .with_context("B-tree")?;
        if count != self.len {
            return Err(TreeError::invariant(
                "B-tree",
                &format!("{} keys reachable but len is {}", count, self.len),
            ));
        }
        Ok(())
    }

    fn check_btree_node(
        &self,
        node: &BTreeNode<K>,
        lo: Option<&K>,
        hi: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> TreeResult<usize> {
        let t = self.min_degree;
        let is_root = depth == 0;
        let keys = node.keys.len();

        if keys > 2 * t - 1 {
            return Err(TreeError::invariant(
                "occupancy",
                &format!("node at depth {} holds {} keys", depth, keys),
            ));
        }
        if !is_root && keys < t - 1 {
            return Err(TreeError::invariant(
                "occupancy",
                &format!("node at depth {} holds only {} keys", depth, keys),
            ));
        }
        if node.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TreeError::invariant("ordering", "keys not strictly ascending"));
        }
        if node.keys.iter().any(|key| !check_bounds(key, lo, hi, true)) {
            return Err(TreeError::invariant("ordering", "key outside its subtree range"));
        }

        if node.leaf {
            if !node.children.is_empty() {
                return Err(TreeError::invariant("shape", "leaf has children"));
            }
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(TreeError::invariant(
                        "shape",
                        &format!("leaves at depths {} and {}", expected, depth),
                    ));
                }
                Some(_) => {}
            }
            return Ok(keys);
        }

        if node.children.len() != keys + 1 {
            return Err(TreeError::invariant(
                "shape",
                &format!("{} keys but {} children", keys, node.children.len()),
            ));
        }

        let mut count = keys;
        for (i, child) in node.children.iter().enumerate() {
            let child_lo = if i == 0 { lo } else { Some(&node.keys[i - 1]) };
            let child_hi = if i == keys { hi } else { Some(&node.keys[i]) };
            count += self.check_btree_node(child, child_lo, child_hi, depth + 1, leaf_depth)?;
        }
        Ok(count)
    }
}

// ============================================================================
// B+ TREE
// ============================================================================

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Check node invariants, the leaf chain and arena consistency.
    pub fn validate(&self) -> TreeResult<()> {
        let mut leaf_ids = Vec::new();
        let mut leaf_depth = None;
        self.check_node(&self.root, None, None, 0, &mut leaf_depth, &mut leaf_ids)
            .with_context("B+ tree")?;
        self.check_leaf_chain(&leaf_ids).with_context("B+ tree")?;
        self.check_arena_tree_consistency(leaf_ids.len())
            .with_context("B+ tree")
    }

    fn check_node(
        &self,
        node: &NodeRef<K, V>,
        lo: Option<&K>,
        hi: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        leaf_ids: &mut Vec<NodeId>,
    ) -> TreeResult<()> {
        let is_root = depth == 0;
        let capacity = self.capacity();

        match *node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.get_leaf(id).ok_or_else(|| {
                    TreeError::invariant("arena", &format!("missing leaf {}", id))
                })?;

                if leaf.keys.len() != leaf.values.len() {
                    return Err(TreeError::invariant(
                        "leaf",
                        &format!("leaf {} has {} keys and {} values", id, leaf.keys.len(), leaf.values.len()),
                    ));
                }
                if leaf.keys.len() > capacity || (!is_root && leaf.is_underfull()) {
                    return Err(TreeError::invariant(
                        "occupancy",
                        &format!("leaf {} holds {} keys", id, leaf.keys.len()),
                    ));
                }
                if leaf.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return Err(TreeError::invariant(
                        "ordering",
                        &format!("leaf {} keys not strictly ascending", id),
                    ));
                }
                // Separators bound their right subtree inclusively.
                let in_range = leaf.keys.iter().all(|key| {
                    lo.map_or(true, |lo| key >= lo) && hi.map_or(true, |hi| key < hi)
                });
                if !in_range {
                    return Err(TreeError::invariant(
                        "ordering",
                        &format!("leaf {} has a key outside its separators", id),
                    ));
                }

                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(TreeError::invariant(
                            "shape",
                            &format!("leaves at depths {} and {}", expected, depth),
                        ));
                    }
                    Some(_) => {}
                }
                leaf_ids.push(id);
                Ok(())
            }
            NodeRef::Branch(id, _) => {
                let branch = self.get_branch(id).ok_or_else(|| {
                    TreeError::invariant("arena", &format!("missing branch {}", id))
                })?;
                let keys = branch.keys.len();

                if branch.children.len() != keys + 1 {
                    return Err(TreeError::invariant(
                        "shape",
                        &format!("branch {} has {} keys and {} children", id, keys, branch.children.len()),
                    ));
                }
                let too_few = if is_root { keys == 0 } else { branch.is_underfull() };
                if keys > capacity || too_few {
                    return Err(TreeError::invariant(
                        "occupancy",
                        &format!("branch {} holds {} keys", id, keys),
                    ));
                }
                if branch.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return Err(TreeError::invariant(
                        "ordering",
                        &format!("branch {} separators not strictly ascending", id),
                    ));
                }
                let in_range = branch.keys.iter().all(|key| {
                    lo.map_or(true, |lo| key >= lo) && hi.map_or(true, |hi| key < hi)
                });
                if !in_range {
                    return Err(TreeError::invariant(
                        "ordering",
                        &format!("branch {} has a separator outside its range", id),
                    ));
                }
                let first_is_leaf = branch.children[0].is_leaf();
                if branch.children.iter().any(|child| child.is_leaf() != first_is_leaf) {
                    return Err(TreeError::invariant(
                        "shape",
                        &format!("branch {} mixes leaf and branch children", id),
                    ));
                }

                for (i, child) in branch.children.iter().enumerate() {
                    let child_lo = if i == 0 { lo } else { Some(&branch.keys[i - 1]) };
                    let child_hi = if i == keys { hi } else { Some(&branch.keys[i]) };
                    self.check_node(child, child_lo, child_hi, depth + 1, leaf_depth, leaf_ids)?;
                }
                Ok(())
            }
        }
    }

    /// The chain must visit exactly the leaves of the tree, left to right.
    fn check_leaf_chain(&self, tree_order: &[NodeId]) -> TreeResult<()> {
        let mut chain = Vec::with_capacity(tree_order.len());
        let mut current = self.first_leaf_id();
        while let Some(id) = current {
            if chain.len() > tree_order.len() {
                return Err(TreeError::invariant("leaf chain", "chain is longer than the tree"));
            }
            chain.push(id);
            let leaf = self.get_leaf(id).ok_or_else(|| {
                TreeError::invariant("leaf chain", &format!("link to freed leaf {}", id))
            })?;
            current = leaf.next_leaf();
        }

        if chain != tree_order {
            return Err(TreeError::invariant(
                "leaf chain",
                &format!("tree has {:?}, chain has {:?}", tree_order, chain),
            ));
        }
        let last_next = tree_order
            .last()
            .and_then(|&id| self.get_leaf(id))
            .map_or(NULL_NODE, |leaf| leaf.next);
        if last_next != NULL_NODE {
            return Err(TreeError::invariant("leaf chain", "last leaf has a successor"));
        }
        Ok(())
    }

    /// Every allocated node must be reachable from the root.
    fn check_arena_tree_consistency(&self, reachable_leaves: usize) -> TreeResult<()> {
        let (_, reachable_branches) = self.count_nodes_in_tree();
        if reachable_leaves != self.leaf_arena.len() {
            return Err(TreeError::invariant(
                "arena",
                &format!("{} leaves in tree vs {} in arena", reachable_leaves, self.leaf_arena.len()),
            ));
        }
        if reachable_branches != self.branch_arena.len() {
            return Err(TreeError::invariant(
                "arena",
                &format!(
                    "{} branches in tree vs {} in arena",
                    reachable_branches,
                    self.branch_arena.len()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeafNode;

    #[test]
    fn test_valid_trees_pass() {
        let avl: AvlTree<i32> = (0..100).collect();
        avl.validate().unwrap();

        let rb: RedBlackTree<i32> = (0..100).collect();
        rb.validate().unwrap();

        let mut btree = BTree::new(3).unwrap();
        btree.extend(0..100);
        btree.validate().unwrap();

        let bplus: BPlusTreeMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
        bplus.validate().unwrap();
    }

    #[test]
    fn test_avl_detects_stale_height() {
        let mut avl: AvlTree<i32> = (0..7).collect();
        if let Some(root) = avl.root.as_mut() {
            root.height += 1;
        }
        let err = avl.validate().unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(err.to_string().contains("AVL: height cache"));
    }

    #[test]
    fn test_red_black_detects_red_root() {
        let mut rb: RedBlackTree<i32> = (0..7).collect();
        let root = rb.root;
        rb.nodes[root].color = Color::Red;
        assert!(rb.validate().is_err());
    }

    #[test]
    fn test_red_black_detects_broken_parent_link() {
        let mut rb: RedBlackTree<i32> = (0..7).collect();
        let left = rb.left_of(rb.root);
        rb.nodes[left].parent = left;
        let err = rb.validate().unwrap_err();
        assert!(err.to_string().contains("parent link"));
    }

    #[test]
    fn test_btree_detects_unsorted_keys() {
        let mut btree = BTree::new(2).unwrap();
        btree.extend([1, 2, 3]);
        btree.root.keys.swap(0, 2);
        assert!(btree.validate().is_err());
    }

    #[test]
    fn test_bplus_detects_broken_chain() {
        let mut bplus: BPlusTreeMap<i32, ()> = BPlusTreeMap::new(2).unwrap();
        for key in 0..10 {
            bplus.insert(key, ());
        }
        let first = bplus.first_leaf_id().unwrap();
        bplus.leaf_arena[first].next = NULL_NODE;
        let err = bplus.validate().unwrap_err();
        assert!(err.to_string().contains("leaf chain"));
    }

    #[test]
    fn test_bplus_detects_orphan_leaf() {
        let mut bplus: BPlusTreeMap<i32, ()> = BPlusTreeMap::new(2).unwrap();
        bplus.insert(1, ());
        bplus.leaf_arena.allocate(LeafNode::new(3));
        let err = bplus.validate().unwrap_err();
        assert!(err.to_string().contains("arena"));
    }
}
