//! Depth-first traversal shared by the binary trees.
//!
//! A tree exposes its nodes through [`BinaryCursor`], a cheap copyable handle
//! that can report its key and children. [`Traverse`] walks any cursor with an
//! explicit stack, so traversal is lazy and never recurses. Cloning a
//! `Traverse` forks it; [`Traverse::restart`] rewinds it to the root.

use std::marker::PhantomData;

use crate::types::TraversalOrder;

/// Read-only handle onto a node of a binary tree.
pub trait BinaryCursor<'a>: Copy {
    type Key: 'a;

    fn key(self) -> &'a Self::Key;
    fn left(self) -> Option<Self>;
    fn right(self) -> Option<Self>;
}

/// Lazy pre-, in- or post-order walk over a binary tree.
#[derive(Debug, Clone)]
pub struct Traverse<'a, C> {
    order: TraversalOrder,
    root: Option<C>,
    // The flag marks a post-order frame whose children are already queued.
    stack: Vec<(C, bool)>,
    _marker: PhantomData<&'a ()>,
}

impl<'a, C: BinaryCursor<'a>> Traverse<'a, C> {
    pub fn new(root: Option<C>, order: TraversalOrder) -> Self {
        let mut traverse = Self {
            order,
            root,
            stack: Vec::new(),
            _marker: PhantomData,
        };
        traverse.restart();
        traverse
    }

    /// Rewind to the beginning of the walk.
    pub fn restart(&mut self) {
        self.stack.clear();
        match (self.order, self.root) {
            (_, None) => {}
            (TraversalOrder::InOrder, Some(root)) => self.push_left_spine(Some(root)),
            (_, Some(root)) => self.stack.push((root, false)),
        }
    }

    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    fn push_left_spine(&mut self, mut node: Option<C>) {
        while let Some(current) = node {
            self.stack.push((current, false));
            node = current.left();
        }
    }
}

impl<'a, C: BinaryCursor<'a>> Iterator for Traverse<'a, C> {
    type Item = &'a C::Key;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            TraversalOrder::PreOrder => {
                let (node, _) = self.stack.pop()?;
                if let Some(right) = node.right() {
                    self.stack.push((right, false));
                }
                if let Some(left) = node.left() {
                    self.stack.push((left, false));
                }
                Some(node.key())
            }
            TraversalOrder::InOrder => {
                let (node, _) = self.stack.pop()?;
                self.push_left_spine(node.right());
                Some(node.key())
            }
            TraversalOrder::PostOrder => loop {
                let (node, expanded) = self.stack.pop()?;
                if expanded {
                    return Some(node.key());
                }
                self.stack.push((node, true));
                if let Some(right) = node.right() {
                    self.stack.push((right, false));
                }
                if let Some(left) = node.left() {
                    self.stack.push((left, false));
                }
            },
        }
    }
}

impl<'a, C: BinaryCursor<'a>> std::iter::FusedIterator for Traverse<'a, C> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal boxed tree for exercising the walker on its own.
    struct Node {
        key: i32,
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    }

    impl<'a> BinaryCursor<'a> for &'a Node {
        type Key = i32;

        fn key(self) -> &'a i32 {
            &self.key
        }

        fn left(self) -> Option<Self> {
            self.left.as_deref()
        }

        fn right(self) -> Option<Self> {
            self.right.as_deref()
        }
    }

    fn leaf(key: i32) -> Option<Box<Node>> {
        Some(Box::new(Node {
            key,
            left: None,
            right: None,
        }))
    }

    //        4
    //      /   \
    //     2     6
    //    / \     \
    //   1   3     7
    fn sample() -> Node {
        Node {
            key: 4,
            left: Some(Box::new(Node {
                key: 2,
                left: leaf(1),
                right: leaf(3),
            })),
            right: Some(Box::new(Node {
                key: 6,
                left: None,
                right: leaf(7),
            })),
        }
    }

    fn walk(root: &Node, order: TraversalOrder) -> Vec<i32> {
        Traverse::new(Some(root), order).copied().collect()
    }

    #[test]
    fn test_orders() {
        let root = sample();
        assert_eq!(walk(&root, TraversalOrder::PreOrder), [4, 2, 1, 3, 6, 7]);
        assert_eq!(walk(&root, TraversalOrder::InOrder), [1, 2, 3, 4, 6, 7]);
        assert_eq!(walk(&root, TraversalOrder::PostOrder), [1, 3, 2, 7, 6, 4]);
    }

    #[test]
    fn test_empty_tree() {
        let mut walk: Traverse<'_, &Node> = Traverse::new(None, TraversalOrder::InOrder);
        assert_eq!(walk.next(), None);
        assert_eq!(walk.next(), None);
    }

    #[test]
    fn test_restart_and_fork() {
        let root = sample();
        let mut walk = Traverse::new(Some(&root), TraversalOrder::InOrder);
        assert_eq!(walk.next(), Some(&1));
        assert_eq!(walk.next(), Some(&2));

        let fork = walk.clone();
        assert_eq!(fork.copied().collect::<Vec<_>>(), [3, 4, 6, 7]);

        walk.restart();
        assert_eq!(walk.copied().collect::<Vec<_>>(), [1, 2, 3, 4, 6, 7]);
    }
}
