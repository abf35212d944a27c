use core::iter::FusedIterator;

use alloc::vec::{self, Vec};

use crate::{RedBlackTree, node::NodeIndex};

/// Ascending iterator over the keys of a [`RedBlackTree`].
///
/// Walks the tree with an explicit stack of nodes whose left subtree is being
/// visited, so it never recurses.
pub struct Iter<'a, K: Ord> {
    pub(crate) tree: &'a RedBlackTree<K>,
    pub(crate) curr: NodeIndex,
    pub(crate) stack: Vec<NodeIndex>,
    pub(crate) remaining: usize,
}

impl<'a, K: Ord> Iter<'a, K> {
    pub(crate) fn new(tree: &'a RedBlackTree<K>) -> Self {
        Self {
            tree,
            curr: tree.root_idx(),
            stack: Vec::new(),
            remaining: tree.len(),
        }
    }
}

impl<'a, K: Ord> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr != RedBlackTree::<K>::BLACK_NIL {
            self.stack.push(self.curr);
            self.curr = self.tree.get_node_by_idx(self.curr).left_child();
        }

        if let Some(node) = self.stack.pop() {
            self.curr = self.tree.get_node_by_idx(node).right_child();
            self.remaining -= 1;

            return Some(self.tree.get_node_by_idx(node).key());
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord> ExactSizeIterator for Iter<'_, K> {}

impl<K: Ord> FusedIterator for Iter<'_, K> {}

impl<K: Ord> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            curr: self.curr,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Owning ascending iterator, produced by `RedBlackTree::into_iter`.
pub struct IntoIter<K> {
    keys: vec::IntoIter<K>,
}

impl<K: Ord> IntoIter<K> {
    pub(crate) fn new(mut tree: RedBlackTree<K>) -> Self {
        let order: Vec<NodeIndex> = {
            let mut order = Vec::with_capacity(tree.len());
            let mut stack = Vec::new();
            let mut curr = tree.root_idx();

            loop {
                while curr != RedBlackTree::<K>::BLACK_NIL {
                    stack.push(curr);
                    curr = tree.get_node_by_idx(curr).left_child();
                }

                let Some(node) = stack.pop() else {
                    break;
                };
                order.push(node);
                curr = tree.get_node_by_idx(node).right_child();
            }

            order
        };

        let keys = order
            .into_iter()
            .filter_map(|idx| tree.get_node_by_idx_mut(idx).key.take())
            .collect::<Vec<_>>();

        Self {
            keys: keys.into_iter(),
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.keys.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.keys.next_back()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}
