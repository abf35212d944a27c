use core::fmt;

use alloc::vec::Vec;

use crate::{RedBlackTree, node::NodeIndex};

/// A broken red-black or ordering invariant found by
/// [`RedBlackTree::check_invariants`].
///
/// Nodes are identified by their position in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    RedSentinel,
    RedRoot,
    RootHasParent,
    /// A key is smaller than the one preceding it in order.
    OutOfOrder { position: usize },
    /// A red node has a red child.
    RedChildOfRed { position: usize },
    /// The two subtrees of a node disagree on their black height.
    BlackHeightMismatch {
        position: usize,
        left: usize,
        right: usize,
    },
    /// A child's parent link does not point back at the node.
    BrokenParentLink { position: usize },
    LengthMismatch { expected: usize, found: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedSentinel => f.write_str("sentinel is red"),
            Self::RedRoot => f.write_str("root is red"),
            Self::RootHasParent => f.write_str("root has a parent"),
            Self::OutOfOrder { position } => {
                write!(f, "key at position {position} is smaller than its predecessor")
            }
            Self::RedChildOfRed { position } => {
                write!(f, "red node at position {position} has a red child")
            }
            Self::BlackHeightMismatch {
                position,
                left,
                right,
            } => write!(
                f,
                "node at position {position} has black height {left} on the left and {right} on the right"
            ),
            Self::BrokenParentLink { position } => {
                write!(f, "a child of the node at position {position} does not link back to it")
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "tree reports {expected} keys but {found} are reachable")
            }
        }
    }
}

impl core::error::Error for InvariantViolation {}

struct Checker<'a, K: Ord> {
    tree: &'a RedBlackTree<K>,
    visited: usize,
    previous: Option<&'a K>,
}

impl<'a, K: Ord> Checker<'a, K> {
    /// Returns the number of black nodes on every path from `idx` down to the
    /// sentinel, `idx` included.
    fn visit(&mut self, idx: NodeIndex) -> Result<usize, InvariantViolation> {
        if idx == RedBlackTree::<K>::BLACK_NIL {
            return Ok(0);
        }

        let tree = self.tree;
        let node = tree.get_node_by_idx(idx);

        let left_bh = self.visit(node.left)?;

        let position = self.visited;
        for child in [node.left, node.right] {
            if child != RedBlackTree::<K>::BLACK_NIL
                && tree.get_node_by_idx(child).parent != idx
            {
                return Err(InvariantViolation::BrokenParentLink { position });
            }
        }

        if node.color.is_red()
            && (tree.get_node_by_idx(node.left).color.is_red()
                || tree.get_node_by_idx(node.right).color.is_red())
        {
            return Err(InvariantViolation::RedChildOfRed { position });
        }

        let key = node.key();
        if self.previous.is_some_and(|previous| key < previous) {
            return Err(InvariantViolation::OutOfOrder { position });
        }
        self.previous = Some(key);
        self.visited += 1;

        let right_bh = self.visit(node.right)?;
        if left_bh != right_bh {
            return Err(InvariantViolation::BlackHeightMismatch {
                position,
                left: left_bh,
                right: right_bh,
            });
        }

        Ok(left_bh + usize::from(node.color.is_black()))
    }
}

impl<K: Ord> RedBlackTree<K> {
    /// Walks the whole tree and checks ordering, coloring, black heights and
    /// link consistency. Returns the black height of the root on success.
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        if self.get_node_by_idx(Self::BLACK_NIL).color.is_red() {
            return Err(InvariantViolation::RedSentinel);
        }

        let root = self.root_idx();
        if root != Self::BLACK_NIL {
            let root_node = self.get_node_by_idx(root);
            if root_node.color.is_red() {
                return Err(InvariantViolation::RedRoot);
            }
            if root_node.parent != Self::BLACK_NIL {
                return Err(InvariantViolation::RootHasParent);
            }
        }

        let mut checker = Checker {
            tree: self,
            visited: 0,
            previous: None,
        };
        let black_height = checker.visit(root)?;

        if checker.visited != self.len() {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.len(),
                found: checker.visited,
            });
        }

        Ok(black_height)
    }

    /// Number of black nodes on any path from the root down to the sentinel.
    #[must_use]
    pub fn black_height(&self) -> usize {
        let mut current_node = self.root_idx();
        let mut black_height = 0;

        while current_node != Self::BLACK_NIL {
            let node = self.get_node_by_idx(current_node);
            black_height += usize::from(node.color.is_black());
            current_node = node.left_child();
        }

        black_height
    }

    /// Number of nodes on the longest path from the root down to a leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut stack: Vec<(NodeIndex, usize)> = Vec::new();
        let mut height = 0;

        if self.root_idx() != Self::BLACK_NIL {
            stack.push((self.root_idx(), 1));
        }

        while let Some((idx, depth)) = stack.pop() {
            height = height.max(depth);

            let node = self.get_node_by_idx(idx);
            for child in [node.left, node.right] {
                if child != Self::BLACK_NIL {
                    stack.push((child, depth + 1));
                }
            }
        }

        height
    }
}
