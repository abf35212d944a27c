use core::fmt;

/// Position of a node inside the tree's storage.
///
/// Slot `0` is reserved for the black sentinel, every other slot holds a real
/// node or sits in the free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIndex(pub(crate) usize);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeColor {
    #[default]
    Red,
    Black,
}

impl NodeColor {
    #[must_use]
    pub fn is_red(self) -> bool {
        matches!(self, NodeColor::Red)
    }

    #[must_use]
    pub fn is_black(self) -> bool {
        matches!(self, NodeColor::Black)
    }
}

impl fmt::Display for NodeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeColor::Red => f.write_str("Red"),
            NodeColor::Black => f.write_str("Black"),
        }
    }
}

/// Which child link of a node is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RedBlackNode<K> {
    pub(crate) key: Option<K>,
    pub(crate) color: NodeColor,
    pub(crate) parent: NodeIndex,
    pub(crate) left: NodeIndex,
    pub(crate) right: NodeIndex,
}

impl<K> RedBlackNode<K> {
    pub(crate) fn new_isolated(key: K) -> Self {
        Self {
            key: Some(key),
            color: NodeColor::default(),
            parent: NodeIndex(0),
            left: NodeIndex(0),
            right: NodeIndex(0),
        }
    }

    pub(crate) fn sentinel() -> Self {
        Self {
            key: None,
            color: NodeColor::Black,
            parent: NodeIndex(0),
            left: NodeIndex(0),
            right: NodeIndex(0),
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> NodeIndex {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, side: Side) -> &mut NodeIndex {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    #[inline]
    pub(crate) fn left_child(&self) -> NodeIndex {
        self.left
    }

    #[inline]
    pub(crate) fn right_child(&self) -> NodeIndex {
        self.right
    }

    pub(crate) fn key(&self) -> &K {
        self.key
            .as_ref()
            .expect("`RedBlackNode::key()` - read through the sentinel or a freed slot")
    }
}

/// Read-only handle to a node of a [`RedBlackTree`](crate::RedBlackTree).
///
/// Returned by [`search`](crate::RedBlackTree::search) and
/// [`root`](crate::RedBlackTree::root). Links that lead to the sentinel come
/// back as `None`.
pub struct NodeRef<'a, K: Ord> {
    pub(crate) tree: &'a crate::RedBlackTree<K>,
    pub(crate) idx: NodeIndex,
}

impl<'a, K: Ord> NodeRef<'a, K> {
    fn node(&self) -> &'a RedBlackNode<K> {
        self.tree.get_node_by_idx(self.idx)
    }

    fn link(&self, idx: NodeIndex) -> Option<NodeRef<'a, K>> {
        self.tree.node_ref(idx)
    }

    #[must_use]
    pub fn key(&self) -> &'a K {
        self.node().key()
    }

    #[must_use]
    pub fn color(&self) -> NodeColor {
        self.node().color
    }

    #[must_use]
    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.node().left)
    }

    #[must_use]
    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.node().right)
    }

    /// `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.node().parent)
    }
}

impl<K: Ord> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Ord> Copy for NodeRef<'_, K> {}

/// Handles compare by key and color, wherever the nodes sit.
impl<K: Ord> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.color() == other.color()
    }
}

impl<K: Ord> Eq for NodeRef<'_, K> {}

impl<K: Ord + fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("color", &self.color())
            .finish()
    }
}

impl<K: Ord + fmt::Display> fmt::Display for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedBlackNode(key={}, color={})", self.key(), self.color())
    }
}
