//! Red-black tree containers backed by a single node arena.
//!
//! [`RedBlackTree`] is an ordered multiset: keys are kept in ascending order,
//! equal keys are allowed, and insertion as well as removal rebalance the tree
//! so its height stays within `2 * log2(n + 1)`.
//!
//! ```
//! use redwood::RedBlackTree;
//!
//! let mut tree = RedBlackTree::new();
//! for key in [10, 20, 30, 15, 25, 5] {
//!     tree.insert(key);
//! }
//!
//! assert_eq!(tree.root().map(|root| *root.key()), Some(20));
//! assert!(tree.remove(&20));
//! assert!(!tree.remove(&99));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [5, 10, 15, 25, 30]);
//! ```
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod iter;
mod node;
mod validate;

use core::{cmp::Ordering, fmt};

use alloc::vec::Vec;
use log::{debug, trace};

pub use iter::{IntoIter, Iter};
pub use node::{NodeColor, NodeRef};
pub use validate::InvariantViolation;

use node::{NodeIndex, RedBlackNode, Side};

/*
Empty storage cells are kept in a linked list threaded through their `parent` link, with the head stored in the tree:
- a new cell is taken from the head, the new head is storage[head].parent
- a freed cell gets storage[cell].parent = head, and then head = cell

Slot 0 is the sentinel and is never part of that list, so `BLACK_NIL` doubles as the end-of-list marker.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertCase {
    /// Uncle is red: push the red up to the grandparent.
    RecolorUncle,
    /// Uncle is black and the node sits on the inner side of its grandparent.
    RotateInner,
    /// Uncle is black and the node sits on the outer side of its grandparent.
    RotateOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoveCase {
    /// Sibling is red: rotate it above the parent.
    RedSibling,
    /// Sibling and both its children are black: push the deficit up.
    BlackNephews,
    /// Only the sibling's child nearest the node is red: turn it outward.
    NearNephewRed,
    /// The sibling's far child is red: one rotation settles the deficit.
    FarNephewRed,
}

/// An ordered multiset kept balanced with the red-black discipline.
///
/// Nodes live in one `Vec`; links between them are indices into it, with
/// index `0` reserved for a black sentinel standing in for every missing
/// child and for the parent of the root.
#[derive(Clone)]
pub struct RedBlackTree<K: Ord> {
    storage: Vec<RedBlackNode<K>>,
    root: NodeIndex,
    free_head: NodeIndex,
    len: usize,
}

impl<K: Ord> RedBlackTree<K> {
    pub(crate) const BLACK_NIL: NodeIndex = NodeIndex(0);

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree able to hold `capacity` keys before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Vec::with_capacity(capacity.saturating_add(1));
        storage.push(RedBlackNode::sentinel());

        Self {
            storage,
            root: Self::BLACK_NIL,
            free_head: Self::BLACK_NIL,
            len: 0,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    /// Releases spare storage capacity. Slots freed by removals stay allocated
    /// and are reused by later insertions.
    pub fn shrink_to_fit(&mut self) {
        self.storage.shrink_to_fit();
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.capacity().saturating_sub(1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.storage.truncate(1);
        self.storage[Self::BLACK_NIL.0] = RedBlackNode::sentinel();
        self.root = Self::BLACK_NIL;
        self.free_head = Self::BLACK_NIL;
        self.len = 0;
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key) != Self::BLACK_NIL
    }

    /// Returns the stored key equal to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&K> {
        self.search(key).map(|node| node.key())
    }

    /// Looks `key` up and returns a handle to the first matching node met on
    /// the way down from the root.
    #[must_use]
    pub fn search(&self, key: &K) -> Option<NodeRef<'_, K>> {
        self.node_ref(self.find_node(key))
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.node_ref(self.root)
    }

    /// Smallest key in the tree.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        if self.root == Self::BLACK_NIL {
            return None;
        }

        Some(self.get_node_by_idx(self.extremum(self.root, Side::Left)).key())
    }

    /// Largest key in the tree.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        if self.root == Self::BLACK_NIL {
            return None;
        }

        Some(self.get_node_by_idx(self.extremum(self.root, Side::Right)).key())
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Inserts `key`. Equal keys are kept side by side, the newest one to the
    /// right of those already present on its search path.
    pub fn insert(&mut self, key: K) {
        let mut current_node = self.root;
        let mut parent_node = Self::BLACK_NIL;
        let mut side = Side::Left;

        while current_node != Self::BLACK_NIL {
            parent_node = current_node;
            let curr_node_storage = self.get_node_by_idx(current_node);

            side = if key < *curr_node_storage.key() {
                Side::Left
            } else {
                Side::Right
            };
            current_node = curr_node_storage.child(side);
        }

        let new_node_pos = self.allocate(key);
        self.get_node_by_idx_mut(new_node_pos).parent = parent_node;

        if parent_node == Self::BLACK_NIL {
            debug!("new root at {new_node_pos:?}");
            self.root = new_node_pos;
        } else {
            *self.get_node_by_idx_mut(parent_node).child_mut(side) = new_node_pos;
        }

        self.len += 1;
        self.fix_red_violation(new_node_pos);
    }

    /// Removes one key equal to `key`, returning whether one was found.
    ///
    /// When several equal keys are stored, the first one met while searching
    /// down from the root is removed.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes one key equal to `key` and returns it.
    pub fn take(&mut self, key: &K) -> Option<K> {
        let target = self.find_node(key);
        if target == Self::BLACK_NIL {
            return None;
        }

        let target_storage = self.get_node_by_idx(target);
        let spliced = if target_storage.left == Self::BLACK_NIL
            || target_storage.right == Self::BLACK_NIL
        {
            target
        } else {
            self.extremum(target_storage.right, Side::Left)
        };

        let spliced_storage = self.get_node_by_idx(spliced);
        let spliced_color = spliced_storage.color;
        let replacement = if spliced_storage.left != Self::BLACK_NIL {
            spliced_storage.left
        } else {
            spliced_storage.right
        };

        self.transplant(spliced, replacement);

        let spliced_key = self.release(spliced);
        let removed = if spliced == target {
            spliced_key
        } else {
            self.get_node_by_idx_mut(target)
                .key
                .replace(spliced_key)
                .expect("`RedBlackTree::take()` - target node lost its key")
        };
        self.len -= 1;

        if spliced_color.is_black() {
            self.fix_double_black(replacement);
        }

        // the splice may have pointed the sentinel at a real parent
        self.get_node_by_idx_mut(Self::BLACK_NIL).parent = Self::BLACK_NIL;

        Some(removed)
    }

    pub(crate) fn get_node_by_idx(&self, node_idx: NodeIndex) -> &RedBlackNode<K> {
        &self.storage[node_idx.0]
    }

    pub(crate) fn get_node_by_idx_mut(&mut self, node_idx: NodeIndex) -> &mut RedBlackNode<K> {
        &mut self.storage[node_idx.0]
    }

    pub(crate) fn node_ref(&self, idx: NodeIndex) -> Option<NodeRef<'_, K>> {
        (idx != Self::BLACK_NIL).then_some(NodeRef { tree: self, idx })
    }

    pub(crate) fn root_idx(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    fn color(&self, idx: NodeIndex) -> NodeColor {
        self.storage[idx.0].color
    }

    #[inline]
    fn set_color(&mut self, idx: NodeIndex, color: NodeColor) {
        self.storage[idx.0].color = color;
    }

    #[inline]
    fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.storage[idx.0].parent
    }

    #[inline]
    fn child(&self, idx: NodeIndex, side: Side) -> NodeIndex {
        self.storage[idx.0].child(side)
    }

    /// Which side of `parent` the link to `idx` hangs on.
    ///
    /// `idx` may be the sentinel right after a splice, in which case the
    /// empty side of `parent` is reported.
    fn side_in_parent(&self, parent: NodeIndex, idx: NodeIndex) -> Side {
        if self.child(parent, Side::Left) == idx {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn find_node(&self, key: &K) -> NodeIndex {
        let mut current_node = self.root;

        while current_node != Self::BLACK_NIL {
            let curr_node_storage = self.get_node_by_idx(current_node);

            match key.cmp(curr_node_storage.key()) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return current_node;
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                }
            }
        }

        Self::BLACK_NIL
    }

    /// Follows `side` links from `start` down to the last real node.
    fn extremum(&self, start: NodeIndex, side: Side) -> NodeIndex {
        let mut current_node = start;

        loop {
            let next = self.child(current_node, side);
            if next == Self::BLACK_NIL {
                return current_node;
            }
            current_node = next;
        }
    }

    fn allocate(&mut self, key: K) -> NodeIndex {
        if self.free_head == Self::BLACK_NIL {
            self.storage.push(RedBlackNode::new_isolated(key));
            return NodeIndex(self.storage.len() - 1);
        }

        let slot = self.free_head;
        self.free_head = self.parent(slot);
        debug!("reusing free slot {slot:?}");

        *self.get_node_by_idx_mut(slot) = RedBlackNode::new_isolated(key);
        slot
    }

    /// Moves the key out of `idx` and pushes the slot on the free list.
    fn release(&mut self, idx: NodeIndex) -> K {
        debug_assert!(idx != Self::BLACK_NIL, "attempted to release the sentinel");

        let free_head = self.free_head;
        let node = self.get_node_by_idx_mut(idx);
        let key = node
            .key
            .take()
            .expect("`RedBlackTree::release()` - slot is already free");

        node.color = NodeColor::Black;
        node.left = Self::BLACK_NIL;
        node.right = Self::BLACK_NIL;
        node.parent = free_head;
        self.free_head = idx;

        key
    }

    /// Puts `replacement` where `target` hangs under its parent.
    ///
    /// The parent link of `replacement` is written even when it is the
    /// sentinel: the double-black fix-up climbs from there.
    fn transplant(&mut self, target: NodeIndex, replacement: NodeIndex) {
        let parent_idx = self.parent(target);

        if parent_idx == Self::BLACK_NIL {
            debug!("root replaced by {replacement:?}");
            self.root = replacement;
        } else {
            let side = self.side_in_parent(parent_idx, target);
            *self.get_node_by_idx_mut(parent_idx).child_mut(side) = replacement;
        }

        self.get_node_by_idx_mut(replacement).parent = parent_idx;
    }

    /// Rotates the subtree at `center` so that `center` moves down to `side`
    /// and its child on the opposite side takes its place.
    fn rotate(&mut self, center: NodeIndex, side: Side) {
        let grandparent_idx = self.parent(center);
        let pivot_idx = self.child(center, side.opposite());
        debug_assert!(
            pivot_idx != Self::BLACK_NIL,
            "rotation of {center:?} towards {side:?} has no child to promote"
        );
        trace!("rotating {center:?} towards {side:?}");

        let c_idx = self.child(pivot_idx, side);

        *self.get_node_by_idx_mut(center).child_mut(side.opposite()) = c_idx;
        if c_idx != Self::BLACK_NIL {
            self.get_node_by_idx_mut(c_idx).parent = center;
        }

        *self.get_node_by_idx_mut(pivot_idx).child_mut(side) = center;
        self.get_node_by_idx_mut(center).parent = pivot_idx;
        self.get_node_by_idx_mut(pivot_idx).parent = grandparent_idx;

        if grandparent_idx != Self::BLACK_NIL {
            let center_side = self.side_in_parent(grandparent_idx, center);
            *self.get_node_by_idx_mut(grandparent_idx).child_mut(center_side) = pivot_idx;
        } else {
            debug!("rotation promoted {pivot_idx:?} to root");
            self.root = pivot_idx;
        }
    }

    fn fix_red_violation(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while self.color(self.parent(curr_node)).is_red() {
            let parent_idx = self.parent(curr_node);
            let grandparent_idx = self.parent(parent_idx);
            debug_assert!(
                grandparent_idx != Self::BLACK_NIL,
                "red node {parent_idx:?} is the root"
            );

            let parent_side = self.side_in_parent(grandparent_idx, parent_idx);
            let uncle = self.child(grandparent_idx, parent_side.opposite());

            let case = if self.color(uncle).is_red() {
                InsertCase::RecolorUncle
            } else if self.side_in_parent(parent_idx, curr_node) != parent_side {
                InsertCase::RotateInner
            } else {
                InsertCase::RotateOuter
            };
            trace!("insert fix-up at {curr_node:?}: {case:?}");

            match case {
                InsertCase::RecolorUncle => {
                    self.set_color(parent_idx, NodeColor::Black);
                    self.set_color(uncle, NodeColor::Black);
                    self.set_color(grandparent_idx, NodeColor::Red);

                    curr_node = grandparent_idx;
                }
                InsertCase::RotateInner => {
                    self.rotate(parent_idx, parent_side);

                    curr_node = parent_idx;
                }
                InsertCase::RotateOuter => {
                    self.set_color(parent_idx, NodeColor::Black);
                    self.set_color(grandparent_idx, NodeColor::Red);

                    self.rotate(grandparent_idx, parent_side.opposite());
                }
            }
        }

        self.set_color(self.root, NodeColor::Black);
    }

    fn fix_double_black(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while curr_node != self.root && self.color(curr_node).is_black() {
            let parent_idx = self.parent(curr_node);
            let side = self.side_in_parent(parent_idx, curr_node);
            let sibling = self.child(parent_idx, side.opposite());
            debug_assert!(
                sibling != Self::BLACK_NIL,
                "double-black node {curr_node:?} has no sibling"
            );

            let near_nephew = self.child(sibling, side);
            let far_nephew = self.child(sibling, side.opposite());

            let case = if self.color(sibling).is_red() {
                RemoveCase::RedSibling
            } else if self.color(far_nephew).is_red() {
                RemoveCase::FarNephewRed
            } else if self.color(near_nephew).is_red() {
                RemoveCase::NearNephewRed
            } else {
                RemoveCase::BlackNephews
            };
            trace!("remove fix-up at {curr_node:?}: {case:?}");

            match case {
                RemoveCase::RedSibling => {
                    self.set_color(sibling, NodeColor::Black);
                    self.set_color(parent_idx, NodeColor::Red);

                    self.rotate(parent_idx, side);
                }
                RemoveCase::BlackNephews => {
                    self.set_color(sibling, NodeColor::Red);

                    curr_node = parent_idx;
                }
                RemoveCase::NearNephewRed => {
                    self.set_color(near_nephew, NodeColor::Black);
                    self.set_color(sibling, NodeColor::Red);

                    self.rotate(sibling, side.opposite());
                }
                RemoveCase::FarNephewRed => {
                    self.set_color(sibling, self.color(parent_idx));
                    self.set_color(parent_idx, NodeColor::Black);
                    self.set_color(far_nephew, NodeColor::Black);

                    self.rotate(parent_idx, side);

                    curr_node = self.root;
                }
            }
        }

        self.set_color(curr_node, NodeColor::Black);
    }
}

impl<K: Ord> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for RedBlackTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord + fmt::Display> fmt::Display for RedBlackTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RedBlackTree([")?;
        for (i, key) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        f.write_str("])")
    }
}

/// Trees compare by their ascending key sequence; shape and colors are ignored.
impl<K: Ord> PartialEq for RedBlackTree<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Ord> Eq for RedBlackTree<K> {}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RedBlackTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Ord + Copy + 'a> Extend<&'a K> for RedBlackTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, K: Ord> IntoIterator for &'a RedBlackTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> IntoIterator for RedBlackTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
