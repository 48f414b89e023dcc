use core::{mem, ops::Not};

/// A handle to a node stored in an [`AvlTree`](crate::AvlTree).
///
/// Handles are only meaningful for the tree that produced them. A handle stays valid until the
/// node it names is physically removed from the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> NodeId {
        NodeId(u32::try_from(index).expect("node arena exceeds u32::MAX slots"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// A vertex of an [`AvlTree`](crate::AvlTree).
///
/// A node owns its item and records its position in the tree: the cached height of the subtree
/// rooted here, its children, and a back-link to its parent. Only the tree rewires nodes; from the
/// outside a node is read-only.
#[derive(Clone, Debug)]
pub struct Node<T> {
    item: T,
    parent: Link,
    children: [Link; 2],
    height: i32,
}

impl<T> Node<T> {
    /// Returns a new detached node holding `item`.
    ///
    /// A detached node is a leaf of height 0 with no parent.
    pub const fn new(item: T) -> Node<T> {
        Node {
            item,
            parent: None,
            children: [None; 2],
            height: 0,
        }
    }

    /// Returns a reference to the node's item.
    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Consumes the node, returning its item.
    #[inline]
    pub fn into_item(self) -> T {
        self.item
    }

    /// Returns the height of the subtree rooted at this node. Leaves have height 0.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        self.child(Dir::Left)
    }

    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.child(Dir::Right)
    }

    #[inline]
    pub fn has_left(&self) -> bool {
        self.left().is_some()
    }

    #[inline]
    pub fn has_right(&self) -> bool {
        self.right().is_some()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.has_left() && !self.has_right()
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn set_item(&mut self, item: T) -> T {
        mem::replace(&mut self.item, item)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    // Only updates this node's slot. Keeping the child's parent link in sync is the tree's job.
    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    // Clears all links, leaving a detached leaf.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.children = [None; 2];
        self.height = 0;
    }
}
