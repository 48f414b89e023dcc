//! An AVL tree ordered by a caller-supplied comparator, with nodes stored in an arena.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. An absent subtree has height -1, so leaves have
//   height 0.
// - The parent of a node `x` is denoted `p(x)`.
// - The balance of a node `x` is `h(right(x)) - h(left(x))`.
//
// The invariants below hold whenever a public method returns:
// 1. `h(x) = 1 + max(h(left(x)), h(right(x)))` for every node `x`.
// 2. Every balance is -1, 0 or 1.
// 3. Every item in the left subtree of `x` compares less than the item of `x`, and every item in
//    its right subtree compares greater.
// 4. `p(c) = x` if and only if `c` is a child of `x`.
//
// Nodes are addressed by `NodeId`, an index into `AvlTree::nodes`. Child links own their target
// in the sense that a node is reachable from the root only through them; the parent link is a
// plain back-reference used for ascending.

use core::{cmp::Ordering, fmt};

mod debug;
mod error;
#[cfg(any(test, feature = "model"))]
pub mod model;
mod node;

pub use error::TreeError;
pub use node::{Node, NodeId};

use node::{Dir, Link};

/// The comparator used by trees over [`Ord`] items.
pub type OrdComparator<T> = fn(&T, &T) -> Ordering;

/// An AVL tree.
///
/// Items are placed according to the comparator `C`, which must be a total order over `T`. Items
/// comparing equal to an item already in the tree are rejected on insertion.
///
/// Insertion, search, successor lookup and deletion complete in _O(log(n))_ time.
pub struct AvlTree<T, C = OrdComparator<T>> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<NodeId>,
    root: Link,
    len: usize,
    cmp: C,
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        AvlTree::new(T::cmp as OrdComparator<T>)
    }
}

impl<T, C> AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Returns a new empty tree ordered by `cmp`.
    pub const fn new(cmp: C) -> AvlTree<T, C> {
        AvlTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Returns a new empty tree ordered by `cmp`, with room for `capacity` nodes before the arena
    /// reallocates.
    pub fn with_capacity(cmp: C, capacity: usize) -> AvlTree<T, C> {
        AvlTree {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Returns `true` if the tree contains no items.
    pub fn is_empty(&self) -> bool {
        let empty = self.len == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of items in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the root node of the tree, or `None` if the tree is empty.
    #[inline]
    pub fn top(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the node named by `id`, or `None` if it is not part of the tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.index())?.as_ref()
    }

    /// Returns the item held by the node named by `id`.
    #[inline]
    pub fn item(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(Node::item)
    }

    /// Returns the height of the whole tree.
    ///
    /// An empty tree has no height and yields [`TreeError::EmptyTree`].
    pub fn height(&self) -> Result<i32, TreeError> {
        self.root
            .map(|root| self.at(root).height())
            .ok_or(TreeError::EmptyTree)
    }

    /// Returns the height of the subtree rooted at `node`, or -1 if `node` is absent.
    #[inline]
    pub fn height_of(&self, node: Option<NodeId>) -> i32 {
        node.and_then(|id| self.node(id)).map_or(-1, Node::height)
    }

    /// Returns the balance of `node`: the height of its right subtree minus the height of its left
    /// subtree.
    ///
    /// Yields [`TreeError::AbsentNode`] if `node` is `None` or not part of the tree.
    pub fn balance(&self, node: Option<NodeId>) -> Result<i32, TreeError> {
        let node = node
            .and_then(|id| self.node(id))
            .ok_or(TreeError::AbsentNode)?;

        Ok(self.height_of(node.right()) - self.height_of(node.left()))
    }

    /// Compares the items of two nodes with the tree's comparator.
    #[inline]
    pub fn compare_nodes(&self, a: &Node<T>, b: &Node<T>) -> Ordering {
        (self.cmp)(a.item(), b.item())
    }

    /// Returns `true` if the tree holds an item comparing equal to `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.search(item).is_some()
    }

    /// Returns the node holding the item comparing equal to `item`.
    pub fn search(&self, item: &T) -> Option<NodeId> {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;
            let node = self.at(cur);

            match (self.cmp)(item, node.item()) {
                Ordering::Less => opt_cur = node.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = node.right(),
            }
        }
    }

    /// Returns the node holding the minimum item.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.min_in_subtree(root))
    }

    /// Returns the in-order successor of `node`: the node holding the smallest item greater than
    /// `node`'s item.
    ///
    /// Returns `None` if `node` holds the maximum item or is not part of the tree.
    pub fn find_successor(&self, node: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(node)?.right() {
            return Some(self.min_in_subtree(right));
        }

        // Ascend until `cur` is a left child; its parent is the successor.
        let mut cur = node;
        while let Some(parent) = self.at(cur).parent() {
            if self.which_child(parent, cur) == Dir::Left {
                return Some(parent);
            }

            cur = parent;
        }

        None
    }

    /// Inserts an item into the tree.
    ///
    /// Returns the node now holding `item`. If the tree already holds an item comparing equal to
    /// `item`, the tree is left unchanged and `item` is handed back.
    pub fn insert(&mut self, item: T) -> Result<NodeId, T> {
        self.insert_node(Node::new(item)).map_err(Node::into_item)
    }

    /// Inserts a node into the tree.
    ///
    /// Any links carried by `node` are discarded. If the tree already holds an item comparing equal
    /// to `node`'s item, the tree is left unchanged and `node` is handed back.
    pub fn insert_node(&mut self, mut node: Node<T>) -> Result<NodeId, Node<T>> {
        node.detach();

        let Some(root) = self.root else {
            // Tree is empty. Set `node` as the root and return.
            let id = self.alloc(node);
            self.root = Some(id);
            self.len += 1;
            return Ok(id);
        };

        // Descend the tree, looking for an empty child slot.
        let mut parent = root;
        let dir = loop {
            let dir = match self.compare_nodes(&node, self.at(parent)) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(node),
                Ordering::Greater => Dir::Right,
            };

            match self.at(parent).child(dir) {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        let id = self.alloc(node);
        self.set_child(parent, dir, Some(id));
        self.len += 1;

        self.rebalance_inserted(parent);

        Ok(id)
    }

    // Walks from `node` to the root, fixing heights, and rotates at the first unbalanced ancestor.
    //
    // A single insertion unbalances nodes by at most 2, and the rotation at the lowest unbalanced
    // ancestor restores that subtree's height from before the insertion. Ancestors above it thus
    // keep their heights and balances, and the walk stops there.
    fn rebalance_inserted(&mut self, node: NodeId) {
        let mut opt_cur = Some(node);

        while let Some(cur) = opt_cur {
            self.recompute_height(cur);

            if !(-1..=1).contains(&self.balance_at(cur)) {
                self.rebalance_at(cur);
                break;
            }

            opt_cur = self.at(cur).parent();
        }
    }

    /// Removes the item comparing equal to `item` from the tree, returning it.
    ///
    /// Returns `None` and leaves the tree unchanged if no such item exists.
    ///
    /// If the node holding `item` has two children, it takes over the item of its successor and the
    /// successor's node is the one removed. Handles to the successor's node are invalidated.
    pub fn delete(&mut self, item: &T) -> Option<T> {
        let found = self.search(item)?;

        // There are two possible cases:
        //
        // 1. `found` has two children.
        //
        //    Its successor is the minimum of its right subtree and thus has no left child. The
        //    successor is removed and its item moves into `found`.
        //
        // 2. `found` has at most one child.
        //
        //    `found` is removed and its child, if any, takes its place.
        let target = {
            let node = self.at(found);
            if node.has_left() && node.has_right() {
                self.find_successor(found)
                    .expect("node with a right child must have a successor")
            } else {
                found
            }
        };

        let parent = self.splice(target);
        let removed = self.release(target).into_item();
        self.len -= 1;

        let item = if target == found {
            removed
        } else {
            self.at_mut(found).set_item(removed)
        };

        self.rebalance_removed(parent);

        Some(item)
    }

    // Unlinks `node`, which must have at most one child, moving its child into its place.
    //
    // Returns the former parent of `node`.
    fn splice(&mut self, node: NodeId) -> Link {
        let links = self.at(node);
        debug_assert!(
            !(links.has_left() && links.has_right()),
            "only nodes with at most one child can be spliced"
        );

        let parent = links.parent();
        let child = links.left().or(links.right());

        log::trace!("splicing out {node:?}, elevating {child:?} under {parent:?}");
        self.replace_child_or_set_root(parent, node, child);

        parent
    }

    // Walks from `node` to the root, fixing heights and rotating wherever a balance is out of
    // range.
    //
    // Unlike insertion, a rotation here may shrink the subtree, which can unbalance an ancestor
    // further up, so the walk always reaches the root.
    fn rebalance_removed(&mut self, node: Link) {
        let mut opt_cur = node;

        while let Some(cur) = opt_cur {
            self.recompute_height(cur);
            let subtree = self.rebalance_at(cur);
            opt_cur = self.at(subtree).parent();
        }
    }

    // Restores the balance of `node` if it is out of range, with a single or double rotation.
    //
    // Returns the root of the subtree formerly rooted at `node`. The heights of `node`'s children
    // must be correct.
    fn rebalance_at(&mut self, node: NodeId) -> NodeId {
        let balance = self.balance_at(node);
        if (-1..=1).contains(&balance) {
            return node;
        }

        log::trace!("rebalancing {node:?} with balance {balance}");

        let heavy_dir = if balance > 1 { Dir::Right } else { Dir::Left };
        let heavy = self
            .at(node)
            .child(heavy_dir)
            .expect("heavy side of an unbalanced node must be present");

        // If the heavy child leans inwards, straighten it first.
        if self.lean(heavy, heavy_dir) < 0 {
            self.rotate(heavy, heavy_dir);
        }

        self.rotate(node, !heavy_dir)
    }

    // Performs a rotation, moving `down` into its `dir` subtree and promoting its `!dir` child.
    //
    // A left rotation is `rotate(node, Dir::Left)`. Heights of the two moved nodes are recomputed,
    // lowered node first. Returns the promoted node.
    fn rotate(&mut self, down: NodeId, dir: Dir) -> NodeId {
        let up = self
            .at(down)
            .child(!dir)
            .expect("rotation requires a child to promote");

        log::trace!("rotating {dir:?} at {down:?}, promoting {up:?}");

        // - `up` takes `down`'s place under `down`'s parent.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        // - `down` becomes the `dir` child of `up`.
        let parent = self.at(down).parent();
        let across = self.at(up).child(dir);

        self.replace_child_or_set_root(parent, down, Some(up));
        self.set_child(down, !dir, across);
        self.set_child(up, dir, Some(down));

        self.recompute_height(down);
        self.recompute_height(up);

        up
    }

    /// Clears the tree, removing all items.
    pub fn clear(&mut self) {
        log::trace!("clearing {} items", self.len);

        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        match self.root {
            Some(root) => {
                assert_eq!(self.at(root).parent(), None, "root must not have a parent");
                let count = self.assert_invariants_at(root, None, None);
                assert_eq!(count, self.len, "reachable node count must match len");
            }
            None => assert_eq!(self.len, 0, "empty tree must have len 0"),
        }

        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, self.len, "arena must hold exactly the reachable nodes");
        assert_eq!(self.nodes.len(), live + self.free.len());
    }

    // Checks the subtree rooted at `node`, whose items must lie strictly between `lower` and
    // `upper`. Returns the number of nodes in the subtree.
    fn assert_invariants_at<'a>(
        &'a self,
        node: NodeId,
        lower: Option<&'a T>,
        upper: Option<&'a T>,
    ) -> usize {
        let links = self.at(node);
        let item = links.item();

        if let Some(lower) = lower {
            assert_eq!((self.cmp)(lower, item), Ordering::Less, "left subtree out of order");
        }

        if let Some(upper) = upper {
            assert_eq!((self.cmp)(item, upper), Ordering::Less, "right subtree out of order");
        }

        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = links.child(dir) {
                // Ensure child's parent link points to this node.
                assert_eq!(
                    self.at(child).parent(),
                    Some(node),
                    "{dir:?} child parent link not set"
                );

                let (lower, upper) = match dir {
                    Dir::Left => (lower, Some(item)),
                    Dir::Right => (Some(item), upper),
                };

                count += self.assert_invariants_at(child, lower, upper);
            }
        }

        let expected = 1 + self.height_of(links.left()).max(self.height_of(links.right()));
        assert_eq!(links.height(), expected, "stale height at {node:?}");

        let balance = self.balance_at(node);
        assert!((-1..=1).contains(&balance), "{node:?} has balance {balance}");

        count
    }

    // Support methods ========================================================

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                let id = NodeId::new(self.nodes.len());
                self.nodes.push(Some(node));
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<T> {
        let node = self.nodes[id.index()]
            .take()
            .expect("released node must be live");
        self.free.push(id);
        node
    }

    #[inline]
    fn at(&self, id: NodeId) -> &Node<T> {
        self.nodes[id.index()]
            .as_ref()
            .expect("tree links must point at live nodes")
    }

    #[inline]
    fn at_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.nodes[id.index()]
            .as_mut()
            .expect("tree links must point at live nodes")
    }

    #[inline]
    fn balance_at(&self, node: NodeId) -> i32 {
        self.lean(node, Dir::Right)
    }

    // Returns how much taller `node`'s `dir` subtree is than its `!dir` subtree.
    #[inline]
    fn lean(&self, node: NodeId, dir: Dir) -> i32 {
        let node = self.at(node);
        self.height_of(node.child(dir)) - self.height_of(node.child(!dir))
    }

    fn recompute_height(&mut self, node: NodeId) {
        let links = self.at(node);
        let height = 1 + self.height_of(links.left()).max(self.height_of(links.right()));
        self.at_mut(node).set_height(height);
    }

    // Returns the minimum node in the subtree rooted at `root`.
    #[inline]
    fn min_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;

        while let Some(left) = self.at(cur).left() {
            cur = left;
        }

        cur
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.at(parent).left() == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    // Sets the `dir` child of `parent` to `child`, returning the previous child.
    //
    // `child`'s parent link is set to `parent`. If the previous child still points back at
    // `parent`, its parent link is cleared.
    fn set_child(&mut self, parent: NodeId, dir: Dir, child: Link) -> Link {
        let old = self.at_mut(parent).set_child(dir, child);

        if let Some(old) = old.filter(|&old| Some(old) != child) {
            if self.at(old).parent() == Some(parent) {
                self.at_mut(old).set_parent(None);
            }
        }

        if let Some(child) = child {
            self.at_mut(child).set_parent(Some(parent));
        }

        old
    }

    // Replaces `old_child` with `new_child` in `parent`'s child slot, or as the root if `parent`
    // is `None`.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.set_child(parent, dir, new_child);
            }
            None => {
                debug_assert_eq!(self.root, Some(old_child));
                self.root = new_child;

                if let Some(new_child) = new_child {
                    self.at_mut(new_child).set_parent(None);
                }
            }
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();

        let mut opt_cur = self.first();
        while let Some(cur) = opt_cur {
            set.entry(self.at(cur).item());
            opt_cur = self.find_successor(cur);
        }

        set.finish()
    }
}
