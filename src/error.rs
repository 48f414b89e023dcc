use thiserror::Error;

/// Failures reported by [`AvlTree`](crate::AvlTree) queries.
///
/// Misses (searching for an absent item, deleting an absent item, asking for the successor of
/// the maximum) are not errors and are reported as `None` instead.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The tree holds no items, so it has no height.
    #[error("tree is empty")]
    EmptyTree,

    /// The node passed in is absent or no longer part of the tree.
    #[error("node is absent")]
    AbsentNode,
}
