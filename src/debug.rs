use core::{cmp::Ordering, fmt};
use std::collections::VecDeque;

use crate::{AvlTree, NodeId};

/// Formats the tree as a pre-order dump: every item is written as `" | item"`, visiting each node
/// before its left subtree and its left subtree before its right subtree.
///
/// An empty tree formats as the empty string. This is a debugging aid, not a serialization
/// format.
impl<T, C> fmt::Display for AvlTree<T, C>
where
    T: fmt::Display,
    C: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<NodeId> = self.top().into_iter().collect();

        while let Some(cur) = stack.pop() {
            let node = self.at(cur);
            write!(f, " | {}", node.item())?;

            // Right goes on the stack first so that the left subtree is visited first.
            stack.extend(node.right());
            stack.extend(node.left());
        }

        Ok(())
    }
}

impl<T, C> AvlTree<T, C>
where
    T: fmt::Display,
    C: Fn(&T, &T) -> Ordering,
{
    /// Writes a Graphviz rendering of the tree to `w`.
    ///
    /// Nodes of the same depth share a rank, each node is labelled `item:height`, and missing
    /// children are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.top() {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => node,
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let node = self.at(node);
                let item = node.item();
                write!(w, "\"graph{name}-{item}\" [label=\"{item}:{}\"]; ", node.height())?;

                for child in [node.left(), node.right()] {
                    match child {
                        Some(child) => {
                            let child_item = self.at(child).item();

                            queue.push_back(Item::Node(child));
                            writeln!(
                                links,
                                "\"graph{name}-{item}\" -> \"graph{name}-{child_item}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                links,
                                "\"graph{name}-{item}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlTree;

    #[test]
    fn empty_tree_displays_as_empty_string() {
        let tree: AvlTree<u32> = AvlTree::default();
        assert_eq!(tree.to_string(), "");
    }

    #[test]
    fn display_is_pre_order() {
        let mut tree: AvlTree<u32> = AvlTree::default();
        for item in [7, 9, 2, 8, 3] {
            tree.insert(item).unwrap();
        }

        assert_eq!(tree.to_string(), " | 7 | 2 | 3 | 9 | 8");
    }

    #[test]
    fn dotgraph_empty() {
        let tree: AvlTree<u32> = AvlTree::default();
        let mut out = String::new();
        tree.dotgraph("empty", &mut out).unwrap();

        assert_eq!(out, "digraph \"graph-empty\" {}");
    }

    #[test]
    fn dotgraph_links_children() {
        let mut tree: AvlTree<u32> = AvlTree::default();
        for item in [6, 4, 9] {
            tree.insert(item).unwrap();
        }

        let mut out = String::new();
        tree.dotgraph("t", &mut out).unwrap();

        assert!(out.starts_with("digraph \"graph-t\" {"));
        assert!(out.contains("\"grapht-6\" [label=\"6:1\"];"));
        assert!(out.contains("\"grapht-4\" [label=\"4:0\"];"));
        assert!(out.contains("\"grapht-6\" -> \"grapht-4\";"));
        assert!(out.contains("\"grapht-6\" -> \"grapht-9\";"));
        // Both leaves have two missing children each.
        assert!(out.contains("\"grapht-missing3\" [shape=point];"));
        assert!(!out.contains("missing4"));
        assert!(out.ends_with(" }\n}"));
    }
}
