use std::collections::{HashMap, HashSet};
use std::iter::FusedIterator;

use common::types::NodeIndex;

use crate::graph::{EdgeRef, WishGraph};

/// Identity of a traversed edge: unordered endpoint pair plus item key.
type EdgeId<'g> = (NodeIndex, NodeIndex, &'g str);

/// Lazy depth-first enumeration of the edges reachable from one source node.
///
/// The traversal keeps an explicit node stack. For the node on top of the
/// stack it pulls the next outgoing edge from that node's cursor; an accepted
/// edge pushes its head and is yielded, an exhausted node is popped. Each
/// node keeps a single cursor for the whole traversal, so a node reached a
/// second time resumes where it left off instead of replaying its edges.
///
/// An edge is yielded at most once per traversal, identified by its unordered
/// endpoint pair and key. With a weight filter set, edges of any other weight
/// are skipped without being marked as visited.
///
/// The traversal borrows the graph immutably, so the graph cannot change
/// while edges are being produced. Every call to `EdgeDfs::new` starts from a
/// clean state.
#[derive(Debug)]
pub struct EdgeDfs<'g> {
    graph: &'g WishGraph,
    weight: Option<u64>,
    stack: Vec<NodeIndex>,
    cursors: HashMap<NodeIndex, usize>,
    visited: HashSet<EdgeId<'g>>,
}

impl<'g> EdgeDfs<'g> {
    /// Creates a traversal rooted at `source`.
    ///
    /// An unknown `source` produces an empty traversal.
    pub fn new(graph: &'g WishGraph, source: NodeIndex, weight: Option<u64>) -> Self {
        let stack = if source < graph.node_count() {
            vec![source]
        } else {
            Vec::new()
        };

        Self {
            graph,
            weight,
            stack,
            cursors: HashMap::new(),
            visited: HashSet::new(),
        }
    }
}

fn edge_id<'g>(edge: &EdgeRef<'g>) -> EdgeId<'g> {
    let (tail, head) = (edge.tail(), edge.head());
    (tail.min(head), tail.max(head), edge.data.key.as_str())
}

impl<'g> Iterator for EdgeDfs<'g> {
    type Item = EdgeRef<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;

        while let Some(&current) = self.stack.last() {
            let outgoing = graph.outgoing_indices(current);
            let cursor = self.cursors.entry(current).or_insert(0);

            let Some(&index) = outgoing.get(*cursor) else {
                // No more edges from the current node.
                self.stack.pop();
                continue;
            };
            *cursor += 1;

            let Some(edge) = graph.edge_ref(index) else {
                continue;
            };

            if self.weight.is_some_and(|weight| edge.weight() != weight) {
                continue;
            }

            if !self.visited.insert(edge_id(&edge)) {
                continue;
            }

            self.stack.push(edge.head());
            return Some(edge);
        }

        None
    }
}

impl FusedIterator for EdgeDfs<'_> {}

#[cfg(test)]
mod edge_dfs_tests {
    use super::*;

    fn keys<'g>(edges: impl Iterator<Item = EdgeRef<'g>>) -> Vec<&'g str> {
        edges.map(|edge| edge.data.key.as_str()).collect()
    }

    #[test]
    fn visits_edges_depth_first() {
        // 0 -> 1 -> 2, 0 -> 3
        let mut graph = WishGraph::new();
        graph.add_edge("0", "1", "a", 50, "x").unwrap();
        graph.add_edge("0", "3", "b", 50, "x").unwrap();
        graph.add_edge("1", "2", "c", 50, "x").unwrap();

        let order = keys(EdgeDfs::new(&graph, 0, None));
        assert_eq!(order, vec!["a", "c", "b"]);
    }

    #[test]
    fn each_edge_is_yielded_once_even_around_a_cycle() {
        let mut graph = WishGraph::new();
        graph.add_edge("a", "b", "k1", 50, "x").unwrap();
        graph.add_edge("b", "c", "k2", 50, "x").unwrap();
        graph.add_edge("c", "a", "k3", 50, "x").unwrap();

        let order = keys(EdgeDfs::new(&graph, 0, None));
        assert_eq!(order, vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn weight_filter_skips_other_weights() {
        let mut graph = WishGraph::new();
        graph.add_edge("a", "b", "heavy", 100, "x").unwrap();
        graph.add_edge("a", "b", "light", 50, "x").unwrap();
        graph.add_edge("b", "a", "back", 50, "x").unwrap();

        let filtered = keys(EdgeDfs::new(&graph, 0, Some(50)));
        assert_eq!(filtered, vec!["light", "back"]);

        // A fresh traversal without the filter still sees the skipped edge.
        let unfiltered = keys(EdgeDfs::new(&graph, 0, None));
        assert_eq!(unfiltered, vec!["heavy", "back", "light"]);
    }

    #[test]
    fn revisited_node_resumes_its_cursor() {
        // a -> b, b -> a, a -> c: after returning to `a` through b -> a, the
        // traversal continues with a -> c rather than replaying a -> b.
        let mut graph = WishGraph::new();
        graph.add_edge("a", "b", "ab", 50, "x").unwrap();
        graph.add_edge("b", "a", "ba", 50, "x").unwrap();
        graph.add_edge("a", "c", "ac", 50, "x").unwrap();

        let order = keys(EdgeDfs::new(&graph, 0, None));
        assert_eq!(order, vec!["ab", "ba", "ac"]);
    }

    #[test]
    fn unknown_source_is_empty() {
        let graph = WishGraph::new();
        let mut dfs = EdgeDfs::new(&graph, 7, None);

        assert!(dfs.next().is_none());
        assert!(dfs.next().is_none());
    }

    #[test]
    fn removed_edges_are_not_traversed() {
        let mut graph = WishGraph::new();
        graph.add_edge("a", "b", "k1", 50, "x").unwrap();
        graph.add_edge("a", "c", "k2", 50, "x").unwrap();
        graph.remove_key("k1");

        let order = keys(EdgeDfs::new(&graph, 0, None));
        assert_eq!(order, vec!["k2"]);
    }
}
