use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use common::error::Error;
use common::types::{Edge, EdgeIndex, NodeIndex};

/// Attributes of a single wish edge, stored by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
    pub tail: NodeIndex,
    pub head: NodeIndex,
    pub key: String,
    pub weight: u64,
    pub name: String,
}

/// Borrowed view of a live edge together with its slot index.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'g> {
    pub index: EdgeIndex,
    pub data: &'g EdgeData,
}

impl EdgeRef<'_> {
    pub fn tail(&self) -> NodeIndex {
        self.data.tail
    }

    pub fn head(&self) -> NodeIndex {
        self.data.head
    }

    pub fn key(&self) -> &str {
        &self.data.key
    }

    pub fn weight(&self) -> u64 {
        self.data.weight
    }
}

/// Directed multigraph of participants connected by keyed wish edges.
///
/// Layout:
/// - `nodes[i]` -> external id of node `i`, in insertion order
/// - `edges[e]` -> edge slot `e`, `None` once the edge has been removed
/// - `outgoing[i]` -> live edge slots leaving node `i`, in insertion order
/// - `key_lookup` -> item key to edge slot
///
/// Nodes are never removed, so node indices stay valid for the lifetime of
/// the graph. Edge slots are tombstoned rather than compacted so that edge
/// indices held by a traversal remain meaningful.
#[derive(Debug, Clone, Default)]
pub struct WishGraph {
    nodes: Vec<String>,
    node_lookup: HashMap<String, NodeIndex>,
    edges: Vec<Option<EdgeData>>,
    outgoing: Vec<Vec<EdgeIndex>>,
    key_lookup: HashMap<String, EdgeIndex>,
}

impl WishGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `id`, inserting the node if it is new.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.node_lookup.get(id) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(id.to_string());
        self.node_lookup.insert(id.to_string(), index);
        self.outgoing.push(Vec::new());
        index
    }

    /// Adds a directed edge `tail -> head` keyed by `key`.
    ///
    /// Missing endpoints are created on the fly.
    ///
    /// # Errors
    /// Returns `Error::DuplicateKey` if an edge with the same key is already present.
    pub fn add_edge(
        &mut self,
        tail: &str,
        head: &str,
        key: &str,
        weight: u64,
        name: &str,
    ) -> Result<EdgeIndex, Error> {
        if self.key_lookup.contains_key(key) {
            return Err(Error::DuplicateKey {
                key: key.to_string(),
            });
        }

        let tail = self.add_node(tail);
        let head = self.add_node(head);
        let index = self.edges.len();

        self.edges.push(Some(EdgeData {
            tail,
            head,
            key: key.to_string(),
            weight,
            name: name.to_string(),
        }));
        self.outgoing[tail].push(index);
        self.key_lookup.insert(key.to_string(), index);

        Ok(index)
    }

    /// Removes the edge stored at `index`, returning its data if it was live.
    pub fn remove_edge(&mut self, index: EdgeIndex) -> Option<EdgeData> {
        let data = self.edges.get_mut(index)?.take()?;

        self.outgoing[data.tail].retain(|&e| e != index);
        self.key_lookup.remove(&data.key);

        Some(data)
    }

    pub fn remove_key(&mut self, key: &str) -> Option<EdgeData> {
        let index = *self.key_lookup.get(key)?;
        self.remove_edge(index)
    }

    /// Removes every `(tail, head, key)` triple that is present.
    ///
    /// Entries that are absent, or whose endpoints do not match the stored
    /// edge, are skipped. Returns the number of edges actually removed.
    pub fn remove_edges<'a, I>(&mut self, triples: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut removed = 0;

        for (tail, head, key) in triples {
            let Some(&index) = self.key_lookup.get(key) else {
                continue;
            };
            let matches = self.edges[index].as_ref().is_some_and(|data| {
                self.nodes[data.tail] == tail && self.nodes[data.head] == head
            });

            if matches && self.remove_edge(index).is_some() {
                removed += 1;
            }
        }

        removed
    }

    /// Live edges leaving `node`, in insertion order.
    pub fn outgoing_edges(&self, node: NodeIndex) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.outgoing_indices(node)
            .iter()
            .filter_map(move |&index| self.edge_ref(index))
    }

    pub(crate) fn outgoing_indices(&self, node: NodeIndex) -> &[EdgeIndex] {
        self.outgoing.get(node).map_or(&[], Vec::as_slice)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&EdgeData> {
        self.edges.get(index)?.as_ref()
    }

    pub fn edge_ref(&self, index: EdgeIndex) -> Option<EdgeRef<'_>> {
        self.edge(index).map(|data| EdgeRef { index, data })
    }

    /// Every live edge in slot order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|data| EdgeRef { index, data }))
    }

    /// Resolves the edge at `index` into an owned `Edge` with external node ids.
    pub fn to_edge(&self, index: EdgeIndex) -> Option<Edge> {
        let data = self.edge(index)?;

        Some(Edge {
            tail: self.nodes[data.tail].clone(),
            head: self.nodes[data.head].clone(),
            key: data.key.clone(),
            weight: data.weight,
            name: data.name.clone(),
        })
    }

    pub fn node_id(&self, node: NodeIndex) -> Option<&str> {
        self.nodes.get(node).map(String::as_str)
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_lookup.get(id).copied()
    }

    pub fn node_indices(&self) -> Range<NodeIndex> {
        0..self.nodes.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_lookup.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.key_lookup.len()
    }

    pub fn edge_count_with_weight(&self, weight: u64) -> usize {
        self.edges().filter(|edge| edge.weight() == weight).count()
    }

    /// Distinct weights of the live edges, ascending.
    pub fn weights(&self) -> Vec<u64> {
        self.edges()
            .map(|edge| edge.weight())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Copies the graph keeping only the edges of one weight class.
    ///
    /// All nodes are kept in their original order, and each node's outgoing
    /// edges keep their relative order, so a filtered traversal over the copy
    /// visits edges exactly as it would over `self`.
    pub fn weight_class(&self, weight: u64) -> WishGraph {
        let mut class = WishGraph::new();

        for id in &self.nodes {
            class.add_node(id);
        }

        for edge in self.edges().filter(|edge| edge.weight() == weight) {
            let data = edge.data;
            let index = class.edges.len();
            class.edges.push(Some(data.clone()));
            class.outgoing[data.tail].push(index);
            class.key_lookup.insert(data.key.clone(), index);
        }

        class
    }
}

#[cfg(test)]
mod graph_tests {
    use super::*;

    fn triangle() -> WishGraph {
        let mut graph = WishGraph::new();
        graph.add_edge("a", "b", "k1", 50, "cup").unwrap();
        graph.add_edge("b", "c", "k2", 50, "lamp").unwrap();
        graph.add_edge("c", "a", "k3", 50, "book").unwrap();
        graph
    }

    #[test]
    fn add_edge_creates_nodes_in_order() {
        let graph = triangle();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_id(0), Some("a"));
        assert_eq!(graph.node_id(2), Some("c"));
        assert_eq!(graph.node_index("b"), Some(1));
        assert_eq!(graph.node_index("z"), None);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut graph = triangle();

        let result = graph.add_edge("c", "b", "k1", 100, "cup");
        match result {
            Err(Error::DuplicateKey { key }) => assert_eq!(key, "k1"),
            other => panic!("Expected DuplicateKey, got {:?}", other),
        }
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn parallel_edges_keep_insertion_order() {
        let mut graph = WishGraph::new();
        graph.add_edge("a", "b", "k1", 50, "cup").unwrap();
        graph.add_edge("a", "b", "k2", 100, "lamp").unwrap();
        graph.add_edge("a", "c", "k3", 50, "book").unwrap();

        let keys: Vec<&str> = graph.outgoing_edges(0).map(|e| e.data.key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn remove_edges_skips_absent_and_mismatched() {
        let mut graph = triangle();

        let removed = graph.remove_edges([
            ("a", "b", "k1"),
            ("a", "b", "missing"),
            ("a", "c", "k2"), // wrong endpoints for k2
            ("a", "b", "k1"), // already removed
        ]);

        assert_eq!(removed, 1);
        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.contains_key("k1"));
        assert!(graph.contains_key("k2"));
        assert_eq!(graph.outgoing_edges(0).count(), 0);
        // Nodes survive edge removal.
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn removed_key_can_be_reused() {
        let mut graph = triangle();
        assert!(graph.remove_key("k1").is_some());
        assert!(graph.remove_key("k1").is_none());

        assert!(graph.add_edge("a", "c", "k1", 50, "cup").is_ok());
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn to_edge_resolves_node_ids() {
        let graph = triangle();
        let edge = graph.to_edge(1).unwrap();

        assert_eq!(edge.tail, "b");
        assert_eq!(edge.head, "c");
        assert_eq!(edge.key, "k2");
        assert_eq!(edge.weight, 50);
        assert_eq!(edge.name, "lamp");
    }

    #[test]
    fn weights_are_distinct_and_sorted() {
        let mut graph = triangle();
        graph.add_edge("a", "c", "k4", 200, "tv").unwrap();
        graph.add_edge("b", "a", "k5", 100, "pen").unwrap();

        assert_eq!(graph.weights(), vec![50, 100, 200]);
        assert_eq!(graph.edge_count_with_weight(50), 3);
        assert_eq!(graph.edge_count_with_weight(300), 0);
    }

    #[test]
    fn weight_class_keeps_nodes_and_filters_edges() {
        let mut graph = triangle();
        graph.add_edge("a", "c", "k4", 200, "tv").unwrap();
        graph.add_edge("d", "a", "k5", 100, "pen").unwrap();

        let class = graph.weight_class(50);

        assert_eq!(class.node_count(), 4);
        assert_eq!(class.node_id(3), Some("d"));
        assert_eq!(class.edge_count(), 3);
        assert!(!class.contains_key("k4"));
        assert_eq!(class.weights(), vec![50]);

        let keys: Vec<&str> = class.outgoing_edges(0).map(|e| e.data.key.as_str()).collect();
        assert_eq!(keys, vec!["k1"]);
    }
}
