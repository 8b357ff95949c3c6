use serde::Serialize;
use std::collections::HashSet;

/// Index of a participant inside a `WishGraph`.
pub type NodeIndex = usize;

/// Slot index of an edge inside a `WishGraph`.
pub type EdgeIndex = usize;

/// An owned, fully resolved wish edge.
///
/// `tail` wishes for the item `key` owned by `head`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub tail: String,
    pub head: String,
    pub key: String,
    pub weight: u64,
    pub name: String,
}

/// A closed exchange loop.
///
/// The head of the last edge is the tail of the first one. Every edge hands
/// one item from its `head` (the owner) to its `tail` (the participant who
/// wished for it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub edges: Vec<Edge>,
}

impl Cycle {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns true if the edges chain head-to-tail and close on the first tail.
    pub fn is_closed(&self) -> bool {
        let (Some(first), Some(last)) = (self.edges.first(), self.edges.last()) else {
            return false;
        };

        first.tail == last.head && self.edges.windows(2).all(|pair| pair[0].head == pair[1].tail)
    }

    /// Participants in traversal order, starting at the first edge's tail.
    pub fn participants(&self) -> Vec<&str> {
        self.edges.iter().map(|edge| edge.tail.as_str()).collect()
    }

    pub fn distinct_participants(&self) -> usize {
        self.edges
            .iter()
            .flat_map(|edge| [edge.tail.as_str(), edge.head.as_str()])
            .collect::<HashSet<_>>()
            .len()
    }

    /// The shared weight of the cycle, if every edge carries the same one.
    pub fn weight(&self) -> Option<u64> {
        let first = self.edges.first()?.weight;
        self.edges
            .iter()
            .all(|edge| edge.weight == first)
            .then_some(first)
    }

    pub fn total_value(&self) -> u64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }
}
