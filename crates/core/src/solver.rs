use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::graph::WishGraph;
use super::traits::CycleFinder;
use super::traversal::EdgeDfs;
use common::{
    error::Error,
    types::{Cycle, Edge, EdgeIndex, NodeIndex},
};
use tracing::debug;

/// What to prune from the graph when a branch is abandoned at the depth bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeRemoval {
    /// Leave the graph untouched.
    #[default]
    None,
    /// Remove the first edge of the abandoned active path.
    CurrentNode,
    /// Remove every edge of the abandoned active path.
    FailedCycleNodes,
}

impl FromStr for EdgeRemoval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(EdgeRemoval::None),
            "current_node" => Ok(EdgeRemoval::CurrentNode),
            "failed_cycle_nodes" => Ok(EdgeRemoval::FailedCycleNodes),
            _ => Err(Error::UnknownEdgeRemoval(s.to_string())),
        }
    }
}

impl fmt::Display for EdgeRemoval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EdgeRemoval::None => write!(f, "none"),
            EdgeRemoval::CurrentNode => write!(f, "current_node"),
            EdgeRemoval::FailedCycleNodes => write!(f, "failed_cycle_nodes"),
        }
    }
}

/// Limits applied to a single `find_cycle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchBudget {
    /// Maximum number of traversal edges examined.
    pub max_steps: Option<u64>,
    /// Wall-clock limit.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Maximum number of distinct nodes on the active path.
    pub max_depth: Option<usize>,
    pub edge_removal: EdgeRemoval,
    pub budget: SearchBudget,
}

impl SearchOptions {
    /// # Errors
    /// Returns `Error::InvalidConfig` for a zero depth, step or time limit.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_depth == Some(0) {
            return Err(Error::InvalidConfig(
                "max_depth must be a positive integer".to_string(),
            ));
        }
        if self.budget.max_steps == Some(0) {
            return Err(Error::InvalidConfig(
                "max_steps must be a positive integer".to_string(),
            ));
        }
        if self.budget.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// An accepted edge on the active path.
#[derive(Debug, Clone, Copy)]
struct PathEdge {
    index: EdgeIndex,
    tail: NodeIndex,
    head: NodeIndex,
}

/// State of the current depth-first branch.
#[derive(Debug)]
struct ActivePath {
    root: NodeIndex,
    edges: Vec<PathEdge>,
    nodes: HashSet<NodeIndex>,
    /// Every node reached from the branch's start node.
    seen: HashSet<NodeIndex>,
    previous_head: Option<NodeIndex>,
}

impl ActivePath {
    fn new(start: NodeIndex) -> Self {
        Self {
            root: start,
            edges: Vec::new(),
            nodes: HashSet::from([start]),
            seen: HashSet::from([start]),
            previous_head: None,
        }
    }

    /// The node the next continuing edge must leave from.
    fn tip(&self) -> NodeIndex {
        self.previous_head.unwrap_or(self.root)
    }

    /// Pops edges until the path ends at `tail`.
    ///
    /// For example the path `(0, 1), (1, 2), (2, 3)` followed by the edge
    /// `(1, 4)` becomes `(0, 1)`, ready to take `(1, 4)`. If no edge of the
    /// path ends at `tail`, the path is emptied and `tail` becomes its only node.
    fn backtrack(&mut self, tail: NodeIndex) {
        loop {
            let Some(popped) = self.edges.pop() else {
                self.nodes = HashSet::from([tail]);
                return;
            };
            self.nodes.remove(&popped.head);

            if self.edges.last().is_some_and(|last| last.head == tail) {
                return;
            }
        }
    }

    fn to_edges(&self, graph: &WishGraph) -> Vec<Edge> {
        self.edges
            .iter()
            .filter_map(|edge| graph.to_edge(edge.index))
            .collect()
    }

    /// Drops the lead-in edges so the path starts and ends at `final_node`.
    fn into_cycle(self, graph: &WishGraph, final_node: NodeIndex) -> Cycle {
        let start = self
            .edges
            .iter()
            .position(|edge| edge.tail == final_node)
            .unwrap_or(0);

        let edges = self.edges[start..]
            .iter()
            .filter_map(|edge| graph.to_edge(edge.index))
            .collect();

        Cycle::new(edges)
    }
}

/// Search-wide state, scoped to one `find_cycle` call.
#[derive(Debug)]
struct SearchState {
    weight: Option<u64>,
    budget: SearchBudget,
    /// Nodes proven to lead to no cycle.
    explored: HashSet<NodeIndex>,
    steps: u64,
    started: Instant,
}

impl SearchState {
    fn new(weight: Option<u64>, budget: SearchBudget) -> Self {
        Self {
            weight,
            budget,
            explored: HashSet::new(),
            steps: 0,
            started: Instant::now(),
        }
    }

    fn tick(&mut self, path: &ActivePath, graph: &WishGraph) -> Result<(), Error> {
        self.steps += 1;

        let out_of_steps = self.budget.max_steps.is_some_and(|max| self.steps > max);
        let out_of_time = self
            .budget
            .timeout
            .is_some_and(|timeout| self.started.elapsed() > timeout);

        if out_of_steps || out_of_time {
            return Err(Error::SearchAborted {
                weight: self.weight,
                steps: self.steps,
                path: path.to_edges(graph),
            });
        }

        Ok(())
    }
}

/// How a single branch of the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchEnd {
    /// The last accepted edge points back into the active path.
    Closed(NodeIndex),
    /// The active path reached `max_depth` nodes.
    DepthExceeded,
    /// The traversal ran out of edges.
    Exhausted,
}

/// Depth-first cycle finder over a `WishGraph`.
///
/// Start nodes are tried in index order. From each start node the edges of
/// an `EdgeDfs` traversal are replayed onto an active path; the first edge
/// whose head is already on the path closes a cycle. Nodes reached from a
/// start node that produced no cycle are marked explored and never entered
/// again during the same call.
#[derive(Debug, Clone, Default)]
pub struct DfsCycleFinder {
    options: SearchOptions,
}

impl DfsCycleFinder {
    /// # Errors
    /// Returns `Error::InvalidConfig` if `options` does not validate.
    pub fn new(options: SearchOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn walk_branch(
        &self,
        graph: &WishGraph,
        start: NodeIndex,
        path: &mut ActivePath,
        state: &mut SearchState,
    ) -> Result<BranchEnd, Error> {
        for edge in EdgeDfs::new(graph, start, state.weight) {
            state.tick(path, graph)?;

            if let Some(max_depth) = self.options.max_depth {
                if path.nodes.len() >= max_depth {
                    return Ok(BranchEnd::DepthExceeded);
                }
            }

            let (tail, head) = (edge.tail(), edge.head());
            if state.explored.contains(&head) {
                // Then we've already explored it. No loop is possible.
                continue;
            }

            if tail != path.tip() {
                // This edge results from backtracking.
                path.backtrack(tail);
            }

            path.edges.push(PathEdge {
                index: edge.index,
                tail,
                head,
            });

            if path.nodes.contains(&head) {
                return Ok(BranchEnd::Closed(head));
            }

            path.seen.insert(head);
            path.nodes.insert(head);
            path.previous_head = Some(head);
        }

        Ok(BranchEnd::Exhausted)
    }

    fn apply_edge_removal(&self, graph: &mut WishGraph, path: &ActivePath) {
        let doomed: Vec<EdgeIndex> = match self.options.edge_removal {
            EdgeRemoval::None => return,
            EdgeRemoval::CurrentNode => path.edges.first().map(|e| e.index).into_iter().collect(),
            EdgeRemoval::FailedCycleNodes => path.edges.iter().map(|e| e.index).collect(),
        };

        let removed = doomed
            .into_iter()
            .filter_map(|index| graph.remove_edge(index))
            .count();

        debug!(
            policy = %self.options.edge_removal,
            removed,
            "Pruned edges of abandoned branch"
        );
    }
}

impl CycleFinder for DfsCycleFinder {
    fn find_cycle(
        &self,
        graph: &mut WishGraph,
        weight: Option<u64>,
    ) -> Result<Option<Cycle>, Error> {
        debug!(
            ?weight,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Cycle search start"
        );

        let mut state = SearchState::new(weight, self.options.budget);

        for start in graph.node_indices() {
            if state.explored.contains(&start) {
                // No loop is possible.
                continue;
            }

            let mut path = ActivePath::new(start);

            match self.walk_branch(graph, start, &mut path, &mut state)? {
                BranchEnd::Closed(final_node) => {
                    let cycle = path.into_cycle(graph, final_node);
                    debug!(
                        ?weight,
                        length = cycle.len(),
                        steps = state.steps,
                        "Cycle found"
                    );
                    return Ok(Some(cycle));
                }
                BranchEnd::DepthExceeded => {
                    debug!(
                        ?weight,
                        start,
                        depth = path.nodes.len(),
                        "Branch abandoned at max depth"
                    );
                    self.apply_edge_removal(graph, &path);
                    state.explored.extend(path.seen);
                }
                BranchEnd::Exhausted => {
                    state.explored.extend(path.seen);
                }
            }
        }

        debug!(?weight, steps = state.steps, "No cycle found");
        Ok(None)
    }
}
