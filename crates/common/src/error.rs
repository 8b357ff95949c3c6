use thiserror::Error;

use crate::types::Edge;

#[derive(Debug, Error)]
pub enum Error {
    /// Two edges were inserted with the same item key.
    #[error("Edge key {key} is already present in the graph.")]
    DuplicateKey { key: String },

    /// A search or weight-range setting is out of bounds.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The edge-removal policy name did not match a known policy.
    #[error("Unknown edge removal policy '{0}'. Expected none, current_node or failed_cycle_nodes.")]
    UnknownEdgeRemoval(String),

    /// The step or time budget ran out before the search settled.
    ///
    /// `path` is the active path at the moment the budget tripped.
    #[error(
        "Cycle search aborted after {steps} steps (weight filter: {weight:?}, active path length: {len}).",
        len = .path.len()
    )]
    SearchAborted {
        weight: Option<u64>,
        steps: u64,
        path: Vec<Edge>,
    },
}
