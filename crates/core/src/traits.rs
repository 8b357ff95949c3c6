use super::graph::WishGraph;
use common::{error::Error, types::Cycle};

/// Trait for cycle finders driven by the exhaustive enumerator.
pub trait CycleFinder {
    /// Finds one cycle, restricted to edges of `weight` when a filter is given.
    ///
    /// The graph is mutable because a finder may prune edges from branches it
    /// gives up on. It must not remove the edges of the cycle it returns.
    ///
    /// Returns `Ok(Some(cycle))` if a cycle is found,
    /// `Ok(None)` if none exists, or `Err(e)` on failure.
    fn find_cycle(&self, graph: &mut WishGraph, weight: Option<u64>)
    -> Result<Option<Cycle>, Error>;
}
