use exchange_core::{ClassReport, CycleFinder, Enumeration, Enumerator, WishGraph};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::error::Error;
use common::error::Error as ExchangeError;

type ClassOutcome = Result<(ClassReport, WishGraph), ExchangeError>;

/// Runs the exhaustive enumeration, either in place or one worker per weight class.
pub struct ExchangeSearcher<F> {
    enumerator: Enumerator<F>,
}

impl<F> ExchangeSearcher<F>
where
    F: CycleFinder + Clone + Send + 'static,
{
    pub fn new(enumerator: Enumerator<F>) -> Self {
        ExchangeSearcher { enumerator }
    }

    /// Extracts every cycle from `graph`, consuming the matched edges.
    pub fn search(&self, graph: &mut WishGraph) -> Result<Enumeration, Error> {
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Searcher: starting cycle search"
        );

        Ok(self.enumerator.run(graph)?)
    }

    /// Same result as `search`, with each weight class extracted on its own
    /// copy of the graph on the blocking pool.
    ///
    /// Weight classes touch disjoint edge sets, so the copies never interact.
    /// Once every worker is done, edges consumed or pruned by a worker are
    /// removed from `graph` as well. Without a weight filter there is nothing
    /// to split and the search runs in place.
    pub async fn search_parallel(&self, graph: &mut WishGraph) -> Result<Enumeration, Error> {
        let classes = self.enumerator.classes();
        if !classes.is_filtered() {
            warn!("Searcher: parallel search needs a weight filter, running sequentially");
            return self.search(graph);
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            workers = classes.filters().len(),
            "Searcher: starting parallel cycle search"
        );

        let handles: Vec<(u64, JoinHandle<ClassOutcome>)> = classes
            .filters()
            .into_iter()
            .flatten()
            .map(|weight| {
                let mut class_graph = graph.weight_class(weight);
                let enumerator = self.enumerator.clone();
                let handle = tokio::task::spawn_blocking(move || -> ClassOutcome {
                    let report = enumerator.run_class(&mut class_graph, Some(weight))?;
                    Ok((report, class_graph))
                });
                (weight, handle)
            })
            .collect();

        // Join every worker before touching `graph`, so a failure leaves it unchanged.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (weight, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome.map_err(Error::from),
                Err(e) => Err(Error::WorkerFailed(format!("weight class {weight}: {e}"))),
            };
            outcomes.push((weight, outcome));
        }

        let mut finished = Vec::with_capacity(outcomes.len());
        for (weight, outcome) in outcomes {
            match outcome {
                Ok(result) => finished.push((weight, result)),
                Err(e) => {
                    warn!(weight, error = %e, "Searcher: weight class failed");
                    return Err(e);
                }
            }
        }

        let mut enumeration = Enumeration::default();

        for (weight, (report, class_graph)) in finished {
            let gone: Vec<String> = graph
                .edges()
                .filter(|edge| edge.weight() == weight && !class_graph.contains_key(edge.key()))
                .map(|edge| edge.key().to_string())
                .collect();
            for key in &gone {
                graph.remove_key(key);
            }

            enumeration.classes.push(report);
        }

        info!(
            total = enumeration.total_cycles(),
            remaining_edges = graph.edge_count(),
            "Searcher: parallel cycle search complete"
        );

        Ok(enumeration)
    }
}
