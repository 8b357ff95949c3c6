use std::collections::HashSet;

use exchange_core::{
    CycleFinder, DfsCycleFinder, EdgeDfs, EdgeRemoval, Enumerator, SearchOptions, WeightClasses,
    WishGraph,
};
use proptest::prelude::*;
use proptest::strategy::Strategy;

const NUM_NODES_STRATEGY: std::ops::Range<usize> = 1usize..8;
const WEIGHTS: [u64; 3] = [50, 100, 150];

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, u64)>)> {
    NUM_NODES_STRATEGY.prop_flat_map(|num_nodes| {
        let edge_generator = (
            0usize..num_nodes,
            0usize..num_nodes,
            prop::sample::select(WEIGHTS.to_vec()),
        );
        let edges_generator = prop::collection::vec(edge_generator, 0..30);

        (proptest::strategy::Just(num_nodes), edges_generator)
    })
}

fn build_graph(num_nodes: usize, edges: &[(usize, usize, u64)]) -> WishGraph {
    let mut graph = WishGraph::new();
    for node in 0..num_nodes {
        graph.add_node(&format!("user-{node}"));
    }
    for (i, &(tail, head, weight)) in edges.iter().enumerate() {
        graph
            .add_edge(
                &format!("user-{tail}"),
                &format!("user-{head}"),
                &format!("item-{i}"),
                weight,
                "thing",
            )
            .expect("generated keys are unique");
    }
    graph
}

fn weight_filter() -> impl Strategy<Value = Option<u64>> {
    prop::option::of(prop::sample::select(WEIGHTS.to_vec()))
}

proptest! {
    /// Property: a traversal yields each (unordered endpoint pair, key) at most once.
    #[test]
    fn traversal_yields_each_edge_once(
        (num_nodes, edges) in graph_strategy(),
        weight in weight_filter(),
    ) {
        let graph = build_graph(num_nodes, &edges);

        for start in graph.node_indices() {
            let mut ids = HashSet::new();
            for edge in EdgeDfs::new(&graph, start, weight) {
                let (u, v) = (edge.tail(), edge.head());
                prop_assert!(ids.insert((u.min(v), u.max(v), edge.key().to_string())));
                if let Some(w) = weight {
                    prop_assert_eq!(edge.weight(), w);
                }
            }
        }
    }

    /// Property: every extracted cycle is closed and honours the weight filter.
    #[test]
    fn extracted_cycles_are_closed(
        (num_nodes, edges) in graph_strategy(),
        weight in weight_filter(),
    ) {
        let mut graph = build_graph(num_nodes, &edges);

        if let Some(cycle) = DfsCycleFinder::default().find_cycle(&mut graph, weight).unwrap() {
            prop_assert!(!cycle.is_empty());
            prop_assert!(cycle.is_closed());
            prop_assert_eq!(&cycle.edges[0].tail, &cycle.edges[cycle.len() - 1].head);
            if let Some(w) = weight {
                prop_assert!(cycle.edges.iter().all(|e| e.weight == w));
            }
        }
    }

    /// Property: with a depth bound `d`, no cycle spans more than `d` participants.
    #[test]
    fn depth_bound_limits_cycle_size(
        (num_nodes, edges) in graph_strategy(),
        max_depth in 1usize..6,
        policy in prop::sample::select(vec![
            EdgeRemoval::None,
            EdgeRemoval::CurrentNode,
            EdgeRemoval::FailedCycleNodes,
        ]),
    ) {
        let mut graph = build_graph(num_nodes, &edges);
        let finder = DfsCycleFinder::new(SearchOptions {
            max_depth: Some(max_depth),
            edge_removal: policy,
            ..SearchOptions::default()
        }).unwrap();

        let report = Enumerator::new(finder, WeightClasses::Unfiltered)
            .run_class(&mut graph, None)
            .unwrap();

        for cycle in &report.cycles {
            prop_assert!(cycle.is_closed());
            prop_assert!(cycle.distinct_participants() <= max_depth);
        }
    }

    /// Property: each extraction consumes its edges, so a class drains in a
    /// bounded number of iterations and no item is ever used twice.
    #[test]
    fn enumeration_consumes_edges(
        (num_nodes, edges) in graph_strategy(),
        weight in prop::sample::select(WEIGHTS.to_vec()),
    ) {
        let mut graph = build_graph(num_nodes, &edges);
        let initial = graph.edge_count_with_weight(weight);

        let report = Enumerator::new(DfsCycleFinder::default(), WeightClasses::Unfiltered)
            .run_class(&mut graph, Some(weight))
            .unwrap();

        let consumed: usize = report.cycles.iter().map(|c| c.len()).sum();
        prop_assert!(report.count() <= initial);
        prop_assert_eq!(graph.edge_count_with_weight(weight), initial - consumed);

        let mut keys = HashSet::new();
        for cycle in &report.cycles {
            for edge in &cycle.edges {
                prop_assert!(keys.insert(edge.key.clone()));
            }
        }

        // Nothing of this weight is left that could still close a loop.
        let again = DfsCycleFinder::default().find_cycle(&mut graph, Some(weight)).unwrap();
        prop_assert!(again.is_none());
    }

    /// Property: searching a weight class on its own copy of the graph gives
    /// the same cycles as searching it on the full graph.
    #[test]
    fn weight_class_copy_matches_full_graph(
        (num_nodes, edges) in graph_strategy(),
        max_depth in prop::option::of(2usize..6),
    ) {
        let options = SearchOptions { max_depth, ..SearchOptions::default() };
        let classes = WeightClasses::range(50, 150, 50).unwrap();
        let enumerator = Enumerator::new(DfsCycleFinder::new(options).unwrap(), classes);

        let mut full = build_graph(num_nodes, &edges);
        let sequential = enumerator.run(&mut full).unwrap();

        let reference = build_graph(num_nodes, &edges);
        for class in &sequential.classes {
            let weight = class.weight.unwrap();
            let mut copy = reference.weight_class(weight);
            let isolated = enumerator.run_class(&mut copy, Some(weight)).unwrap();
            prop_assert_eq!(&isolated.cycles, &class.cycles);
        }
    }
}
