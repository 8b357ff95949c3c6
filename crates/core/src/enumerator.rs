use super::graph::WishGraph;
use super::traits::CycleFinder;
use common::{error::Error, types::Cycle};
use tracing::{debug, info};

/// Which weight filters the enumerator runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightClasses {
    /// A single pass over every edge regardless of weight.
    Unfiltered,
    /// One pass per weight in `min, min + step, ...` below `max + step`.
    Range { min: u64, max: u64, step: u64 },
}

impl WeightClasses {
    /// # Errors
    /// Returns `Error::InvalidConfig` if `step` is zero or `min > max`.
    pub fn range(min: u64, max: u64, step: u64) -> Result<Self, Error> {
        if step == 0 {
            return Err(Error::InvalidConfig(
                "value step must be a positive integer".to_string(),
            ));
        }
        if min > max {
            return Err(Error::InvalidConfig(format!(
                "minimum value {min} exceeds maximum value {max}"
            )));
        }
        Ok(WeightClasses::Range { min, max, step })
    }

    /// The filter of every pass, in processing order.
    ///
    /// A range whose bounds are not aligned on `step` yields one filter past
    /// `max`, the last multiple below `max + step`.
    pub fn filters(&self) -> Vec<Option<u64>> {
        match *self {
            WeightClasses::Unfiltered => vec![None],
            WeightClasses::Range { min, max, step } => {
                let end = max.saturating_add(step);
                std::iter::successors(Some(min), |weight| weight.checked_add(step))
                    .take_while(|weight| *weight < end)
                    .map(Some)
                    .collect()
            }
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, WeightClasses::Range { .. })
    }
}

/// Cycles extracted for a single weight filter, in extraction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReport {
    pub weight: Option<u64>,
    pub cycles: Vec<Cycle>,
}

impl ClassReport {
    pub fn count(&self) -> usize {
        self.cycles.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    pub classes: Vec<ClassReport>,
}

impl Enumeration {
    pub fn total_cycles(&self) -> usize {
        self.classes.iter().map(ClassReport::count).sum()
    }

    /// Per-class cycle counts, in processing order.
    pub fn counts(&self) -> Vec<(Option<u64>, usize)> {
        self.classes
            .iter()
            .map(|class| (class.weight, class.count()))
            .collect()
    }

    /// Every cycle tagged with the filter it was found under.
    pub fn cycles(&self) -> impl Iterator<Item = (Option<u64>, &Cycle)> + '_ {
        self.classes
            .iter()
            .flat_map(|class| class.cycles.iter().map(move |cycle| (class.weight, cycle)))
    }
}

/// Greedy extraction loop: find a cycle, consume its edges, repeat.
///
/// Each success removes at least one edge of the class being searched, so a
/// class terminates after at most as many iterations as it has edges.
#[derive(Debug, Clone)]
pub struct Enumerator<F> {
    finder: F,
    classes: WeightClasses,
}

impl<F> Enumerator<F>
where
    F: CycleFinder,
{
    pub fn new(finder: F, classes: WeightClasses) -> Self {
        Enumerator { finder, classes }
    }

    pub fn classes(&self) -> WeightClasses {
        self.classes
    }

    /// Runs every configured weight class against `graph`.
    pub fn run(&self, graph: &mut WishGraph) -> Result<Enumeration, Error> {
        let mut enumeration = Enumeration::default();

        for weight in self.classes.filters() {
            let report = self.run_class(graph, weight)?;
            enumeration.classes.push(report);
        }

        info!(
            total = enumeration.total_cycles(),
            remaining_edges = graph.edge_count(),
            "Cycle enumeration complete"
        );

        Ok(enumeration)
    }

    /// Extracts cycles for one filter until the finder reports none.
    pub fn run_class(&self, graph: &mut WishGraph, weight: Option<u64>) -> Result<ClassReport, Error> {
        let mut cycles = Vec::new();

        while let Some(cycle) = self.finder.find_cycle(graph, weight)? {
            let removed = graph.remove_edges(
                cycle
                    .edges
                    .iter()
                    .map(|e| (e.tail.as_str(), e.head.as_str(), e.key.as_str())),
            );
            debug!(?weight, length = cycle.len(), removed, "Consumed cycle");

            cycles.push(cycle);
        }

        info!(?weight, cycles = cycles.len(), "Weight class exhausted");

        Ok(ClassReport { weight, cycles })
    }
}
