pub mod enumerator;
pub mod graph;
pub mod solver;
pub mod traits;
pub mod traversal;

pub use enumerator::{ClassReport, Enumeration, Enumerator, WeightClasses};
pub use graph::{EdgeData, EdgeRef, WishGraph};
pub use solver::{DfsCycleFinder, EdgeRemoval, SearchBudget, SearchOptions};
pub use traits::CycleFinder;
pub use traversal::EdgeDfs;
