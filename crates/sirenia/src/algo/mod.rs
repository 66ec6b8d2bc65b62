//! Default collaborators wired into [`crate::RankingLayout::new`].

pub mod mds;
pub mod overlap;
pub mod pagerank;
pub mod pivot_distances;
pub mod straight_edges;

pub use mds::{EmbeddingError, LandmarkMds};
pub use overlap::{OverlapError, SeparationOverlapRemoval, overlapping_pairs};
pub use pagerank::{CentralityError, PageRank};
pub use pivot_distances::{BfsPivotDistances, DistanceError};
pub use straight_edges::{RoutingError, StraightLineRouter};
