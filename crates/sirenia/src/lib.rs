#![forbid(unsafe_code)]

//! Headless ranking layout for directed graphs.
//!
//! Nodes are spread horizontally by a landmark multidimensional scaling of graph distances and
//! vertically by their (undirected) PageRank, then nudged apart so no shapes overlap and joined
//! by straight edges. Every numerical stage sits behind a trait in [`oracle`], with deterministic
//! defaults in [`algo`].

pub mod algo;
pub mod cancel;
pub mod error;
pub mod graph;
pub mod oracle;
pub mod ranking;
pub mod settings;
pub mod standardize;

pub use cancel::CancelToken;
pub use error::{Error, OracleError, Result, Stage};
pub use graph::{Edge, Graph, Node, NodeOrder, Point, Polyline, Rect, Shape};
pub use oracle::{
    CentralityOracle, DistanceOracle, EdgeRouter, Embedding, EmbeddingEngine, OverlapResolver,
    PivotDistances, UNREACHABLE,
};
pub use ranking::{PAGE_RANK_DAMPING, RankingLayout};
pub use settings::LayoutSettings;
pub use standardize::{DEGENERATE_FALLBACK, standardize};

/// Headless layout entry point using the default collaborators.
pub fn layout(graph: &mut Graph, settings: &LayoutSettings) -> Result<()> {
    RankingLayout::new(settings.clone()).run(graph)
}
