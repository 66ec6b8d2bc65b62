//! Collaborator seams of the ranking layout.
//!
//! Each stage the orchestrator delegates to is a trait here. Every per-node vector crossing these
//! seams is indexed by the run's [`NodeOrder`]; implementations must neither reorder nor drop
//! nodes.

use nalgebra::DMatrix;

use crate::error::OracleError;
use crate::graph::{Graph, NodeOrder};

/// Marker stored in a [`PivotDistances`] cell when the node cannot be reached from the pivot.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Distances from a set of landmark nodes to every node.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotDistances {
    /// Canonical indices of the pivots actually used, one per matrix row.
    pub pivots: Vec<usize>,
    /// `pivots.len() × node_count`; columns follow the canonical node order.
    pub matrix: DMatrix<f64>,
}

impl PivotDistances {
    pub fn pivot_count(&self) -> usize {
        self.pivots.len()
    }

    pub fn node_count(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn is_reachable(&self, pivot_row: usize, node: usize) -> bool {
        self.matrix[(pivot_row, node)].is_finite()
    }
}

/// Two coordinates per node, in canonical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embedding {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

pub trait DistanceOracle {
    /// Selects `pivot_count` landmarks and measures their distance to every node.
    fn pivot_distances(
        &self,
        graph: &Graph,
        order: &NodeOrder,
        pivot_count: usize,
    ) -> Result<PivotDistances, OracleError>;
}

pub trait EmbeddingEngine {
    /// Turns landmark distances into two coordinates per node that approximately preserve them.
    fn embed(&self, distances: &PivotDistances) -> Result<Embedding, OracleError>;
}

pub trait CentralityOracle {
    /// PageRank score per node. `directed == false` treats every edge as bidirectional.
    fn page_rank(
        &self,
        graph: &Graph,
        order: &NodeOrder,
        damping: f64,
        directed: bool,
    ) -> Result<Vec<f64>, OracleError>;
}

pub trait OverlapResolver {
    /// Moves node centers so that no two node shapes come closer than `separation`.
    fn remove_overlaps(&self, graph: &mut Graph, separation: f64) -> Result<(), OracleError>;
}

pub trait EdgeRouter {
    /// Gives every edge a straight polyline between its endpoints, clipped to their shapes.
    fn route_straight(&self, graph: &mut Graph) -> Result<(), OracleError>;
}
