//! Ranking layout: landmark MDS on one axis, PageRank on the other.
//!
//! The run is strictly sequential: distances, embedding, centrality, placement, overlap removal,
//! routing, bounding box. All geometry is computed on a staged copy of the graph and committed
//! only once every stage has succeeded, so a failed or cancelled run leaves the caller's graph
//! as it was.

use crate::algo::{
    BfsPivotDistances, LandmarkMds, PageRank, SeparationOverlapRemoval, StraightLineRouter,
};
use crate::cancel::CancelToken;
use crate::error::{Error, OracleError, Result, Stage};
use crate::graph::{Graph, NodeOrder, Point, Rect};
use crate::oracle::{
    CentralityOracle, DistanceOracle, Embedding, EdgeRouter, EmbeddingEngine, OverlapResolver,
};
use crate::settings::LayoutSettings;
use crate::standardize::standardize;

pub const PAGE_RANK_DAMPING: f64 = 0.85;

// The centrality seam supports directed PageRank, but this layout always ranks on the
// undirected graph.
const DIRECTED_CENTRALITY: bool = false;

pub struct RankingLayout {
    settings: LayoutSettings,
    distances: Box<dyn DistanceOracle>,
    embedding: Box<dyn EmbeddingEngine>,
    centrality: Box<dyn CentralityOracle>,
    overlap: Box<dyn OverlapResolver>,
    router: Box<dyn EdgeRouter>,
}

impl std::fmt::Debug for RankingLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingLayout")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RankingLayout {
    /// Ranking layout wired to the default collaborators.
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            distances: Box::new(BfsPivotDistances),
            embedding: Box::new(LandmarkMds),
            centrality: Box::new(PageRank::default()),
            overlap: Box::new(SeparationOverlapRemoval::default()),
            router: Box::new(StraightLineRouter),
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn with_distance_oracle(mut self, oracle: impl DistanceOracle + 'static) -> Self {
        self.distances = Box::new(oracle);
        self
    }

    pub fn with_embedding_engine(mut self, engine: impl EmbeddingEngine + 'static) -> Self {
        self.embedding = Box::new(engine);
        self
    }

    pub fn with_centrality_oracle(mut self, oracle: impl CentralityOracle + 'static) -> Self {
        self.centrality = Box::new(oracle);
        self
    }

    pub fn with_overlap_resolver(mut self, resolver: impl OverlapResolver + 'static) -> Self {
        self.overlap = Box::new(resolver);
        self
    }

    pub fn with_edge_router(mut self, router: impl EdgeRouter + 'static) -> Self {
        self.router = Box::new(router);
        self
    }

    pub fn run(&self, graph: &mut Graph) -> Result<()> {
        self.run_with_cancel(graph, &CancelToken::new())
    }

    pub fn run_with_cancel(&self, graph: &mut Graph, cancel: &CancelToken) -> Result<()> {
        self.settings.validate()?;
        graph.validate()?;

        let _span = tracing::debug_span!(
            "ranking_layout",
            nodes = graph.node_count(),
            edges = graph.edge_count()
        )
        .entered();

        let order = NodeOrder::capture(graph);
        if order.is_empty() {
            tracing::debug!("empty graph, nothing to place");
            graph.set_bounding_box(Rect::EMPTY);
            return Ok(());
        }

        let staged = self.compute(graph, &order, cancel)?;
        *graph = staged;
        Ok(())
    }

    fn compute(&self, graph: &Graph, order: &NodeOrder, cancel: &CancelToken) -> Result<Graph> {
        let n = order.len();
        let pivot_count = n.min(self.settings.pivot_count);

        checkpoint(cancel, Stage::Distance)?;
        tracing::debug!(pivot_count, requested = self.settings.pivot_count, "pivot distances");
        let distances = self
            .distances
            .pivot_distances(graph, order, pivot_count)
            .map_err(failed(Stage::Distance))?;
        expect_len(Stage::Distance, pivot_count, distances.pivot_count())?;
        expect_len(Stage::Distance, pivot_count, distances.matrix.nrows())?;
        expect_len(Stage::Distance, n, distances.node_count())?;

        checkpoint(cancel, Stage::Embedding)?;
        let Embedding { mut x, y } = self
            .embedding
            .embed(&distances)
            .map_err(failed(Stage::Embedding))?;
        expect_len(Stage::Embedding, n, x.len())?;
        expect_len(Stage::Embedding, n, y.len())?;
        expect_finite(Stage::Embedding, &x)?;
        standardize(&mut x);
        // The second embedding axis does not feed placement.
        drop(y);

        checkpoint(cancel, Stage::Centrality)?;
        let mut p = self
            .centrality
            .page_rank(graph, order, PAGE_RANK_DAMPING, DIRECTED_CENTRALITY)
            .map_err(failed(Stage::Centrality))?;
        expect_len(Stage::Centrality, n, p.len())?;
        expect_finite(Stage::Centrality, &p)?;
        standardize(&mut p);

        let mut staged = graph.clone();
        for (i, id) in order.iter().enumerate() {
            if let Some(node) = staged.node_mut(id) {
                node.center = Point::new(
                    (x[i] * self.settings.scale_x).trunc(),
                    (p[i].sqrt() * self.settings.scale_y).trunc(),
                );
            }
        }
        tracing::debug!(nodes = n, "initial centers assigned");

        checkpoint(cancel, Stage::Overlap)?;
        self.overlap
            .remove_overlaps(&mut staged, self.settings.node_separation)
            .map_err(failed(Stage::Overlap))?;
        expect_len(Stage::Overlap, n, staged.node_count())?;
        if staged.nodes().any(|node| !node.center.is_finite()) {
            return Err(Error::NonFinite {
                stage: Stage::Overlap,
            });
        }

        checkpoint(cancel, Stage::Routing)?;
        self.router
            .route_straight(&mut staged)
            .map_err(failed(Stage::Routing))?;
        expect_len(Stage::Routing, graph.edge_count(), staged.edge_count())?;

        let bb = staged.pump_bounding_box(self.settings.margin);
        tracing::debug!(
            left = bb.left,
            top = bb.top,
            width = bb.width,
            height = bb.height,
            "bounding box"
        );
        staged.set_bounding_box(bb);
        Ok(staged)
    }
}

fn checkpoint(cancel: &CancelToken, before: Stage) -> Result<()> {
    if cancel.is_cancelled() {
        tracing::debug!(%before, "layout cancelled");
        return Err(Error::Cancelled { before });
    }
    Ok(())
}

fn failed(stage: Stage) -> impl FnOnce(OracleError) -> Error {
    move |source| Error::Oracle { stage, source }
}

fn expect_len(stage: Stage, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::Misaligned {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

fn expect_finite(stage: Stage, values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite { stage });
    }
    Ok(())
}
