use std::collections::VecDeque;

use nalgebra::DMatrix;

use crate::error::OracleError;
use crate::graph::{Graph, NodeOrder};
use crate::oracle::{DistanceOracle, PivotDistances, UNREACHABLE};

#[derive(Debug, thiserror::Error)]
pub enum DistanceError {
    #[error("at least one pivot is required")]
    NoPivots,
    #[error("requested {requested} pivots but the graph has only {nodes} nodes")]
    TooManyPivots { requested: usize, nodes: usize },
}

/// Unit-length shortest path distances from greedily spread pivots, ignoring edge direction.
///
/// The first pivot is canonical node 0. Each following pivot is the node farthest from every
/// pivot chosen so far (unreachable counts as farthest, ties go to the lower index).
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPivotDistances;

impl DistanceOracle for BfsPivotDistances {
    fn pivot_distances(
        &self,
        graph: &Graph,
        order: &NodeOrder,
        pivot_count: usize,
    ) -> Result<PivotDistances, OracleError> {
        let n = order.len();
        if pivot_count == 0 {
            return Err(DistanceError::NoPivots.into());
        }
        if pivot_count > n {
            return Err(DistanceError::TooManyPivots {
                requested: pivot_count,
                nodes: n,
            }
            .into());
        }

        let adjacency = order.undirected_adjacency(graph);
        let mut matrix = DMatrix::<f64>::from_element(pivot_count, n, UNREACHABLE);
        let mut pivots: Vec<usize> = Vec::with_capacity(pivot_count);
        let mut min_dist: Vec<f64> = vec![UNREACHABLE; n];
        let mut chosen: Vec<bool> = vec![false; n];

        let mut pivot = 0usize;
        for row in 0..pivot_count {
            pivots.push(pivot);
            chosen[pivot] = true;
            bfs_fill_row(pivot, row, &adjacency, &mut matrix);

            for (col, d) in min_dist.iter_mut().enumerate() {
                *d = d.min(matrix[(row, col)]);
            }
            if row + 1 < pivot_count {
                pivot = farthest_unchosen(&min_dist, &chosen);
            }
        }

        Ok(PivotDistances { pivots, matrix })
    }
}

fn bfs_fill_row(pivot: usize, row: usize, adjacency: &[Vec<usize>], matrix: &mut DMatrix<f64>) {
    let mut hops: Vec<Option<u32>> = vec![None; adjacency.len()];
    let mut q: VecDeque<usize> = VecDeque::new();

    hops[pivot] = Some(0);
    q.push_back(pivot);

    while let Some(v) = q.pop_front() {
        let next = hops[v].unwrap_or(0).saturating_add(1);
        for &u in &adjacency[v] {
            if hops[u].is_none() {
                hops[u] = Some(next);
                q.push_back(u);
            }
        }
    }

    for (col, h) in hops.into_iter().enumerate() {
        matrix[(row, col)] = h.map_or(UNREACHABLE, f64::from);
    }
}

fn farthest_unchosen(min_dist: &[f64], chosen: &[bool]) -> usize {
    let mut best = 0usize;
    let mut best_d = f64::NEG_INFINITY;
    for (i, &d) in min_dist.iter().enumerate() {
        if chosen[i] {
            continue;
        }
        if d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Shape};

    fn path(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_node(Node::new(format!("n{i}"), Shape::rectangle(10.0, 10.0)));
        }
        for i in 1..n {
            g.connect(format!("n{}", i - 1), format!("n{i}"));
        }
        g
    }

    #[test]
    fn spreads_pivots_to_the_far_end_first() {
        let g = path(5);
        let order = NodeOrder::capture(&g);
        let d = BfsPivotDistances.pivot_distances(&g, &order, 3).unwrap();
        assert_eq!(d.pivots, vec![0, 4, 2]);
        assert_eq!(d.matrix.nrows(), 3);
        assert_eq!(d.matrix.ncols(), 5);
        let row0: Vec<f64> = d.matrix.row(0).iter().copied().collect();
        assert_eq!(row0, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn ignores_edge_direction() {
        let mut g = path(3);
        g.connect("n2", "n0");
        let order = NodeOrder::capture(&g);
        let d = BfsPivotDistances.pivot_distances(&g, &order, 1).unwrap();
        let row: Vec<f64> = d.matrix.row(0).iter().copied().collect();
        assert_eq!(row, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn marks_other_components_unreachable() {
        let mut g = path(2);
        g.add_node(Node::new("lonely", Shape::rectangle(10.0, 10.0)));
        let order = NodeOrder::capture(&g);
        let d = BfsPivotDistances.pivot_distances(&g, &order, 2).unwrap();
        assert_eq!(d.pivots, vec![0, 2]);
        assert!(!d.is_reachable(0, 2));
        assert!(d.is_reachable(1, 2));
        assert_eq!(d.matrix[(1, 0)], UNREACHABLE);
    }

    #[test]
    fn rejects_more_pivots_than_nodes() {
        let g = path(2);
        let order = NodeOrder::capture(&g);
        let err = BfsPivotDistances
            .pivot_distances(&g, &order, 3)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DistanceError>(),
            Some(DistanceError::TooManyPivots {
                requested: 3,
                nodes: 2
            })
        ));
    }
}
