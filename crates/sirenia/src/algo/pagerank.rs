use crate::error::OracleError;
use crate::graph::{Graph, NodeOrder};
use crate::oracle::CentralityOracle;

#[derive(Debug, thiserror::Error)]
pub enum CentralityError {
    #[error("damping factor must lie strictly between 0 and 1, got {damping}")]
    InvalidDamping { damping: f64 },
}

/// Power-iteration PageRank.
///
/// Starts from the uniform distribution; rank held by nodes without outgoing links is spread
/// evenly over all nodes each round. Self loops carry no rank.
#[derive(Debug, Clone, Copy)]
pub struct PageRank {
    pub max_iterations: usize,
    /// Stop once the L1 change between rounds drops below this.
    pub tolerance: f64,
}

impl Default for PageRank {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

impl CentralityOracle for PageRank {
    fn page_rank(
        &self,
        graph: &Graph,
        order: &NodeOrder,
        damping: f64,
        directed: bool,
    ) -> Result<Vec<f64>, OracleError> {
        if !(damping > 0.0 && damping < 1.0) {
            return Err(CentralityError::InvalidDamping { damping }.into());
        }
        let n = order.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut out_links: Vec<Vec<usize>> = vec![Vec::new(); n];
        for e in graph.edges() {
            let Some((s, t)) = order.endpoints(e) else {
                continue;
            };
            if s == t {
                continue;
            }
            out_links[s].push(t);
            if !directed {
                out_links[t].push(s);
            }
        }

        let nf = n as f64;
        let mut rank = vec![1.0 / nf; n];
        let mut next = vec![0.0; n];

        for iteration in 0..self.max_iterations {
            let dangling: f64 = out_links
                .iter()
                .zip(rank.iter())
                .filter(|(links, _)| links.is_empty())
                .map(|(_, r)| *r)
                .sum();
            let base = (1.0 - damping) / nf + damping * dangling / nf;
            next.fill(base);

            for (s, links) in out_links.iter().enumerate() {
                if links.is_empty() {
                    continue;
                }
                let share = damping * rank[s] / links.len() as f64;
                for &t in links {
                    next[t] += share;
                }
            }

            let delta: f64 = rank.iter().zip(next.iter()).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut rank, &mut next);
            if delta < self.tolerance {
                tracing::trace!(iteration, delta, "pagerank converged");
                break;
            }
        }

        Ok(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Shape};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::new();
        for id in nodes {
            g.add_node(Node::new(*id, Shape::rectangle(10.0, 10.0)));
        }
        for (s, t) in edges {
            g.connect(*s, *t);
        }
        g
    }

    #[test]
    fn scores_sum_to_one() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        let order = NodeOrder::capture(&g);
        for directed in [false, true] {
            let p = PageRank::default()
                .page_rank(&g, &order, 0.85, directed)
                .unwrap();
            assert_eq!(p.len(), 4);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(p.iter().all(|v| *v > 0.0));
        }
    }

    #[test]
    fn undirected_star_centre_outranks_leaves() {
        let g = graph(
            &["l1", "hub", "l2", "l3"],
            &[("l1", "hub"), ("l2", "hub"), ("l3", "hub")],
        );
        let order = NodeOrder::capture(&g);
        let p = PageRank::default().page_rank(&g, &order, 0.85, false).unwrap();
        assert!(p[1] > p[0]);
        assert!((p[0] - p[2]).abs() < 1e-12);
        assert!((p[0] - p[3]).abs() < 1e-12);
    }

    #[test]
    fn direction_matters_when_requested() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let order = NodeOrder::capture(&g);
        let undirected = PageRank::default().page_rank(&g, &order, 0.85, false).unwrap();
        let directed = PageRank::default().page_rank(&g, &order, 0.85, true).unwrap();
        assert!((undirected[0] - undirected[1]).abs() < 1e-12);
        assert!(directed[1] > directed[0]);
    }

    #[test]
    fn rejects_damping_outside_unit_interval() {
        let g = graph(&["a"], &[]);
        let order = NodeOrder::capture(&g);
        let err = PageRank::default()
            .page_rank(&g, &order, 1.0, false)
            .unwrap_err();
        assert!(err.downcast_ref::<CentralityError>().is_some());
    }
}
