use crate::error::OracleError;
use crate::graph::{Graph, Node, Point, Polyline};
use crate::oracle::EdgeRouter;

const MIN_SELF_LOOP_EXTENT: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("edge {edge_id} references a missing node")]
    MissingEndpoint { edge_id: String },
}

/// Center-to-center segments clipped to both endpoint shapes.
///
/// Self loops leave and re-enter the node's right side through a small rectangular detour.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouter;

impl EdgeRouter for StraightLineRouter {
    fn route_straight(&self, graph: &mut Graph) -> Result<(), OracleError> {
        let mut curves: Vec<Polyline> = Vec::with_capacity(graph.edge_count());
        for e in graph.edges() {
            let (Some(source), Some(target)) = (graph.node(&e.source), graph.node(&e.target))
            else {
                return Err(RoutingError::MissingEndpoint {
                    edge_id: e.id.clone(),
                }
                .into());
            };
            let curve = if e.is_self_loop() {
                self_loop(source)
            } else {
                straight(source, target)
            };
            curves.push(curve);
        }

        for (e, curve) in graph.edges_mut().iter_mut().zip(curves) {
            e.curve = Some(curve);
        }
        Ok(())
    }
}

fn straight(source: &Node, target: &Node) -> Polyline {
    if source.center == target.center {
        return Polyline::new(vec![source.center, target.center]);
    }
    let start = source.shape.intersect(source.center, target.center);
    let end = target.shape.intersect(target.center, source.center);
    Polyline::new(vec![start, end])
}

fn self_loop(node: &Node) -> Polyline {
    let bb = node.bounding_box();
    let c = node.center;
    let extent = (bb.height / 2.0).max(MIN_SELF_LOOP_EXTENT);
    let dy = bb.height / 4.0;
    let right = bb.right();
    Polyline::new(vec![
        Point::new(right, c.y - dy),
        Point::new(right + extent, c.y - dy),
        Point::new(right + extent, c.y + dy),
        Point::new(right, c.y + dy),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Shape;

    fn two_nodes() -> Graph {
        let mut g = Graph::new();
        g.add_node(Node::new("a", Shape::rectangle(20.0, 10.0))).center = Point::new(0.0, 0.0);
        g.add_node(Node::new("b", Shape::ellipse(10.0, 10.0))).center = Point::new(100.0, 0.0);
        g
    }

    #[test]
    fn clips_both_ends_to_the_shapes() {
        let mut g = two_nodes();
        g.connect("a", "b");
        StraightLineRouter.route_straight(&mut g).unwrap();
        let curve = g.edges()[0].curve.as_ref().unwrap();
        assert_eq!(curve.points, vec![Point::new(10.0, 0.0), Point::new(95.0, 0.0)]);
    }

    #[test]
    fn self_loops_stay_on_the_right_side() {
        let mut g = two_nodes();
        g.connect("a", "a");
        StraightLineRouter.route_straight(&mut g).unwrap();
        let curve = g.edges()[0].curve.as_ref().unwrap();
        assert_eq!(curve.points.len(), 4);
        assert!(curve.points.iter().all(|p| p.x >= 10.0));
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let mut g = two_nodes();
        g.connect("a", "ghost");
        let err = StraightLineRouter.route_straight(&mut g).unwrap_err();
        assert!(err.downcast_ref::<RoutingError>().is_some());
        assert!(g.edges()[0].curve.is_none());
    }
}
