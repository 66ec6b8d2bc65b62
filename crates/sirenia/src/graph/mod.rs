use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod shape;

pub use shape::Shape;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Zero-extent rectangle at the origin; the bounding box of a graph without nodes.
    pub const EMPTY: Rect = Rect {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self {
            left: center.x - width / 2.0,
            top: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self {
            left,
            top,
            width: a.x.max(b.x) - left,
            height: a.y.max(b.y) - top,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        Rect {
            left,
            top,
            width: (self.right().max(other.right()) - left).max(0.0),
            height: (self.bottom().max(other.bottom()) - top).max(0.0),
        }
    }

    pub fn expand(&self, margin: f64) -> Rect {
        Rect {
            left: self.left - margin,
            top: self.top - margin,
            width: (self.width + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        let (first, rest) = self.points.split_first()?;
        let mut bb = Rect::from_points(*first, *first);
        for p in rest {
            bb = bb.union(&Rect::from_points(*p, *p));
        }
        Some(bb)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub shape: Shape,
    pub center: Point,
}

impl Node {
    pub fn new(id: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: id.into(),
            shape,
            center: Point::default(),
        }
    }

    pub fn bounding_box(&self) -> Rect {
        self.shape.bounding_box(self.center)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Routed geometry; `None` until an edge router has run.
    pub curve: Option<Polyline>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            curve: None,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Geometry graph laid out in place. Node iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    bounding_box: Rect,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing any node with the same id in place.
    pub fn add_node(&mut self, node: Node) -> &mut Node {
        let entry = self.nodes.entry(node.id.clone());
        match entry {
            indexmap::map::Entry::Occupied(mut e) => {
                e.insert(node);
                e.into_mut()
            }
            indexmap::map::Entry::Vacant(e) => e.insert(node),
        }
    }

    pub fn add_edge(&mut self, edge: Edge) -> &mut Edge {
        self.edges.push(edge);
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    /// Adds an edge with a generated id (`e<index>`).
    pub fn connect(&mut self, source: impl Into<String>, target: impl Into<String>) -> &mut Edge {
        let id = format!("e{}", self.edges.len());
        self.add_edge(Edge::new(id, source, target))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, n)| n)
    }

    pub fn node_at_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_index_mut(index).map(|(_, n)| n)
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl ExactSizeIterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bb: Rect) {
        self.bounding_box = bb;
    }

    pub fn validate(&self) -> Result<()> {
        for e in &self.edges {
            for endpoint in [&e.source, &e.target] {
                if !self.nodes.contains_key(endpoint.as_str()) {
                    return Err(Error::MissingEndpoint {
                        edge_id: e.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Smallest rectangle holding every node shape and routed edge, grown by `margin`.
    ///
    /// A graph without nodes yields [`Rect::EMPTY`] regardless of the margin.
    pub fn pump_bounding_box(&self, margin: f64) -> Rect {
        if self.nodes.is_empty() {
            return Rect::EMPTY;
        }
        let mut boxes = self
            .nodes
            .values()
            .map(Node::bounding_box)
            .chain(
                self.edges
                    .iter()
                    .filter_map(|e| e.curve.as_ref().and_then(Polyline::bounding_box)),
            );
        let Some(first) = boxes.next() else {
            return Rect::EMPTY;
        };
        boxes.fold(first, |acc, r| acc.union(&r)).expand(margin)
    }
}

/// Canonical node ordering for one layout run.
///
/// Every per-node vector produced during a run is indexed by this ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeOrder {
    ids: IndexSet<String>,
}

impl NodeOrder {
    pub fn capture(graph: &Graph) -> Self {
        Self {
            ids: graph.nodes.keys().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get_index(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Canonical indices of an edge's source and target.
    pub fn endpoints(&self, edge: &Edge) -> Option<(usize, usize)> {
        Some((self.index_of(&edge.source)?, self.index_of(&edge.target)?))
    }

    /// Undirected neighbor lists (sorted, deduplicated, self loops dropped).
    pub fn undirected_adjacency(&self, graph: &Graph) -> Vec<Vec<usize>> {
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        for e in graph.edges() {
            let Some((a, b)) = self.endpoints(e) else {
                continue;
            };
            if a == b {
                continue;
            }
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for neigh in &mut adjacency {
            neigh.sort_unstable();
            neigh.dedup();
        }
        adjacency
    }
}
