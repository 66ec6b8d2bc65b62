use crate::error::OracleError;
use crate::graph::Graph;
use crate::oracle::OverlapResolver;

/// Slack allowed when comparing gaps against the separation, absorbing rounding in the pushes.
pub const SEPARATION_TOLERANCE: f64 = 1e-6;

const DEFAULT_MAX_SWEEPS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum OverlapError {
    #[error("node {node} has a non-finite center")]
    NonFiniteCenter { node: String },
}

/// Pairwise separation by minimal axis translation.
///
/// Every sweep visits node pairs in left-to-right order; a pair closer than the separation on
/// both axes is pushed apart along the axis needing the smaller move, each node taking half.
/// Nodes sharing a coordinate split with the lower canonical index moving toward negative.
///
/// If overlaps survive `max_sweeps`, a final left-to-right pass shifts each remaining offender
/// right of the node it collides with. That pass always terminates with no overlaps left.
#[derive(Debug, Clone, Copy)]
pub struct SeparationOverlapRemoval {
    pub max_sweeps: usize,
}

impl Default for SeparationOverlapRemoval {
    fn default() -> Self {
        Self {
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Item {
    cx: f64,
    cy: f64,
    half_w: f64,
    half_h: f64,
}

impl Item {
    fn left(&self) -> f64 {
        self.cx - self.half_w
    }

    fn right(&self) -> f64 {
        self.cx + self.half_w
    }
}

fn gaps(a: &Item, b: &Item) -> (f64, f64) {
    (
        (a.cx - b.cx).abs() - (a.half_w + b.half_w),
        (a.cy - b.cy).abs() - (a.half_h + b.half_h),
    )
}

fn too_close(a: &Item, b: &Item, separation: f64) -> bool {
    let (gx, gy) = gaps(a, b);
    gx < separation - SEPARATION_TOLERANCE && gy < separation - SEPARATION_TOLERANCE
}

/// Direction `b` moves away from `a`; ties resolved by canonical index.
fn direction(from: f64, to: f64, a_idx: usize, b_idx: usize) -> f64 {
    if to > from {
        1.0
    } else if to < from {
        -1.0
    } else if b_idx > a_idx {
        1.0
    } else {
        -1.0
    }
}

fn separate(items: &mut [Item], i: usize, j: usize, separation: f64) {
    let (gx, gy) = gaps(&items[i], &items[j]);
    let need_x = separation - gx;
    let need_y = separation - gy;

    if need_x <= need_y {
        let dir = direction(items[i].cx, items[j].cx, i, j);
        items[i].cx -= dir * need_x / 2.0;
        items[j].cx += dir * need_x / 2.0;
    } else {
        let dir = direction(items[i].cy, items[j].cy, i, j);
        items[i].cy -= dir * need_y / 2.0;
        items[j].cy += dir * need_y / 2.0;
    }
}

fn collect_items(graph: &Graph) -> Result<Vec<Item>, OverlapError> {
    graph
        .nodes()
        .map(|n| {
            if !n.center.is_finite() {
                return Err(OverlapError::NonFiniteCenter { node: n.id.clone() });
            }
            Ok(Item {
                cx: n.center.x,
                cy: n.center.y,
                half_w: n.shape.width() / 2.0,
                half_h: n.shape.height() / 2.0,
            })
        })
        .collect()
}

/// Canonical index pairs whose shapes are closer than `separation` on both axes.
pub fn overlapping_pairs(graph: &Graph, separation: f64) -> Vec<(usize, usize)> {
    let Ok(items) = collect_items(graph) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if too_close(&items[i], &items[j], separation) {
                out.push((i, j));
            }
        }
    }
    out
}

impl OverlapResolver for SeparationOverlapRemoval {
    fn remove_overlaps(&self, graph: &mut Graph, separation: f64) -> Result<(), OracleError> {
        let mut items = collect_items(graph)?;
        if items.len() < 2 {
            return Ok(());
        }

        let mut by_left: Vec<usize> = (0..items.len()).collect();
        for sweep in 0..self.max_sweeps {
            by_left.sort_by(|&a, &b| {
                items[a]
                    .left()
                    .total_cmp(&items[b].left())
                    .then(a.cmp(&b))
            });

            let mut moved = 0usize;
            for (pos, &a) in by_left.iter().enumerate() {
                for &b in &by_left[pos + 1..] {
                    if items[b].left() >= items[a].right() + separation {
                        break;
                    }
                    let (i, j) = if a < b { (a, b) } else { (b, a) };
                    if too_close(&items[i], &items[j], separation) {
                        separate(&mut items, i, j, separation);
                        moved += 1;
                    }
                }
            }

            if moved == 0 {
                tracing::debug!(sweeps = sweep + 1, "overlap removal converged");
                write_back(graph, &items);
                return Ok(());
            }
        }

        tracing::warn!(
            sweeps = self.max_sweeps,
            "overlap sweeps exhausted, shifting remaining overlaps right"
        );
        shift_right_pass(&mut items, separation);
        write_back(graph, &items);
        Ok(())
    }
}

fn write_back(graph: &mut Graph, items: &[Item]) {
    for (node, item) in graph.nodes_mut().zip(items.iter()) {
        node.center.x = item.cx;
        node.center.y = item.cy;
    }
}

/// Places nodes in `x` order, moving each one right past any already placed node it is too
/// close to. A node only moves right, so it never re-enters a node it has cleared.
fn shift_right_pass(items: &mut [Item], separation: f64) {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[a].cx.total_cmp(&items[b].cx).then(a.cmp(&b)));

    let mut placed: Vec<usize> = Vec::with_capacity(items.len());
    for k in order {
        loop {
            let hit = placed
                .iter()
                .copied()
                .find(|&p| too_close(&items[p], &items[k], separation));
            let Some(p) = hit else {
                break;
            };
            items[k].cx = items[p].cx + items[p].half_w + items[k].half_w + separation;
        }
        placed.push(k);
    }
}
