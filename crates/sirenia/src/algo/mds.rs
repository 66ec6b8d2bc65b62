use nalgebra::{DMatrix, SymmetricEigen};

use crate::error::OracleError;
use crate::oracle::{Embedding, EmbeddingEngine, PivotDistances};

const EIGEN_EPS: f64 = 1e-9;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("distance matrix has {rows} rows for {pivots} pivots")]
    Shape { rows: usize, pivots: usize },
    #[error("pivot index {pivot} is outside the {nodes} node columns")]
    PivotOutOfRange { pivot: usize, nodes: usize },
    #[error("landmark scaling produced non-finite coordinates")]
    Singular,
}

/// Landmark classical scaling.
///
/// Squared pivot-to-pivot distances are double-centered and eigendecomposed; every node is then
/// triangulated from its squared distances to the pivots. Unreachable cells are clamped to one
/// more than the largest finite distance so disconnected parts are pushed apart instead of
/// poisoning the solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkMds;

impl EmbeddingEngine for LandmarkMds {
    fn embed(&self, distances: &PivotDistances) -> Result<Embedding, OracleError> {
        let k = distances.pivot_count();
        let n = distances.node_count();
        if k == 0 || distances.matrix.nrows() != k {
            return Err(EmbeddingError::Shape {
                rows: distances.matrix.nrows(),
                pivots: k,
            }
            .into());
        }
        if let Some(&pivot) = distances.pivots.iter().find(|&&p| p >= n) {
            return Err(EmbeddingError::PivotOutOfRange { pivot, nodes: n }.into());
        }

        let squared = clamped_squares(&distances.matrix);

        let mut landmarks = DMatrix::<f64>::zeros(k, k);
        for i in 0..k {
            for j in 0..k {
                landmarks[(i, j)] =
                    0.5 * (squared[(i, distances.pivots[j])] + squared[(j, distances.pivots[i])]);
            }
        }
        let means: Vec<f64> = (0..k).map(|i| landmarks.row(i).mean()).collect();
        let centered = double_center(&landmarks);

        let eigen = SymmetricEigen::new(centered);
        if eigen.eigenvalues.iter().any(|v| !v.is_finite())
            || eigen.eigenvectors.iter().any(|v| !v.is_finite())
        {
            return Err(EmbeddingError::Singular.into());
        }

        let mut axes: Vec<usize> = (0..k).collect();
        axes.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .total_cmp(&eigen.eigenvalues[a])
                .then(a.cmp(&b))
        });
        let scale = eigen.eigenvalues.iter().fold(1.0_f64, |m, v| m.max(v.abs()));

        let mut coords = [vec![0.0; n], vec![0.0; n]];
        for (out, &axis) in coords.iter_mut().zip(axes.iter()) {
            let lambda = eigen.eigenvalues[axis];
            if lambda <= EIGEN_EPS * scale {
                continue;
            }
            let v = oriented(eigen.eigenvectors.column(axis).iter().copied().collect());
            let inv_sqrt = 1.0 / lambda.sqrt();
            for (node, slot) in out.iter_mut().enumerate() {
                let mut acc = 0.0;
                for i in 0..k {
                    acc += v[i] * (squared[(i, node)] - means[i]);
                }
                *slot = -0.5 * acc * inv_sqrt;
            }
        }

        let [x, y] = coords;
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(EmbeddingError::Singular.into());
        }
        Ok(Embedding { x, y })
    }
}

fn clamped_squares(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let max_finite = matrix
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0_f64, f64::max);
    let clamp = max_finite + 1.0;

    let unreachable = matrix.iter().filter(|d| !d.is_finite()).count();
    if unreachable > 0 {
        tracing::warn!(cells = unreachable, clamp, "clamping unreachable pivot distances");
    }

    matrix.map(|d| {
        let d = if d.is_finite() { d.max(0.0) } else { clamp };
        d * d
    })
}

fn double_center(m: &DMatrix<f64>) -> DMatrix<f64> {
    let k = m.nrows();
    let row_means: Vec<f64> = (0..k).map(|i| m.row(i).mean()).collect();
    let col_means: Vec<f64> = (0..k).map(|j| m.column(j).mean()).collect();
    let total = row_means.iter().sum::<f64>() / k as f64;
    DMatrix::from_fn(k, k, |i, j| {
        -0.5 * (m[(i, j)] - row_means[i] - col_means[j] + total)
    })
}

/// Flips an eigenvector so its largest-magnitude component is positive, making the sign
/// independent of the solver.
fn oriented(mut v: Vec<f64>) -> Vec<f64> {
    let mut pivot = 0.0_f64;
    for &c in &v {
        if c.abs() > pivot.abs() + 1e-12 {
            pivot = c;
        }
    }
    if pivot < 0.0 {
        for c in &mut v {
            *c = -*c;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::UNREACHABLE;

    fn path_distances(n: usize, pivots: &[usize]) -> PivotDistances {
        let mut matrix = DMatrix::<f64>::zeros(pivots.len(), n);
        for (row, &p) in pivots.iter().enumerate() {
            for col in 0..n {
                matrix[(row, col)] = (p as f64 - col as f64).abs();
            }
        }
        PivotDistances {
            pivots: pivots.to_vec(),
            matrix,
        }
    }

    #[test]
    fn recovers_a_path_on_one_axis() {
        let e = LandmarkMds.embed(&path_distances(5, &[0, 4, 2])).unwrap();
        for i in 1..5 {
            let step = (e.x[i] - e.x[i - 1]).abs();
            assert!((step - 1.0).abs() < 1e-6, "step {i} was {step}");
        }
        assert!(e.y.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn single_pivot_collapses_to_the_origin() {
        let e = LandmarkMds.embed(&path_distances(3, &[0])).unwrap();
        assert_eq!(e.x, vec![0.0; 3]);
        assert_eq!(e.y, vec![0.0; 3]);
    }

    #[test]
    fn unreachable_cells_stay_finite() {
        let mut d = path_distances(3, &[0, 2]);
        d.matrix[(0, 2)] = UNREACHABLE;
        d.matrix[(1, 0)] = UNREACHABLE;
        let e = LandmarkMds.embed(&d).unwrap();
        assert!(e.x.iter().chain(e.y.iter()).all(|v| v.is_finite()));
        assert!((e.x[0] - e.x[2]).abs() > 1.0);
    }

    #[test]
    fn rejects_mismatched_rows() {
        let mut d = path_distances(3, &[0, 2]);
        d.pivots.push(1);
        let err = LandmarkMds.embed(&d).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EmbeddingError>(),
            Some(EmbeddingError::Shape { rows: 2, pivots: 3 })
        ));
    }

    #[test]
    fn rejects_pivots_outside_the_matrix() {
        let mut d = path_distances(3, &[0, 2]);
        d.pivots[1] = 9;
        let err = LandmarkMds.embed(&d).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EmbeddingError>(),
            Some(EmbeddingError::PivotOutOfRange { pivot: 9, nodes: 3 })
        ));
    }
}
