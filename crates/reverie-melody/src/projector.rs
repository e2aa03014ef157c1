//! The 2D projection seam.
//!
//! The melody mapper needs each distinct memory vector flattened to a point
//! in the plane. The dimensionality reducer is an interchangeable part, so
//! the seam is the [`Projector`] trait; the shipped implementation is a
//! deterministic 2-component PCA.

use crate::error::ProjectionError;

/// Trait for projecting high-dimensional vectors into 2D points.
///
/// Implementations must return one point per input vector, in input order.
/// `n_neighbors` is the neighborhood size hint for neighborhood-based
/// reducers; implementations that don't use one may ignore it.
pub trait Projector {
    fn project(
        &self,
        vectors: &[Vec<f32>],
        n_neighbors: usize,
    ) -> Result<Vec<[f32; 2]>, ProjectionError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// PCA Projector
// ─────────────────────────────────────────────────────────────────────────────

/// Power-iteration rounds per component.
const POWER_ITERATIONS: usize = 60;

/// Deterministic 2-component PCA projector.
///
/// Centers the input and extracts the top two principal directions by
/// power iteration with deflation. When the data is effectively
/// one-dimensional the second coordinate is zero for every point; only a
/// fully degenerate input (fewer than two points, ragged rows, zero total
/// variance, non-finite values) is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcaProjector;

impl Projector for PcaProjector {
    fn project(
        &self,
        vectors: &[Vec<f32>],
        _n_neighbors: usize,
    ) -> Result<Vec<[f32; 2]>, ProjectionError> {
        let n = vectors.len();
        if n < 2 {
            return Err(ProjectionError::Degenerate(format!(
                "need at least 2 points, got {n}"
            )));
        }
        let dims = vectors[0].len();
        if dims == 0 || vectors.iter().any(|v| v.len() != dims) {
            return Err(ProjectionError::Failed("ragged or empty input rows".to_string()));
        }
        if vectors.iter().flatten().any(|x| !x.is_finite()) {
            return Err(ProjectionError::Failed("non-finite input values".to_string()));
        }

        // Center the data.
        let mut mean = vec![0.0f64; dims];
        for v in vectors {
            for (m, &x) in mean.iter_mut().zip(v.iter()) {
                *m += x as f64;
            }
        }
        for m in &mut mean {
            *m /= n as f64;
        }
        let centered: Vec<Vec<f64>> = vectors
            .iter()
            .map(|v| v.iter().zip(mean.iter()).map(|(&x, &m)| x as f64 - m).collect())
            .collect();

        let total_variance: f64 = centered.iter().flatten().map(|x| x * x).sum();
        if total_variance <= f64::EPSILON {
            return Err(ProjectionError::Degenerate(
                "all points are identical (zero variance)".to_string(),
            ));
        }

        let first = principal_direction(&centered, None).ok_or_else(|| {
            ProjectionError::Failed("power iteration did not converge".to_string())
        })?;
        // Residual variance can legitimately be zero (collinear points);
        // in that case every second coordinate is zero.
        let second = principal_direction(&centered, Some(&first));

        let points = centered
            .iter()
            .map(|row| {
                let x = dot(row, &first) as f32;
                let y = second.as_ref().map(|s| dot(row, s) as f32).unwrap_or(0.0);
                [x, y]
            })
            .collect();
        Ok(points)
    }
}

/// Top principal direction of centered rows, orthogonal to `deflate` if
/// given. Returns `None` when the residual variance vanishes.
fn principal_direction(rows: &[Vec<f64>], deflate: Option<&[f64]>) -> Option<Vec<f64>> {
    let dims = rows[0].len();

    // Deterministic pseudo-random start so repeated runs agree exactly.
    let mut v: Vec<f64> = (0..dims)
        .map(|i| {
            let mut z = (i as u64).wrapping_add(0x9e37_79b9_7f4a_7c15);
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            ((z >> 11) as f64 / (1u64 << 53) as f64) - 0.5
        })
        .collect();
    orthogonalize(&mut v, deflate);
    normalize(&mut v)?;

    for _ in 0..POWER_ITERATIONS {
        // w = Xᵀ X v, computed row by row.
        let mut w = vec![0.0f64; dims];
        for row in rows {
            let score = dot(row, &v);
            for (wk, &rk) in w.iter_mut().zip(row.iter()) {
                *wk += score * rk;
            }
        }
        orthogonalize(&mut w, deflate);
        normalize(&mut w)?;

        let alignment = dot(&w, &v).abs();
        v = w;
        if alignment > 1.0 - 1e-10 {
            break;
        }
    }
    Some(v)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn orthogonalize(v: &mut [f64], against: Option<&[f64]>) {
    if let Some(basis) = against {
        let proj = dot(v, basis);
        for (x, &b) in v.iter_mut().zip(basis.iter()) {
            *x -= proj * b;
        }
    }
}

fn normalize(v: &mut [f64]) -> Option<()> {
    let norm = dot(v, v).sqrt();
    if norm <= 1e-12 {
        return None;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    Some(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed Projector
// ─────────────────────────────────────────────────────────────────────────────

/// Projector that returns a preset point per distinct input vector.
///
/// Used to script exact geometry in tests and demos.
#[derive(Debug, Clone)]
pub struct FixedProjector {
    points: Vec<[f32; 2]>,
}

impl FixedProjector {
    /// Create a projector that always returns `points`.
    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self { points }
    }
}

impl Projector for FixedProjector {
    fn project(
        &self,
        vectors: &[Vec<f32>],
        _n_neighbors: usize,
    ) -> Result<Vec<[f32; 2]>, ProjectionError> {
        if vectors.len() != self.points.len() {
            return Err(ProjectionError::Failed(format!(
                "expected {} vectors, got {}",
                self.points.len(),
                vectors.len()
            )));
        }
        Ok(self.points.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pca_preserves_order_and_count() {
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ];
        let points = PcaProjector.project(&vectors, 2).unwrap();
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_pca_is_deterministic() {
        let vectors = vec![
            vec![0.3, -0.2, 0.9, 0.1],
            vec![-0.5, 0.4, 0.2, -0.7],
            vec![0.1, 0.8, -0.3, 0.5],
        ];
        let a = PcaProjector.project(&vectors, 2).unwrap();
        let b = PcaProjector.project(&vectors, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pca_separates_far_points() {
        let vectors = vec![vec![10.0, 0.0], vec![-10.0, 0.0], vec![0.0, 0.1]];
        let points = PcaProjector.project(&vectors, 2).unwrap();
        // The two far-apart inputs stay far apart along the first axis.
        assert!((points[0][0] - points[1][0]).abs() > 10.0);
    }

    #[test]
    fn test_pca_two_points_yields_flat_second_axis() {
        let vectors = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let points = PcaProjector.project(&vectors, 2).unwrap();
        // Two points are always collinear: second coordinate collapses.
        assert_eq!(points[0][1], 0.0);
        assert_eq!(points[1][1], 0.0);
        assert!((points[0][0] - points[1][0]).abs() > 0.0);
    }

    #[test]
    fn test_pca_rejects_degenerate_input() {
        let one = vec![vec![1.0, 2.0]];
        assert!(matches!(
            PcaProjector.project(&one, 2),
            Err(ProjectionError::Degenerate(_))
        ));

        let identical = vec![vec![1.0, 2.0], vec![1.0, 2.0]];
        assert!(matches!(
            PcaProjector.project(&identical, 2),
            Err(ProjectionError::Degenerate(_))
        ));

        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            PcaProjector.project(&ragged, 2),
            Err(ProjectionError::Failed(_))
        ));
    }

    #[test]
    fn test_fixed_projector_checks_count() {
        let projector = FixedProjector::new(vec![[0.0, 0.0], [1.0, 2.0]]);
        let two = vec![vec![1.0], vec![2.0]];
        assert_eq!(
            projector.project(&two, 2).unwrap(),
            vec![[0.0, 0.0], [1.0, 2.0]]
        );

        let three = vec![vec![1.0], vec![2.0], vec![3.0]];
        assert!(projector.project(&three, 2).is_err());
    }
}
