//! Least-squares Bezier interpolation and non-negative least squares.

use nalgebra::{DMatrix, DVector};

use super::{bernstein, BezierCurve, Range};
use crate::geometry::Point;

/// Singular values below this (relative) threshold are treated as zero.
const SVD_EPS: f64 = 1e-12;

/// Sample times mapped linearly so the first point is at 0 and the last at 1.
///
/// Returns `None` when the points span no time.
pub fn normalized_times(points: &[Point]) -> Option<Vec<f64>> {
    let first = points.first()?.time();
    let last = points.last()?.time();
    let span = last - first;
    if span.is_nan() || span <= 0.0 {
        return None;
    }
    Some(points.iter().map(|p| (p.time() - first) / span).collect())
}

/// Bernstein weight matrix: row `i`, column `j` is `B_j^degree(times[i])`.
pub fn weight_matrix(times: &[f64], degree: usize) -> DMatrix<f64> {
    DMatrix::from_fn(times.len(), degree + 1, |i, j| bernstein(degree, j, times[i]))
}

/// Fit a crisp Bezier curve of `degree` through `points` in the least-squares sense.
///
/// The curve is parameterised by the points' time span. Returns `None` when there are
/// not more points than the degree, or the points span no time.
pub fn interpolate(points: &[Point], degree: usize) -> Option<BezierCurve> {
    if points.len() <= degree {
        return None;
    }
    let times = normalized_times(points)?;
    let weights = weight_matrix(&times, degree);
    let svd = weights.svd(true, true);

    // Fit offsets from the first sample so constant data is reproduced exactly.
    let origin = points[0];
    let mut axes = Vec::with_capacity(3);
    for axis in 0..3 {
        let rhs = DVector::from_iterator(
            points.len(),
            points.iter().map(|p| p.component(axis) - origin.component(axis)),
        );
        axes.push(svd.solve(&rhs, SVD_EPS).ok()?);
    }

    let range = Range::new(points[0].time(), points[points.len() - 1].time());
    let control_points = (0..=degree)
        .map(|j| {
            Point::with_time(
                origin.x() + axes[0][j],
                origin.y() + axes[1][j],
                origin.z() + axes[2][j],
                range.denormalize(j as f64 / degree.max(1) as f64),
                0.0,
            )
        })
        .collect();
    Some(BezierCurve::new(control_points, range))
}

/// Unconstrained least squares restricted to the columns in `passive`.
fn solve_passive(a: &DMatrix<f64>, b: &DVector<f64>, passive: &[usize]) -> Option<DVector<f64>> {
    let sub = DMatrix::from_fn(a.nrows(), passive.len(), |r, c| a[(r, passive[c])]);
    sub.svd(true, true).solve(b, SVD_EPS).ok()
}

/// Non-negative least squares: `argmin ||A x - b||` subject to `x >= 0`.
///
/// Lawson–Hanson active-set method. The iteration count is bounded, so a
/// pathological system returns the best feasible iterate found.
pub fn nnls(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let n = a.ncols();
    let mut x = DVector::<f64>::zeros(n);
    let mut passive = vec![false; n];
    let scale = a.amax().max(b.amax()).max(1.0);
    let tol = 1e-10 * scale * scale;
    let max_outer = 3 * n.max(1);

    for _ in 0..max_outer {
        let gradient = a.transpose() * (b - a * &x);
        let candidate = (0..n)
            .filter(|&j| !passive[j] && gradient[j] > tol)
            .max_by(|&i, &j| gradient[i].total_cmp(&gradient[j]));
        let Some(entering) = candidate else {
            break;
        };
        passive[entering] = true;

        for _ in 0..max_outer {
            let indices: Vec<usize> = (0..n).filter(|&j| passive[j]).collect();
            let Some(z_passive) = solve_passive(a, b, &indices) else {
                return x;
            };
            let mut z = DVector::<f64>::zeros(n);
            for (k, &j) in indices.iter().enumerate() {
                z[j] = z_passive[k];
            }

            if indices.iter().all(|&j| z[j] > 0.0) {
                x = z;
                break;
            }

            // Step back toward x until the first passive variable hits zero.
            let alpha = indices
                .iter()
                .filter(|&&j| z[j] <= 0.0)
                .map(|&j| x[j] / (x[j] - z[j]))
                .fold(f64::INFINITY, f64::min);
            let alpha = if alpha.is_finite() { alpha } else { 0.0 };
            let step = (&z - &x) * alpha;
            x += step;
            for &j in &indices {
                if x[j] <= 1e-12 * scale {
                    x[j] = 0.0;
                    passive[j] = false;
                }
            }
        }
    }
    x.iter_mut().for_each(|v| *v = v.max(0.0));
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ParametricCurve;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolate_recovers_cubic() {
        // x(t) = t^3 sampled on [0, 1] is exactly representable.
        let points: Vec<Point> = (0..=20)
            .map(|i| {
                let t = i as f64 / 20.0;
                Point::with_time(t * t * t, 2.0 * t, 1.0, t, 0.0)
            })
            .collect();
        let curve = interpolate(&points, 3).unwrap();
        for p in &points {
            let q = curve.evaluate_at(p.time());
            assert_relative_eq!(q.x(), p.x(), epsilon = 1e-9);
            assert_relative_eq!(q.y(), p.y(), epsilon = 1e-9);
            assert_relative_eq!(q.z(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interpolate_constant_is_exact() {
        let points: Vec<Point> = (0..10)
            .map(|i| Point::with_time(1.0, 2.0, 3.0, i as f64 * 0.01, 0.0))
            .collect();
        let curve = interpolate(&points, 3).unwrap();
        for c in curve.control_points() {
            assert_eq!((c.x(), c.y(), c.z()), (1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_interpolate_needs_enough_points() {
        let points: Vec<Point> = (0..3)
            .map(|i| Point::with_time(0.0, 0.0, 0.0, i as f64, 0.0))
            .collect();
        assert!(interpolate(&points, 3).is_none());

        let same_time: Vec<Point> = (0..5).map(|_| Point::new(0.0, 0.0, 0.0)).collect();
        assert!(interpolate(&same_time, 3).is_none());
    }

    #[test]
    fn test_nnls_matches_unconstrained_when_feasible() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = nnls(&a, &b);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nnls_clamps_negative_component() {
        // Unconstrained solution is (2, -1); the constrained optimum puts x1 = 0.
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![2.0, -1.0]);
        let x = nnls(&a, &b);
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-9);
        assert_eq!(x[1], 0.0);
    }

    #[test]
    fn test_nnls_zero_rhs_is_zero() {
        let a = weight_matrix(&[0.0, 0.25, 0.5, 0.75, 1.0], 3);
        let x = nnls(&a, &DVector::zeros(5));
        assert!(x.iter().all(|&v| v == 0.0));
    }
}
