//! Fuzzy Bezier curves.
//!
//! Control points carry a fuzziness; a curve point's fuzziness is the Bernstein
//! combination of the control fuzziness, which is what de Casteljau produces when
//! fuzziness is interpolated alongside the coordinates.

use super::{ParametricCurve, Range};
use crate::geometry::Point;

/// Coordinates plus fuzziness, the quantities de Casteljau interpolates.
type Lane = [f64; 4];

fn lane(p: &Point) -> Lane {
    [p.x(), p.y(), p.z(), p.fuzziness()]
}

fn lerp_lane(a: &Lane, b: &Lane, u: f64) -> Lane {
    // a + (b - a) * u keeps coincident control points exact
    [
        a[0] + (b[0] - a[0]) * u,
        a[1] + (b[1] - a[1]) * u,
        a[2] + (b[2] - a[2]) * u,
        a[3] + (b[3] - a[3]) * u,
    ]
}

/// A fuzzy Bezier curve of degree `control_points.len() - 1` over a time range.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierCurve {
    control_points: Vec<Point>,
    range: Range,
}

impl BezierCurve {
    /// Create a curve from its control points.
    ///
    /// # Panics
    /// When `control_points` is empty.
    pub fn new(control_points: Vec<Point>, range: Range) -> Self {
        assert!(
            !control_points.is_empty(),
            "a Bezier curve needs at least one control point"
        );
        Self {
            control_points,
            range,
        }
    }

    /// Control points.
    pub fn control_points(&self) -> &[Point] {
        &self.control_points
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.control_points.len() - 1
    }

    /// Same geometry with one fuzziness per control point replaced.
    ///
    /// Extra values are ignored; missing ones leave the control point unchanged.
    pub fn with_fuzziness(&self, fuzziness: &[f64]) -> Self {
        let control_points = self
            .control_points
            .iter()
            .enumerate()
            .map(|(i, p)| match fuzziness.get(i) {
                Some(&f) => p.with_fuzziness(f),
                None => *p,
            })
            .collect();
        Self::new(control_points, self.range)
    }

    /// Derivative with respect to the normalised parameter `u ∈ [0, 1]`.
    ///
    /// Control points are `d · (P_{i+1} - P_i)`; the fuzziness of a difference of
    /// fuzzy points is the sum of their spreads. A constant curve differentiates to a
    /// single zero control point.
    pub fn differentiate(&self) -> BezierCurve {
        let degree = self.degree();
        if degree == 0 {
            let zero = Point::with_time(0.0, 0.0, 0.0, self.range.start(), 0.0);
            return BezierCurve::new(vec![zero], self.range);
        }
        let d = degree as f64;
        let control_points = self
            .control_points
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let (a, b) = (&pair[0], &pair[1]);
                Point::with_time(
                    d * (b.x() - a.x()),
                    d * (b.y() - a.y()),
                    d * (b.z() - a.z()),
                    self.range.denormalize(i as f64 / (degree - 1).max(1) as f64),
                    d * (a.fuzziness() + b.fuzziness()),
                )
            })
            .collect();
        BezierCurve::new(control_points, self.range)
    }

    /// The portion of this curve over `range` (intersected with the curve's own range),
    /// as a new Bezier curve of the same degree.
    pub fn part(&self, range: Range) -> BezierCurve {
        let sub = self.range.intersect(&range).unwrap_or_else(|| {
            let t = self.range.clamp(range.start());
            Range::new(t, t)
        });
        let u0 = self.range.normalize(sub.start());
        let u1 = self.range.normalize(sub.end());

        let lanes: Vec<Lane> = self.control_points.iter().map(lane).collect();
        let (_, right) = split(&lanes, u0);
        let local = if u0 < 1.0 { (u1 - u0) / (1.0 - u0) } else { 0.0 };
        let (left, _) = split(&right, local);

        let degree = self.degree().max(1) as f64;
        let control_points = left
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let t = sub.denormalize(i as f64 / degree);
                Point::with_time(l[0], l[1], l[2], t, l[3])
            })
            .collect();
        BezierCurve::new(control_points, sub)
    }

    /// Evaluate at a normalised parameter `u ∈ [0, 1]`.
    pub fn evaluate_normalized(&self, u: f64) -> Point {
        let mut work: Vec<Lane> = self.control_points.iter().map(lane).collect();
        let n = work.len();
        for level in 1..n {
            for i in 0..n - level {
                work[i] = lerp_lane(&work[i], &work[i + 1], u);
            }
        }
        let l = work[0];
        Point::with_time(l[0], l[1], l[2], self.range.denormalize(u), l[3])
    }
}

/// de Casteljau subdivision at `u`: control lanes of the left and right halves.
fn split(lanes: &[Lane], u: f64) -> (Vec<Lane>, Vec<Lane>) {
    let n = lanes.len();
    let mut work = lanes.to_vec();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    left.push(work[0]);
    right.push(work[n - 1]);
    for level in 1..n {
        for i in 0..n - level {
            work[i] = lerp_lane(&work[i], &work[i + 1], u);
        }
        left.push(work[0]);
        right.push(work[n - level - 1]);
    }
    right.reverse();
    (left, right)
}

impl ParametricCurve for BezierCurve {
    fn range(&self) -> Range {
        self.range
    }

    fn evaluate_at(&self, t: f64) -> Point {
        let t = self.range.clamp(t);
        self.evaluate_normalized(self.range.normalize(t)).at_time(t)
    }
}
