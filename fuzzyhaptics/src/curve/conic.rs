//! Rational quadratic Bezier curves used as crisp reference models.
//!
//! The curve is stored in shoulder form: the two end points, the point the curve
//! passes through at parameter 1/2 (the shoulder) and the weight of the implicit
//! middle control point. Writing the middle term through the shoulder keeps the
//! curve finite at `w = 0`, where the classic middle control point runs off to
//! infinity (a semicircle).

use super::{EvaluationType, ParametricCurve, Range};
use crate::fuzzy::TruthValue;
use crate::geometry::{Point, Vector};

/// A crisp conic arc `P(u)` through `start`, `shoulder` (at `u = 1/2`) and `end`.
///
/// With `M` the chord midpoint,
/// `P(u) = [(1-u)² P0 + 2u(1-u)((1+w)S - M) + u² P2] / [(1-u)² + 2u(1-u)w + u²]`.
/// `w = 0` gives a semicircle-like arc, `0 < w < 1` an ellipse, `w = 1` a parabola.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadraticBezierCurve {
    start: Point,
    shoulder: Point,
    end: Point,
    weight: f64,
    range: Range,
}

impl QuadraticBezierCurve {
    /// Build a reference model. Fuzziness of the given points is discarded.
    pub fn new(start: Point, shoulder: Point, end: Point, weight: f64, range: Range) -> Self {
        Self {
            start: start.with_fuzziness(0.0),
            shoulder: shoulder.with_fuzziness(0.0),
            end: end.with_fuzziness(0.0),
            weight,
            range,
        }
    }

    /// Start point.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Point at the parameter midpoint.
    pub fn shoulder(&self) -> Point {
        self.shoulder
    }

    /// End point.
    pub fn end(&self) -> Point {
        self.end
    }

    /// Weight of the middle control point.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate_normalized(&self, u: f64) -> Point {
        let w = self.weight;
        let a = (1.0 - u) * (1.0 - u);
        let b = 2.0 * u * (1.0 - u);
        let c = u * u;
        let denominator = a + b * w + c;
        let mid = self.start.internal_division(&self.end, 1.0, 1.0);
        let lane = |i: usize| {
            let middle = (1.0 + w) * self.shoulder.component(i) - mid.component(i);
            (a * self.start.component(i) + b * middle + c * self.end.component(i)) / denominator
        };
        Point::with_time(lane(0), lane(1), lane(2), self.range.denormalize(u), 0.0)
    }

    /// Necessity and possibility that this model lies inside the fuzzy `curve`.
    ///
    /// The model is sampled at `fmps` evenly spaced parameters. Each sample is
    /// compared against the polyline through a denser time-even sampling of the
    /// curve, taking the best match along it; the result is the minimum over all
    /// model samples.
    pub fn included_in<C>(&self, curve: &C, fmps: usize) -> TruthValue
    where
        C: ParametricCurve + ?Sized,
    {
        let fmps = fmps.max(2);
        let polyline = curve.evaluate_all(fmps * 4, EvaluationType::Time);
        let mut necessity = 1.0_f64;
        let mut possibility = 1.0_f64;
        for sample in self.evaluate_all(fmps - 1, EvaluationType::Parameter) {
            let best = best_match(&sample, &polyline);
            necessity = necessity.min(best.necessity());
            possibility = possibility.min(best.possibility());
        }
        TruthValue::new(necessity, possibility)
    }
}

/// Highest inclusion of `p` in any point of the polyline `samples`.
fn best_match(p: &Point, samples: &[Point]) -> TruthValue {
    let mut necessity = 0.0_f64;
    let mut possibility = 0.0_f64;
    let mut consider = |q: Point| {
        let tv = p.included_in(&q);
        necessity = necessity.max(tv.necessity());
        possibility = possibility.max(tv.possibility());
    };
    if samples.len() == 1 {
        consider(samples[0]);
    }
    for pair in samples.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ab = Vector::between(a, b);
        let length2 = ab.dot(&ab);
        let s = if length2 > 0.0 {
            (Vector::between(a, p).dot(&ab) / length2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        consider(a.internal_division(b, s, 1.0 - s));
    }
    TruthValue::new(necessity, possibility)
}

impl ParametricCurve for QuadraticBezierCurve {
    fn range(&self) -> Range {
        self.range
    }

    fn evaluate_at(&self, t: f64) -> Point {
        let t = self.range.clamp(t);
        self.evaluate_normalized(self.range.normalize(t)).at_time(t)
    }
}
