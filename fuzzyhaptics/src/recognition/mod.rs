//! Geometric primitive recognition for open fuzzy curves.
//!
//! A curve is compared against crisp reference models through its end points (a
//! line, a circular arc and an elliptic arc, each a rational quadratic) and graded
//! by how possibly each model lies inside the fuzzy curve.

use std::collections::BTreeMap;

use crate::curve::{EvaluationType, ParametricCurve, QuadraticBezierCurve, Range, SplineCurve};
use crate::geometry::{Point, Vector};
use crate::surface::FrictionSurface;

/// Default number of matching samples between a model and the curve.
pub const DEFAULT_FMPS: usize = 30;
/// Default lower bound on reference-model weights.
pub const DEFAULT_MINIMUM_WEIGHT: f64 = -0.999;

/// Bound on elliptic candidate weights.
const WEIGHT_LIMIT: f64 = 0.999;
const REPRESENTATIVE_SAMPLES: usize = 99;
const AID_SAMPLES: usize = 20;
const CROSSING_SAMPLES: usize = 100;
const CROSSING_ITERATIONS: usize = 50;

/// Primitive classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveType {
    /// straight segment
    Line,
    /// arc of a circle
    CircularArc,
    /// arc of an ellipse
    EllipticArc,
    /// open curve matching no model
    OpenFreeCurve,
    /// closed curve matching no model
    ClosedFreeCurve,
}

/// Approximating geometry attached to a result.
#[derive(Clone, Debug, PartialEq)]
pub enum RoughCurve {
    /// the winning conic reference model
    Conic(QuadraticBezierCurve),
    /// the input curve itself
    Free(SplineCurve),
}

/// Outcome of recognising a curve.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionResult {
    kind: PrimitiveType,
    rough_curve: RoughCurve,
    grades: BTreeMap<PrimitiveType, f64>,
}

impl RecognitionResult {
    /// Assemble a result.
    pub fn new(
        kind: PrimitiveType,
        rough_curve: RoughCurve,
        grades: BTreeMap<PrimitiveType, f64>,
    ) -> Self {
        Self {
            kind,
            rough_curve,
            grades,
        }
    }

    /// Winning class.
    pub fn kind(&self) -> PrimitiveType {
        self.kind
    }

    /// Approximating geometry.
    pub fn rough_curve(&self) -> &RoughCurve {
        &self.rough_curve
    }

    /// Grade of every class considered.
    pub fn grades(&self) -> &BTreeMap<PrimitiveType, f64> {
        &self.grades
    }

    /// Grade of one class; classes not considered grade 0.
    pub fn grade(&self, kind: PrimitiveType) -> f64 {
        self.grades.get(&kind).copied().unwrap_or(0.0)
    }
}

/// Classifies a fuzzy spline.
pub trait Recognizer {
    /// Recognise the whole of `curve`.
    fn recognize(&self, curve: &SplineCurve) -> RecognitionResult;
}

/// Open-curve recognizer: line, circular arc, elliptic arc or open free curve.
///
/// Only possibilities are used, and every reference model passes through the
/// curve's end points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpenRecognizer {
    fmps: usize,
    minimum_weight: f64,
}

impl OpenRecognizer {
    /// Recognizer with `fmps` matching samples and a floor on the circular weight.
    pub fn new(fmps: usize, minimum_weight: f64) -> Self {
        Self {
            fmps: fmps.max(2),
            minimum_weight,
        }
    }

    fn linear_reference(&self, curve: &SplineCurve) -> QuadraticBezierCurve {
        let start = curve.evaluate_at_start();
        let end = curve.evaluate_at_end();
        let mid = start.internal_division(&end, 1.0, 1.0);
        QuadraticBezierCurve::new(start, mid, end, 0.0, Range::zero_to_one())
    }

    fn circular_reference(&self, curve: &SplineCurve) -> QuadraticBezierCurve {
        let p0 = curve.evaluate_at_start();
        let p2 = curve.evaluate_at_end();
        let mid = p0.internal_division(&p2, 1.0, 1.0);

        // Apex: where the curve crosses the chord's perpendicular bisector.
        let apex = FrictionSurface::plane(mid, Vector::between(&p0, &p2))
            .ok()
            .and_then(|bisector| first_crossing(curve, &bisector))
            .unwrap_or_else(|| curve.evaluate_at((p0.time() + p2.time()) * 0.5));

        let l2 = mid.distance(&p2).powi(2);
        let h2 = mid.distance(&apex).powi(2);
        let mut weight = (l2 - h2) / (l2 + h2);
        if weight.is_nan() {
            weight = 0.0;
        }
        let weight = weight.max(self.minimum_weight);
        QuadraticBezierCurve::new(p0, apex, p2, weight, Range::zero_to_one())
    }

    fn elliptic_reference(&self, curve: &SplineCurve) -> Option<QuadraticBezierCurve> {
        let rp = representative_points(curve);
        let mut best: Option<(f64, QuadraticBezierCurve)> = None;
        for w in best_weights(&rp, curve) {
            if w.is_nan() {
                continue;
            }
            let model = QuadraticBezierCurve::new(rp[0], rp[1], rp[2], w, Range::zero_to_one());
            let possibility = model.included_in(curve, self.fmps).possibility();
            if best.as_ref().map_or(true, |(p, _)| possibility > *p) {
                best = Some((possibility, model));
            }
        }
        best.map(|(_, model)| model)
    }
}

impl Default for OpenRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_FMPS, DEFAULT_MINIMUM_WEIGHT)
    }
}

impl Recognizer for OpenRecognizer {
    fn recognize(&self, curve: &SplineCurve) -> RecognitionResult {
        let linear = self.linear_reference(curve);
        let circular = self.circular_reference(curve);
        let elliptic = self
            .elliptic_reference(curve)
            .unwrap_or_else(|| circular.clone());

        let pl = linear.included_in(curve, self.fmps).possibility();
        let pc = circular.included_in(curve, self.fmps).possibility();
        let pe = elliptic.included_in(curve, self.fmps).possibility();

        let ranked = [
            (PrimitiveType::Line, pl),
            (PrimitiveType::CircularArc, (1.0 - pl).min(pc)),
            (PrimitiveType::EllipticArc, (1.0 - pl).min(1.0 - pc).min(pe)),
            (PrimitiveType::OpenFreeCurve, (1.0 - pl).min(1.0 - pc).min(1.0 - pe)),
        ];
        // Strict comparison keeps the earlier class on ties.
        let (kind, _) = ranked
            .iter()
            .copied()
            .fold(ranked[0], |best, entry| if entry.1 > best.1 { entry } else { best });

        let rough_curve = match kind {
            PrimitiveType::Line => RoughCurve::Conic(linear),
            PrimitiveType::CircularArc => RoughCurve::Conic(circular),
            PrimitiveType::EllipticArc => RoughCurve::Conic(elliptic),
            _ => RoughCurve::Free(curve.clone()),
        };
        RecognitionResult::new(kind, rough_curve, ranked.into_iter().collect())
    }
}

/// Start, area-bisecting point and end of the curve.
fn representative_points(curve: &SplineCurve) -> [Point; 3] {
    let samples = curve.evaluate_all(REPRESENTATIVE_SAMPLES, EvaluationType::Time);
    let rp0 = samples[0];
    let rp2 = samples[samples.len() - 1];
    let rp1 = bisecting_point(&samples[1..samples.len() - 1]);
    [rp0, rp1, rp2]
}

/// Point splitting the fan area between `points` and their chord midpoint in half.
///
/// Works on the sliver triangles `(centre, p_i, p_{i+1})`: a bisection finds the
/// sliver holding the halfway mark, and the point is interpolated inside it.
pub(crate) fn bisecting_point(points: &[Point]) -> Point {
    match points.len() {
        0 => return Point::new(0.0, 0.0, 0.0),
        1 => return points[0],
        _ => {}
    }
    let centre = points[0].internal_division(&points[points.len() - 1], 1.0, 1.0);
    let slivers: Vec<f64> = points
        .windows(2)
        .map(|w| {
            Vector::between(&centre, &w[0])
                .cross(&Vector::between(&centre, &w[1]))
                .length()
        })
        .collect();
    let sum = |r: core::ops::Range<usize>| -> f64 { slivers[r].iter().sum() };

    let len = slivers.len();
    let (mut start, mut end, mut mid) = (0, len - 1, len / 2);
    // Each pass halves [start, end]; the bound only guards against a stalled state.
    for _ in 0..=2 * len {
        let head = sum(0..mid);
        let tail = sum(mid..len);
        if head > tail {
            end = mid;
            mid = start + (end - start) / 2;
        } else if head < tail {
            start = mid;
            mid = start + (end - start) / 2;
        } else {
            break;
        }
        if end - start <= 1 {
            mid = if head > tail { start } else { end };
            break;
        }
    }

    let mut head = sum(0..mid);
    let mut tail = sum(mid..len);
    if head > tail {
        head = sum(0..mid.saturating_sub(1));
        let sliver = slivers[mid - 1];
        if sliver == 0.0 {
            return points[mid];
        }
        let ratio = (tail - head + sliver) / (2.0 * sliver);
        points[mid - 1].internal_division(&points[mid], ratio, 1.0 - ratio)
    } else {
        tail = sum((mid + 1).min(len)..len);
        let sliver = slivers[mid];
        if sliver == 0.0 {
            return points[mid];
        }
        let ratio = (tail - head + sliver) / (2.0 * sliver);
        points[mid].internal_division(&points[mid + 1], ratio, 1.0 - ratio)
    }
}

/// Candidate weights for the elliptic model through `rp`.
///
/// Each span between consecutive break points (curve start, the three
/// representative points, curve end) contributes one estimate from its own
/// bisecting point; the outer two spans are merged. Spans that give no estimate
/// contribute 0, degenerate ones NaN.
fn best_weights(rp: &[Point; 3], curve: &SplineCurve) -> [f64; 3] {
    let mid = rp[0].internal_division(&rp[2], 1.0, 1.0);
    let alpha_plus_beta = rp[1].distance(&mid);
    let breaks = [
        curve.evaluate_at_start(),
        rp[0],
        rp[1],
        rp[2],
        curve.evaluate_at_end(),
    ];
    let mut weights = [0.0_f64; 4];

    if alpha_plus_beta > 0.0 {
        let d2 = rp[0].distance(&mid).powi(2);
        let normal2 = Vector::normal_of(&rp[0], &rp[1], &rp[2])
            .map(|normal| Vector::between(&rp[0], &rp[2]).cross(&normal));
        if let Some(normal2) = normal2.filter(|n| n.length() > 0.0) {
            for (i, weight) in weights.iter_mut().enumerate() {
                let span = Range::new(breaks[i].time(), breaks[i + 1].time());
                let aids = curve.part(span).evaluate_all(AID_SAMPLES, EvaluationType::Time);
                let aid = bisecting_point(&aids);
                let Some(t) = line_plane_intersection(&mid, &rp[1], &aid, &normal2) else {
                    continue;
                };
                let alpha = t.distance(&rp[1]);
                let beta = alpha_plus_beta - alpha;
                let c = t.distance(&aid);
                let numerator = 2.0 * alpha * beta * d2;
                let denominator = alpha_plus_beta * alpha_plus_beta * c * c - alpha * alpha * d2;
                let w = numerator / denominator - 1.0;
                *weight = if w.is_nan() {
                    w
                } else {
                    w.clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT)
                };
            }
        }
    }
    [weights[1], weights[2], nan_max(weights[0], weights[3])]
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Where the line through `a` and `b` meets the plane through `base` with `normal`.
fn line_plane_intersection(a: &Point, b: &Point, base: &Point, normal: &Vector) -> Option<Point> {
    let direction = Vector::between(a, b);
    let denominator = normal.dot(&direction);
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let s = normal.dot(&Vector::between(a, base)) / denominator;
    Some(a.move_by(&direction.magnify(s)))
}

/// Earliest point where `curve` crosses `plane`, refined by bisection in time.
fn first_crossing(curve: &SplineCurve, plane: &FrictionSurface) -> Option<Point> {
    let samples = curve.evaluate_all(CROSSING_SAMPLES, EvaluationType::Time);
    let signed: Vec<f64> = samples.iter().map(|p| plane.distance(p)).collect();
    let index = (0..samples.len() - 1)
        .find(|&i| signed[i] == 0.0 || signed[i] * signed[i + 1] < 0.0)?;
    if signed[index] == 0.0 {
        return Some(samples[index]);
    }
    let (mut lo, mut hi) = (samples[index].time(), samples[index + 1].time());
    let lo_sign = signed[index].signum();
    for _ in 0..CROSSING_ITERATIONS {
        let t = 0.5 * (lo + hi);
        if plane.distance(&curve.evaluate_at(t)).signum() == lo_sign {
            lo = t;
        } else {
            hi = t;
        }
    }
    Some(curve.evaluate_at(0.5 * (lo + hi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitting::FuzzyBezierCurveCreator;
    use approx::assert_relative_eq;

    /// Fuzzy spline through `f(t)`, `t ∈ [0, 1]`, with uniform fuzziness.
    fn spline(f: impl Fn(f64) -> (f64, f64), fuzziness: f64) -> SplineCurve {
        let points: Vec<Point> = (0..=64)
            .map(|i| {
                let t = i as f64 / 64.0;
                let (x, y) = f(t);
                Point::with_time(x, y, 0.0, t, 0.0)
            })
            .collect();
        let fitted = FuzzyBezierCurveCreator::default()
            .create_spline(&points, 0.25)
            .unwrap();
        let segments = fitted
            .segments()
            .iter()
            .map(|s| s.with_fuzziness(&vec![fuzziness; s.control_points().len()]))
            .collect();
        SplineCurve::new(segments).unwrap()
    }

    #[test]
    fn test_straight_stroke_is_a_line() {
        let r = OpenRecognizer::default().recognize(&spline(|t| (t, 0.5 * t), 0.02));
        assert_eq!(r.kind(), PrimitiveType::Line);
        assert!(r.grade(PrimitiveType::Line) > 0.9);
        assert!(matches!(r.rough_curve(), RoughCurve::Conic(_)));
    }

    #[test]
    fn test_semicircle_is_a_circular_arc() {
        let pi = core::f64::consts::PI;
        let curve = spline(|t| (-(pi * t).cos(), (pi * t).sin()), 0.02);
        let r = OpenRecognizer::default().recognize(&curve);
        assert_eq!(r.kind(), PrimitiveType::CircularArc);
        assert_eq!(r.grade(PrimitiveType::Line), 0.0);
        assert!(r.grade(PrimitiveType::OpenFreeCurve) < 0.1);
        match r.rough_curve() {
            RoughCurve::Conic(model) => {
                assert_relative_eq!(model.weight(), 0.0, epsilon = 1e-3);
                assert_relative_eq!(model.shoulder().y(), 1.0, epsilon = 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_s_curve_is_free() {
        let tau = 2.0 * core::f64::consts::PI;
        let curve = spline(|t| (t, 0.3 * (tau * t).sin()), 0.02);
        let r = OpenRecognizer::default().recognize(&curve);
        assert_eq!(r.kind(), PrimitiveType::OpenFreeCurve);
        assert!(matches!(r.rough_curve(), RoughCurve::Free(_)));
        assert_eq!(r.grade(PrimitiveType::ClosedFreeCurve), 0.0);
    }

    #[test]
    fn test_bisecting_point_of_symmetric_arc_is_its_apex() {
        let points: Vec<Point> = (0..=40)
            .map(|i| {
                let a = core::f64::consts::PI * i as f64 / 40.0;
                Point::new(-a.cos(), a.sin(), 0.0)
            })
            .collect();
        let p = bisecting_point(&points);
        assert_relative_eq!(p.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_line_plane_intersection() {
        let p = line_plane_intersection(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(0.0, 0.0, 2.0),
            &Point::new(5.0, 5.0, 1.0),
            &Vector::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(p.z(), 1.0);
        assert!(line_plane_intersection(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(0.0, 0.0, 1.0),
            &Vector::new(0.0, 0.0, 1.0),
        )
        .is_none());
    }
}
