//! Piecewise fuzzy Bezier splines.

use super::{BezierCurve, EvaluationType, ParametricCurve, Range};
use crate::error::GeometryError;
use crate::geometry::Point;

/// Relative tolerance when checking that consecutive segments meet in time.
const CONTINUITY_EPS: f64 = 1e-9;

/// A fuzzy spline: Bezier segments laid end to end in time.
#[derive(Clone, Debug, PartialEq)]
pub struct SplineCurve {
    segments: Vec<BezierCurve>,
}

impl SplineCurve {
    /// Create a spline from time-contiguous segments.
    pub fn new(segments: Vec<BezierCurve>) -> Result<Self, GeometryError> {
        if segments.is_empty() {
            return Err(GeometryError::EmptySpline);
        }
        for (index, pair) in segments.windows(2).enumerate() {
            let previous_end = pair[0].range().end();
            let start = pair[1].range().start();
            let tolerance = CONTINUITY_EPS * previous_end.abs().max(1.0);
            if (start - previous_end).abs() > tolerance {
                return Err(GeometryError::DiscontinuousSpline {
                    index: index + 1,
                    start,
                    previous_end,
                });
            }
        }
        Ok(Self { segments })
    }

    /// Segments in time order.
    pub fn segments(&self) -> &[BezierCurve] {
        &self.segments
    }

    fn segment_index(&self, t: f64) -> usize {
        self.segments
            .iter()
            .position(|s| t <= s.range().end())
            .unwrap_or(self.segments.len() - 1)
    }

    /// The portion of the spline over `range`, clamped to the spline's own range.
    pub fn part(&self, range: Range) -> SplineCurve {
        let own = self.range();
        let sub = own.intersect(&range).unwrap_or_else(|| {
            let t = own.clamp(range.start());
            Range::new(t, t)
        });
        let first = self.segment_index(sub.start());
        let last = self.segment_index(sub.end()).max(first);
        let mut segments: Vec<BezierCurve> = self.segments[first..=last]
            .iter()
            .map(|s| {
                let piece = s.range().intersect(&sub).unwrap_or_else(|| {
                    let t = s.range().clamp(sub.start());
                    Range::new(t, t)
                });
                s.part(piece)
            })
            .collect();
        // A cut on a segment boundary leaves a zero-length piece behind.
        if sub.length() > 0.0 {
            segments.retain(|s| s.range().length() > 0.0);
        }
        SplineCurve { segments }
    }
}

impl From<BezierCurve> for SplineCurve {
    fn from(curve: BezierCurve) -> Self {
        Self {
            segments: vec![curve],
        }
    }
}

impl ParametricCurve for SplineCurve {
    fn range(&self) -> Range {
        let first = self.segments[0].range();
        let last = self.segments[self.segments.len() - 1].range();
        Range::new(first.start(), last.end())
    }

    fn evaluate_at(&self, t: f64) -> Point {
        let t = self.range().clamp(t);
        self.segments[self.segment_index(t)].evaluate_at(t)
    }

    /// [`EvaluationType::Parameter`] gives every segment an equal share of the samples
    /// regardless of its duration; [`EvaluationType::Time`] spaces evenly in time.
    fn evaluate_all(&self, n: usize, kind: EvaluationType) -> Vec<Point> {
        let n = n.max(1);
        match kind {
            EvaluationType::Time => {
                let range = self.range();
                (0..=n)
                    .map(|i| self.evaluate_at(range.denormalize(i as f64 / n as f64)))
                    .collect()
            }
            EvaluationType::Parameter => {
                let count = self.segments.len() as f64;
                (0..=n)
                    .map(|i| {
                        let s = i as f64 / n as f64 * count;
                        let index = (s.floor() as usize).min(self.segments.len() - 1);
                        self.segments[index].evaluate_normalized(s - index as f64)
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(x0: f64, x1: f64, t0: f64, t1: f64) -> BezierCurve {
        BezierCurve::new(
            vec![
                Point::with_time(x0, 0.0, 0.0, t0, 0.1),
                Point::with_time(x1, 0.0, 0.0, t1, 0.1),
            ],
            Range::new(t0, t1),
        )
    }

    #[test]
    fn test_rejects_gaps_and_empty() {
        assert_eq!(SplineCurve::new(vec![]), Err(GeometryError::EmptySpline));
        let err = SplineCurve::new(vec![line(0.0, 1.0, 0.0, 1.0), line(1.0, 2.0, 1.5, 2.0)]);
        assert!(matches!(err, Err(GeometryError::DiscontinuousSpline { index: 1, .. })));
    }

    #[test]
    fn test_evaluate_across_segments() {
        let s = SplineCurve::new(vec![line(0.0, 1.0, 0.0, 1.0), line(1.0, 5.0, 1.0, 2.0)]).unwrap();
        assert_relative_eq!(s.evaluate_at(0.5).x(), 0.5);
        assert_relative_eq!(s.evaluate_at(1.5).x(), 3.0);
        assert_relative_eq!(s.evaluate_at(7.0).x(), 5.0);
        assert_eq!(s.range(), Range::new(0.0, 2.0));
    }

    #[test]
    fn test_part_spans_segment_boundary() {
        let s = SplineCurve::new(vec![line(0.0, 1.0, 0.0, 1.0), line(1.0, 5.0, 1.0, 2.0)]).unwrap();
        let p = s.part(Range::new(0.5, 1.5));
        assert_eq!(p.segments().len(), 2);
        assert_eq!(p.range(), Range::new(0.5, 1.5));
        assert_relative_eq!(p.evaluate_at_start().x(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.evaluate_at_end().x(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_part_from_segment_boundary_drops_empty_piece() {
        let s = SplineCurve::new(vec![line(0.0, 1.0, 0.0, 1.0), line(1.0, 5.0, 1.0, 2.0)]).unwrap();
        let p = s.part(Range::new(1.0, 1.5));
        assert_eq!(p.segments().len(), 1);
        assert_eq!(p.range(), Range::new(1.0, 1.5));
    }

    #[test]
    fn test_parameter_sampling_is_per_segment() {
        let s = SplineCurve::new(vec![line(0.0, 1.0, 0.0, 1.0), line(1.0, 5.0, 1.0, 3.0)]).unwrap();
        let by_param = s.evaluate_all(2, EvaluationType::Parameter);
        assert_relative_eq!(by_param[1].time(), 1.0, epsilon = 1e-12);
        let by_time = s.evaluate_all(2, EvaluationType::Time);
        assert_relative_eq!(by_time[1].time(), 1.5, epsilon = 1e-12);
    }
}
