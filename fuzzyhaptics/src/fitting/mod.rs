//! Fuzzy Bezier curve fitting over a window of samples.
//!
//! The geometry comes from a least-squares Bezier fit; the fuzziness of each control
//! point is then synthesised from the fitted curve's speed and acceleration, so fast
//! or jerky motion yields a wider curve.

use nalgebra::DVector;
use tracing::trace;

use crate::curve::interpolation::{interpolate, nnls, normalized_times, weight_matrix};
use crate::curve::{BezierCurve, EvaluationType, ParametricCurve, SplineCurve};
use crate::error::ConfigError;
use crate::geometry::Point;

/// Default polynomial degree.
pub const DEFAULT_DEGREE: usize = 3;
/// Default window length (s).
pub const DEFAULT_CURVE_TIME_LENGTH: f64 = 0.1;
/// Default weight of the speed term.
pub const DEFAULT_VELOCITY_COEFFICIENT: f64 = 0.008581 * 6.0;
/// Default weight of the acceleration term.
pub const DEFAULT_ACCELERATION_COEFFICIENT: f64 = 0.007742 * 0.25;

// Derivatives are taken per unit of normalised parameter; these rescale them to a
// 0.1 s window.
const VELOCITY_SCALE: f64 = 10.0;
const ACCELERATION_SCALE: f64 = 100.0;
/// Largest sample count any config-derived window may request.
pub(crate) const MAX_WINDOW_SAMPLES: f64 = 1e6;

/// Builds fuzzy Bezier curves from sample windows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyBezierCurveCreator {
    degree: usize,
    point_num: usize,
    velocity_coefficient: f64,
    acceleration_coefficient: f64,
}

impl FuzzyBezierCurveCreator {
    /// Create a curve creator.
    ///
    /// # Arguments
    /// * `degree` - Bezier degree of every fitted curve
    /// * `curve_time_length` - window length (s), sets how densely fuzziness is sampled
    /// * `velocity_coefficient` - fuzziness per unit of speed
    /// * `acceleration_coefficient` - fuzziness per unit of acceleration
    pub fn new(
        degree: usize,
        curve_time_length: f64,
        velocity_coefficient: f64,
        acceleration_coefficient: f64,
    ) -> Result<Self, ConfigError> {
        if !curve_time_length.is_finite() || curve_time_length <= 0.0 {
            return Err(ConfigError::CurveTimeLength(curve_time_length));
        }
        let point_num = sample_count("fuzziness sampling", curve_time_length * 100.0)?.max(4);
        if !velocity_coefficient.is_finite() || velocity_coefficient < 0.0 {
            return Err(ConfigError::Negative {
                name: "velocity_coefficient",
                value: velocity_coefficient,
            });
        }
        if !acceleration_coefficient.is_finite() || acceleration_coefficient < 0.0 {
            return Err(ConfigError::Negative {
                name: "acceleration_coefficient",
                value: acceleration_coefficient,
            });
        }
        Ok(Self {
            degree,
            point_num,
            velocity_coefficient,
            acceleration_coefficient,
        })
    }

    /// Default coefficients with a custom window length.
    pub fn with_curve_time_length(curve_time_length: f64) -> Result<Self, ConfigError> {
        Self::new(
            DEFAULT_DEGREE,
            curve_time_length,
            DEFAULT_VELOCITY_COEFFICIENT,
            DEFAULT_ACCELERATION_COEFFICIENT,
        )
    }

    /// Bezier degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of fuzziness sampling intervals.
    pub fn point_num(&self) -> usize {
        self.point_num
    }

    /// Fit a fuzzy Bezier curve through `points`.
    ///
    /// `None` when there are not more points than the degree or the points span no
    /// time; callers treat that as "no curve yet".
    pub fn create_fbc(&self, points: &[Point]) -> Option<BezierCurve> {
        let Some(bezier) = interpolate(points, self.degree) else {
            trace!(points = points.len(), degree = self.degree, "not enough samples to fit");
            return None;
        };
        self.fuzzify(&bezier)
    }

    /// Attach synthesised fuzziness to the control points of a crisp curve.
    ///
    /// Returns `None` only for a curve over an empty time span.
    pub fn fuzzify(&self, bezier: &BezierCurve) -> Option<BezierCurve> {
        let velocity = bezier.differentiate();
        let acceleration = velocity.differentiate();

        let samples = velocity.evaluate_all(self.point_num, EvaluationType::Time);
        let targets = DVector::from_iterator(
            samples.len(),
            samples.iter().map(|p| {
                let t = p.time();
                let v = origin_distance(&velocity.evaluate_at(t)) * VELOCITY_SCALE;
                let a = origin_distance(&acceleration.evaluate_at(t)) * ACCELERATION_SCALE;
                self.velocity_coefficient * v + self.acceleration_coefficient * a
            }),
        );

        let times = normalized_times(&samples)?;
        let weights = weight_matrix(&times, bezier.degree());
        let fuzziness = nnls(&weights, &targets);
        Some(bezier.with_fuzziness(fuzziness.as_slice()))
    }

    /// Fit consecutive fuzzy Bezier segments of roughly `segment_time` seconds each.
    ///
    /// Neighbouring segments share their boundary sample, so the spline is contiguous
    /// in time. A trailing run too short to fit is merged into the last segment. A
    /// non-positive `segment_time` fits a single segment.
    pub fn create_spline(&self, points: &[Point], segment_time: f64) -> Option<SplineCurve> {
        if points.len() <= self.degree {
            return None;
        }
        let last = points.len() - 1;
        let mut segments = Vec::new();
        let mut start = 0;
        while start < last {
            let mut end = if segment_time > 0.0 && segment_time.is_finite() {
                let limit = points[start].time() + segment_time;
                points[start..]
                    .iter()
                    .rposition(|p| p.time() <= limit)
                    .map_or(start, |i| start + i)
            } else {
                last
            };
            end = end.max(start + self.degree.max(1)).min(last);
            if last - end < self.degree.max(1) {
                end = last;
            }
            segments.push(self.create_fbc(&points[start..=end])?);
            start = end;
        }
        SplineCurve::new(segments).ok()
    }
}

impl Default for FuzzyBezierCurveCreator {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            point_num: (DEFAULT_CURVE_TIME_LENGTH * 100.0).max(4.0) as usize,
            velocity_coefficient: DEFAULT_VELOCITY_COEFFICIENT,
            acceleration_coefficient: DEFAULT_ACCELERATION_COEFFICIENT,
        }
    }
}

/// Truncate a non-negative sample count, refusing counts past [`MAX_WINDOW_SAMPLES`].
pub(crate) fn sample_count(name: &'static str, samples: f64) -> Result<usize, ConfigError> {
    if samples.is_finite() && samples <= MAX_WINDOW_SAMPLES {
        Ok(samples.max(0.0) as usize)
    } else {
        Err(ConfigError::WindowTooLarge {
            name,
            samples,
            max: MAX_WINDOW_SAMPLES,
        })
    }
}

fn origin_distance(p: &Point) -> f64 {
    p.coords().coords.norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples(f: impl Fn(f64) -> (f64, f64, f64), count: usize, dt: f64) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let t = i as f64 * dt;
                let (x, y, z) = f(t);
                Point::with_time(x, y, z, t, 0.0)
            })
            .collect()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(
            FuzzyBezierCurveCreator::new(3, 0.0, 0.1, 0.1),
            Err(ConfigError::CurveTimeLength(0.0))
        );
        assert!(matches!(
            FuzzyBezierCurveCreator::new(3, 0.1, -1.0, 0.1),
            Err(ConfigError::Negative { name: "velocity_coefficient", .. })
        ));
        assert!(matches!(
            FuzzyBezierCurveCreator::new(3, 0.1, 0.1, f64::NAN),
            Err(ConfigError::Negative { name: "acceleration_coefficient", .. })
        ));
    }

    #[test]
    fn test_rejects_windows_too_long_to_sample() {
        assert_eq!(
            FuzzyBezierCurveCreator::with_curve_time_length(f64::INFINITY),
            Err(ConfigError::CurveTimeLength(f64::INFINITY))
        );
        assert!(matches!(
            FuzzyBezierCurveCreator::with_curve_time_length(1e300),
            Err(ConfigError::WindowTooLarge { name: "fuzziness sampling", .. })
        ));
        assert_eq!(
            FuzzyBezierCurveCreator::with_curve_time_length(1e4).unwrap().point_num(),
            1_000_000
        );
    }

    #[test]
    fn test_point_num_has_floor_of_four() {
        assert_eq!(FuzzyBezierCurveCreator::with_curve_time_length(0.01).unwrap().point_num(), 4);
        assert_eq!(FuzzyBezierCurveCreator::with_curve_time_length(0.1).unwrap().point_num(), 10);
        assert_eq!(FuzzyBezierCurveCreator::default().point_num(), 10);
    }

    #[test]
    fn test_too_few_points_is_no_curve() {
        let creator = FuzzyBezierCurveCreator::default();
        let points = samples(|t| (t, 0.0, 0.0), 3, 0.001);
        assert!(creator.create_fbc(&points).is_none());
    }

    #[test]
    fn test_stationary_points_are_crisp() {
        let creator = FuzzyBezierCurveCreator::default();
        let points = samples(|_| (1.0, 2.0, 3.0), 50, 0.001);
        let fbc = creator.create_fbc(&points).unwrap();
        for c in fbc.control_points() {
            assert_eq!(c.fuzziness(), 0.0);
            assert_eq!((c.x(), c.y(), c.z()), (1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_uniform_motion_fuzziness_follows_speed() {
        // 1 m/s over a 0.1 s window: d/du = 0.1, fuzziness = coeff * 0.1 * 10.
        let creator = FuzzyBezierCurveCreator::default();
        let points = samples(|t| (t, 0.0, 0.0), 101, 0.001);
        let fbc = creator.create_fbc(&points).unwrap();
        let expected = DEFAULT_VELOCITY_COEFFICIENT;
        for c in fbc.control_points() {
            assert_relative_eq!(c.fuzziness(), expected, epsilon = 1e-6);
        }
        let mid = fbc.evaluate_at(0.05);
        assert_relative_eq!(mid.x(), 0.05, epsilon = 1e-9);
        assert_relative_eq!(mid.fuzziness(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_faster_motion_is_fuzzier() {
        let creator = FuzzyBezierCurveCreator::default();
        let slow = creator.create_fbc(&samples(|t| (t, 0.0, 0.0), 101, 0.001)).unwrap();
        let fast = creator.create_fbc(&samples(|t| (5.0 * t, 0.0, 0.0), 101, 0.001)).unwrap();
        assert!(fast.evaluate_at(0.05).fuzziness() > slow.evaluate_at(0.05).fuzziness());
    }

    #[test]
    fn test_spline_segments_are_contiguous() {
        let creator = FuzzyBezierCurveCreator::default();
        let points = samples(|t| (t.cos(), t.sin(), 0.0), 65, 0.015625);
        let spline = creator.create_spline(&points, 0.25).unwrap();
        assert_eq!(spline.segments().len(), 4);
        assert_relative_eq!(spline.range().start(), 0.0);
        assert_relative_eq!(spline.range().end(), 1.0, epsilon = 1e-12);
        for pair in spline.segments().windows(2) {
            assert_eq!(pair[0].range().end(), pair[1].range().start());
        }
        let p = spline.evaluate_at(0.6);
        assert_relative_eq!(p.x(), 0.6_f64.cos(), epsilon = 1e-4);
        assert_relative_eq!(p.y(), 0.6_f64.sin(), epsilon = 1e-4);
    }
}
