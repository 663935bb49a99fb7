//! Parametric fuzzy curves.
//!
//! Every curve here is parameterised by time over a [`Range`]: evaluating at `t`
//! yields a fuzzy [`Point`] stamped with `t`.

pub mod bezier;
pub mod conic;
pub mod interpolation;
pub mod spline;

pub use bezier::BezierCurve;
pub use conic::QuadraticBezierCurve;
pub use spline::SplineCurve;

use crate::geometry::Point;

/// A closed parameter interval `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    start: f64,
    end: f64,
}

impl Range {
    /// Create a range; the bounds are swapped if given in reverse.
    pub fn new(start: f64, end: f64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// `[0, 1]`.
    pub fn zero_to_one() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Lower bound.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Upper bound.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// `end - start`.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` lies inside the closed interval.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// `t` clamped into the interval.
    pub fn clamp(&self, t: f64) -> f64 {
        t.clamp(self.start, self.end)
    }

    /// Position of `t` inside the range mapped to `[0, 1]`. A degenerate range maps to 0.
    pub fn normalize(&self, t: f64) -> f64 {
        let length = self.length();
        if length > 0.0 {
            ((t - self.start) / length).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Inverse of [`Range::normalize`].
    pub fn denormalize(&self, u: f64) -> f64 {
        self.start + (self.end - self.start) * u
    }

    /// Overlap with another range, if any.
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then(|| Range::new(start, end))
    }
}

/// How [`ParametricCurve::evaluate_all`] spaces its samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluationType {
    /// Evenly in the curve's own parameter (per segment for piecewise curves).
    Parameter,
    /// Evenly in time.
    Time,
}

/// A time-parameterised fuzzy curve.
pub trait ParametricCurve {
    /// Parameter range.
    fn range(&self) -> Range;

    /// Fuzzy point at time `t`; `t` outside the range is clamped.
    fn evaluate_at(&self, t: f64) -> Point;

    /// Point at the range start.
    fn evaluate_at_start(&self) -> Point {
        self.evaluate_at(self.range().start())
    }

    /// Point at the range end.
    fn evaluate_at_end(&self) -> Point {
        self.evaluate_at(self.range().end())
    }

    /// `n + 1` samples from start to end inclusive, spaced per `kind`.
    ///
    /// The default spaces evenly in time; curves whose parameter is not linear in
    /// time override it.
    fn evaluate_all(&self, n: usize, _kind: EvaluationType) -> Vec<Point> {
        let range = self.range();
        let n = n.max(1);
        (0..=n)
            .map(|i| self.evaluate_at(range.denormalize(i as f64 / n as f64)))
            .collect()
    }
}

/// Bernstein basis polynomial `B_{index}^{degree}(u)`.
pub(crate) fn bernstein(degree: usize, index: usize, u: f64) -> f64 {
    binomial(degree, index) * u.powi(index as i32) * (1.0 - u).powi((degree - index) as i32)
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
