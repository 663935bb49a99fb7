//! Time-bounded window of accepted stylus samples.

use crate::geometry::Point;

/// Recent samples, thinned to one per `interval` and bounded to `length` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleWindow {
    interval: f64,
    length: f64,
    points: Vec<Point>,
    last_accepted: Option<f64>,
}

impl SampleWindow {
    /// Empty window. Parameters are expected to be validated by the caller.
    pub fn new(interval: f64, length: f64) -> Self {
        Self {
            interval,
            length,
            points: Vec::new(),
            last_accepted: None,
        }
    }

    /// Offer a sample.
    ///
    /// The sample is kept if it is the first one or more than `interval` after the
    /// last kept sample. Afterwards every point older than `length` before `point`
    /// is dropped, whether or not `point` was kept. Returns whether it was kept.
    pub fn push(&mut self, point: Point) -> bool {
        let accepted = self
            .last_accepted
            .map_or(true, |last| point.time() - last > self.interval);
        if accepted {
            self.points.push(point);
            self.last_accepted = Some(point.time());
        }
        let oldest = point.time() - self.length;
        self.points.retain(|p| p.time() >= oldest);
        accepted
    }

    /// Samples in arrival order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no sample is held.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Window length (s).
    pub fn length(&self) -> f64 {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_thinning_and_first_sample() {
        let mut w = SampleWindow::new(1e-3, 0.1);
        assert!(w.push(Point::with_time(0.0, 0.0, 0.0, 0.0, 0.0)));
        assert!(!w.push(Point::with_time(0.0, 0.0, 0.0, 0.0005, 0.0)));
        assert!(!w.push(Point::with_time(0.0, 0.0, 0.0, 0.001, 0.0)));
        assert!(w.push(Point::with_time(0.0, 0.0, 0.0, 0.0015, 0.0)));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_window_only_holds_recent_points() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut w = SampleWindow::new(1e-3, 0.1);
        let mut t = 0.0;
        for _ in 0..2000 {
            t += rng.gen_range(0.0..0.004);
            w.push(Point::with_time(0.0, 0.0, 0.0, t, 0.0));
            assert!(w.points().iter().all(|p| p.time() >= t - 0.1));
        }
        assert!(!w.is_empty());
    }
}
