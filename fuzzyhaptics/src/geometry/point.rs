//! Time-stamped fuzzy points.

use nalgebra::Point3;

use super::Vector;
use crate::fuzzy::TruthValue;

/// A position sample with a time stamp and a fuzziness (uncertainty radius).
///
/// Points are immutable values; every operation returns a new point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    coords: Point3<f64>,
    time: f64,
    fuzziness: f64,
}

impl Point {
    /// A crisp point at time zero.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::with_time(x, y, z, 0.0, 0.0)
    }

    /// A point with explicit time and fuzziness. Negative fuzziness is clamped to zero.
    pub fn with_time(x: f64, y: f64, z: f64, time: f64, fuzziness: f64) -> Self {
        Self {
            coords: Point3::new(x, y, z),
            time,
            fuzziness: fuzziness.max(0.0),
        }
    }

    /// Build from an nalgebra point.
    pub fn from_coords(coords: Point3<f64>, time: f64, fuzziness: f64) -> Self {
        Self {
            coords,
            time,
            fuzziness: fuzziness.max(0.0),
        }
    }

    /// x coordinate.
    pub fn x(&self) -> f64 {
        self.coords.x
    }

    /// y coordinate.
    pub fn y(&self) -> f64 {
        self.coords.y
    }

    /// z coordinate.
    pub fn z(&self) -> f64 {
        self.coords.z
    }

    /// Coordinate along axis `index` (0: x, 1: y, 2: z).
    ///
    /// # Panics
    /// When `index > 2`.
    pub fn component(&self, index: usize) -> f64 {
        self.coords[index]
    }

    /// Time stamp (s).
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Fuzziness.
    pub fn fuzziness(&self) -> f64 {
        self.fuzziness
    }

    /// Position as an nalgebra point.
    pub fn coords(&self) -> Point3<f64> {
        self.coords
    }

    /// Same position and time with a different fuzziness.
    pub fn with_fuzziness(&self, fuzziness: f64) -> Self {
        Self::from_coords(self.coords, self.time, fuzziness)
    }

    /// Same position and fuzziness with a different time.
    pub fn at_time(&self, time: f64) -> Self {
        Self::from_coords(self.coords, time, self.fuzziness)
    }

    /// Copy of this point with one coordinate replaced.
    ///
    /// # Panics
    /// When `index > 2`.
    pub fn with_component(&self, index: usize, value: f64) -> Self {
        let mut coords = self.coords;
        coords[index] = value;
        Self::from_coords(coords, self.time, self.fuzziness)
    }

    /// Euclidean distance between positions.
    pub fn distance(&self, other: &Point) -> f64 {
        nalgebra::distance(&self.coords, &other.coords)
    }

    /// Translate by `v`, keeping time and fuzziness.
    pub fn move_by(&self, v: &Vector) -> Self {
        Self::from_coords(self.coords + v.as_vector3(), self.time, self.fuzziness)
    }

    /// Internal division of the segment `self`–`other` in the ratio `m : n`.
    ///
    /// Position, time and fuzziness are all interpolated; `1 : 1` is the midpoint.
    pub fn internal_division(&self, other: &Point, m: f64, n: f64) -> Self {
        let s = m / (m + n);
        let lerp = |a: f64, b: f64| a + (b - a) * s;
        Self {
            coords: Point3::new(
                lerp(self.x(), other.x()),
                lerp(self.y(), other.y()),
                lerp(self.z(), other.z()),
            ),
            time: lerp(self.time, other.time),
            fuzziness: lerp(self.fuzziness, other.fuzziness).max(0.0),
        }
    }

    /// Possibility/necessity that this fuzzy point is contained in `other`.
    ///
    /// Same rule as [`crate::fuzzy::FuzzyValue::included_in`], with the Euclidean
    /// distance between the two vertices.
    pub fn included_in(&self, other: &Point) -> TruthValue {
        TruthValue::inclusion(self.distance(other), self.fuzziness, other.fuzziness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_internal_division_interpolates_time_and_fuzziness() {
        let a = Point::with_time(0.0, 0.0, 0.0, 1.0, 0.0);
        let b = Point::with_time(4.0, 2.0, 0.0, 3.0, 2.0);
        let mid = a.internal_division(&b, 1.0, 1.0);
        assert_relative_eq!(mid.x(), 2.0);
        assert_relative_eq!(mid.y(), 1.0);
        assert_relative_eq!(mid.time(), 2.0);
        assert_relative_eq!(mid.fuzziness(), 1.0);

        let q = a.internal_division(&b, 1.0, 3.0);
        assert_relative_eq!(q.x(), 1.0);
    }

    #[test]
    fn test_negative_fuzziness_is_clamped() {
        let p = Point::with_time(0.0, 0.0, 0.0, 0.0, -1.0);
        assert_eq!(p.fuzziness(), 0.0);
    }

    #[test]
    fn test_point_inclusion_uses_distance() {
        let a = Point::with_time(0.0, 0.0, 0.0, 0.0, 1.0);
        let b = Point::with_time(3.0, 4.0, 0.0, 0.0, 9.0);
        let tv = a.included_in(&b);
        // distance 5, sum 10
        assert_relative_eq!(tv.necessity(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(tv.possibility(), 0.5, epsilon = 1e-12);
    }
}
