//! Free 3-D vectors.

use core::ops::{Add, Neg, Sub};

use nalgebra::Vector3;

use super::Point;

/// A free vector in 3-D space.
///
/// Thin wrapper over `nalgebra::Vector3<f64>` exposing the operations the force
/// pipeline speaks in (compose, magnify, start-to-end construction).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector(Vector3<f64>);

impl Vector {
    /// The zero vector.
    pub fn zeros() -> Self {
        Self(Vector3::zeros())
    }

    /// Create a vector from its components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// Vector pointing from `start` to `end`.
    pub fn between(start: &Point, end: &Point) -> Self {
        Self(end.coords() - start.coords())
    }

    /// Unit normal of the plane through three points, or `None` when they are collinear.
    pub fn normal_of(a: &Point, b: &Point, c: &Point) -> Option<Self> {
        Self::between(a, b).cross(&Self::between(a, c)).normalize()
    }

    /// x component.
    pub fn x(&self) -> f64 {
        self.0.x
    }

    /// y component.
    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// z component.
    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Component along axis `index` (0: x, 1: y, 2: z).
    ///
    /// # Panics
    /// When `index > 2`.
    pub fn component(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.0.norm()
    }

    /// Sum of two vectors.
    pub fn compose(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Scalar multiple.
    pub fn magnify(&self, factor: f64) -> Self {
        Self(self.0 * factor)
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    /// Cross product.
    pub fn cross(&self, other: &Self) -> Self {
        Self(self.0.cross(&other.0))
    }

    /// Unit vector in the same direction, or `None` for a zero or non-finite vector.
    pub fn normalize(&self) -> Option<Self> {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Some(Self(self.0 / length))
        } else {
            None
        }
    }

    /// Underlying nalgebra vector.
    pub fn as_vector3(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl From<Vector3<f64>> for Vector {
    fn from(v: Vector3<f64>) -> Self {
        Self(v)
    }
}

impl From<Vector> for Vector3<f64> {
    fn from(v: Vector) -> Self {
        v.0
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.compose(&rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_zero_is_none() {
        assert!(Vector::zeros().normalize().is_none());
        let n = Vector::new(3.0, 0.0, 4.0).normalize().unwrap();
        assert_relative_eq!(n.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.x(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_of_collinear() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(2.0, 0.0, 0.0);
        assert!(Vector::normal_of(&a, &b, &c).is_none());

        let c = Point::new(0.0, 1.0, 0.0);
        let n = Vector::normal_of(&a, &b, &c).unwrap();
        assert_relative_eq!(n.z(), 1.0, epsilon = 1e-12);
    }
}
