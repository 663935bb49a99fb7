//! Similarity transforms (rotation, translation, uniform scale).

use nalgebra::{Similarity3, Vector3};

use super::{Point, Vector};

/// A similarity transform of 3-D space.
pub type Transform = Similarity3<f64>;

/// Objects that can be mapped through a similarity transform.
pub trait Transformable: Sized {
    /// Apply `transform`, returning the transformed object.
    fn transform(&self, transform: &Transform) -> Self;
}

impl Transformable for Point {
    fn transform(&self, transform: &Transform) -> Self {
        Point::from_coords(
            transform.transform_point(&self.coords()),
            self.time(),
            self.fuzziness() * transform.scaling(),
        )
    }
}

impl Transformable for Vector {
    /// Free vectors are rotated and scaled; translation does not apply.
    fn transform(&self, transform: &Transform) -> Self {
        let v: Vector3<f64> = transform.transform_vector(self.as_vector3());
        Vector::from(v)
    }
}

/// Rotation-only part of a transform, applied to a vector.
pub(crate) fn rotate(transform: &Transform, v: &Vector) -> Vector {
    Vector::from(transform.isometry.rotation * v.as_vector3())
}
