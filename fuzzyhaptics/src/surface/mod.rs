//! Frictional surfaces the stylus can be held against.

use core::fmt;

use crate::error::GeometryError;
use crate::geometry::transform::rotate;
use crate::geometry::{Point, Transform, Transformable, Vector};

/// A geometric surface with signed distance, projection and normal queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrictionSurface {
    /// Infinite plane through `base` with unit `normal`.
    Plane {
        /// a point on the plane
        base: Point,
        /// unit normal; distances are positive on this side
        normal: Vector,
    },
    /// Sphere around `base`.
    Sphere {
        /// centre
        base: Point,
        /// radius, `>= 0`
        radius: f64,
    },
}

impl FrictionSurface {
    /// Plane through `base` orthogonal to `normal` (normalised here).
    pub fn plane(base: Point, normal: Vector) -> Result<Self, GeometryError> {
        let normal = normal.normalize().ok_or(GeometryError::ZeroNormal)?;
        Ok(Self::Plane { base, normal })
    }

    /// Plane through three points, oriented by the right-hand rule `a → b → c`.
    pub fn plane_through(a: Point, b: Point, c: Point) -> Result<Self, GeometryError> {
        let normal = Vector::normal_of(&a, &b, &c).ok_or(GeometryError::CollinearPoints)?;
        Ok(Self::Plane { base: a, normal })
    }

    /// Sphere with centre `base` and radius `radius`.
    pub fn sphere(base: Point, radius: f64) -> Result<Self, GeometryError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GeometryError::NegativeRadius(radius));
        }
        Ok(Self::Sphere { base, radius })
    }

    /// Distance from `p` to the surface.
    ///
    /// Signed along the normal for a plane; unsigned `| |p - c| - r |` for a sphere.
    pub fn distance(&self, p: &Point) -> f64 {
        match self {
            Self::Plane { base, normal } => normal.dot(&Vector::between(base, p)),
            Self::Sphere { base, radius } => (base.distance(p) - radius).abs(),
        }
    }

    /// Closest point of the surface to `p`, keeping `p`'s time and fuzziness.
    pub fn projection(&self, p: &Point) -> Point {
        match self {
            Self::Plane { normal, .. } => p.move_by(&normal.magnify(-self.distance(p))),
            Self::Sphere { base, radius } => {
                let offset = self.normal(p).magnify(*radius);
                Point::from_coords(base.move_by(&offset).coords(), p.time(), p.fuzziness())
            }
        }
    }

    /// Unit outward normal at (the projection of) `p`.
    ///
    /// At a sphere's centre every direction is equally close; the x axis is used.
    pub fn normal(&self, p: &Point) -> Vector {
        match self {
            Self::Plane { normal, .. } => *normal,
            Self::Sphere { base, .. } => Vector::between(base, p)
                .normalize()
                .unwrap_or_else(|| Vector::new(1.0, 0.0, 0.0)),
        }
    }
}

impl Transformable for FrictionSurface {
    fn transform(&self, transform: &Transform) -> Self {
        match self {
            Self::Plane { base, normal } => Self::Plane {
                base: base.transform(transform),
                normal: rotate(transform, normal).normalize().unwrap_or(*normal),
            },
            Self::Sphere { base, radius } => Self::Sphere {
                base: base.transform(transform),
                radius: radius * transform.scaling().abs(),
            },
        }
    }
}

/// Stable handle of a surface registered with a calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub(crate) u32);

impl SurfaceId {
    /// Raw handle value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}
