//! Geometric value types: fuzzy points, free vectors and similarity transforms.

pub mod point;
pub mod transform;
pub mod vector;

pub use point::Point;
pub use transform::{Transform, Transformable};
pub use vector::Vector;
