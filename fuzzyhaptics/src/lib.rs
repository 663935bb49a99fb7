//! Fuzzy-curve friction forces for haptic styluses, and segmentation of fuzzy curves
//! into elliptic runs.
//!
//! Stylus samples are fitted with a fuzzy Bezier curve over a short trailing window.
//! A possibility/necessity test on that curve tells whether the stylus is resting,
//! and the force calculators in [`force`] turn that into a stick/slip spring force.
//! [`fragmentation`] cuts a recorded fuzzy spline into the fewest line, circular-arc
//! or elliptic-arc runs.

pub mod curve;
pub mod error;
pub mod fitting;
pub mod force;
pub mod fragmentation;
pub mod fuzzy;
pub mod geometry;
pub mod recognition;
pub mod session;
pub mod surface;

pub use curve::{
    BezierCurve, EvaluationType, ParametricCurve, QuadraticBezierCurve, Range, SplineCurve,
};
pub use error::{ConfigError, GeometryError, SegmentationError};
pub use fitting::FuzzyBezierCurveCreator;
pub use force::{
    AxisFrictionCalculator, CalculatorSnapshot, ForceCalculator, FragmentLabel, FrictionConfig,
    SurfaceFrictionCalculator,
};
pub use fragmentation::{EllipticalArcsSegmentation, Fragment};
pub use fuzzy::{FuzzyValue, TruthValue};
pub use geometry::{Point, Transform, Transformable, Vector};
pub use recognition::{OpenRecognizer, PrimitiveType, RecognitionResult, Recognizer};
pub use session::{DeviceEvent, EventListener, ForceSink, HapticSession, SnapshotReader};
pub use surface::{FrictionSurface, SurfaceId};
