//! Error types for calculator configuration, geometry construction and segmentation.

use thiserror::Error;

/// Errors raised while validating calculator or curve-creator parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The input sampling interval must be strictly positive.
    #[error("invalid input interval: {0}")]
    InputInterval(f64),
    /// The curve window length must be strictly positive.
    #[error("invalid curve time length: {0}")]
    CurveTimeLength(f64),
    /// The fragmentation time resolution must be strictly positive.
    #[error("invalid fragmentation time resolution: {0}")]
    TimeResolution(f64),
    /// The curve window must contain at least one fragmentation step.
    #[error("curve time length {length} is shorter than one fragmentation step of {resolution}")]
    WindowTooShort {
        /// curve time length (s)
        length: f64,
        /// fragmentation time resolution (s)
        resolution: f64,
    },
    /// A threshold or truth value fell outside [0, 1].
    #[error("{name} must lie in [0, 1], got {value}")]
    Threshold {
        /// parameter name
        name: &'static str,
        /// offending value
        value: f64,
    },
    /// A truth value had a necessity above its possibility.
    #[error("necessity {necessity} exceeds possibility {possibility}")]
    InvertedTruthValue {
        /// necessity bound
        necessity: f64,
        /// possibility bound
        possibility: f64,
    },
    /// A window would need more samples than a calculator will hold.
    #[error("{name} needs {samples} samples, more than the {max} allowed")]
    WindowTooLarge {
        /// which sample count overflowed
        name: &'static str,
        /// requested count
        samples: f64,
        /// largest accepted count
        max: f64,
    },
    /// A physical magnitude that must be non-negative was negative or not finite.
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative {
        /// parameter name
        name: &'static str,
        /// offending value
        value: f64,
    },
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Errors raised while building geometric objects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A plane normal had zero (or non-finite) length.
    #[error("plane normal has zero length")]
    ZeroNormal,
    /// Three points given for a plane were collinear.
    #[error("plane points are collinear")]
    CollinearPoints,
    /// Sphere radius was negative or not finite.
    #[error("sphere radius must be finite and non-negative, got {0}")]
    NegativeRadius(f64),
    /// A spline was built from no segments.
    #[error("spline curve needs at least one segment")]
    EmptySpline,
    /// Consecutive spline segments do not share their boundary time.
    #[error("spline segment {index} starts at {start} but the previous one ends at {previous_end}")]
    DiscontinuousSpline {
        /// index of the offending segment
        index: usize,
        /// its start time
        start: f64,
        /// end time of the previous segment
        previous_end: f64,
    },
}

/// Errors raised by the elliptical-arc segmentation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentationError {
    /// A search parameter was NaN or infinite.
    #[error("search parameter {index} is not finite")]
    NonFinite {
        /// position in the parameter list
        index: usize,
    },
    /// Search parameters were not strictly increasing.
    #[error("search parameters must be strictly increasing (index {index}: {previous} >= {value})")]
    NotIncreasing {
        /// position of the offending parameter
        index: usize,
        /// preceding parameter
        previous: f64,
        /// offending parameter
        value: f64,
    },
    /// A search parameter lies outside the curve's range.
    #[error("search parameter {value} lies outside the curve range [{start}, {end}]")]
    OutOfRange {
        /// offending parameter
        value: f64,
        /// curve start
        start: f64,
        /// curve end
        end: f64,
    },
    /// The narrowed search read a table cell it never filled.
    #[error("inconsistent search state: no partial answer for index {0}")]
    MissingAnswer(usize),
}
