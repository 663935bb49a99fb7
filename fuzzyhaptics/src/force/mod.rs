//! Stick/slip friction force calculators.
//!
//! Both calculators share the same front end: a [`SampleWindow`] of recent stylus
//! samples, a fuzzy Bezier fit over it, and a possibility/necessity test labelling
//! the trailing motion as [`FragmentLabel::Move`], [`FragmentLabel::Stay`] or
//! [`FragmentLabel::Unknown`]. They differ in what is labelled: each coordinate axis
//! ([`AxisFrictionCalculator`]) or each registered surface
//! ([`SurfaceFrictionCalculator`]).

pub mod axis;
pub mod config;
pub mod surface;
pub mod window;

pub use axis::AxisFrictionCalculator;
pub use config::FrictionConfig;
pub use surface::SurfaceFrictionCalculator;
pub use window::SampleWindow;

use crate::curve::BezierCurve;
use crate::fuzzy::{FuzzyValue, TruthValue};
use crate::geometry::{Point, Vector};
use crate::surface::{FrictionSurface, SurfaceId};

/// Motion state of the trailing window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FragmentLabel {
    /// Certainly moving.
    Move,
    /// Certainly stationary.
    Stay,
    /// Neither; triggers no transition.
    #[default]
    Unknown,
}

impl FragmentLabel {
    /// Label from a minimum necessity/possibility pair.
    ///
    /// `Move` when both fall strictly below the threshold pair, `Stay` when both lie
    /// strictly above it, `Unknown` otherwise.
    pub fn classify(necessity: f64, possibility: f64, threshold: &TruthValue) -> Self {
        if necessity < threshold.necessity() && possibility < threshold.possibility() {
            Self::Move
        } else if threshold.necessity() < necessity && threshold.possibility() < possibility {
            Self::Stay
        } else {
            Self::Unknown
        }
    }
}

/// Necessity that a fuzzy force magnitude exceeds `max_force`.
///
/// `clamp((|v| - max) / fuzziness, 0, 1)`; a crisp force is a step at `max_force`.
pub(crate) fn exceed_necessity(force: &FuzzyValue, max_force: f64) -> f64 {
    let excess = force.vertex().abs() - max_force;
    if force.fuzziness() == 0.0 {
        return if excess > 0.0 { 1.0 } else { 0.0 };
    }
    (excess / force.fuzziness()).clamp(0.0, 1.0)
}

/// Stick state of one registered surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceState {
    /// handle
    pub id: SurfaceId,
    /// geometry
    pub surface: FrictionSurface,
    /// `true` while stuck to the surface
    pub stick: bool,
    /// last fragmentation label
    pub label: FragmentLabel,
}

/// Calculator-specific stick state.
#[derive(Clone, Debug, PartialEq)]
pub enum StickState {
    /// Per-axis state (x, y, z).
    Axis {
        /// stick flags
        flags: [bool; 3],
        /// fragmentation labels
        labels: [FragmentLabel; 3],
        /// spring anchor, `None` before the first sample
        anchor: Option<Point>,
    },
    /// Per-surface state in registration order.
    Surface(Vec<SurfaceState>),
}

/// Immutable view of a calculator after a `calculate` call.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorSnapshot {
    /// time of the last processed sample (s), `None` before any
    pub time: Option<f64>,
    /// last output force
    pub force: Vector,
    /// fuzzy curve over the current window, if one could be fitted
    pub fbc: Option<BezierCurve>,
    /// stick flags and labels
    pub stick: StickState,
}

/// Turns stylus samples into friction forces.
///
/// Implementations are stateful and driven by a single writer; `calculate` must be
/// called with samples in time order.
pub trait ForceCalculator {
    /// Process one position sample and return the force to render.
    fn calculate(&mut self, point: Point) -> Vector;

    /// Consistent copy of the current state for readers.
    fn snapshot(&self) -> CalculatorSnapshot;
}
