//! Per-axis stick/slip friction.

use tracing::{debug, trace};

use super::{
    exceed_necessity, CalculatorSnapshot, FragmentLabel, ForceCalculator, FrictionConfig,
    SampleWindow, StickState,
};
use crate::curve::{BezierCurve, EvaluationType, ParametricCurve};
use crate::error::ConfigError;
use crate::fitting::FuzzyBezierCurveCreator;
use crate::fuzzy::FuzzyValue;
use crate::geometry::{Point, Vector};

const AXES: [&str; 3] = ["x", "y", "z"];

/// Friction that pins each coordinate axis independently.
///
/// An axis sticks when its coordinate has stayed put over the window; a spring then
/// pulls the stylus back to the anchor along that axis until the spring force
/// certainly exceeds the static friction limit while the axis is moving.
#[derive(Clone, Debug)]
pub struct AxisFrictionCalculator {
    config: FrictionConfig,
    creator: FuzzyBezierCurveCreator,
    window: SampleWindow,
    fbc: Option<BezierCurve>,
    anchor: Option<Point>,
    flags: [bool; 3],
    labels: [FragmentLabel; 3],
    last_time: Option<f64>,
    last_force: Vector,
}

impl AxisFrictionCalculator {
    /// Create a calculator; fails on invalid parameters.
    pub fn new(config: FrictionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let creator = config.creator()?;
        Ok(Self {
            config,
            creator,
            window: SampleWindow::new(config.input_interval, config.curve_time_length),
            fbc: None,
            anchor: None,
            flags: [false; 3],
            labels: [FragmentLabel::Unknown; 3],
            last_time: None,
            last_force: Vector::zeros(),
        })
    }

    /// Parameters in use.
    pub fn config(&self) -> &FrictionConfig {
        &self.config
    }

    /// Curve over the current window, if one could be fitted.
    pub fn fbc(&self) -> Option<&BezierCurve> {
        self.fbc.as_ref()
    }

    /// Stick flags for x, y and z.
    pub fn flags(&self) -> [bool; 3] {
        self.flags
    }

    /// Last fragmentation labels for x, y and z.
    pub fn labels(&self) -> [FragmentLabel; 3] {
        self.labels
    }

    /// Spring anchor.
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Accepted samples.
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Compare the last value against every earlier one.
    fn fragmentation(&self, values: &[FuzzyValue]) -> FragmentLabel {
        let Some((last, earlier)) = values.split_last() else {
            return FragmentLabel::Unknown;
        };
        let (necessity, possibility) = earlier.iter().fold((1.0_f64, 1.0_f64), |(n, p), v| {
            let tv = last.included_in(v);
            (n.min(tv.necessity()), p.min(tv.possibility()))
        });
        FragmentLabel::classify(necessity, possibility, &self.config.fragmentation_threshold)
    }

    fn update_axis(&mut self, index: usize, current: &Point, spring: &Vector) -> f64 {
        let value = FuzzyValue::new(
            spring.component(index),
            current.fuzziness() * self.config.stiffness,
        );
        let necessity = exceed_necessity(&value, self.config.max_friction_force);
        let force = value.vertex() * (1.0 - necessity);
        let label = self.labels[index];

        if self.flags[index] {
            if necessity >= self.config.max_friction_threshold && label != FragmentLabel::Stay {
                self.flags[index] = false;
                debug!(axis = AXES[index], necessity, "axis slips");
                return 0.0;
            }
            force
        } else if label == FragmentLabel::Stay {
            self.flags[index] = true;
            // Only this axis is re-pinned; the others keep their anchor.
            self.anchor = self
                .anchor
                .map(|a| a.with_component(index, current.component(index)));
            debug!(axis = AXES[index], position = current.component(index), "axis sticks");
            force
        } else {
            0.0
        }
    }
}

impl ForceCalculator for AxisFrictionCalculator {
    fn calculate(&mut self, point: Point) -> Vector {
        self.window.push(point);
        self.fbc = self.creator.create_fbc(self.window.points());

        let mut current = point;
        if let Some(fbc) = &self.fbc {
            let samples = fbc.evaluate_all(self.config.fragmentation_steps(), EvaluationType::Time);
            for axis in 0..3 {
                let values: Vec<FuzzyValue> = samples
                    .iter()
                    .map(|p| FuzzyValue::new(p.component(axis), p.fuzziness()))
                    .collect();
                self.labels[axis] = self.fragmentation(&values);
            }
            trace!(labels = ?self.labels, "axis fragmentation");
            if let Some(last) = samples.last() {
                current = *last;
            }
        }

        let anchor = *self.anchor.get_or_insert(current);
        let spring = Vector::between(&current, &anchor).magnify(self.config.stiffness);
        let x = self.update_axis(0, &current, &spring);
        let y = self.update_axis(1, &current, &spring);
        let z = self.update_axis(2, &current, &spring);

        self.last_time = Some(point.time());
        self.last_force = Vector::new(x, y, z);
        self.last_force
    }

    fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            time: self.last_time,
            force: self.last_force,
            fbc: self.fbc.clone(),
            stick: StickState::Axis {
                flags: self.flags,
                labels: self.labels,
                anchor: self.anchor,
            },
        }
    }
}
