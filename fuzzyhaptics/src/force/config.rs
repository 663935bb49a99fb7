//! Friction calculator parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fitting::{
    sample_count, FuzzyBezierCurveCreator, DEFAULT_ACCELERATION_COEFFICIENT, DEFAULT_DEGREE,
    DEFAULT_VELOCITY_COEFFICIENT,
};
use crate::fuzzy::TruthValue;

/// Construction parameters shared by both friction calculators.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FrictionConfig {
    /// Minimum time between accepted samples (s).
    pub input_interval: f64,
    /// Length of the sample window the curve is fitted over (s).
    pub curve_time_length: f64,
    /// Spring stiffness (N per unit distance).
    pub stiffness: f64,
    /// Largest static friction force (N).
    pub max_friction_force: f64,
    /// Necessity of exceeding the max force at which a stuck axis or surface lets go.
    pub max_friction_threshold: f64,
    /// Necessity/possibility pair the fragmentation test compares against.
    pub fragmentation_threshold: TruthValue,
    /// Time step between curve samples used by the fragmentation test (s).
    pub fragmentation_time_resolution: f64,
    /// Bezier degree of the fitted curve.
    pub degree: usize,
    /// Fuzziness per unit of speed.
    pub velocity_coefficient: f64,
    /// Fuzziness per unit of acceleration.
    pub acceleration_coefficient: f64,
}

impl FrictionConfig {
    /// Defaults of the per-axis calculator: a soft 0.5 N/unit spring, 0.5 N grip.
    pub fn axis() -> Self {
        Self {
            input_interval: 1e-3,
            curve_time_length: 0.1,
            stiffness: 0.5,
            max_friction_force: 0.5,
            max_friction_threshold: 0.95,
            fragmentation_threshold: TruthValue::new(0.5, 0.5),
            fragmentation_time_resolution: 0.025,
            degree: DEFAULT_DEGREE,
            velocity_coefficient: DEFAULT_VELOCITY_COEFFICIENT,
            acceleration_coefficient: DEFAULT_ACCELERATION_COEFFICIENT,
        }
    }

    /// Defaults of the per-surface calculator: a stiff 350 N/unit spring, 1.5 N grip.
    pub fn surface() -> Self {
        Self {
            stiffness: 350.0,
            max_friction_force: 1.5,
            ..Self::axis()
        }
    }

    /// Check every parameter, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.input_interval) {
            return Err(ConfigError::InputInterval(self.input_interval));
        }
        if !positive(self.curve_time_length) {
            return Err(ConfigError::CurveTimeLength(self.curve_time_length));
        }
        if !positive(self.fragmentation_time_resolution) {
            return Err(ConfigError::TimeResolution(self.fragmentation_time_resolution));
        }
        let steps = sample_count(
            "fragmentation test",
            self.curve_time_length / self.fragmentation_time_resolution,
        )?;
        if steps == 0 {
            return Err(ConfigError::WindowTooShort {
                length: self.curve_time_length,
                resolution: self.fragmentation_time_resolution,
            });
        }
        sample_count("sample window", self.curve_time_length / self.input_interval)?;
        non_negative("stiffness", self.stiffness)?;
        non_negative("max_friction_force", self.max_friction_force)?;
        unit_interval("max_friction_threshold", self.max_friction_threshold)?;
        unit_interval(
            "fragmentation_threshold.necessity",
            self.fragmentation_threshold.necessity(),
        )?;
        unit_interval(
            "fragmentation_threshold.possibility",
            self.fragmentation_threshold.possibility(),
        )?;
        self.creator().map(|_| ())
    }

    /// Curve creator matching these parameters.
    pub fn creator(&self) -> Result<FuzzyBezierCurveCreator, ConfigError> {
        FuzzyBezierCurveCreator::new(
            self.degree,
            self.curve_time_length,
            self.velocity_coefficient,
            self.acceleration_coefficient,
        )
    }

    /// Number of curve intervals the fragmentation test samples.
    ///
    /// Bounded only once [`FrictionConfig::validate`] has passed.
    pub fn fragmentation_steps(&self) -> usize {
        (self.curve_time_length / self.fragmentation_time_resolution) as usize
    }

    /// Parse a TOML document. Omitted keys take the [`FrictionConfig::axis`] value.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self::axis()
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Threshold { name, value })
    }
}
