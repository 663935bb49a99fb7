//! Per-surface stick/slip friction.

use tracing::{debug, trace};

use super::{
    exceed_necessity, CalculatorSnapshot, FragmentLabel, ForceCalculator, FrictionConfig,
    SampleWindow, StickState, SurfaceState,
};
use crate::curve::{BezierCurve, EvaluationType, ParametricCurve};
use crate::error::ConfigError;
use crate::fitting::FuzzyBezierCurveCreator;
use crate::fuzzy::FuzzyValue;
use crate::geometry::{Point, Vector};
use crate::surface::{FrictionSurface, SurfaceId};

/// Friction against a set of registered surfaces.
///
/// Each surface sticks while the stylus rests on it; the restoring forces of all
/// stuck surfaces are summed.
#[derive(Clone, Debug)]
pub struct SurfaceFrictionCalculator {
    config: FrictionConfig,
    creator: FuzzyBezierCurveCreator,
    window: SampleWindow,
    fbc: Option<BezierCurve>,
    entries: Vec<SurfaceState>,
    next_id: u32,
    last_time: Option<f64>,
    last_force: Vector,
}

impl SurfaceFrictionCalculator {
    /// Create a calculator with no surfaces; fails on invalid parameters.
    pub fn new(config: FrictionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let creator = config.creator()?;
        Ok(Self {
            config,
            creator,
            window: SampleWindow::new(config.input_interval, config.curve_time_length),
            fbc: None,
            entries: Vec::new(),
            next_id: 0,
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

    /// Register a surface. It starts unstuck with an unknown label.
    pub fn add(&mut self, surface: FrictionSurface) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.entries.push(SurfaceState {
            id,
            surface,
            stick: false,
            label: FragmentLabel::Unknown,
        });
        id
    }

    /// Register several surfaces, returning their handles in order.
    pub fn add_all<I>(&mut self, surfaces: I) -> Vec<SurfaceId>
    where
        I: IntoIterator<Item = FrictionSurface>,
    {
        surfaces.into_iter().map(|s| self.add(s)).collect()
    }

    /// Unregister a surface along with its stick state.
    pub fn remove(&mut self, id: SurfaceId) -> Option<FrictionSurface> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).surface)
    }

    /// Unregister every surface.
    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    /// Registered surfaces in registration order.
    pub fn surfaces(&self) -> Vec<(SurfaceId, FrictionSurface)> {
        self.entries.iter().map(|e| (e.id, e.surface)).collect()
    }

    /// Stick flag of every registered surface.
    pub fn flags(&self) -> Vec<(SurfaceId, bool)> {
        self.entries.iter().map(|e| (e.id, e.stick)).collect()
    }

    /// Full state of one surface.
    pub fn state(&self, id: SurfaceId) -> Option<&SurfaceState> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Accepted samples.
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// On-surface test for the last distance, narrowed by the pairwise comparison.
    ///
    /// The necessity of lying on the surface is read straight from the last
    /// distance; only when it is non-zero is it intersected with the inclusion of the
    /// last distance in each earlier one.
    fn fragmentation(&self, distances: &[FuzzyValue]) -> FragmentLabel {
        let Some((last, earlier)) = distances.split_last() else {
            return FragmentLabel::Unknown;
        };
        let on_surface = if last.fuzziness() == 0.0 {
            if last.vertex() <= 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            ((last.fuzziness() - last.vertex()) / last.fuzziness()).clamp(0.0, 1.0)
        };
        let (mut necessity, mut possibility) = (on_surface, on_surface);
        if necessity != 0.0 {
            for d in earlier {
                let tv = last.included_in(d);
                necessity = necessity.min(tv.necessity());
                possibility = possibility.min(tv.possibility());
            }
        }
        FragmentLabel::classify(necessity, possibility, &self.config.fragmentation_threshold)
    }

    fn update_state(&mut self, current: &Point) -> Vector {
        let stiffness = self.config.stiffness;
        let max_force = self.config.max_friction_force;
        let threshold = self.config.max_friction_threshold;
        let mut total = Vector::zeros();
        for entry in &mut self.entries {
            let v = Vector::between(current, &entry.surface.projection(current));
            let value = FuzzyValue::new(v.length() * stiffness, current.fuzziness() * stiffness);
            let necessity = exceed_necessity(&value, max_force);
            if entry.stick {
                if necessity >= threshold && entry.label != FragmentLabel::Stay {
                    entry.stick = false;
                    debug!(surface = %entry.id, necessity, "surface slips");
                    continue;
                }
            } else if entry.label == FragmentLabel::Stay {
                entry.stick = true;
                debug!(surface = %entry.id, necessity, "surface sticks");
            } else {
                continue;
            }
            total = total.compose(&v.magnify(1.0 - necessity));
        }
        total.magnify(stiffness)
    }
}

impl ForceCalculator for SurfaceFrictionCalculator {
    fn calculate(&mut self, point: Point) -> Vector {
        self.window.push(point);
        self.fbc = self.creator.create_fbc(self.window.points());

        let mut current = point;
        if let Some(fbc) = &self.fbc {
            let samples = fbc.evaluate_all(self.config.fragmentation_steps(), EvaluationType::Time);
            let labels: Vec<FragmentLabel> = self
                .entries
                .iter()
                .map(|entry| {
                    let distances: Vec<FuzzyValue> = samples
                        .iter()
                        .map(|p| FuzzyValue::new(entry.surface.distance(p), p.fuzziness()))
                        .collect();
                    self.fragmentation(&distances)
                })
                .collect();
            for (entry, label) in self.entries.iter_mut().zip(labels) {
                entry.label = label;
            }
            trace!(surfaces = self.entries.len(), "surface fragmentation");
            if let Some(last) = samples.last() {
                current = *last;
            }
        }

        self.last_time = Some(point.time());
        self.last_force = self.update_state(&current);
        self.last_force
    }

    fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            time: self.last_time,
            force: self.last_force,
            fbc: self.fbc.clone(),
            stick: StickState::Surface(self.entries.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor() -> FrictionSurface {
        FrictionSurface::plane(Point::new(0.0, 0.0, 0.0), Vector::new(0.0, 0.0, 1.0)).unwrap()
    }

    fn crisp(stiffness: f64, max_friction_force: f64) -> FrictionConfig {
        FrictionConfig {
            stiffness,
            max_friction_force,
            velocity_coefficient: 0.0,
            acceleration_coefficient: 0.0,
            ..FrictionConfig::surface()
        }
    }

    #[test]
    fn test_force_toward_plane_once_stuck() {
        let config = FrictionConfig {
            stiffness: 1.0,
            max_friction_force: 4.95,
            ..FrictionConfig::surface()
        };
        let mut calc = SurfaceFrictionCalculator::new(config).unwrap();
        let id = calc.add(floor());
        calc.entries[0].label = FragmentLabel::Stay;

        let p = Point::with_time(0.0, 0.0, 5.0, 0.0, 0.1);
        assert_relative_eq!(calc.surfaces()[0].1.distance(&p), 5.0);
        let f = calc.calculate(p);
        // |v| = 5, fuzziness 0.1: necessity (5 - 4.95) / 0.1 = 0.5
        assert_relative_eq!(f.x(), 0.0);
        assert_relative_eq!(f.z(), -5.0 * 0.5, epsilon = 1e-9);
        assert_eq!(calc.state(id).map(|s| s.stick), Some(true));
    }

    #[test]
    fn test_resting_on_plane_sticks_and_pushes_back_out() {
        let mut calc = SurfaceFrictionCalculator::new(crisp(1.0, 1.5)).unwrap();
        let id = calc.add(floor());
        for ms in (0..200).step_by(2) {
            let f = calc.calculate(Point::with_time(0.3, 0.2, 0.0, ms as f64 * 1e-3, 0.0));
            assert_relative_eq!(f.length(), 0.0);
        }
        assert_eq!(calc.state(id).unwrap().label, FragmentLabel::Stay);
        assert_eq!(calc.flags(), vec![(id, true)]);

        let f = calc.calculate(Point::with_time(0.3, 0.2, -0.01, 0.2, 0.0));
        assert!(f.z() > 0.0);
        assert_relative_eq!(f.x(), 0.0);
        assert_eq!(calc.flags(), vec![(id, true)]);
    }

    #[test]
    fn test_dragged_off_plane_releases_without_force() {
        let mut calc = SurfaceFrictionCalculator::new(crisp(1.0, 1.5)).unwrap();
        let id = calc.add(floor());
        for ms in (0..200).step_by(2) {
            calc.calculate(Point::with_time(0.3, 0.2, 0.0, ms as f64 * 1e-3, 0.0));
        }
        assert_eq!(calc.flags(), vec![(id, true)]);

        let mut released_at = None;
        for k in 0..60 {
            let t = 0.2 + k as f64 * 2e-3;
            let f = calc.calculate(Point::with_time(0.3, 0.2, 20.0, t, 0.0));
            let state = *calc.state(id).unwrap();
            if released_at.is_none() && !state.stick {
                assert_ne!(state.label, FragmentLabel::Stay);
                assert_eq!(f, Vector::zeros());
                released_at = Some(k);
            } else if released_at.is_some() {
                assert!(!state.stick);
                assert_eq!(f, Vector::zeros());
            } else {
                // Still held: the spring pulls back down to the floor.
                assert!(f.z() < 0.0);
            }
        }
        assert!(released_at.is_some());
    }

    #[test]
    fn test_resting_on_sphere_shell_sticks() {
        let ball = FrictionSurface::sphere(Point::new(0.0, 0.0, -1.0), 1.0).unwrap();
        assert_relative_eq!(ball.distance(&Point::new(0.0, 0.0, -0.5)), 0.5);
        assert_relative_eq!(ball.distance(&Point::new(0.0, 0.0, 2.0)), 2.0);

        let mut calc = SurfaceFrictionCalculator::new(crisp(1.0, 1.5)).unwrap();
        let id = calc.add(ball);
        for ms in (0..200).step_by(2) {
            let f = calc.calculate(Point::with_time(0.0, 0.0, 0.0, ms as f64 * 1e-3, 0.0));
            assert_relative_eq!(f.length(), 0.0);
        }
        let state = calc.state(id).unwrap();
        assert_eq!(state.label, FragmentLabel::Stay);
        assert!(state.stick);
    }

    #[test]
    fn test_hovering_above_plane_never_sticks() {
        let mut calc = SurfaceFrictionCalculator::new(crisp(1.0, 1.5)).unwrap();
        let id = calc.add(floor());
        for ms in (0..200).step_by(2) {
            let f = calc.calculate(Point::with_time(0.0, 0.0, 1.0, ms as f64 * 1e-3, 0.0));
            assert_eq!(f, Vector::zeros());
        }
        assert_eq!(calc.state(id).unwrap().label, FragmentLabel::Move);
        assert!(!calc.state(id).unwrap().stick);
    }

    #[test]
    fn test_registry_leaves_no_orphans() {
        let mut calc = SurfaceFrictionCalculator::new(FrictionConfig::surface()).unwrap();
        let sphere = FrictionSurface::sphere(Point::new(0.0, 0.0, 0.0), 1.0).unwrap();
        let ids = calc.add_all([floor(), sphere]);
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        assert_eq!(calc.remove(ids[0]), Some(floor()));
        assert_eq!(calc.remove(ids[0]), None);
        assert!(calc.state(ids[0]).is_none());
        assert_eq!(calc.flags(), vec![(ids[1], false)]);
        assert_eq!(calc.surfaces(), vec![(ids[1], sphere)]);

        let again = calc.add(floor());
        assert_ne!(again, ids[0]);
        calc.remove_all();
        assert!(calc.surfaces().is_empty());
        assert!(calc.flags().is_empty());
        match calc.snapshot().stick {
            StickState::Surface(states) => assert!(states.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_two_stuck_surfaces_blend() {
        let config = FrictionConfig {
            stiffness: 1.0,
            max_friction_force: 100.0,
            ..FrictionConfig::surface()
        };
        let mut calc = SurfaceFrictionCalculator::new(config).unwrap();
        calc.add(floor());
        let wall = FrictionSurface::plane(Point::new(0.0, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0));
        calc.add(wall.unwrap());
        for e in &mut calc.entries {
            e.label = FragmentLabel::Stay;
        }
        let f = calc.calculate(Point::with_time(2.0, 0.0, 3.0, 0.0, 0.0));
        assert_relative_eq!(f.x(), -2.0);
        assert_relative_eq!(f.z(), -3.0);
    }
}
