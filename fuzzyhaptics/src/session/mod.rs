//! Device event handling around a force calculator.
//!
//! A [`HapticSession`] is the single writer of its calculator: it turns position
//! events into force requests and publishes a [`CalculatorSnapshot`] after each
//! one. Readers on other threads hold a [`SnapshotReader`] and always see a whole
//! snapshot, never one that is half updated.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, trace};

use crate::force::{CalculatorSnapshot, ForceCalculator};
use crate::geometry::{Point, Vector};

/// Nanoseconds per second.
const NANOS_PER_SECOND: f64 = 1e9;

/// One message from the stylus device. Timestamps are in nanoseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceEvent {
    /// A button went down.
    Pressed { button: i32, time_ns: i64 },
    /// A button came up.
    Released { button: i32, time_ns: i64 },
    /// Tip position (mm).
    Position { x: f64, y: f64, z: f64, time_ns: i64 },
    /// Stylus angles about x, y and z (degrees).
    Posture { x: f64, y: f64, z: f64, time_ns: i64 },
    /// Force measured by the device (N).
    Force { x: f64, y: f64, z: f64, time_ns: i64 },
    /// The link dropped.
    Disconnected,
}

/// Receiver of device events. Every handler defaults to doing nothing.
pub trait EventListener {
    /// A button went down.
    fn on_pressed(&mut self, _button: i32, _time_ns: i64) {}

    /// A button came up.
    fn on_released(&mut self, _button: i32, _time_ns: i64) {}

    /// New tip position.
    fn position(&mut self, _x: f64, _y: f64, _z: f64, _time_ns: i64) {}

    /// New stylus posture.
    fn posture(&mut self, _x: f64, _y: f64, _z: f64, _time_ns: i64) {}

    /// New measured force.
    fn force(&mut self, _x: f64, _y: f64, _z: f64, _time_ns: i64) {}

    /// The link dropped.
    fn disconnected(&mut self) {}

    /// Route `event` to its handler.
    fn dispatch(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Pressed { button, time_ns } => self.on_pressed(button, time_ns),
            DeviceEvent::Released { button, time_ns } => self.on_released(button, time_ns),
            DeviceEvent::Position { x, y, z, time_ns } => self.position(x, y, z, time_ns),
            DeviceEvent::Posture { x, y, z, time_ns } => self.posture(x, y, z, time_ns),
            DeviceEvent::Force { x, y, z, time_ns } => self.force(x, y, z, time_ns),
            DeviceEvent::Disconnected => self.disconnected(),
        }
    }
}

/// Destination of computed forces, usually the device link.
pub trait ForceSink {
    /// Ask the device to render `force`.
    fn request_update(&mut self, force: Vector);
}

impl<F: FnMut(Vector)> ForceSink for F {
    fn request_update(&mut self, force: Vector) {
        self(force)
    }
}

/// Read side of a session's published state.
#[derive(Clone, Debug)]
pub struct SnapshotReader {
    shared: Arc<RwLock<Arc<CalculatorSnapshot>>>,
}

impl SnapshotReader {
    /// Most recently published snapshot.
    pub fn latest(&self) -> Arc<CalculatorSnapshot> {
        Arc::clone(&self.shared.read())
    }
}

/// Drives a calculator from device events and forwards its forces to a sink.
pub struct HapticSession<C, S> {
    calculator: C,
    sink: S,
    pressed: BTreeSet<i32>,
    connected: bool,
    measured_force: Option<Vector>,
    shared: Arc<RwLock<Arc<CalculatorSnapshot>>>,
}

impl<C: ForceCalculator, S: ForceSink> HapticSession<C, S> {
    /// Session over `calculator`, sending forces to `sink`.
    pub fn new(calculator: C, sink: S) -> Self {
        let shared = Arc::new(RwLock::new(Arc::new(calculator.snapshot())));
        Self {
            calculator,
            sink,
            pressed: BTreeSet::new(),
            connected: true,
            measured_force: None,
            shared,
        }
    }

    /// A reader that may be moved to another thread.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The calculator.
    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    /// Change the calculator, e.g. its surface set, then republish its state.
    pub fn update_calculator<T>(&mut self, f: impl FnOnce(&mut C) -> T) -> T {
        let out = f(&mut self.calculator);
        self.publish();
        out
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Buttons currently held.
    pub fn pressed_buttons(&self) -> impl Iterator<Item = i32> + '_ {
        self.pressed.iter().copied()
    }

    /// Whether `button` is held.
    pub fn is_pressed(&self, button: i32) -> bool {
        self.pressed.contains(&button)
    }

    /// `false` once the device disconnected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Last force reported by the device itself.
    pub fn measured_force(&self) -> Option<Vector> {
        self.measured_force
    }

    /// Tear the session down into its calculator and sink.
    pub fn into_parts(self) -> (C, S) {
        (self.calculator, self.sink)
    }

    fn publish(&self) {
        let snapshot = Arc::new(self.calculator.snapshot());
        *self.shared.write() = snapshot;
    }
}

impl<C: ForceCalculator, S: ForceSink> EventListener for HapticSession<C, S> {
    fn on_pressed(&mut self, button: i32, time_ns: i64) {
        trace!(button, time_ns, "pressed");
        self.pressed.insert(button);
    }

    fn on_released(&mut self, button: i32, time_ns: i64) {
        trace!(button, time_ns, "released");
        self.pressed.remove(&button);
    }

    fn position(&mut self, x: f64, y: f64, z: f64, time_ns: i64) {
        if !self.connected {
            return;
        }
        let time = time_ns as f64 / NANOS_PER_SECOND;
        let force = self.calculator.calculate(Point::with_time(x, y, z, time, 0.0));
        self.sink.request_update(force);
        self.publish();
    }

    fn force(&mut self, x: f64, y: f64, z: f64, _time_ns: i64) {
        self.measured_force = Some(Vector::new(x, y, z));
    }

    fn disconnected(&mut self) {
        info!(pressed = self.pressed.len(), "device disconnected");
        self.connected = false;
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use approx::assert_relative_eq;

    use super::*;
    use crate::force::{
        AxisFrictionCalculator, FrictionConfig, StickState, SurfaceFrictionCalculator,
    };
    use crate::surface::FrictionSurface;

    #[derive(Default)]
    struct Recorder(Vec<Vector>);

    impl ForceSink for Recorder {
        fn request_update(&mut self, force: Vector) {
            self.0.push(force);
        }
    }

    fn axis_session() -> HapticSession<AxisFrictionCalculator, Recorder> {
        let calc = AxisFrictionCalculator::new(FrictionConfig::axis()).unwrap();
        HapticSession::new(calc, Recorder::default())
    }

    #[test]
    fn test_positions_drive_calculator_in_seconds() {
        let mut session = axis_session();
        let reader = session.reader();
        assert_eq!(reader.latest().time, None);

        for i in 0..200_i64 {
            session.dispatch(DeviceEvent::Position {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                time_ns: i * 1_000_000,
            });
        }
        assert_eq!(session.sink().0.len(), 200);
        let latest = reader.latest();
        assert_relative_eq!(latest.time.unwrap(), 0.199, epsilon = 1e-12);
        assert!(latest.fbc.is_some());
        match &latest.stick {
            StickState::Axis { flags, .. } => assert_eq!(*flags, [true; 3]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_buttons_and_disconnect() {
        let mut session = axis_session();
        session.dispatch(DeviceEvent::Pressed { button: 1, time_ns: 0 });
        session.dispatch(DeviceEvent::Pressed { button: 2, time_ns: 5 });
        session.dispatch(DeviceEvent::Released { button: 1, time_ns: 9 });
        assert_eq!(session.pressed_buttons().collect::<Vec<_>>(), vec![2]);
        assert!(session.is_pressed(2));

        session.dispatch(DeviceEvent::Force {
            x: 0.0,
            y: 0.5,
            z: 0.0,
            time_ns: 10,
        });
        assert_eq!(session.measured_force(), Some(Vector::new(0.0, 0.5, 0.0)));

        session.dispatch(DeviceEvent::Disconnected);
        assert!(!session.is_connected());
        assert_eq!(session.pressed_buttons().count(), 0);

        session.dispatch(DeviceEvent::Position {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            time_ns: 20,
        });
        let (_, sink) = session.into_parts();
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_closure_sink_and_surface_updates_republish() {
        let mut forces = Vec::new();
        {
            let calc = SurfaceFrictionCalculator::new(FrictionConfig::surface()).unwrap();
            let mut session = HapticSession::new(calc, |f: Vector| forces.push(f));
            let reader = session.reader();
            let ball = FrictionSurface::sphere(Point::new(0.0, 0.0, 0.0), 1.0).unwrap();
            let id = session.update_calculator(|c| c.add(ball));
            match &reader.latest().stick {
                StickState::Surface(states) => assert_eq!(states[0].id, id),
                other => panic!("unexpected {other:?}"),
            }
            session.position(0.0, 0.0, 5.0, 0);
            session.update_calculator(|c| c.remove_all());
            match &reader.latest().stick {
                StickState::Surface(states) => assert!(states.is_empty()),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(forces, vec![Vector::zeros()]);
    }

    #[test]
    fn test_reader_sees_whole_snapshots_across_threads() {
        let mut session = axis_session();
        let reader = session.reader();
        let watcher = thread::spawn(move || {
            let mut last = f64::NEG_INFINITY;
            for _ in 0..2000 {
                let snapshot = reader.latest();
                if let Some(t) = snapshot.time {
                    assert!(t >= last);
                    last = t;
                }
            }
        });
        for i in 0..300_i64 {
            session.position(i as f64 * 1e-3, 0.0, 0.0, i * 1_000_000);
        }
        watcher.join().unwrap();
        assert_relative_eq!(session.reader().latest().time.unwrap(), 0.299, epsilon = 1e-12);
    }
}
