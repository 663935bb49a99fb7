//! A session over a floor and a ball: the stylus lands on the floor and rests there.
use std::thread;
use std::time::Duration;

use fuzzyhaptics::force::StickState;
use fuzzyhaptics::{
    DeviceEvent, EventListener, FrictionConfig, FrictionSurface, HapticSession, Point,
    SurfaceFrictionCalculator, Vector,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let calc = SurfaceFrictionCalculator::new(FrictionConfig::surface())?;
    let mut session = HapticSession::new(calc, |f: Vector| {
        if f.length() > 0.0 {
            tracing::debug!(fx = f.x(), fy = f.y(), fz = f.z(), "force request");
        }
    });

    let floor = FrictionSurface::plane(Point::new(0.0, 0.0, 0.0), Vector::new(0.0, 0.0, 1.0))?;
    let ball = FrictionSurface::sphere(Point::new(0.0, 0.0, 50.0), 10.0)?;
    let ids = session.update_calculator(|c| c.add_all([floor, ball]));
    info!(?ids, "surfaces registered");

    // The display side polls snapshots while the device thread writes.
    let reader = session.reader();
    let display = thread::spawn(move || {
        for _ in 0..5 {
            let snapshot = reader.latest();
            if let StickState::Surface(states) = &snapshot.stick {
                let stuck: Vec<_> = states.iter().filter(|s| s.stick).map(|s| s.id).collect();
                info!(time = ?snapshot.time, ?stuck, "display");
            }
            thread::sleep(Duration::from_millis(20));
        }
    });

    session.dispatch(DeviceEvent::Pressed { button: 0, time_ns: 0 });
    for ms in 0..400_i64 {
        // Descend from z = 2 to the floor over 100 ms, then rest.
        let z = (2.0 - 0.02 * ms as f64).max(0.0);
        session.dispatch(DeviceEvent::Position {
            x: 5.0,
            y: 5.0,
            z,
            time_ns: ms * 1_000_000,
        });
    }
    session.dispatch(DeviceEvent::Released { button: 0, time_ns: 400_000_000 });
    session.dispatch(DeviceEvent::Disconnected);

    display
        .join()
        .map_err(|_| "display thread panicked")?;
    let (calc, _) = session.into_parts();
    for (id, stick) in calc.flags() {
        info!(surface = %id, stick, "final");
    }
    Ok(())
}
