//! A stylus held still with sensor jitter, then dragged along x.
use fuzzyhaptics::{AxisFrictionCalculator, ForceCalculator, FrictionConfig, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

const JITTER: f64 = 1e-4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = FrictionConfig::from_toml_str(
        r#"
        stiffness = 1.0
        max_friction_force = 0.05
        "#,
    )?;
    let mut calc = AxisFrictionCalculator::new(config)?;
    let mut rng = StdRng::seed_from_u64(42);

    for ms in 0..600 {
        let t = ms as f64 * 1e-3;
        // Rest for 300 ms, then drag at 0.5 units/s.
        let x = 1.0 + if ms < 300 { 0.0 } else { 0.5 * (t - 0.3) };
        let jitter = |rng: &mut StdRng| rng.gen_range(-JITTER..JITTER);
        let (dx, dy, dz) = (jitter(&mut rng), jitter(&mut rng), jitter(&mut rng));
        let p = Point::with_time(x + dx, 2.0 + dy, 3.0 + dz, t, 0.0);
        let force = calc.calculate(p);
        if ms % 50 == 0 {
            info!(
                ms,
                fx = force.x(),
                fy = force.y(),
                fz = force.z(),
                flags = ?calc.flags(),
                labels = ?calc.labels(),
                "tick"
            );
        }
    }
    Ok(())
}
