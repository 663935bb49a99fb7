//! Fit a stroke made of a straight run followed by a half circle, then segment it.
use std::f64::consts::PI;

use fuzzyhaptics::{
    EllipticalArcsSegmentation, FuzzyBezierCurveCreator, OpenRecognizer, ParametricCurve, Point,
    Recognizer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn stroke(t: f64) -> (f64, f64) {
    if t < 1.0 {
        (t, 0.0)
    } else {
        let a = (t - 1.0) * PI;
        (1.0 + a.sin(), 1.0 - a.cos())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let points: Vec<Point> = (0..=200)
        .map(|i| {
            let t = i as f64 * 0.01;
            let (x, y) = stroke(t);
            Point::with_time(x, y, 0.0, t, 0.0)
        })
        .collect();

    let creator = FuzzyBezierCurveCreator::default();
    let Some(spline) = creator.create_spline(&points, 0.25) else {
        return Err("too few samples to fit a spline".into());
    };
    info!(segments = spline.segments().len(), range = ?spline.range(), "spline fitted");

    let segmentation = EllipticalArcsSegmentation::new(OpenRecognizer::default());
    for fragment in segmentation.create_fragments(&spline)? {
        let result = segmentation.recognizer().recognize(fragment.curve());
        info!(
            start = fragment.range().start(),
            end = fragment.range().end(),
            kind = ?result.kind(),
            "fragment"
        );
    }
    Ok(())
}
