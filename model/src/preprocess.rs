use serde::{Deserialize, Serialize};

use crate::{GeoPoint, Path};

/// In raw degrees, not meters. Roughly 5.5m of latitude, but the east-west equivalent shrinks
/// towards the poles.
// TODO Convert to meters with geo::distance once replays can be compared before and after; every
// other threshold in the crate is in meters.
pub const DEFAULT_MIN_SEPARATION: f64 = 0.00005;
pub const DEFAULT_SMOOTHING_ITERATIONS: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Points closer than this to the last kept point are dropped. Raw degrees.
    pub min_separation: f64,
    /// Passes of Chaikin smoothing
    pub iterations: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_separation: DEFAULT_MIN_SEPARATION,
            iterations: DEFAULT_SMOOTHING_ITERATIONS,
        }
    }
}

/// Drops points within `min_separation` of the most recently kept point. The first point always
/// survives.
pub fn filter_close_points(points: &[GeoPoint], min_separation: f64) -> Vec<GeoPoint> {
    let mut kept: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for pt in points {
        match kept.last() {
            Some(last) if last.degree_dist_to(*pt) <= min_separation => {}
            _ => kept.push(*pt),
        }
    }
    kept
}

/// Chaikin's corner-cutting. Each pass replaces every edge with points at 1/4 and 3/4 along it,
/// keeping the original endpoints fixed.
pub fn chaikin_smoothing(mut points: Vec<GeoPoint>, iterations: usize) -> Vec<GeoPoint> {
    if points.len() < 2 {
        return points;
    }
    for _ in 0..iterations {
        let first = points[0];
        let last = points[points.len() - 1];

        let mut smoothed = Vec::with_capacity(2 * points.len());
        smoothed.push(first);
        for pair in points.windows(2) {
            smoothed.push(pair[0].lerp(pair[1], 0.25));
            smoothed.push(pair[0].lerp(pair[1], 0.75));
        }
        smoothed.push(last);
        points = smoothed;
    }
    points
}

/// Cleans up raw shape points into something that animates smoothly.
pub fn preprocess(points: &[GeoPoint], config: &PreprocessConfig) -> Path {
    let filtered = filter_close_points(points, config.min_separation);
    Path::new(chaikin_smoothing(filtered, config.iterations))
}
