//! Turns raw route shapes into smooth paths, and moves simulated vehicles along them, slowing
//! into corners.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod config;
pub mod corner;
mod fleet;
pub mod geo;
pub mod motion;
mod path;
pub mod preprocess;

use std::collections::BTreeMap;

use abstutil::Timer;
use gtfs::{RawShapePoint, ShapeID};

pub use self::config::ReplayConfig;
pub use self::corner::{speed_profile, turn_angle, CornerConfig, SpeedProfile};
pub use self::fleet::Fleet;
pub use self::geo::{distance, initial_bearing, GeoPoint};
pub use self::motion::{
    Lifecycle, MotionConfig, MotionController, MotionState, Position, TickToken,
};
pub use self::path::Path;
pub use self::preprocess::{chaikin_smoothing, filter_close_points, preprocess, PreprocessConfig};

/// Preprocesses every shape. Shapes that wind up too short to animate are skipped.
pub fn preprocess_shapes(
    shapes: Vec<(ShapeID, &Vec<RawShapePoint>)>,
    config: &PreprocessConfig,
    timer: &mut Timer,
) -> BTreeMap<ShapeID, Path> {
    let mut results = BTreeMap::new();
    timer.start_iter("preprocess shapes", shapes.len());
    for (id, raw) in shapes {
        timer.next();
        let points: Vec<GeoPoint> = raw.iter().map(GeoPoint::from).collect();
        let path = preprocess(&points, config);
        if !path.can_animate() {
            warn!(
                "Skipping {id}: {} raw points became {} after filtering",
                raw.len(),
                path.len()
            );
            continue;
        }
        debug!(
            "{id}: {} raw points, {} smoothed, {:.0}m long",
            raw.len(),
            path.len(),
            path.length_meters()
        );
        results.insert(id, path);
    }
    results
}
