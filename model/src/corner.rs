use serde::{Deserialize, Serialize};

use crate::{distance, GeoPoint, Path};

pub const DEFAULT_LOOK_AHEAD: usize = 3;

/// How fast a vehicle should be moving, as multipliers of its base speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Apply this right now. In (0, 1].
    pub current_speed: f64,
    /// Needed by the time the vehicle reaches the corner. In (0, 1].
    pub target_speed: f64,
    /// Meters to the most restrictive corner ahead, or infinity if there isn't one.
    pub distance_to_corner: f64,
}

impl SpeedProfile {
    /// Full speed, nothing ahead
    pub const NEUTRAL: SpeedProfile = SpeedProfile {
        current_speed: 1.0,
        target_speed: 1.0,
        distance_to_corner: f64::INFINITY,
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerConfig {
    /// How many points past the current one to inspect
    pub look_ahead: usize,
    /// (angle in degrees, speed). A turn angle below the limit gets that speed; the first match
    /// wins, so keep these sorted by increasing angle. Anything that matches nothing is a
    /// straight.
    pub thresholds: Vec<(f64, f64)>,
    /// Start slowing down within this many meters of a corner
    pub ease_in_meters: f64,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            look_ahead: DEFAULT_LOOK_AHEAD,
            thresholds: vec![(30.0, 0.2), (45.0, 0.3), (90.0, 0.5), (135.0, 0.7)],
            ease_in_meters: 10.0,
        }
    }
}

impl CornerConfig {
    pub fn target_speed_for_angle(&self, angle: f64) -> f64 {
        for (limit, speed) in &self.thresholds {
            if angle < *limit {
                return *speed;
            }
        }
        1.0
    }

    /// Looks for the sharpest turn in the `look_ahead` points after `current_idx`.
    pub fn speed_profile(&self, points: &[GeoPoint], current_idx: usize) -> SpeedProfile {
        if current_idx >= points.len() {
            return SpeedProfile::NEUTRAL;
        }
        let end = (current_idx + self.look_ahead).min(points.len() - 1);
        let window = &points[current_idx..=end];
        if window.len() < 3 {
            return SpeedProfile::NEUTRAL;
        }

        let mut target_speed = 1.0;
        let mut distance_to_corner = f64::INFINITY;
        // From the window start to the middle point of the current triple
        let mut dist_so_far = 0.0;
        for triple in window.windows(3) {
            dist_so_far += distance(triple[0], triple[1]);
            let speed = self.target_speed_for_angle(turn_angle(triple[0], triple[1], triple[2]));
            // Strict, so ties keep the nearer corner
            if speed < target_speed {
                target_speed = speed;
                distance_to_corner = dist_so_far;
            }
        }

        SpeedProfile {
            current_speed: self.ease_in(target_speed, distance_to_corner),
            target_speed,
            distance_to_corner,
        }
    }

    /// Like `speed_profile`, but on a closed path the window wraps past the last point, so the
    /// corner where the loop joins is seen too.
    pub fn path_profile(&self, path: &Path, current_idx: usize) -> SpeedProfile {
        let n = path.len();
        if !path.is_closed() || current_idx >= n {
            return self.speed_profile(path.points(), current_idx);
        }
        // At most one full lap
        let window: Vec<GeoPoint> = (0..=self.look_ahead.min(n))
            .map(|k| path.points()[(current_idx + k) % n])
            .collect();
        self.speed_profile(&window, 0)
    }

    /// Quadratic approach to the target speed, reaching it exactly at the corner.
    fn ease_in(&self, target_speed: f64, distance_to_corner: f64) -> f64 {
        if distance_to_corner > self.ease_in_meters {
            return 1.0;
        }
        if self.ease_in_meters <= 0.0 {
            return target_speed;
        }
        let pct = distance_to_corner / self.ease_in_meters;
        target_speed + (1.0 - target_speed) * pct * pct
    }
}

/// Uses the default thresholds with a custom look-ahead.
pub fn speed_profile(points: &[GeoPoint], current_idx: usize, look_ahead: usize) -> SpeedProfile {
    CornerConfig {
        look_ahead,
        ..Default::default()
    }
    .speed_profile(points, current_idx)
}

/// The angle at `middle` between the chords to its neighbors, in degrees. 180 is a straight line,
/// 0 is a full reversal. Computed on the unit sphere, so it holds up away from the equator.
pub fn turn_angle(before: GeoPoint, middle: GeoPoint, after: GeoPoint) -> f64 {
    let b = before.to_unit_vector();
    let m = middle.to_unit_vector();
    let a = after.to_unit_vector();
    let v1 = [b[0] - m[0], b[1] - m[1], b[2] - m[2]];
    let v2 = [a[0] - m[0], a[1] - m[1], a[2] - m[2]];

    let norms = norm(v1) * norm(v2);
    if norms == 0.0 {
        // A repeated point has no direction
        return 180.0;
    }
    let cos = (v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2]) / norms;
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Three points around the origin. Coming in from the west, then leaving at `angle` degrees
    /// from the incoming chord. Near the equator a degree of lat and lng are about the same
    /// length, so the spherical angle matches the planar one.
    fn corner(arm_degrees: f64, angle: f64) -> Vec<GeoPoint> {
        let rads = angle.to_radians();
        vec![
            GeoPoint::new(0.0, -arm_degrees),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(arm_degrees * rads.sin(), -arm_degrees * rads.cos()),
        ]
    }

    #[test]
    fn angles() {
        for angle in [10.0, 45.0, 90.0, 120.0, 179.0] {
            let pts = corner(0.001, angle);
            assert_relative_eq!(turn_angle(pts[0], pts[1], pts[2]), angle, epsilon = 1e-3);
        }
    }

    #[test]
    fn repeated_point_is_straight() {
        let pt = GeoPoint::new(1.0, 1.0);
        assert_eq!(turn_angle(pt, pt, GeoPoint::new(2.0, 2.0)), 180.0);
    }

    #[test]
    fn too_short_is_neutral() {
        let pts = corner(0.001, 20.0);
        assert_eq!(speed_profile(&pts[..2], 0, 3), SpeedProfile::NEUTRAL);
        assert_eq!(speed_profile(&pts, 1, 3), SpeedProfile::NEUTRAL);
        assert_eq!(speed_profile(&pts, 7, 3), SpeedProfile::NEUTRAL);
        assert_eq!(speed_profile(&[], 0, 3), SpeedProfile::NEUTRAL);
        // A look-ahead of 1 never sees a full triple
        assert_eq!(speed_profile(&pts, 0, 1), SpeedProfile::NEUTRAL);
    }

    #[test]
    fn straight_line_never_slows() {
        let pts: Vec<GeoPoint> = (0..5)
            .map(|i| GeoPoint::new(i as f64 * 0.0001, i as f64 * 0.0001))
            .collect();
        for idx in 0..pts.len() {
            let profile = speed_profile(&pts, idx, 3);
            assert_eq!(profile.target_speed, 1.0);
            assert_eq!(profile.current_speed, 1.0);
            assert_eq!(profile.distance_to_corner, f64::INFINITY);
        }
    }

    #[test]
    fn sharper_turns_are_slower() {
        let mut last = f64::INFINITY;
        for (angle, expected) in [
            (170.0, 1.0),
            (120.0, 0.7),
            (60.0, 0.5),
            (40.0, 0.3),
            (20.0, 0.2),
        ] {
            let profile = speed_profile(&corner(0.001, angle), 0, 3);
            assert_eq!(profile.target_speed, expected, "angle {angle}");
            assert!(profile.target_speed <= last);
            last = profile.target_speed;
        }
    }

    #[test]
    fn far_corner_keeps_full_speed() {
        // Each arm is about 111m
        let pts = corner(0.001, 20.0);
        let profile = speed_profile(&pts, 0, 3);
        assert_eq!(profile.target_speed, 0.2);
        assert_relative_eq!(profile.distance_to_corner, distance(pts[0], pts[1]));
        assert_eq!(profile.current_speed, 1.0);
    }

    #[test]
    fn near_corner_eases_in() {
        // About 5.6m from the corner
        let pts = corner(0.00005, 20.0);
        let profile = speed_profile(&pts, 0, 3);
        let dist = distance(pts[0], pts[1]);
        assert!(dist < 10.0);
        assert_relative_eq!(profile.distance_to_corner, dist);
        assert_relative_eq!(
            profile.current_speed,
            0.2 + 0.8 * (dist / 10.0).powi(2),
            max_relative = 1e-12
        );
        assert!(profile.current_speed > profile.target_speed);
        assert!(profile.current_speed < 1.0);
    }

    #[test]
    fn most_restrictive_corner_wins() {
        // A gentle turn, then a hairpin further along
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0005, 0.0019),
            GeoPoint::new(0.0, 0.0015),
        ];
        let gentle = turn_angle(pts[0], pts[1], pts[2]);
        let hairpin = turn_angle(pts[1], pts[2], pts[3]);
        assert!(gentle > 135.0, "{gentle}");
        assert!(hairpin < 30.0, "{hairpin}");

        let profile = speed_profile(&pts, 0, 3);
        assert_eq!(profile.target_speed, 0.2);
        assert_relative_eq!(
            profile.distance_to_corner,
            distance(pts[0], pts[1]) + distance(pts[1], pts[2]),
            max_relative = 1e-12
        );
    }

    #[test]
    fn ties_keep_the_nearer_corner() {
        // Two identical zigzags
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0003, 0.0),
            GeoPoint::new(0.0003, 0.001),
        ];
        let profile = speed_profile(&pts, 0, 3);
        assert_eq!(profile.target_speed, 0.2);
        assert_relative_eq!(profile.distance_to_corner, distance(pts[0], pts[1]));
    }

    #[test]
    fn look_ahead_limits_the_window() {
        // The hairpin is at index 3, which a look-ahead of 2 from index 0 can't see
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.002),
            GeoPoint::new(0.0, 0.003),
            GeoPoint::new(0.0003, 0.002),
        ];
        assert_eq!(speed_profile(&pts, 0, 2).target_speed, 1.0);
        assert_eq!(speed_profile(&pts, 0, 4).target_speed, 0.2);
    }

    #[test]
    fn closed_paths_see_the_join() {
        // The closing segment runs from the last point into a hairpin at the first point
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0003, 0.0005),
            GeoPoint::new(0.00001, 0.00004),
        ];
        let cfg = CornerConfig::default();
        assert_eq!(
            cfg.path_profile(&Path::new(pts.clone()), 3),
            SpeedProfile::NEUTRAL
        );

        let profile = cfg.path_profile(&Path::closed(pts.clone()), 3);
        let dist = distance(pts[3], pts[0]);
        assert!(dist < 10.0);
        assert_eq!(profile.target_speed, 0.2);
        assert_relative_eq!(profile.distance_to_corner, dist);
        assert!(profile.current_speed < 1.0);

        // Away from the join, nothing changes
        assert_eq!(
            cfg.path_profile(&Path::closed(pts.clone()), 0),
            cfg.speed_profile(&pts, 0)
        );
    }

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: CornerConfig = serde_json::from_str(r#"{"look_ahead": 5}"#).unwrap();
        assert_eq!(cfg.look_ahead, 5);
        assert_eq!(cfg.ease_in_meters, 10.0);
        assert_eq!(cfg.target_speed_for_angle(100.0), 0.7);
        assert_eq!(cfg.target_speed_for_angle(135.0), 1.0);
    }
}
