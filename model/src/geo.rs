use serde::{Deserialize, Serialize};

use gtfs::RawShapePoint;

/// Mean Earth radius
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 position in degrees. The range isn't validated here; that's up to whatever parsed it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Interpolates lat and lng independently. This is not a great-circle interpolation, but over
    /// the length of one smoothed segment, nobody can tell.
    pub fn lerp(self, other: GeoPoint, pct: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * pct,
            lng: self.lng + (other.lng - self.lng) * pct,
        }
    }

    /// Straight-line separation in raw degrees, treating lat/lng as planar coordinates.
    pub fn degree_dist_to(self, other: GeoPoint) -> f64 {
        (other.lat - self.lat).hypot(other.lng - self.lng)
    }

    /// Position on the unit sphere
    pub(crate) fn to_unit_vector(self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lng = self.lng.to_radians();
        [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
    }
}

impl From<&RawShapePoint> for GeoPoint {
    fn from(pt: &RawShapePoint) -> Self {
        GeoPoint::new(pt.lat, pt.lng)
    }
}

/// Great-circle distance in meters, using the haversine formula.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push h slightly outside [0, 1]
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// The initial bearing of the great circle from `a` to `b`, in degrees clockwise from north, in
/// [0, 360). Coincident points have a bearing of 0.
pub fn initial_bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative angles
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Total great-circle length of a polyline in meters.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        for pt in [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(47.6062, -122.3321),
            GeoPoint::new(-89.9, 179.9),
        ] {
            assert_eq!(distance(pt, pt), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(48.2082, 16.3738);
        let b = GeoPoint::new(48.1486, 17.1077);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn known_distances() {
        // Vienna to Bratislava is roughly 55km
        let vienna = GeoPoint::new(48.2082, 16.3738);
        let bratislava = GeoPoint::new(48.1486, 17.1077);
        let dist = distance(vienna, bratislava);
        assert!(dist > 50_000.0 && dist < 60_000.0, "got {dist}");

        // One degree along the equator
        let expected = EARTH_RADIUS_METERS * 1.0_f64.to_radians();
        assert_relative_eq!(
            distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)),
            expected,
            max_relative = 1e-9
        );
    }

    #[test]
    fn antipodes_dont_blow_up() {
        let dist = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(dist.is_finite());
        assert_relative_eq!(
            dist,
            std::f64::consts::PI * EARTH_RADIUS_METERS,
            max_relative = 1e-9
        );
    }

    #[test]
    fn bearings() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert_relative_eq!(
            initial_bearing(origin, GeoPoint::new(1.0, 0.0)),
            0.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            initial_bearing(origin, GeoPoint::new(0.0, 1.0)),
            90.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            initial_bearing(origin, GeoPoint::new(-1.0, 0.0)),
            180.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            initial_bearing(origin, GeoPoint::new(0.0, -1.0)),
            270.0,
            epsilon = 1e-9
        );
        assert_eq!(initial_bearing(origin, origin), 0.0);
    }

    #[test]
    fn lerp_endpoints() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(12.0, 16.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), GeoPoint::new(11.0, 18.0));
    }

    #[test]
    fn length_of_polyline() {
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, 2.0),
        ];
        assert_relative_eq!(
            path_length(&pts),
            2.0 * distance(pts[0], pts[1]),
            max_relative = 1e-12
        );
        assert_eq!(path_length(&pts[..1]), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }
}
