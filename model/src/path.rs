use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// The canonical geometry a vehicle follows, usually the output of `preprocess`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<GeoPoint>,
    /// If true, there's an implicit segment from the last point back to the first.
    closed: bool,
}

impl Path {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Fewer than 2 points can't be animated.
    pub fn can_animate(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// The (start, end) of one segment, or None if the index is out of range.
    pub fn segment(&self, idx: usize) -> Option<(GeoPoint, GeoPoint)> {
        if idx >= self.segment_count() {
            return None;
        }
        let end = (idx + 1) % self.points.len();
        Some((self.points[idx], self.points[end]))
    }

    pub fn length_meters(&self) -> f64 {
        let mut total = crate::geo::path_length(&self.points);
        if self.closed && self.points.len() >= 2 {
            total += crate::distance(self.points[self.points.len() - 1], self.points[0]);
        }
        total
    }
}
