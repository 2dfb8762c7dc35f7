use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeID(String);

impl ShapeID {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShapeID {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of shapes.txt, minus the shape ID.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawShapePoint {
    pub lat: f64,
    pub lng: f64,
    pub sequence: usize,
}

/// Groups points by shape. Each list is sorted by `sequence`, since feeds don't promise the file
/// is in order.
pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<ShapeID, Vec<RawShapePoint>>> {
    let mut pts_per_shape: BTreeMap<ShapeID, Vec<RawShapePoint>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        pts_per_shape
            .entry(rec.shape_id)
            .or_insert_with(Vec::new)
            .push(RawShapePoint {
                lat: rec.shape_pt_lat,
                lng: rec.shape_pt_lon,
                sequence: rec.shape_pt_sequence,
            });
    }

    for pts in pts_per_shape.values_mut() {
        // Stable, so duplicate sequence numbers keep file order
        pts.sort_by_key(|pt| pt.sequence);
    }
    Ok(pts_per_shape)
}

#[derive(Deserialize)]
struct Record {
    shape_id: ShapeID,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
    shape_pt_sequence: usize,
    // shape_dist_traveled and anything else is ignored
}
