use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::Serialize;

use gtfs::ShapeID;
use model::{Path, Position};

pub enum Format {
    GeoJson,
    Csv,
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "geojson" => Ok(Format::GeoJson),
            "csv" => Ok(Format::Csv),
            _ => bail!("Unknown format {x}; use geojson or csv"),
        }
    }
}

pub struct Sample {
    pub shape_id: ShapeID,
    pub time_ms: f64,
    pub position: Position,
}

/// One LineString per smoothed shape, then one Point per sampled position.
pub fn write_geojson<W: Write>(
    writer: W,
    paths: &BTreeMap<ShapeID, Path>,
    samples: &[Sample],
) -> Result<()> {
    let mut features = Vec::new();
    for (id, path) in paths {
        let mut pts: Vec<Vec<f64>> = path.points().iter().map(|pt| vec![pt.lng, pt.lat]).collect();
        if path.is_closed() {
            if let Some(first) = pts.first().cloned() {
                pts.push(first);
            }
        }
        let mut properties = JsonObject::new();
        properties.insert("shape_id".to_string(), id.as_str().into());
        properties.insert("length_meters".to_string(), path.length_meters().into());
        features.push(make_feature(Value::LineString(pts), properties));
    }

    for sample in samples {
        let pt = sample.position.point;
        let mut properties = JsonObject::new();
        properties.insert("shape_id".to_string(), sample.shape_id.as_str().into());
        properties.insert("time_ms".to_string(), sample.time_ms.into());
        properties.insert("heading".to_string(), sample.position.heading.into());
        features.push(make_feature(Value::Point(vec![pt.lng, pt.lat]), properties));
    }

    let gj = GeoJson::FeatureCollection(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    });
    serde_json::to_writer(writer, &gj)?;
    Ok(())
}

fn make_feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn write_csv<W: Write>(writer: W, samples: &[Sample]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in samples {
        writer.serialize(Row {
            shape_id: sample.shape_id.as_str(),
            time_ms: sample.time_ms,
            lat: sample.position.point.lat,
            lng: sample.position.point.lng,
            heading: sample.position.heading,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct Row<'a> {
    shape_id: &'a str,
    time_ms: f64,
    lat: f64,
    lng: f64,
    heading: f64,
}
