#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod shapes;

use std::collections::BTreeMap;

use abstutil::Timer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

pub use shapes::{RawShapePoint, ShapeID};

/// The subset of a GTFS feed needed to replay vehicles along route shapes.
#[derive(Clone, Serialize, Deserialize)]
pub struct GTFS {
    pub shapes: BTreeMap<ShapeID, Vec<RawShapePoint>>,
}

impl GTFS {
    /// Accepts either an unzipped GTFS directory or a .zip archive.
    pub fn load(path: &str, timer: &mut Timer) -> Result<Self> {
        if path.ends_with(".zip") {
            let file = fs_err::File::open(path)?;
            let mut archive = ZipArchive::new(file).with_context(|| format!("opening {path}"))?;
            Self::load_from_zip(&mut archive, timer)
        } else {
            Self::load_from_dir(path, timer)
        }
    }

    pub fn load_from_dir(path: &str, timer: &mut Timer) -> Result<Self> {
        timer.start("load shapes");
        let shapes_path = format!("{path}/shapes.txt");
        let shapes = shapes::load(fs_err::File::open(&shapes_path)?)
            .with_context(|| format!("parsing {shapes_path}"))?;
        timer.stop("load shapes");

        let gtfs = Self { shapes };
        gtfs.describe();
        Ok(gtfs)
    }

    pub fn load_from_zip<R: std::io::Read + std::io::Seek>(
        archive: &mut ZipArchive<R>,
        timer: &mut Timer,
    ) -> Result<Self> {
        timer.start("load shapes");
        // Feeds are zipped either flat or with everything under gtfs/
        let name = if archive.by_name("shapes.txt").is_ok() {
            "shapes.txt"
        } else {
            "gtfs/shapes.txt"
        };
        let shapes = shapes::load(get_zip_file(archive, name)?)
            .with_context(|| format!("parsing {name}"))?;
        timer.stop("load shapes");

        let gtfs = Self { shapes };
        gtfs.describe();
        Ok(gtfs)
    }

    pub fn empty() -> Self {
        Self {
            shapes: BTreeMap::new(),
        }
    }

    /// Looks up the raw points for every requested shape. An empty request means all shapes.
    pub fn select_shapes(&self, ids: &[ShapeID]) -> Result<Vec<(ShapeID, &Vec<RawShapePoint>)>> {
        if ids.is_empty() {
            return Ok(self.shapes.iter().map(|(id, pts)| (id.clone(), pts)).collect());
        }
        let mut results = Vec::new();
        for id in ids {
            match self.shapes.get(id) {
                Some(pts) => results.push((id.clone(), pts)),
                None => bail!("Unknown shape {id}"),
            }
        }
        Ok(results)
    }

    fn describe(&self) {
        let total: usize = self.shapes.values().map(|pts| pts.len()).sum();
        info!(
            "Loaded {} shapes with {} points",
            abstutil::prettyprint_usize(self.shapes.len()),
            abstutil::prettyprint_usize(total)
        );
    }
}

// Adds the path in the error message
pub fn get_zip_file<'a, R: std::io::Read + std::io::Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<zip::read::ZipFile<'a>> {
    archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))
}
