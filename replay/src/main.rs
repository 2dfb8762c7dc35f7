#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod output;

use std::collections::BTreeMap;
use std::io::Write;

use abstutil::Timer;
use anyhow::{Context, Result};
use structopt::StructOpt;

use gtfs::{ShapeID, GTFS};
use model::{Fleet, Path, ReplayConfig};

use self::output::{Format, Sample};

#[derive(StructOpt)]
#[structopt(about = "Replays vehicles along GTFS route shapes")]
struct Args {
    /// The path to a GTFS directory or .zip file
    #[structopt(long)]
    gtfs: String,
    /// Only replay these shapes. By default, every shape is used.
    #[structopt(long)]
    shape: Vec<String>,
    /// A JSON file overriding any preprocessing, corner, or motion settings
    #[structopt(long)]
    config: Option<String>,
    /// Treat every shape as a loop, driving from the last point back to the first
    #[structopt(long)]
    closed: bool,
    /// Simulated milliseconds per tick
    #[structopt(long, default_value = "16")]
    tick_ms: f64,
    /// How many simulated milliseconds to replay
    #[structopt(long, default_value = "60000")]
    duration_ms: f64,
    /// Record a position every this many ticks
    #[structopt(long, default_value = "10")]
    sample_every: usize,
    /// geojson or csv
    #[structopt(long, default_value = "geojson")]
    format: Format,
    /// Write here instead of stdout
    #[structopt(long)]
    output: Option<String>,
}

impl Args {
    fn validate(&self) -> Result<()> {
        if !(self.tick_ms > 0.0) {
            bail!("--tick-ms must be positive, not {}", self.tick_ms);
        }
        if self.duration_ms < 0.0 {
            bail!("--duration-ms can't be negative");
        }
        if self.sample_every == 0 {
            bail!("--sample-every must be at least 1");
        }
        Ok(())
    }

    fn load_config(&self) -> Result<ReplayConfig> {
        match self.config {
            Some(ref path) => {
                let file = fs_err::File::open(path)?;
                serde_json::from_reader(std::io::BufReader::new(file))
                    .with_context(|| format!("parsing {path}"))
            }
            None => Ok(ReplayConfig::default()),
        }
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    args.validate()?;
    let config = args.load_config()?;
    config.validate()?;

    let mut timer = Timer::new("replay shapes");
    let gtfs = GTFS::load(&args.gtfs, &mut timer)?;
    let ids: Vec<ShapeID> = args.shape.iter().map(ShapeID::new).collect();
    let mut paths = model::preprocess_shapes(
        gtfs.select_shapes(&ids)?,
        &config.preprocess,
        &mut timer,
    );
    if paths.is_empty() {
        bail!("None of the selected shapes have enough points to replay");
    }
    if args.closed {
        paths = paths
            .into_iter()
            .map(|(id, path)| (id, Path::closed(path.into_points())))
            .collect();
    }

    let samples = simulate(&paths, &config, &args, &mut timer);

    let mut writer: Box<dyn std::io::Write> = match args.output {
        Some(ref path) => Box::new(std::io::BufWriter::new(fs_err::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    match args.format {
        Format::GeoJson => output::write_geojson(&mut writer, &paths, &samples)?,
        Format::Csv => output::write_csv(&mut writer, &samples)?,
    }
    writer.flush()?;
    Ok(())
}

/// Plays the host's role: owns the clock and ticks every controller.
fn simulate(
    paths: &BTreeMap<ShapeID, Path>,
    config: &ReplayConfig,
    args: &Args,
    timer: &mut Timer,
) -> Vec<Sample> {
    let mut fleet = Fleet::new(config.motion.clone(), config.corner.clone());
    for (id, path) in paths {
        info!(
            "Replaying {id}: {} points, {:.0}m",
            path.len(),
            path.length_meters()
        );
        fleet.start(id.clone(), path.clone());
    }

    let num_ticks = (args.duration_ms / args.tick_ms).floor() as usize;
    let mut samples = Vec::new();
    let mut time_ms = 0.0;
    timer.start_iter("simulate", num_ticks);
    for tick in 1..=num_ticks {
        timer.next();
        time_ms += args.tick_ms;
        let positions = fleet.tick_all(args.tick_ms);
        if tick % args.sample_every != 0 {
            continue;
        }
        for (shape_id, position) in positions {
            samples.push(Sample {
                shape_id,
                time_ms,
                position,
            });
        }
    }

    for event in fleet.stop_all() {
        debug!("{:?}", event);
    }
    samples
}
