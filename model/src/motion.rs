use serde::{Deserialize, Serialize};

use gtfs::ShapeID;

use crate::{distance, initial_bearing, CornerConfig, GeoPoint, Path};

pub const DEFAULT_BASE_SPEED: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Meters per unit of tick time at full speed. There's no particular physical unit here; with
    /// ticks in milliseconds, the default is 10m/s.
    pub base_speed: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_speed: DEFAULT_BASE_SPEED,
        }
    }
}

/// Where the vehicle is right now.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub point: GeoPoint,
    /// Degrees clockwise from north, along the current segment
    pub heading: f64,
}

/// Progress along one path. Plain data, so hosts can inspect or persist it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub path_id: ShapeID,
    pub segment_index: usize,
    pub elapsed_in_segment: f64,
    pub segment_duration: f64,
}

impl MotionState {
    /// How far through the current segment, in [0, 1]. A segment with no length or no duration is
    /// immediately finished.
    pub fn fraction(&self) -> f64 {
        if !(self.segment_duration > 0.0) || !self.segment_duration.is_finite() {
            return 1.0;
        }
        (self.elapsed_in_segment / self.segment_duration).clamp(0.0, 1.0)
    }
}

/// Identifies one run of a controller. Anything the host scheduled against an older run is
/// rejected once the controller is started, switched, or stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken(u64);

/// Tells the presentation layer when to create or destroy whatever it draws for a path.
#[derive(Clone, Debug, PartialEq)]
pub enum Lifecycle {
    Started(ShapeID),
    Switched { from: ShapeID, to: ShapeID },
    Stopped(ShapeID),
}

enum Mode {
    Idle,
    Animating { path: Path, state: MotionState },
}

/// Moves one simulated vehicle along one path. This owns no timer; the host calls `tick` with
/// however much time passed.
pub struct MotionController {
    config: MotionConfig,
    corner: CornerConfig,
    mode: Mode,
    generation: u64,
}

impl MotionController {
    pub fn new(config: MotionConfig, corner: CornerConfig) -> Self {
        Self {
            config,
            corner,
            mode: Mode::Idle,
            generation: 0,
        }
    }

    /// Begins animating from the start of the path. If something else was animating, its
    /// progress is thrown away.
    pub fn start(&mut self, id: ShapeID, path: Path) -> Lifecycle {
        let segment_duration = segment_duration(&self.config, &self.corner, &path, 0);
        let state = MotionState {
            path_id: id.clone(),
            segment_index: 0,
            elapsed_in_segment: 0.0,
            segment_duration,
        };
        if path.len() < 2 {
            warn!("{id} has {} points and can't be animated", path.len());
        }
        debug!("Starting {id}, first segment lasts {segment_duration}");

        let previous = std::mem::replace(&mut self.mode, Mode::Animating { path, state });
        self.generation += 1;
        match previous {
            Mode::Idle => Lifecycle::Started(id),
            Mode::Animating { state, .. } => Lifecycle::Switched {
                from: state.path_id,
                to: id,
            },
        }
    }

    /// The same as `start`; prior progress is always discarded.
    pub fn switch_path(&mut self, id: ShapeID, path: Path) -> Lifecycle {
        self.start(id, path)
    }

    /// Returns None if the controller was already stopped.
    pub fn stop(&mut self) -> Option<Lifecycle> {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Idle => None,
            Mode::Animating { state, .. } => {
                self.generation += 1;
                debug!("Stopping {}", state.path_id);
                Some(Lifecycle::Stopped(state.path_id))
            }
        }
    }

    pub fn token(&self) -> TickToken {
        TickToken(self.generation)
    }

    /// Like `tick`, but does nothing if `token` came from an earlier run.
    pub fn tick_with_token(&mut self, token: TickToken, elapsed: f64) -> Option<Position> {
        if token != self.token() {
            return None;
        }
        self.tick(elapsed)
    }

    /// Advances time and returns the new position, or None when idle or the path is empty.
    ///
    /// Finishing a segment moves to the next one (looping back to the first after the last), but
    /// any time left over is dropped. So one tick never advances more than one segment.
    pub fn tick(&mut self, elapsed: f64) -> Option<Position> {
        let (path, state) = match &mut self.mode {
            Mode::Idle => {
                return None;
            }
            Mode::Animating { path, state } => (path, state),
        };

        if path.len() < 2 {
            return path.points().first().map(|pt| Position {
                point: *pt,
                heading: 0.0,
            });
        }

        state.elapsed_in_segment += elapsed;
        let fraction = state.fraction();
        let (from, to) = path.segment(state.segment_index)?;
        let position = Position {
            point: from.lerp(to, fraction),
            heading: initial_bearing(from, to),
        };

        if fraction >= 1.0 {
            state.segment_index = (state.segment_index + 1) % path.segment_count();
            state.elapsed_in_segment = 0.0;
            state.segment_duration =
                segment_duration(&self.config, &self.corner, path, state.segment_index);
            debug!(
                "{} moved to segment {}, lasting {}",
                state.path_id, state.segment_index, state.segment_duration
            );
        }

        Some(position)
    }

    pub fn state(&self) -> Option<&MotionState> {
        match &self.mode {
            Mode::Idle => None,
            Mode::Animating { state, .. } => Some(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.mode {
            Mode::Idle => None,
            Mode::Animating { path, .. } => Some(path),
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.mode, Mode::Animating { .. })
    }
}

/// How long to spend on one segment, slowing down if a corner is coming up.
fn segment_duration(config: &MotionConfig, corner: &CornerConfig, path: &Path, idx: usize) -> f64 {
    match path.segment(idx) {
        Some((from, to)) => {
            let profile = corner.path_profile(path, idx);
            distance(from, to) / (config.base_speed * profile.current_speed)
        }
        None => 0.0,
    }
}
