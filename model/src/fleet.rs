use std::collections::BTreeMap;

use gtfs::ShapeID;

use crate::{CornerConfig, Lifecycle, MotionConfig, MotionController, Path, Position};

/// Animates several shapes at once. Every shape gets its own controller; nothing is shared
/// between them besides the configuration they were created with.
pub struct Fleet {
    motion: MotionConfig,
    corner: CornerConfig,
    controllers: BTreeMap<ShapeID, MotionController>,
}

impl Fleet {
    pub fn new(motion: MotionConfig, corner: CornerConfig) -> Self {
        Self {
            motion,
            corner,
            controllers: BTreeMap::new(),
        }
    }

    /// Starts this shape from the beginning, even if it was already running.
    pub fn start(&mut self, id: ShapeID, path: Path) -> Lifecycle {
        let (motion, corner) = (&self.motion, &self.corner);
        self.controllers
            .entry(id.clone())
            .or_insert_with(|| MotionController::new(motion.clone(), corner.clone()))
            .start(id, path)
    }

    pub fn stop(&mut self, id: &ShapeID) -> Option<Lifecycle> {
        self.controllers.remove(id)?.stop()
    }

    pub fn stop_all(&mut self) -> Vec<Lifecycle> {
        std::mem::take(&mut self.controllers)
            .into_values()
            .filter_map(|mut ctrl| ctrl.stop())
            .collect()
    }

    /// Ticks every controller once, in order of shape ID.
    pub fn tick_all(&mut self, elapsed: f64) -> Vec<(ShapeID, Position)> {
        let mut results = Vec::new();
        for (id, ctrl) in &mut self.controllers {
            if let Some(pos) = ctrl.tick(elapsed) {
                results.push((id.clone(), pos));
            }
        }
        results
    }

    pub fn controller(&self, id: &ShapeID) -> Option<&MotionController> {
        self.controllers.get(id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
