use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{CornerConfig, MotionConfig, PreprocessConfig};

/// Every tunable in one place. Missing fields fall back to their defaults, so a config file only
/// needs to mention what it changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub preprocess: PreprocessConfig,
    pub corner: CornerConfig,
    pub motion: MotionConfig,
}

impl ReplayConfig {
    /// Catches settings that would make segment durations infinite, negative, or NaN.
    pub fn validate(&self) -> Result<()> {
        let base_speed = self.motion.base_speed;
        if !(base_speed > 0.0) || !base_speed.is_finite() {
            bail!("motion.base_speed must be positive, not {base_speed}");
        }
        for (angle, speed) in &self.corner.thresholds {
            if !(*speed > 0.0 && *speed <= 1.0) {
                bail!("corner threshold for {angle} degrees has speed {speed}, outside (0, 1]");
            }
        }
        Ok(())
    }
}
