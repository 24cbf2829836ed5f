use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::predictor::SamplingPolicy;

pub const APP_NAME: &str = "noteassist";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period before the model is rebuilt and the note persisted.
    pub debounce_ms: u64,
    /// Minimum gap between suggestion repositions on resize.
    pub resize_throttle_ms: u64,
    pub policy: SamplingPolicy,
    /// Rebuild models on a worker thread instead of inline.
    pub background_model: bool,
    pub title_max_chars: usize,
    pub line_height_px: f32,
    pub char_width_px: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            resize_throttle_ms: 100,
            policy: SamplingPolicy::MaxFrequency,
            background_model: true,
            title_max_chars: 75,
            line_height_px: 20.0,
            char_width_px: 8.0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        match confy::load(APP_NAME, Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, Some("config"), self)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resize_throttle(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }
}
