use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::time::ZoomRange;

/// Tunables for the engine. Missing keys fall back to the defaults.
///
/// # Example
/// ```
/// use timeline_engine::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "max_scale": 200.0 }"#).expect("valid");
/// assert_eq!(config.max_scale, 200.0);
/// assert_eq!(config.default_clip_duration, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lowest zoom in pixels per second.
    pub min_scale: f64,
    /// Highest zoom in pixels per second.
    pub max_scale: f64,
    pub initial_scale: f64,
    /// Duration given to clips whose asset has no intrinsic duration.
    pub default_clip_duration: f64,
    /// Floor applied by resize instead of rejecting short clips.
    pub min_clip_duration: f64,
    /// Jump used by the skip transport buttons.
    pub skip_step: f64,
    pub playback_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: 10.0,
            max_scale: 100.0,
            initial_scale: 50.0,
            default_clip_duration: 5.0,
            min_clip_duration: 0.1,
            skip_step: 10.0,
            playback_rate: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|source| EngineError::ConfigParse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "engine config loaded");
        Ok(config)
    }

    pub fn zoom_range(&self) -> ZoomRange {
        ZoomRange {
            min_scale: self.min_scale,
            max_scale: self.max_scale,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |value: f64| value.is_finite() && value > 0.0;

        if !positive(self.min_scale) || !positive(self.max_scale) {
            return Err(EngineError::invalid("zoom bounds must be positive"));
        }
        if self.min_scale > self.max_scale {
            return Err(EngineError::invalid(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !self.zoom_range().contains(self.initial_scale) {
            return Err(EngineError::invalid(format!(
                "initial_scale {} is outside {}..={}",
                self.initial_scale, self.min_scale, self.max_scale
            )));
        }
        if !positive(self.default_clip_duration) || !positive(self.min_clip_duration) {
            return Err(EngineError::invalid("clip durations must be positive"));
        }
        if !positive(self.skip_step) || !positive(self.playback_rate) {
            return Err(EngineError::invalid(
                "skip step and playback rate must be positive",
            ));
        }
        Ok(())
    }
}
