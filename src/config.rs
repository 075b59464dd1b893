use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LabError, Result};
use crate::types::{ExperimentMode, PhysicsParams};

/// Start-up knobs. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Letter of the experiment to open with.
    pub mode: String,
    /// Fixed noise seed. Unset means a fresh seed every launch.
    pub seed: Option<u64>,
    /// Frame rate used by `replay` to synthesize timestamps.
    pub frame_rate_hz: f64,
    pub params: PhysicsParams,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            mode: ExperimentMode::default().to_string(),
            seed: None,
            frame_rate_hz: 60.0,
            params: PhysicsParams::default(),
        }
    }
}

impl LabConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| LabError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| LabError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), mode = %config.mode, "loaded config");
        Ok(config)
    }

    pub fn experiment_mode(&self) -> Result<ExperimentMode> {
        self.mode.parse()
    }

    pub fn frame_interval_ms(&self) -> f64 {
        if self.frame_rate_hz.is_finite() && self.frame_rate_hz > 0.0 {
            1000.0 / self.frame_rate_hz
        } else {
            1000.0 / 60.0
        }
    }
}
