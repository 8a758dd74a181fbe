//! Pipeline configuration, loadable from YAML.
//!
//! ```yaml
//! inference:
//!   threshold: 0.9
//! normalize:
//!   duplicates: keep_last
//! window:
//!   calendar_months: false
//! model: holt
//! level: 0.8
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::ModelKind;
use crate::prep::{InferenceConfig, NormalizeConfig, WindowConfig};

/// Default width of the forecast interval.
pub const DEFAULT_LEVEL: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub inference: InferenceConfig,
    pub normalize: NormalizeConfig,
    pub window: WindowConfig,
    pub model: ModelKind,
    /// Central interval level in (0, 1).
    pub level: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            normalize: NormalizeConfig::default(),
            window: WindowConfig::default(),
            model: ModelKind::default(),
            level: DEFAULT_LEVEL,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a YAML document. Missing fields take defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.inference.validate()?;
        if !(self.level > 0.0 && self.level < 1.0) {
            return Err(Error::Config(format!(
                "interval level must be in (0, 1), got {}",
                self.level
            )));
        }
        Ok(())
    }
}
