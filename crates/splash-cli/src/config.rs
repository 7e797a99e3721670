use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use splash_core::config::SessionConfig;
use splash_observe::{LoggerConfig, LoggerFormat, LoggerLevel};

/// Everything read from `--config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logger: LoggerConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Read a JSON config file; `None` means all defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(
        &mut self,
        level: Option<&str>,
        format: Option<&str>,
    ) -> anyhow::Result<()> {
        if let Some(level) = level {
            self.logger.level = LoggerLevel::new(level)?;
        }
        if let Some(format) = format {
            self.logger.format = format.parse::<LoggerFormat>()?;
        }
        Ok(())
    }
}
