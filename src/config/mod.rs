//! Persisted generation settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::document::Assets;
use crate::render::RenderSettings;

/// Upper bound for the pacing delay, in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 500;

/// User settings kept between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Sampling temperature forwarded to the generation service, in `[0, 1]`.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Retrieval threshold forwarded to the generation service, in `[0, 1]`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Pacing delay between drawn siblings, in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_temperature() -> f64 {
    0.5
}

fn default_threshold() -> f64 {
    0.5
}

fn default_timeout() -> u64 {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            threshold: default_threshold(),
            timeout: default_timeout(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> WorldviewResult<()> {
        unit_interval("temperature", self.temperature)?;
        unit_interval("threshold", self.threshold)?;
        if self.timeout > MAX_TIMEOUT_MS {
            return Err(WorldviewError::config(format!(
                "timeout must be at most {MAX_TIMEOUT_MS} ms, got {}",
                self.timeout
            )));
        }
        Ok(())
    }

    /// Parse and validate TOML settings.
    pub fn from_toml(content: &str) -> WorldviewResult<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| WorldviewError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> WorldviewResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorldviewError::config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load settings, keeping the defaults when the file is missing or fails validation.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), "using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Save settings to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> WorldviewResult<()> {
        self.validate()?;
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| WorldviewError::config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| WorldviewError::config(format!("write {}: {e}", path.display())))
    }

    pub fn render_settings(&self, assets: Option<Assets>) -> RenderSettings {
        RenderSettings {
            pacing_delay_ms: self.timeout,
            assets,
        }
    }
}

fn unit_interval(name: &str, value: f64) -> WorldviewResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(WorldviewError::config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
