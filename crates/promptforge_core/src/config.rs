//! Configuration for promptforge

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::request::GenerationSettings;
use crate::style::Style;

/// Main configuration, stored as `config.toml` in the promptforge home.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForgeConfig {
    #[serde(default)]
    pub variations: VariationConfig,

    /// Defaults for generation requests
    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationConfig {
    /// Variations produced when no count is given
    #[serde(default = "default_count")]
    pub count: usize,

    /// Largest count the CLI accepts
    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Style key applied when none is given; unknown keys mean no style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Fixed seed for reproducible variations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_count() -> usize {
    5
}

fn default_max_count() -> usize {
    10
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            max_count: default_max_count(),
            style: None,
            seed: None,
        }
    }
}

impl VariationConfig {
    pub fn style(&self) -> Style {
        Style::from_key(self.style.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Report directory; `<home>/batch_output` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Plan one request per prompt variation instead of one per entry
    #[serde(default)]
    pub expand_variations: bool,
}

impl BatchConfig {
    pub fn output_dir_or(&self, home: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| home.join("batch_output"))
    }
}

impl ForgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ForgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
