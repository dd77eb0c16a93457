//! CLI module for promptforge
//!
//! Each subcommand lives in its own module with an args struct and a `run`
//! function. Shared state (home directory, loaded config) travels in
//! [`CommandContext`].

pub mod error;
pub mod output;

pub mod batch;
pub mod config;
pub mod enhance;
pub mod negatives;
pub mod process;
pub mod request;
pub mod templates;
pub mod vary;

use anyhow::Context;
use promptforge_core::{ForgeConfig, PromptVariator};
use std::path::PathBuf;

/// Resolved environment for a single command invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub home: PathBuf,
    pub config_path: PathBuf,
    pub config: ForgeConfig,
}

impl CommandContext {
    /// Resolve paths without reading `config.toml`; `config` holds defaults.
    ///
    /// Used by commands that must work while the config file is broken.
    pub fn resolve() -> Self {
        Self {
            home: promptforge_logging::promptforge_home(),
            config_path: promptforge_logging::config_path(),
            config: ForgeConfig::default(),
        }
    }

    /// Load `config.toml` from the promptforge home, or defaults when absent.
    pub fn load() -> anyhow::Result<Self> {
        let mut ctx = Self::resolve();
        ctx.config = ForgeConfig::load_or_default(&ctx.config_path).map_err(|e| {
            anyhow::Error::new(error::HelpfulError::invalid_config(&ctx.config_path, &e.to_string()))
        })?;
        Ok(ctx)
    }

    /// Variator seeded from the flag, then the config, then entropy.
    pub fn variator(&self, seed: Option<u64>) -> PromptVariator {
        PromptVariator::from_seed_opt(seed.or(self.config.variations.seed))
    }

    pub fn ensure_home(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.home)
            .with_context(|| format!("Failed to create {}", self.home.display()))
    }
}
