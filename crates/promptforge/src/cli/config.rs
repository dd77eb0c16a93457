//! Config command - show or initialize configuration

use clap::Subcommand;
use promptforge_core::ForgeConfig;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::error::HelpfulError;
use super::output::{print_json, print_table};
use super::CommandContext;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration and paths
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration to config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigAction {
    pub fn wants_json(&self) -> bool {
        match self {
            ConfigAction::Show { json } => *json,
            ConfigAction::Init { .. } => false,
        }
    }

    /// `init` only writes defaults.
    pub fn reads_config(&self) -> bool {
        matches!(self, ConfigAction::Show { .. })
    }
}

#[derive(Debug, Serialize)]
struct ConfigOutput<'a> {
    home: &'a PathBuf,
    config_path: &'a PathBuf,
    config_exists: bool,
    config: &'a ForgeConfig,
}

/// Execute the config command
pub fn run(ctx: &CommandContext, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show { json } => show(ctx, json),
        ConfigAction::Init { force } => init(ctx, force),
    }
}

fn show(ctx: &CommandContext, json: bool) -> anyhow::Result<()> {
    let config = &ctx.config;
    if json {
        return print_json(&ConfigOutput {
            home: &ctx.home,
            config_path: &ctx.config_path,
            config_exists: ctx.config_path.exists(),
            config,
        });
    }

    let generation = &config.generation;
    let rows = vec![
        vec!["home".to_string(), ctx.home.display().to_string()],
        vec!["config".to_string(), ctx.config_path.display().to_string()],
        vec!["variations.count".to_string(), config.variations.count.to_string()],
        vec!["variations.max_count".to_string(), config.variations.max_count.to_string()],
        vec!["variations.style".to_string(), config.variations.style().to_string()],
        vec![
            "variations.seed".to_string(),
            config.variations.seed.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        ],
        vec!["generation.num_images".to_string(), generation.num_images.to_string()],
        vec!["generation.steps".to_string(), generation.steps.to_string()],
        vec!["generation.guidance_scale".to_string(), generation.guidance_scale.to_string()],
        vec!["generation.size".to_string(), generation.size.to_string()],
        vec!["generation.watermark".to_string(), generation.watermark.to_string()],
        vec![
            "batch.output_dir".to_string(),
            config.batch.output_dir_or(&ctx.home).display().to_string(),
        ],
        vec![
            "batch.expand_variations".to_string(),
            config.batch.expand_variations.to_string(),
        ],
    ];
    print_table(&["Setting", "Value"], rows);
    Ok(())
}

fn init(ctx: &CommandContext, force: bool) -> anyhow::Result<()> {
    if ctx.config_path.exists() && !force {
        return Err(HelpfulError::file_exists(&ctx.config_path).into());
    }
    ctx.ensure_home()?;
    ForgeConfig::default().save(&ctx.config_path)?;
    info!(path = %ctx.config_path.display(), "wrote default config");
    println!("Wrote default config: {}", ctx.config_path.display());
    Ok(())
}
