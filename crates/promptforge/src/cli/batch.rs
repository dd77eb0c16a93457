//! Batch command - plan generation requests from a prompts file

use clap::Subcommand;
use promptforge_core::{BatchFile, BatchPlan, BatchPlanner, EntryOutcome, ForgeError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::HelpfulError;
use super::output::{print_json, print_table, truncate};
use super::CommandContext;

const PROMPT_COLUMN_WIDTH: usize = 48;

/// Subcommands for batch planning
#[derive(Subcommand, Debug, Clone)]
pub enum BatchAction {
    /// Write a sample prompts file
    Init {
        /// Destination file
        #[arg(default_value = "prompts.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Expand a prompts file into generation requests and write a report
    Plan {
        /// Prompts file
        #[arg(default_value = "prompts.json")]
        path: PathBuf,

        /// Report directory (defaults to config `batch.output_dir`)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// One request per prompt variation instead of one per entry
        #[arg(long)]
        expand: bool,

        /// Seed for reproducible variations
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },
}

impl BatchAction {
    pub fn wants_json(&self) -> bool {
        match self {
            BatchAction::Init { .. } => false,
            BatchAction::Plan { json, .. } => *json,
        }
    }
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    report: PathBuf,
    #[serde(flatten)]
    plan: &'a BatchPlan,
}

/// Execute the batch command
pub fn run(ctx: &CommandContext, action: BatchAction) -> anyhow::Result<()> {
    match action {
        BatchAction::Init { path, force } => init(&path, force),
        BatchAction::Plan {
            path,
            output_dir,
            expand,
            seed,
            json,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| ctx.config.batch.output_dir_or(&ctx.home));
            let expand = expand || ctx.config.batch.expand_variations;
            plan(ctx, &path, &output_dir, expand, seed, json)
        }
    }
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(HelpfulError::file_exists(path).into());
    }
    BatchFile::sample().save(path)?;
    info!(path = %path.display(), "wrote sample batch file");
    println!("Created sample prompts file: {}", path.display());
    Ok(())
}

fn load_batch(path: &Path) -> anyhow::Result<BatchFile> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    BatchFile::load(path).map_err(|err| match err {
        ForgeError::Json(e) => HelpfulError::invalid_batch_file(path, &e.to_string()).into(),
        other => anyhow::Error::new(other)
            .context(format!("Failed to read batch file {}", path.display())),
    })
}

fn plan(
    ctx: &CommandContext,
    path: &Path,
    output_dir: &Path,
    expand: bool,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let batch = load_batch(path)?;
    info!(path = %path.display(), prompts = batch.prompts.len(), "loaded batch file");

    let mut planner = BatchPlanner::new(ctx.variator(seed), ctx.config.generation.clone(), expand);
    let plan = planner.plan(&batch);
    let report = plan.write_report(output_dir)?;

    if json {
        return print_json(&PlanOutput {
            report,
            plan: &plan,
        });
    }

    let rows = plan
        .entries
        .iter()
        .map(|entry| {
            let (status, detail) = match &entry.outcome {
                EntryOutcome::Planned { requests, .. } => (
                    "planned".to_string(),
                    format!("{} request(s), {} image(s)", requests.len(), entry.image_count()),
                ),
                EntryOutcome::Rejected { error } => ("rejected".to_string(), error.clone()),
            };
            vec![
                entry.index.to_string(),
                truncate(&entry.prompt, PROMPT_COLUMN_WIDTH),
                entry.style.to_string(),
                status,
                detail,
            ]
        })
        .collect();
    print_table(&["#", "Prompt", "Style", "Status", "Detail"], rows);

    let summary = &plan.summary;
    println!(
        "Total prompts: {}  Planned: {}  Rejected: {}  Images: {}",
        summary.total, summary.planned, summary.rejected, summary.images
    );
    println!("Plan saved to: {}", report.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.json");
        init(&path, false).unwrap();
        let err = init(&path, false).unwrap_err();
        assert!(err.downcast_ref::<HelpfulError>().is_some());
        init(&path, true).unwrap();
    }

    #[test]
    fn test_load_batch_errors_are_helpful() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_batch(&missing).unwrap_err();
        assert!(err
            .downcast_ref::<HelpfulError>()
            .unwrap()
            .message
            .starts_with("File not found"));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{\"prompts\": [").unwrap();
        let err = load_batch(&broken).unwrap_err();
        assert!(err
            .downcast_ref::<HelpfulError>()
            .unwrap()
            .message
            .starts_with("Invalid batch file"));
    }
}
