//! promptforge command-line interface
//!
//! Prompt tooling for text-to-image diffusion workflows:
//! - **vary / enhance / negatives**: randomized prompt rewriting
//! - **request**: resolve a prompt into a validated generation request
//! - **process**: upscale, adjust, crop, filter or watermark a finished image
//! - **batch**: expand a prompts file into a generation plan
//! - **templates / config**: starter prompts and persistent defaults

use clap::{Parser, Subcommand};
use promptforge_logging::{init_logging, LogConfig};
use std::process::ExitCode;
use tracing::debug;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "promptforge", version, about = "Prompt tooling for diffusion workflows")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate stylistic variations of a prompt
    Vary {
        /// Base prompt; the first comma-separated segment is the subject
        prompt: String,

        /// Number of variations (defaults to config `variations.count`)
        #[arg(short = 'n', long = "count")]
        count: Option<usize>,

        /// Style preset (realistic, artistic, fantasy, cyberpunk, anime, cartoon)
        #[arg(short, long)]
        style: Option<String>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a quality tag and a lighting modifier when missing
    Enhance {
        prompt: String,

        /// Do not add a quality tag
        #[arg(long)]
        no_quality: bool,

        /// Do not add a lighting modifier
        #[arg(long)]
        no_lighting: bool,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Generate three negative prompt variations
    Negatives {
        /// Comma-separated negative prompt to extend
        negative: Option<String>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// List curated starter prompts
    Templates {
        /// Only show one category (realistic, artistic, fantasy, cyberpunk, anime)
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Resolve a prompt into a generation request (printed as JSON)
    Request(cli::request::RequestArgs),

    /// Post-process an image and write a metadata sidecar
    Process(cli::process::ProcessArgs),

    /// Batch planning from a prompts file
    Batch {
        #[command(subcommand)]
        action: cli::batch::BatchAction,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: cli::config::ConfigAction,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Vary { json, .. } => *json,
        Commands::Enhance { json, .. } => *json,
        Commands::Negatives { json, .. } => *json,
        Commands::Templates { json, .. } => *json,
        Commands::Request(_) => true,
        Commands::Process(args) => args.json,
        Commands::Batch { action } => action.wants_json(),
        Commands::Config { action } => action.wants_json(),
    }
}

/// Commands that never read settings skip parsing `config.toml`, so a broken
/// file can still be replaced with `config init --force`.
fn command_reads_config(command: &Commands) -> bool {
    match command {
        Commands::Templates { .. } => false,
        Commands::Process(_) => false,
        Commands::Config { action } => action.reads_config(),
        _ => true,
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ctx = if command_reads_config(&cli.command) {
        cli::CommandContext::load()?
    } else {
        cli::CommandContext::resolve()
    };

    match cli.command {
        Commands::Vary {
            prompt,
            count,
            style,
            seed,
            json,
        } => cli::vary::run(
            &ctx,
            cli::vary::VaryArgs {
                prompt,
                count,
                style,
                seed,
                json,
            },
        ),

        Commands::Enhance {
            prompt,
            no_quality,
            no_lighting,
            seed,
            json,
        } => cli::enhance::run(
            &ctx,
            cli::enhance::EnhanceArgs {
                prompt,
                add_quality: !no_quality,
                add_lighting: !no_lighting,
                seed,
                json,
            },
        ),

        Commands::Negatives {
            negative,
            seed,
            json,
        } => cli::negatives::run(
            &ctx,
            cli::negatives::NegativesArgs {
                negative,
                seed,
                json,
            },
        ),

        Commands::Templates { category, json } => {
            cli::templates::run(cli::templates::TemplatesArgs { category, json })
        }

        Commands::Request(args) => cli::request::run(&ctx, args),

        Commands::Process(args) => cli::process::run(args),

        Commands::Batch { action } => cli::batch::run(&ctx, action),

        Commands::Config { action } => cli::config::run(&ctx, action),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let _log_guard = match init_logging(LogConfig {
        app_name: "promptforge",
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };
    debug!(home = %promptforge_logging::promptforge_home().display(), "starting");

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}

