//! Vary command - stylistic prompt variations

use promptforge_core::Style;
use serde::Serialize;
use tracing::info;

use super::error::HelpfulError;
use super::output::{print_json, print_numbered};
use super::CommandContext;

#[derive(Debug)]
pub struct VaryArgs {
    pub prompt: String,
    pub count: Option<usize>,
    pub style: Option<String>,
    pub seed: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct VaryOutput {
    prompt: String,
    style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    variations: Vec<String>,
}

/// Execute the vary command
pub fn run(ctx: &CommandContext, args: VaryArgs) -> anyhow::Result<()> {
    let defaults = &ctx.config.variations;
    let count = args.count.unwrap_or(defaults.count);
    if count > defaults.max_count {
        return Err(HelpfulError::too_many_variations(count, defaults.max_count).into());
    }

    let style = match args.style.as_deref() {
        Some(key) => Style::from_key(Some(key)),
        None => defaults.style(),
    };
    let seed = args.seed.or(defaults.seed);

    let mut variator = ctx.variator(seed);
    let variations = variator.generate_variations(&args.prompt, count, style);
    info!(count, %style, "generated variations");

    if args.json {
        return print_json(&VaryOutput {
            prompt: args.prompt,
            style,
            seed,
            variations,
        });
    }

    println!("Variations of: {}", args.prompt);
    if !style.is_unstyled() {
        println!("Style: {}", style);
    }
    print_numbered("Variation", &variations);
    Ok(())
}
