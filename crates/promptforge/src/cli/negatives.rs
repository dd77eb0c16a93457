//! Negatives command - negative prompt variations

use serde::Serialize;

use super::output::{print_json, print_numbered};
use super::CommandContext;

#[derive(Debug)]
pub struct NegativesArgs {
    pub negative: Option<String>,
    pub seed: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct NegativesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    variations: Vec<String>,
}

/// Execute the negatives command
pub fn run(ctx: &CommandContext, args: NegativesArgs) -> anyhow::Result<()> {
    let mut variator = ctx.variator(args.seed);
    let variations = variator.create_negative_prompt_variations(args.negative.as_deref());

    if args.json {
        return print_json(&NegativesOutput {
            base: args.negative,
            variations,
        });
    }

    print_numbered("Negative prompt", &variations);
    Ok(())
}
