//! Enhance command - add missing quality and lighting phrases

use serde::Serialize;

use super::output::print_json;
use super::CommandContext;

#[derive(Debug)]
pub struct EnhanceArgs {
    pub prompt: String,
    pub add_quality: bool,
    pub add_lighting: bool,
    pub seed: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct EnhanceOutput {
    original: String,
    enhanced: String,
    changed: bool,
}

/// Execute the enhance command
pub fn run(ctx: &CommandContext, args: EnhanceArgs) -> anyhow::Result<()> {
    let mut variator = ctx.variator(args.seed);
    let enhanced = variator.enhance_prompt(&args.prompt, args.add_quality, args.add_lighting);
    let changed = enhanced != args.prompt.trim();

    if args.json {
        return print_json(&EnhanceOutput {
            original: args.prompt,
            enhanced,
            changed,
        });
    }

    println!("{}", enhanced);
    if !changed {
        eprintln!("(prompt already has the requested modifiers)");
    }
    Ok(())
}
