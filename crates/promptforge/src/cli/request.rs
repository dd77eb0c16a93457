//! Request command - resolve a prompt into a generation request

use clap::Args;
use promptforge_core::{GenerationRequest, SizePreset, Style};
use tracing::info;

use super::error::HelpfulError;
use super::output::print_json;
use super::CommandContext;

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Prompt describing the image
    pub prompt: String,

    /// Concepts to steer away from (the default negative prompt is appended)
    #[arg(long)]
    pub negative: Option<String>,

    /// Style template to apply (unknown styles use the realistic template)
    #[arg(short, long)]
    pub style: Option<String>,

    /// Number of images (1-4)
    #[arg(long)]
    pub images: Option<u32>,

    /// Inference steps (20-100)
    #[arg(long)]
    pub steps: Option<u32>,

    /// Guidance scale (1.0-20.0)
    #[arg(long)]
    pub guidance: Option<f64>,

    /// square, portrait, landscape, large, or WIDTHxHEIGHT
    #[arg(long)]
    pub size: Option<String>,

    /// Fixed seed (0-999999)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ask the pipeline not to watermark output
    #[arg(long)]
    pub no_watermark: bool,
}

/// Execute the request command
pub fn run(ctx: &CommandContext, args: RequestArgs) -> anyhow::Result<()> {
    let request = build(ctx, &args)
        .map_err(|e| HelpfulError::invalid_request(&e.to_string()))?;
    info!(
        style = %request.style,
        images = request.settings.num_images,
        "resolved generation request"
    );
    print_json(&request)
}

fn build(ctx: &CommandContext, args: &RequestArgs) -> promptforge_core::Result<GenerationRequest> {
    let mut settings = ctx.config.generation.clone();
    if let Some(images) = args.images {
        settings.num_images = images;
    }
    if let Some(steps) = args.steps {
        settings.steps = steps;
    }
    if let Some(guidance) = args.guidance {
        settings.guidance_scale = guidance;
    }
    if let Some(size) = args.size.as_deref() {
        settings.size = size.parse::<SizePreset>()?;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if args.no_watermark {
        settings.watermark = false;
    }

    let style = match args.style.as_deref() {
        Some(key) => Style::from_key(Some(key)),
        None => ctx.config.variations.style(),
    };

    GenerationRequest::build(&args.prompt, args.negative.as_deref(), style, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::{ForgeConfig, ForgeError};
    use std::path::PathBuf;

    fn ctx() -> CommandContext {
        CommandContext {
            home: PathBuf::from("/tmp/promptforge-test"),
            config_path: PathBuf::from("/tmp/promptforge-test/config.toml"),
            config: ForgeConfig::default(),
        }
    }

    fn args(prompt: &str) -> RequestArgs {
        RequestArgs {
            prompt: prompt.to_string(),
            negative: None,
            style: None,
            images: None,
            steps: None,
            guidance: None,
            size: None,
            seed: None,
            no_watermark: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut a = args("a bridge");
        a.style = Some("fantasy".to_string());
        a.steps = Some(30);
        a.size = Some("portrait".to_string());
        a.seed = Some(42);
        a.no_watermark = true;

        let request = build(&ctx(), &a).unwrap();
        assert_eq!(request.style, Style::Fantasy);
        assert_eq!(request.settings.steps, 30);
        assert_eq!((request.width, request.height), (512, 768));
        assert_eq!(request.settings.seed, Some(42));
        assert!(!request.settings.watermark);
        assert!(request.prompt.starts_with("a bridge, fantasy art"));
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let mut a = args("a bridge");
        a.size = Some("640x480".to_string());
        assert!(matches!(
            build(&ctx(), &a),
            Err(ForgeError::InvalidSettings { field: "size", .. })
        ));
    }
}
