//! Process command - post-process a finished image
//!
//! Steps run in a fixed order: watermark removal, crop, upscale, resize,
//! brightness, contrast, saturation, sharpness, filter, watermark stamp.

use anyhow::Context;
use clap::Args;
use promptforge_core::processor::{self, ImageMetadata};
use promptforge_core::{ForgeError, GenerationRequest, NamedFilter, Operation, Pipeline, Resample};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::HelpfulError;
use super::output::print_json;

#[derive(Args, Debug, Clone, Default)]
pub struct ProcessArgs {
    /// Image to process
    pub input: PathBuf,

    /// Output file; the extension picks the format (default: <input>_processed.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Generation request JSON the image was produced from; its prompt goes
    /// into the metadata and its watermark setting applies
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Paint over a bottom-right watermark first
    #[arg(long)]
    pub remove_watermark: bool,

    /// Crop box in source pixels
    #[arg(long, value_name = "LEFT,TOP,RIGHT,BOTTOM")]
    pub crop: Option<String>,

    /// Upscale factor (2 or 4)
    #[arg(long)]
    pub upscale: Option<u32>,

    /// Upscale method: lanczos or nearest
    #[arg(long, default_value = "lanczos")]
    pub method: String,

    /// Shrink to fit inside WIDTHxHEIGHT
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub resize: Option<String>,

    /// With --resize, stretch to the exact size
    #[arg(long)]
    pub exact: bool,

    /// Brightness factor (0.0-2.0, 1.0 unchanged)
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Contrast factor (0.0-2.0)
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Saturation factor (0.0-2.0)
    #[arg(long)]
    pub saturation: Option<f32>,

    /// Sharpness factor (0.0-2.0)
    #[arg(long)]
    pub sharpness: Option<f32>,

    /// blur, sharpen, smooth, edge_enhance or emboss
    #[arg(long)]
    pub filter: Option<String>,

    /// Stamp the AI GENERATED mark
    #[arg(long)]
    pub watermark: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ProcessOutput<'a> {
    output: &'a Path,
    metadata_file: PathBuf,
    #[serde(flatten)]
    metadata: &'a ImageMetadata,
}

/// Execute the process command
pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        return Err(HelpfulError::input_not_found(&args.input).into());
    }
    let request = args.request.as_deref().map(load_request).transpose()?;
    let pipeline =
        build_pipeline(&args, request.as_ref()).map_err(|e| HelpfulError::invalid_processing(&e))?;

    let image = processor::open_image(&args.input)
        .with_context(|| format!("Failed to open image {}", args.input.display()))?;
    let processed = pipeline.run(image).map_err(|e| {
        if matches!(e, ForgeError::InvalidSettings { .. }) {
            anyhow::Error::new(HelpfulError::invalid_processing(&e.to_string()))
        } else {
            anyhow::Error::new(e).context("Failed to process image")
        }
    })?;

    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    let mut metadata = ImageMetadata::describe(&processed, &output, &pipeline.operations);
    metadata.source = Some(args.input.clone());
    metadata.prompt = request.map(|r| r.prompt);

    let metadata_file = processor::save_with_metadata(&processed, &output, &metadata)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    info!(
        input = %args.input.display(),
        output = %output.display(),
        steps = pipeline.operations.len(),
        "processed image"
    );

    if args.json {
        return print_json(&ProcessOutput {
            output: &output,
            metadata_file,
            metadata: &metadata,
        });
    }

    if pipeline.is_empty() {
        println!("No operations given; image re-encoded.");
    } else {
        let steps: Vec<&str> = pipeline.operations.iter().map(Operation::name).collect();
        println!("Applied: {}", steps.join(" -> "));
    }
    println!("Saved: {} ({}x{})", output.display(), metadata.width, metadata.height);
    println!("Metadata: {}", metadata_file.display());
    Ok(())
}

fn load_request(path: &Path) -> anyhow::Result<GenerationRequest> {
    if !path.exists() {
        return Err(HelpfulError::input_not_found(path).into());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| HelpfulError::invalid_request_file(path, &e.to_string()).into())
}

/// `dir/name.jpg` -> `dir/name_processed.png`
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}_processed.png", stem))
}

fn build_pipeline(args: &ProcessArgs, request: Option<&GenerationRequest>) -> Result<Pipeline, String> {
    let mut pipeline = Pipeline::new();

    if args.remove_watermark {
        pipeline.push(Operation::RemoveWatermark);
    }
    if let Some(crop) = args.crop.as_deref() {
        pipeline.push(parse_crop(crop)?);
    }
    if let Some(factor) = args.upscale {
        pipeline.push(Operation::Upscale {
            factor,
            method: Resample::from_key(&args.method),
        });
    }
    if let Some(size) = args.resize.as_deref() {
        let (width, height) = parse_size(size)?;
        pipeline.push(Operation::Resize {
            width,
            height,
            keep_aspect: !args.exact,
        });
    }
    if let Some(factor) = args.brightness {
        pipeline.push(Operation::Brightness { factor });
    }
    if let Some(factor) = args.contrast {
        pipeline.push(Operation::Contrast { factor });
    }
    if let Some(factor) = args.saturation {
        pipeline.push(Operation::Saturation { factor });
    }
    if let Some(factor) = args.sharpness {
        pipeline.push(Operation::Sharpness { factor });
    }
    if let Some(name) = args.filter.as_deref() {
        let name = NamedFilter::from_key(name).ok_or_else(|| format!("unknown filter '{}'", name))?;
        pipeline.push(Operation::Filter { name });
    }
    if args.watermark || request.is_some_and(|r| r.settings.watermark) {
        pipeline.push(Operation::Watermark);
    }

    for operation in &pipeline.operations {
        operation.validate().map_err(|e| e.to_string())?;
    }
    Ok(pipeline)
}

fn parse_crop(value: &str) -> Result<Operation, String> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("crop must be LEFT,TOP,RIGHT,BOTTOM, got '{}'", value))?;
    match parts[..] {
        [left, top, right, bottom] => Ok(Operation::Crop {
            left,
            top,
            right,
            bottom,
        }),
        _ => Err(format!("crop must be LEFT,TOP,RIGHT,BOTTOM, got '{}'", value)),
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("resize must be WIDTHxHEIGHT, got '{}'", value);
    let lower = value.trim().to_lowercase();
    let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::{GenerationSettings, Style};

    fn args() -> ProcessArgs {
        ProcessArgs {
            input: PathBuf::from("in.png"),
            method: "lanczos".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pipeline_order_is_fixed() {
        let a = ProcessArgs {
            watermark: true,
            filter: Some("emboss".to_string()),
            brightness: Some(1.2),
            upscale: Some(2),
            method: "nearest".to_string(),
            crop: Some("0, 0, 10, 10".to_string()),
            remove_watermark: true,
            ..args()
        };
        let pipeline = build_pipeline(&a, None).unwrap();
        let names: Vec<&str> = pipeline.operations.iter().map(Operation::name).collect();
        assert_eq!(
            names,
            ["remove_watermark", "crop", "upscale", "brightness", "filter", "watermark"]
        );
        assert_eq!(
            pipeline.operations[2],
            Operation::Upscale {
                factor: 2,
                method: Resample::Nearest
            }
        );
    }

    #[test]
    fn test_request_watermark_setting_applies() {
        let settings = GenerationSettings::default();
        assert!(settings.watermark);
        let request = GenerationRequest::build("a fox", None, Style::Anime, settings.clone()).unwrap();
        let pipeline = build_pipeline(&args(), Some(&request)).unwrap();
        assert_eq!(pipeline.operations, [Operation::Watermark]);

        let quiet = GenerationRequest::build(
            "a fox",
            None,
            Style::Anime,
            GenerationSettings {
                watermark: false,
                ..settings
            },
        )
        .unwrap();
        assert!(build_pipeline(&args(), Some(&quiet)).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_options() {
        let bad = [
            ProcessArgs {
                upscale: Some(3),
                ..args()
            },
            ProcessArgs {
                crop: Some("1,2,3".to_string()),
                ..args()
            },
            ProcessArgs {
                resize: Some("wide".to_string()),
                ..args()
            },
            ProcessArgs {
                filter: Some("sepia".to_string()),
                ..args()
            },
            ProcessArgs {
                contrast: Some(3.0),
                ..args()
            },
        ];
        for a in &bad {
            assert!(build_pipeline(a, None).is_err(), "{:?}", a);
        }
    }

    #[test]
    fn test_parse_size_and_default_output() {
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert!(parse_size("640x").is_err());
        assert_eq!(
            default_output(Path::new("shots/fox.jpg")),
            PathBuf::from("shots/fox_processed.png")
        );
    }
}
