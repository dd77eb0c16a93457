//! promptforge core - prompt tooling for text-to-image diffusion workflows
//!
//! Image synthesis itself lives in an external pipeline. This crate prepares
//! everything that pipeline consumes and post-processes the images it returns.
//!
//! # Core Concepts
//!
//! - **PromptVariator**: builds stylistic variations, enhanced prompts and
//!   negative prompt variations from fixed vocabularies
//! - **RandomSource**: injected randomness; a seed reproduces output exactly
//! - **Style**: closed set of style presets with an explicit unstyled case
//! - **GenerationRequest**: validated positive/negative prompt pair plus
//!   sampling settings for one pipeline call
//! - **BatchPlanner**: expands a `prompts.json` file into generation requests
//! - **Pipeline**: ordered post-processing of finished images

pub mod batch;
pub mod config;
pub mod error;
pub mod processor;
pub mod request;
pub mod rng;
pub mod style;
pub mod templates;
pub mod variator;
pub mod vocab;

// Re-exports for convenience
pub use batch::{BatchEntry, BatchFile, BatchPlan, BatchPlanner, BatchPrompt, BatchSummary, EntryOutcome};
pub use config::{BatchConfig, ForgeConfig, VariationConfig};
pub use error::{ForgeError, Result};
pub use processor::{ImageMetadata, NamedFilter, Operation, Pipeline, Resample};
pub use request::{GenerationRequest, GenerationSettings, SizePreset};
pub use rng::{DefaultSource, RandomSource, RngSource};
pub use style::Style;
pub use templates::TemplateCategory;
pub use variator::{apply_style_template, merge_negative_prompt, PromptParts, PromptVariator};
