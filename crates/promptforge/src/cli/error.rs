//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use promptforge_core::NamedFilter;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug, Serialize)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                "TRY: Create a starter file: promptforge batch init prompts.json".to_string(),
            ])
    }

    /// Batch file is not valid JSON or has the wrong shape
    pub fn invalid_batch_file(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid batch file: {}", details))
            .with_context(format!("Failed to parse {}", path.display()))
            .with_suggestions([
                "TRY: The file must look like {\"prompts\": [{\"text\": \"...\"}]}".to_string(),
                "TRY: Optional fields: style, num_images, negative_prompt".to_string(),
                "TRY: Generate an example: promptforge batch init example.json".to_string(),
            ])
    }

    /// Config file exists but cannot be parsed
    pub fn invalid_config(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid config: {}", details))
            .with_context(format!("Failed to load {}", path.display()))
            .with_suggestions([
                format!("TRY: Fix or delete {}", path.display()),
                "TRY: Write a fresh default: promptforge config init --force".to_string(),
            ])
    }

    /// Refusing to overwrite an existing file
    pub fn file_exists(path: &Path) -> Self {
        Self::new(format!("File already exists: {}", path.display()))
            .with_context("Refusing to overwrite an existing file")
            .with_suggestion("TRY: Pass --force to overwrite it")
    }

    /// Variation count outside the configured bound
    pub fn too_many_variations(requested: usize, max: usize) -> Self {
        Self::new(format!("Too many variations requested: {}", requested))
            .with_context(format!("The configured maximum is {}", max))
            .with_suggestions([
                format!("TRY: Use --count {} or fewer", max),
                "TRY: Raise variations.max_count in config.toml".to_string(),
            ])
    }

    /// Unknown template category
    pub fn unknown_category(name: &str, known: &[&str]) -> Self {
        Self::new(format!("Unknown template category: '{}'", name))
            .with_suggestion(format!("TRY: One of: {}", known.join(", ")))
    }

    /// Generation settings or prompt rejected
    pub fn invalid_request(details: &str) -> Self {
        Self::new(format!("Invalid generation request: {}", details)).with_suggestions([
            "TRY: images 1-4, steps 20-100, guidance 1.0-20.0, seed 0-999999".to_string(),
            "TRY: size square|portrait|landscape|large or WxH with 512, 768, 1024".to_string(),
        ])
    }

    /// Input file for a command other than batch does not exist
    pub fn input_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The input file does not exist")
            .with_suggestion(format!("TRY: Check the path: ls -la {}", path.display()))
    }

    /// Request file is not a generation request
    pub fn invalid_request_file(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid request file: {}", details))
            .with_context(format!("Failed to parse {}", path.display()))
            .with_suggestion("TRY: Write one with: promptforge request \"a prompt\" > request.json")
    }

    /// Post-processing options rejected
    pub fn invalid_processing(details: &str) -> Self {
        Self::new(format!("Invalid processing options: {}", details)).with_suggestions([
            "TRY: --upscale 2|4 with --method lanczos|nearest".to_string(),
            "TRY: --brightness/--contrast/--saturation/--sharpness between 0.0 and 2.0".to_string(),
            "TRY: --crop LEFT,TOP,RIGHT,BOTTOM inside the image, --resize WIDTHxHEIGHT".to_string(),
            format!(
                "TRY: --filter {}",
                NamedFilter::ALL.map(NamedFilter::as_str).join("|")
            ),
        ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print an error as `{"error": {...}}` on stdout for `--json` callers.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({ "error": helpful }),
        None => serde_json::json!({ "error": { "message": format!("{:#}", err) } }),
    };
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{}", text),
        Err(_) => eprintln!("{:?}", err),
    }
}
