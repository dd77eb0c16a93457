//! Generation request contract.
//!
//! A [`GenerationRequest`] is the fully resolved input for one call into an
//! external diffusion pipeline: final positive and negative prompts plus
//! validated sampling settings.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{ForgeError, Result};
use crate::style::Style;
use crate::variator::{apply_style_template, merge_negative_prompt};

pub const NUM_IMAGES_RANGE: RangeInclusive<u32> = 1..=4;
pub const STEPS_RANGE: RangeInclusive<u32> = 20..=100;
pub const GUIDANCE_RANGE: RangeInclusive<f64> = 1.0..=20.0;
pub const MAX_SEED: u64 = 999_999;
/// Edge lengths accepted for custom sizes.
pub const ALLOWED_DIMENSIONS: [u32; 3] = [512, 768, 1024];

/// Output image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePreset {
    #[default]
    Square,
    Portrait,
    Landscape,
    Large,
    Custom { width: u32, height: u32 },
}

impl SizePreset {
    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            SizePreset::Square => (512, 512),
            SizePreset::Portrait => (512, 768),
            SizePreset::Landscape => (768, 512),
            SizePreset::Large => (1024, 1024),
            SizePreset::Custom { width, height } => (width, height),
        }
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizePreset::Square => write!(f, "square"),
            SizePreset::Portrait => write!(f, "portrait"),
            SizePreset::Landscape => write!(f, "landscape"),
            SizePreset::Large => write!(f, "large"),
            SizePreset::Custom { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

impl FromStr for SizePreset {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "square" => return Ok(SizePreset::Square),
            "portrait" => return Ok(SizePreset::Portrait),
            "landscape" => return Ok(SizePreset::Landscape),
            "large" => return Ok(SizePreset::Large),
            _ => {}
        }

        let (w, h) = lowered.split_once('x').ok_or_else(|| {
            ForgeError::invalid(
                "size",
                format!(
                    "'{}' is not a preset (square, portrait, landscape, large) or WIDTHxHEIGHT",
                    s
                ),
            )
        })?;
        let parse = |value: &str| {
            value
                .trim()
                .parse::<u32>()
                .map_err(|_| ForgeError::invalid("size", format!("'{}' is not a number", value)))
        };
        Ok(SizePreset::Custom {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

impl Serialize for SizePreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SizePreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_num_images")]
    pub num_images: u32,

    /// Inference steps; more is slower and finer.
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// How closely the pipeline follows the prompt.
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,

    #[serde(default)]
    pub size: SizePreset,

    /// Fixed seed for reproducible output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default = "default_watermark")]
    pub watermark: bool,
}

fn default_num_images() -> u32 {
    1
}

fn default_steps() -> u32 {
    50
}

fn default_guidance_scale() -> f64 {
    7.5
}

fn default_watermark() -> bool {
    true
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            num_images: default_num_images(),
            steps: default_steps(),
            guidance_scale: default_guidance_scale(),
            size: SizePreset::default(),
            seed: None,
            watermark: default_watermark(),
        }
    }
}

impl GenerationSettings {
    pub fn validate(&self) -> Result<()> {
        if !NUM_IMAGES_RANGE.contains(&self.num_images) {
            return Err(ForgeError::invalid(
                "num_images",
                format!(
                    "{} is outside {}..={}",
                    self.num_images,
                    NUM_IMAGES_RANGE.start(),
                    NUM_IMAGES_RANGE.end()
                ),
            ));
        }
        if !STEPS_RANGE.contains(&self.steps) {
            return Err(ForgeError::invalid(
                "steps",
                format!(
                    "{} is outside {}..={}",
                    self.steps,
                    STEPS_RANGE.start(),
                    STEPS_RANGE.end()
                ),
            ));
        }
        if !GUIDANCE_RANGE.contains(&self.guidance_scale) {
            return Err(ForgeError::invalid(
                "guidance_scale",
                format!(
                    "{} is outside {}..={}",
                    self.guidance_scale,
                    GUIDANCE_RANGE.start(),
                    GUIDANCE_RANGE.end()
                ),
            ));
        }
        if let SizePreset::Custom { width, height } = self.size {
            for (field, value) in [("width", width), ("height", height)] {
                if !ALLOWED_DIMENSIONS.contains(&value) {
                    return Err(ForgeError::invalid(
                        "size",
                        format!("{} {} must be one of {:?}", field, value, ALLOWED_DIMENSIONS),
                    ));
                }
            }
        }
        if let Some(seed) = self.seed {
            if seed > MAX_SEED {
                return Err(ForgeError::invalid(
                    "seed",
                    format!("{} exceeds {}", seed, MAX_SEED),
                ));
            }
        }
        Ok(())
    }
}

/// Resolved input for one pipeline call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub style: Style,
    pub width: u32,
    pub height: u32,
    pub settings: GenerationSettings,
}

impl GenerationRequest {
    /// Validate settings and resolve the final prompt pair.
    pub fn build(
        prompt: &str,
        negative_prompt: Option<&str>,
        style: Style,
        settings: GenerationSettings,
    ) -> Result<Self> {
        if prompt.trim().is_empty() {
            return Err(ForgeError::EmptyPrompt);
        }
        settings.validate()?;
        let (width, height) = settings.size.dimensions();
        Ok(Self {
            prompt: apply_style_template(prompt, style),
            negative_prompt: merge_negative_prompt(negative_prompt),
            style,
            width,
            height,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::DEFAULT_NEGATIVE_PROMPT;

    #[test]
    fn test_size_presets() {
        assert_eq!(SizePreset::Portrait.dimensions(), (512, 768));
        assert_eq!("LANDSCAPE".parse::<SizePreset>().unwrap(), SizePreset::Landscape);
        assert_eq!(
            "768x1024".parse::<SizePreset>().unwrap(),
            SizePreset::Custom {
                width: 768,
                height: 1024
            }
        );
        assert!("huge".parse::<SizePreset>().is_err());
        assert!("12xab".parse::<SizePreset>().is_err());
    }

    #[test]
    fn test_default_settings_validate() {
        GenerationSettings::default().validate().unwrap();
    }

    #[test]
    fn test_settings_boundaries() {
        let ok = GenerationSettings {
            num_images: 4,
            steps: 20,
            guidance_scale: 20.0,
            seed: Some(MAX_SEED),
            ..Default::default()
        };
        ok.validate().unwrap();

        let cases = [
            (
                GenerationSettings {
                    num_images: 0,
                    ..Default::default()
                },
                "num_images",
            ),
            (
                GenerationSettings {
                    steps: 101,
                    ..Default::default()
                },
                "steps",
            ),
            (
                GenerationSettings {
                    guidance_scale: 0.5,
                    ..Default::default()
                },
                "guidance_scale",
            ),
            (
                GenerationSettings {
                    size: SizePreset::Custom {
                        width: 640,
                        height: 512,
                    },
                    ..Default::default()
                },
                "size",
            ),
            (
                GenerationSettings {
                    seed: Some(MAX_SEED + 1),
                    ..Default::default()
                },
                "seed",
            ),
        ];
        for (settings, expected) in cases {
            match settings.validate() {
                Err(ForgeError::InvalidSettings { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected invalid {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_build_request() {
        let request = GenerationRequest::build(
            "a lighthouse",
            Some("people"),
            Style::Cyberpunk,
            GenerationSettings {
                size: SizePreset::Large,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            request.prompt,
            "a lighthouse, cyberpunk style, neon lights, futuristic, dystopian"
        );
        assert_eq!(
            request.negative_prompt,
            format!("people, {}", DEFAULT_NEGATIVE_PROMPT)
        );
        assert_eq!((request.width, request.height), (1024, 1024));
    }

    #[test]
    fn test_build_rejects_blank_prompt() {
        let err = GenerationRequest::build("  ", None, Style::Unstyled, Default::default())
            .unwrap_err();
        assert!(matches!(err, ForgeError::EmptyPrompt));
    }

    #[test]
    fn test_settings_json_shape() {
        let json = serde_json::to_value(GenerationSettings::default()).unwrap();
        assert_eq!(json["size"], "square");
        assert!(json.get("seed").is_none());
        let parsed: GenerationSettings =
            serde_json::from_str(r#"{"size": "512x768", "steps": 30}"#).unwrap();
        assert_eq!(parsed.steps, 30);
        assert_eq!(parsed.num_images, 1);
        assert_eq!(parsed.size.dimensions(), (512, 768));
    }
}
