//! Style identifiers and their phrase vocabularies.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Closed set of style presets. Unknown keys map to [`Style::Unstyled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    #[default]
    Unstyled,
    Realistic,
    Artistic,
    Fantasy,
    Cyberpunk,
    Anime,
    Cartoon,
}

impl Style {
    /// Every style that carries phrases, in display order.
    pub const PRESETS: [Style; 6] = [
        Style::Realistic,
        Style::Artistic,
        Style::Fantasy,
        Style::Cyberpunk,
        Style::Anime,
        Style::Cartoon,
    ];

    /// Total lookup: unknown, empty, or absent keys yield `Unstyled`.
    pub fn from_key(key: Option<&str>) -> Self {
        let Some(key) = key else {
            return Style::Unstyled;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "realistic" => Style::Realistic,
            "artistic" => Style::Artistic,
            "fantasy" => Style::Fantasy,
            "cyberpunk" => Style::Cyberpunk,
            "anime" => Style::Anime,
            "cartoon" => Style::Cartoon,
            _ => Style::Unstyled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Unstyled => "none",
            Style::Realistic => "realistic",
            Style::Artistic => "artistic",
            Style::Fantasy => "fantasy",
            Style::Cyberpunk => "cyberpunk",
            Style::Anime => "anime",
            Style::Cartoon => "cartoon",
        }
    }

    /// Phrases mixed into variations. Empty for `Unstyled`.
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            Style::Unstyled => &[],
            Style::Realistic => &[
                "photorealistic",
                "realistic",
                "professional photography",
                "DSLR",
            ],
            Style::Artistic => &[
                "artistic",
                "oil painting",
                "watercolor",
                "digital art",
                "concept art",
            ],
            Style::Fantasy => &["fantasy art", "magical", "ethereal", "epic", "legendary"],
            Style::Cyberpunk => &["cyberpunk", "neon", "futuristic", "dystopian", "sci-fi"],
            Style::Anime => &["anime style", "manga", "japanese animation", "cel shaded"],
            Style::Cartoon => &[
                "cartoon style",
                "animated",
                "vibrant colors",
                "illustration",
            ],
        }
    }

    /// Suffix appended when building a generation request.
    /// `Unstyled` falls back to the realistic template.
    pub fn template(&self) -> &'static str {
        match self {
            Style::Realistic | Style::Unstyled => {
                "highly detailed, photorealistic, 4K, professional photography"
            }
            Style::Artistic => "artistic, oil painting, masterpiece, highly detailed",
            Style::Cartoon => "cartoon style, animated, vibrant colors, cel shaded",
            Style::Anime => "anime style, manga, detailed, vibrant",
            Style::Cyberpunk => "cyberpunk style, neon lights, futuristic, dystopian",
            Style::Fantasy => "fantasy art, magical, ethereal, detailed",
        }
    }

    pub fn is_unstyled(&self) -> bool {
        matches!(self, Style::Unstyled)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = Option::<String>::deserialize(deserializer)?;
        Ok(Style::from_key(key.as_deref()))
    }
}
