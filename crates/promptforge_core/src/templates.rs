//! Curated starter prompts, grouped by category.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Realistic,
    Artistic,
    Fantasy,
    Cyberpunk,
    Anime,
}

impl TemplateCategory {
    pub fn all() -> &'static [TemplateCategory] {
        &[
            TemplateCategory::Realistic,
            TemplateCategory::Artistic,
            TemplateCategory::Fantasy,
            TemplateCategory::Cyberpunk,
            TemplateCategory::Anime,
        ]
    }

    /// Case-insensitive lookup; `None` for unknown categories.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(key.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Realistic => "realistic",
            TemplateCategory::Artistic => "artistic",
            TemplateCategory::Fantasy => "fantasy",
            TemplateCategory::Cyberpunk => "cyberpunk",
            TemplateCategory::Anime => "anime",
        }
    }

    pub fn prompts(&self) -> &'static [&'static str] {
        match self {
            TemplateCategory::Realistic => &[
                "A golden retriever puppy playing in a flower field, professional photography, natural lighting",
                "Modern minimalist living room with large windows, natural lighting, cozy atmosphere",
                "Majestic lion in a savanna at sunset, photorealistic, detailed fur, golden hour",
            ],
            TemplateCategory::Artistic => &[
                "Portrait of a cat in the style of Van Gogh's Starry Night, vibrant colors, artistic",
                "Abstract representation of human emotions, vibrant colors, flowing forms",
                "Surreal landscape with floating islands and waterfalls, dreamlike atmosphere",
            ],
            TemplateCategory::Fantasy => &[
                "A floating castle in the clouds with waterfalls, magical atmosphere, epic fantasy art",
                "Dragon flying over a medieval city at dusk, epic fantasy art, detailed scales",
                "Enchanted forest with glowing mushrooms and fairy lights, mystical atmosphere",
            ],
            TemplateCategory::Cyberpunk => &[
                "Neon-lit street in Tokyo at night, rain reflections, cyberpunk aesthetic, futuristic",
                "Futuristic robot bartender in a high-tech bar, neon lights, cyberpunk style",
                "Flying car in a futuristic cityscape, neon signs, cyberpunk atmosphere",
            ],
            TemplateCategory::Anime => &[
                "Anime style character with colorful hair, detailed eyes, vibrant background",
                "Magical girl transformation scene, anime style, sparkles and effects",
                "Anime style landscape with cherry blossoms, peaceful atmosphere",
            ],
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_three_prompts() {
        for category in TemplateCategory::all() {
            assert_eq!(category.prompts().len(), 3, "{}", category);
        }
    }

    #[test]
    fn test_from_key() {
        assert_eq!(
            TemplateCategory::from_key("Cyberpunk"),
            Some(TemplateCategory::Cyberpunk)
        );
        assert_eq!(TemplateCategory::from_key("cartoon"), None);
    }
}
