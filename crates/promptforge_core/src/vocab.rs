//! Fixed modifier vocabularies.

pub const QUALITY_TAGS: &[&str] = &[
    "high quality",
    "detailed",
    "4K",
    "8K",
    "ultra detailed",
    "professional",
    "masterpiece",
    "best quality",
    "sharp focus",
];

pub const LIGHTING_MODIFIERS: &[&str] = &[
    "natural lighting",
    "golden hour",
    "sunset",
    "sunrise",
    "dramatic lighting",
    "soft lighting",
    "studio lighting",
    "rim lighting",
    "backlit",
    "ambient light",
];

pub const COMPOSITION_MODIFIERS: &[&str] = &[
    "wide angle",
    "close-up",
    "macro",
    "panoramic",
    "bird's eye view",
    "low angle",
    "dutch angle",
    "rule of thirds",
    "centered composition",
];

pub const MOOD_MODIFIERS: &[&str] = &[
    "peaceful",
    "dramatic",
    "mysterious",
    "vibrant",
    "serene",
    "energetic",
    "melancholic",
    "joyful",
    "epic",
    "intimate",
    "grandiose",
];

/// Terms mixed into negative prompt variations.
pub const NEGATIVE_TERMS: &[&str] = &[
    "blurry",
    "low quality",
    "distorted",
    "deformed",
    "ugly",
    "bad anatomy",
    "bad proportions",
    "watermark",
    "text",
    "signature",
];

/// Always appended to the negative prompt of a generation request.
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "blurry, bad quality, distorted, deformed, ugly, low resolution";

/// Case-insensitive check for any vocabulary entry occurring inside `text`.
pub fn contains_any(text: &str, vocabulary: &[&str]) -> bool {
    let haystack = text.to_lowercase();
    vocabulary
        .iter()
        .any(|entry| haystack.contains(&entry.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_sizes() {
        assert_eq!(QUALITY_TAGS.len(), 9);
        assert_eq!(LIGHTING_MODIFIERS.len(), 10);
        assert_eq!(COMPOSITION_MODIFIERS.len(), 9);
        assert_eq!(MOOD_MODIFIERS.len(), 11);
        assert_eq!(NEGATIVE_TERMS.len(), 10);
    }

    #[test]
    fn test_contains_any_ignores_case() {
        assert!(contains_any("a cat, 4k", QUALITY_TAGS));
        assert!(contains_any("Golden Hour portrait", LIGHTING_MODIFIERS));
        assert!(!contains_any("a cat", LIGHTING_MODIFIERS));
    }
}
