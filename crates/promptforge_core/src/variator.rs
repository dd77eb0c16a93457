//! Prompt variation generator.
//!
//! A prompt is treated as comma-separated segments: the first is the subject,
//! the rest are existing modifiers. Variations keep the subject, mix in
//! phrases from the fixed vocabularies with per-category probabilities, and
//! retain a few of the existing modifiers.
//!
//! All operations are total: any string input produces a well-defined output.

use tracing::debug;

use crate::rng::{DefaultSource, RandomSource};
use crate::style::Style;
use crate::vocab::{
    contains_any, COMPOSITION_MODIFIERS, DEFAULT_NEGATIVE_PROMPT, LIGHTING_MODIFIERS,
    MOOD_MODIFIERS, NEGATIVE_TERMS, QUALITY_TAGS,
};

/// Inclusion probability of a quality tag.
pub const QUALITY_PROBABILITY: f64 = 0.5;
/// Inclusion probability of a lighting modifier.
pub const LIGHTING_PROBABILITY: f64 = 0.4;
/// Inclusion probability of a composition modifier.
pub const COMPOSITION_PROBABILITY: f64 = 0.3;
/// Inclusion probability of a mood modifier.
pub const MOOD_PROBABILITY: f64 = 0.3;
/// Upper bound on existing modifiers carried into a variation.
pub const MAX_KEPT_MODIFIERS: usize = 2;
/// Number of negative prompt variations produced per call.
pub const NEGATIVE_VARIATION_COUNT: usize = 3;
/// Range of negative terms added to each negative variation.
pub const NEGATIVE_TERMS_MIN: usize = 2;
pub const NEGATIVE_TERMS_MAX: usize = 4;

const SEPARATOR: &str = ", ";

/// A prompt split into its subject and trailing modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    pub subject: String,
    pub modifiers: Vec<String>,
}

impl PromptParts {
    pub fn parse(prompt: &str) -> Self {
        let mut segments = prompt.trim().split(',').map(|s| s.trim().to_string());
        // split always yields at least one segment
        let subject = segments.next().unwrap_or_default();
        Self {
            subject,
            modifiers: segments.collect(),
        }
    }
}

/// Generates prompt variations from an owned random source.
#[derive(Debug, Clone)]
pub struct PromptVariator<R = DefaultSource> {
    rng: R,
}

impl PromptVariator<DefaultSource> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(DefaultSource::seeded(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(DefaultSource::from_entropy())
    }

    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        Self::new(DefaultSource::from_seed_opt(seed))
    }
}

impl<R: RandomSource> PromptVariator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }

    /// Produce `num_variations` independently assembled variations.
    ///
    /// No deduplication: identical variations may appear.
    pub fn generate_variations(
        &mut self,
        prompt: &str,
        num_variations: usize,
        style: Style,
    ) -> Vec<String> {
        let parts = PromptParts::parse(prompt);
        debug!(
            subject = %parts.subject,
            modifiers = parts.modifiers.len(),
            num_variations,
            %style,
            "generating prompt variations"
        );

        (0..num_variations)
            .map(|_| self.assemble_variation(&parts, style))
            .collect()
    }

    fn assemble_variation(&mut self, parts: &PromptParts, style: Style) -> String {
        let mut out: Vec<String> = vec![parts.subject.clone()];

        if let Some(phrase) = self.rng.choose(style.phrases()) {
            out.push((*phrase).to_string());
        }

        let categories: [(f64, &[&str]); 4] = [
            (QUALITY_PROBABILITY, QUALITY_TAGS),
            (LIGHTING_PROBABILITY, LIGHTING_MODIFIERS),
            (COMPOSITION_PROBABILITY, COMPOSITION_MODIFIERS),
            (MOOD_PROBABILITY, MOOD_MODIFIERS),
        ];
        for (probability, vocabulary) in categories {
            if self.rng.chance(probability) {
                if let Some(phrase) = self.rng.choose(vocabulary) {
                    out.push((*phrase).to_string());
                }
            }
        }

        if !parts.modifiers.is_empty() {
            let keep = self
                .rng
                .gen_range_inclusive(0, MAX_KEPT_MODIFIERS.min(parts.modifiers.len()));
            out.extend(self.rng.sample(&parts.modifiers, keep));
        }

        out.join(SEPARATOR)
    }

    /// Append a quality tag and/or a lighting modifier unless the prompt
    /// already contains one from that category (case-insensitive).
    pub fn enhance_prompt(&mut self, prompt: &str, add_quality: bool, add_lighting: bool) -> String {
        let mut enhanced = prompt.trim().to_string();

        if add_quality && !contains_any(&enhanced, QUALITY_TAGS) {
            if let Some(tag) = self.rng.choose(QUALITY_TAGS) {
                enhanced.push_str(SEPARATOR);
                enhanced.push_str(tag);
            }
        }

        if add_lighting && !contains_any(&enhanced, LIGHTING_MODIFIERS) {
            if let Some(light) = self.rng.choose(LIGHTING_MODIFIERS) {
                enhanced.push_str(SEPARATOR);
                enhanced.push_str(light);
            }
        }

        enhanced
    }

    /// Three negative prompts, each the caller's terms followed by 2 to 4
    /// distinct terms from the fixed negative vocabulary.
    pub fn create_negative_prompt_variations(&mut self, negative_prompt: Option<&str>) -> Vec<String> {
        let base: Vec<String> = match negative_prompt {
            Some(negative) if !negative.is_empty() => {
                negative.split(',').map(|s| s.trim().to_string()).collect()
            }
            _ => Vec::new(),
        };

        (0..NEGATIVE_VARIATION_COUNT)
            .map(|_| {
                let count = self
                    .rng
                    .gen_range_inclusive(NEGATIVE_TERMS_MIN, NEGATIVE_TERMS_MAX)
                    .min(NEGATIVE_TERMS.len());
                let mut variation = base.clone();
                variation.extend(
                    self.rng
                        .sample(NEGATIVE_TERMS, count)
                        .into_iter()
                        .map(str::to_string),
                );
                variation.join(SEPARATOR)
            })
            .collect()
    }
}

/// Append the style's template to `prompt`.
pub fn apply_style_template(prompt: &str, style: Style) -> String {
    format!("{}{}{}", prompt.trim(), SEPARATOR, style.template())
}

/// Combine the caller's negative prompt with the default negative prompt.
pub fn merge_negative_prompt(negative: Option<&str>) -> String {
    match negative.map(str::trim) {
        Some(negative) if !negative.is_empty() => {
            format!("{}{}{}", negative, SEPARATOR, DEFAULT_NEGATIVE_PROMPT)
        }
        _ => DEFAULT_NEGATIVE_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that replays fixed draws, for exact-output assertions.
    struct Scripted {
        floats: Vec<f64>,
        indices: Vec<usize>,
    }

    impl Scripted {
        fn new(floats: &[f64], indices: &[usize]) -> Self {
            Self {
                floats: floats.iter().rev().copied().collect(),
                indices: indices.iter().rev().copied().collect(),
            }
        }
    }

    impl RandomSource for Scripted {
        fn next_f64(&mut self) -> f64 {
            self.floats.pop().expect("script ran out of floats")
        }

        fn gen_index(&mut self, len: usize) -> usize {
            self.indices.pop().expect("script ran out of indices") % len
        }

        fn gen_range_inclusive(&mut self, low: usize, high: usize) -> usize {
            let value = self.indices.pop().expect("script ran out of indices");
            value.clamp(low, high)
        }

        fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
            (0..amount.min(len)).collect()
        }
    }

    #[test]
    fn test_parse_parts() {
        let parts = PromptParts::parse("  a cat , on a mat,  watercolor ");
        assert_eq!(parts.subject, "a cat");
        assert_eq!(parts.modifiers, vec!["on a mat", "watercolor"]);

        let parts = PromptParts::parse("");
        assert_eq!(parts.subject, "");
        assert!(parts.modifiers.is_empty());
    }

    #[test]
    fn test_all_categories_scripted() {
        // style idx, then each category: chance float + choice index, then keep count
        let rng = Scripted::new(&[0.0, 0.0, 0.0, 0.0], &[1, 2, 3, 4, 5, 1]);
        let mut variator = PromptVariator::new(rng);
        let out = variator.generate_variations("a fox, in snow, at dusk", 1, Style::Anime);
        assert_eq!(
            out,
            vec!["a fox, manga, 4K, sunrise, bird's eye view, energetic, in snow"]
        );
    }

    #[test]
    fn test_no_categories_scripted() {
        let rng = Scripted::new(&[0.99, 0.99, 0.99, 0.99], &[]);
        let mut variator = PromptVariator::new(rng);
        let out = variator.generate_variations("lonely lighthouse", 1, Style::Unstyled);
        assert_eq!(out, vec!["lonely lighthouse"]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // 0.5 is not below 0.5, 0.39 is below 0.4
        let rng = Scripted::new(&[0.5, 0.39, 0.3, 0.3], &[0]);
        let mut variator = PromptVariator::new(rng);
        let out = variator.generate_variations("a boat", 1, Style::Unstyled);
        assert_eq!(out, vec!["a boat, natural lighting"]);
    }

    #[test]
    fn test_zero_variations() {
        let mut variator = PromptVariator::seeded(1);
        assert!(variator
            .generate_variations("anything", 0, Style::Fantasy)
            .is_empty());
    }

    #[test]
    fn test_enhance_skips_present_categories() {
        let mut variator = PromptVariator::seeded(5);
        let prompt = "a cat, MASTERPIECE, Golden Hour";
        assert_eq!(variator.enhance_prompt(prompt, true, true), prompt);
    }

    #[test]
    fn test_enhance_flags_off() {
        let mut variator = PromptVariator::seeded(5);
        assert_eq!(variator.enhance_prompt("  a cat  ", false, false), "a cat");
    }

    #[test]
    fn test_negative_variations_without_base() {
        let mut variator = PromptVariator::seeded(9);
        for input in [None, Some("")] {
            let out = variator.create_negative_prompt_variations(input);
            assert_eq!(out.len(), NEGATIVE_VARIATION_COUNT);
            for variation in out {
                let terms: Vec<&str> = variation.split(", ").collect();
                assert!((2..=4).contains(&terms.len()), "{}", variation);
                assert!(terms.iter().all(|t| NEGATIVE_TERMS.contains(t)));
            }
        }
    }

    #[test]
    fn test_style_template_and_negative_merge() {
        assert_eq!(
            apply_style_template("a cat ", Style::Anime),
            "a cat, anime style, manga, detailed, vibrant"
        );
        assert_eq!(merge_negative_prompt(None), DEFAULT_NEGATIVE_PROMPT);
        assert_eq!(merge_negative_prompt(Some("   ")), DEFAULT_NEGATIVE_PROMPT);
        assert_eq!(
            merge_negative_prompt(Some("cropped")),
            format!("cropped, {}", DEFAULT_NEGATIVE_PROMPT)
        );
    }
}
