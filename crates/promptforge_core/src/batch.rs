//! Batch planning
//!
//! Expands a `prompts.json` file into generation requests. Each entry is
//! planned independently: an invalid entry is recorded as rejected and the
//! rest of the batch continues.
//!
//! Input format:
//!
//! ```json
//! {
//!   "prompts": [
//!     {
//!       "text": "A beautiful sunset over mountains",
//!       "style": "realistic",
//!       "num_images": 2,
//!       "negative_prompt": "blurry, distorted"
//!     }
//!   ]
//! }
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::request::{GenerationRequest, GenerationSettings};
use crate::rng::RandomSource;
use crate::style::Style;
use crate::variator::PromptVariator;

/// One prompt in a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrompt {
    #[serde(default)]
    pub text: String,

    #[serde(default = "default_style")]
    pub style: Style,

    #[serde(default = "default_num_images")]
    pub num_images: u32,

    #[serde(default)]
    pub negative_prompt: String,
}

fn default_style() -> Style {
    Style::Realistic
}

fn default_num_images() -> u32 {
    1
}

/// Contents of a batch prompts file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchFile {
    #[serde(default)]
    pub prompts: Vec<BatchPrompt>,
}

impl BatchFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Starter file written by `batch init`.
    pub fn sample() -> Self {
        let entry = |text: &str, style: Style, negative: &str| BatchPrompt {
            text: text.to_string(),
            style,
            num_images: 1,
            negative_prompt: negative.to_string(),
        };
        Self {
            prompts: vec![
                entry(
                    "A serene mountain lake at sunrise, professional photography",
                    Style::Realistic,
                    "blurry, distorted",
                ),
                entry(
                    "Abstract representation of artificial intelligence, vibrant colors",
                    Style::Artistic,
                    "ugly, low quality",
                ),
                entry(
                    "Cyberpunk city street at night with neon lights",
                    Style::Cyberpunk,
                    "blurry, low resolution",
                ),
            ],
        }
    }
}

/// Outcome of planning one batch entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryOutcome {
    Planned {
        /// Prompt variations, one per request; empty unless expansion is on.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variations: Vec<String>,
        requests: Vec<GenerationRequest>,
    },
    Rejected {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// 1-based position in the batch file.
    pub index: usize,
    pub prompt: String,
    pub style: Style,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

impl BatchEntry {
    pub fn is_planned(&self) -> bool {
        matches!(self.outcome, EntryOutcome::Planned { .. })
    }

    /// Images this entry will produce.
    pub fn image_count(&self) -> u32 {
        match &self.outcome {
            EntryOutcome::Planned { requests, .. } => {
                requests.iter().map(|r| r.settings.num_images).sum()
            }
            EntryOutcome::Rejected { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub planned: usize,
    pub rejected: usize,
    pub images: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPlan {
    pub created_at: DateTime<Local>,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

impl BatchPlan {
    /// Report file name derived from the plan timestamp.
    pub fn report_file_name(&self) -> String {
        format!(
            "batch_plan_{}.json",
            self.created_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the plan as pretty JSON into `output_dir`, returning the path.
    pub fn write_report(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(self.report_file_name());
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "wrote batch plan");
        Ok(path)
    }
}

/// Turns batch files into plans.
pub struct BatchPlanner<R> {
    variator: PromptVariator<R>,
    settings: GenerationSettings,
    expand_variations: bool,
}

impl<R: RandomSource> BatchPlanner<R> {
    /// `settings` supplies everything but `num_images`, which comes from
    /// each entry.
    pub fn new(
        variator: PromptVariator<R>,
        settings: GenerationSettings,
        expand_variations: bool,
    ) -> Self {
        Self {
            variator,
            settings,
            expand_variations,
        }
    }

    pub fn plan(&mut self, batch: &BatchFile) -> BatchPlan {
        let total = batch.prompts.len();
        info!(total, expand = self.expand_variations, "planning batch");

        let entries: Vec<BatchEntry> = batch
            .prompts
            .iter()
            .enumerate()
            .map(|(i, prompt)| {
                let index = i + 1;
                info!(index, total, style = %prompt.style, "planning prompt");
                let outcome = match self.plan_entry(prompt) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(index, error = %err, "rejected batch entry");
                        EntryOutcome::Rejected {
                            error: err.to_string(),
                        }
                    }
                };
                BatchEntry {
                    index,
                    prompt: prompt.text.clone(),
                    style: prompt.style,
                    outcome,
                }
            })
            .collect();

        let planned = entries.iter().filter(|e| e.is_planned()).count();
        let summary = BatchSummary {
            total,
            planned,
            rejected: total - planned,
            images: entries.iter().map(BatchEntry::image_count).sum(),
        };
        info!(
            planned = summary.planned,
            rejected = summary.rejected,
            images = summary.images,
            "batch planned"
        );

        BatchPlan {
            created_at: Local::now(),
            entries,
            summary,
        }
    }

    fn plan_entry(&mut self, prompt: &BatchPrompt) -> Result<EntryOutcome> {
        let settings = GenerationSettings {
            num_images: prompt.num_images,
            ..self.settings.clone()
        };
        let negative = Some(prompt.negative_prompt.as_str());
        let request = GenerationRequest::build(&prompt.text, negative, prompt.style, settings.clone())?;

        if !self.expand_variations {
            return Ok(EntryOutcome::Planned {
                variations: Vec::new(),
                requests: vec![request],
            });
        }

        let variations = self.variator.generate_variations(
            &prompt.text,
            prompt.num_images as usize,
            prompt.style,
        );
        let single = GenerationSettings {
            num_images: 1,
            ..settings
        };
        let requests = variations
            .iter()
            .map(|variation| {
                GenerationRequest::build(variation, negative, prompt.style, single.clone())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EntryOutcome::Planned {
            variations,
            requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn planner(expand: bool) -> BatchPlanner<crate::rng::DefaultSource> {
        BatchPlanner::new(
            PromptVariator::seeded(42),
            GenerationSettings::default(),
            expand,
        )
    }

    #[test]
    fn test_defaults_applied_when_fields_missing() {
        let batch: BatchFile =
            serde_json::from_str(r#"{"prompts": [{"text": "a red barn"}]}"#).unwrap();
        let prompt = &batch.prompts[0];
        assert_eq!(prompt.style, Style::Realistic);
        assert_eq!(prompt.num_images, 1);
        assert_eq!(prompt.negative_prompt, "");
    }

    #[test]
    fn test_plan_mixed_entries() {
        let batch: BatchFile = serde_json::from_str(
            r#"{"prompts": [
                {"text": "a red barn", "num_images": 2},
                {"text": "   "},
                {"text": "a dragon", "style": "fantasy", "num_images": 9},
                {"text": "neon alley", "style": "cyberpunk", "negative_prompt": "people"}
            ]}"#,
        )
        .unwrap();

        let plan = planner(false).plan(&batch);
        assert_eq!(
            plan.summary,
            BatchSummary {
                total: 4,
                planned: 2,
                rejected: 2,
                images: 3,
            }
        );
        assert_eq!(
            plan.entries.iter().map(|e| e.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        match &plan.entries[2].outcome {
            EntryOutcome::Rejected { error } => assert!(error.contains("num_images"), "{}", error),
            other => panic!("expected rejection, got {:?}", other),
        }
        match &plan.entries[3].outcome {
            EntryOutcome::Planned { requests, .. } => {
                assert!(requests[0].negative_prompt.starts_with("people, "));
            }
            other => panic!("expected plan, got {:?}", other),
        }
    }

    #[test]
    fn test_expansion_creates_request_per_variation() {
        let batch: BatchFile = serde_json::from_str(
            r#"{"prompts": [{"text": "a red barn, winter", "num_images": 3}]}"#,
        )
        .unwrap();
        let plan = planner(true).plan(&batch);
        match &plan.entries[0].outcome {
            EntryOutcome::Planned {
                variations,
                requests,
            } => {
                assert_eq!(variations.len(), 3);
                assert_eq!(requests.len(), 3);
                for (variation, request) in variations.iter().zip(requests) {
                    assert!(variation.starts_with("a red barn"));
                    assert!(request.prompt.starts_with(variation.as_str()));
                    assert_eq!(request.settings.num_images, 1);
                }
            }
            other => panic!("expected plan, got {:?}", other),
        }
        assert_eq!(plan.summary.images, 3);
    }

    #[test]
    fn test_report_round_trip() {
        let dir = TempDir::new().unwrap();
        let plan = planner(false).plan(&BatchFile::sample());
        let path = plan.write_report(&dir.path().join("out")).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("batch_plan_") && name.ends_with(".json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["planned"], 3);
        assert_eq!(value["entries"][0]["status"], "planned");
        assert_eq!(value["entries"][1]["style"], "artistic");
    }

    #[test]
    fn test_sample_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.json");
        BatchFile::sample().save(&path).unwrap();
        assert_eq!(BatchFile::load(&path).unwrap(), BatchFile::sample());
    }
}
