//! Templates command - curated starter prompts

use promptforge_core::TemplateCategory;
use serde::Serialize;

use super::error::HelpfulError;
use super::output::{print_json, print_table};

#[derive(Debug)]
pub struct TemplatesArgs {
    pub category: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TemplateGroup {
    category: TemplateCategory,
    prompts: &'static [&'static str],
}

/// Execute the templates command
pub fn run(args: TemplatesArgs) -> anyhow::Result<()> {
    let categories: Vec<TemplateCategory> = match args.category.as_deref() {
        Some(name) => {
            let category = TemplateCategory::from_key(name).ok_or_else(|| {
                let known: Vec<&str> = TemplateCategory::all().iter().map(|c| c.as_str()).collect();
                HelpfulError::unknown_category(name, &known)
            })?;
            vec![category]
        }
        None => TemplateCategory::all().to_vec(),
    };

    let groups: Vec<TemplateGroup> = categories
        .into_iter()
        .map(|category| TemplateGroup {
            category,
            prompts: category.prompts(),
        })
        .collect();

    if args.json {
        return print_json(&groups);
    }

    let rows = groups
        .iter()
        .flat_map(|group| {
            group
                .prompts
                .iter()
                .map(move |prompt| vec![group.category.to_string(), prompt.to_string()])
        })
        .collect();
    print_table(&["Category", "Prompt"], rows);
    Ok(())
}
