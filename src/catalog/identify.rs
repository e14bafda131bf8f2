//! Field-merge settings sent along with identification requests.

use serde::{Deserialize, Serialize};

/// How a scraped value is combined with the scene's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    Ignore,
    Overwrite,
    Merge,
}

/// Merge setting for one scene field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub field: String,
    pub strategy: MergeStrategy,
    /// Whether referenced studios, performers or tags may be created.
    #[serde(default)]
    pub create_missing: Option<bool>,
}

impl FieldOption {
    fn new(field: &str, strategy: MergeStrategy, create_missing: Option<bool>) -> Self {
        Self {
            field: field.to_string(),
            strategy,
            create_missing,
        }
    }
}

/// Options passed to the scraper for every identification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyOptions {
    #[serde(default = "default_field_options")]
    pub field_options: Vec<FieldOption>,

    #[serde(default = "default_true")]
    pub set_cover_image: bool,

    #[serde(default)]
    pub set_organized: bool,

    #[serde(default = "default_true")]
    pub include_male_performers: bool,
}

fn default_true() -> bool {
    true
}

fn default_field_options() -> Vec<FieldOption> {
    use MergeStrategy::*;

    vec![
        FieldOption::new("title", Overwrite, None),
        FieldOption::new("performers", Merge, Some(true)),
        FieldOption::new("studio", Overwrite, Some(true)),
        FieldOption::new("tags", Merge, Some(true)),
        FieldOption::new("stash_ids", Ignore, Some(false)),
        FieldOption::new("date", Overwrite, Some(false)),
        FieldOption::new("details", Overwrite, Some(false)),
        FieldOption::new("url", Overwrite, Some(false)),
        FieldOption::new("code", Overwrite, Some(false)),
        FieldOption::new("director", Overwrite, Some(false)),
    ]
}

impl Default for IdentifyOptions {
    fn default() -> Self {
        Self {
            field_options: default_field_options(),
            set_cover_image: true,
            set_organized: false,
            include_male_performers: true,
        }
    }
}
