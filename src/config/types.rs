use std::collections::BTreeMap;

use scenepath_rules::RuleSpec;
use serde::{Deserialize, Serialize};

use crate::catalog::IdentifyOptions;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    /// Library roots; read from the catalog when empty.
    #[serde(default)]
    pub library_roots: Vec<String>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Named regular expressions usable from rule patterns.
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,

    #[serde(default)]
    pub identify: IdentifyOptions,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_page_size() -> u32 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            tags: TagsConfig::default(),
            library_roots: Vec::new(),
            page_size: default_page_size(),
            patterns: BTreeMap::new(),
            identify: IdentifyOptions::default(),
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Sent as the `ApiKey` header when set
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:9999".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Names of the tags that mark scenes for batch runs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsConfig {
    #[serde(default = "default_run_tag")]
    pub run: String,

    #[serde(default = "default_test_tag")]
    pub test: String,
}

fn default_run_tag() -> String {
    "PathParser: Run".to_string()
}

fn default_test_tag() -> String {
    "PathParser: Test".to_string()
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            run: default_run_tag(),
            test: default_test_tag(),
        }
    }
}

impl TagsConfig {
    pub fn both(&self) -> Vec<String> {
        vec![self.run.clone(), self.test.clone()]
    }
}
