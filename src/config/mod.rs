mod types;

pub use types::*;

use anyhow::{Context, Result};
use scenepath_rules::{build_rules, BuildContext, PredicateRegistry, RuleSet};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    tracing::debug!("Loaded {} rules from {:?}", config.rules.len(), path);
    Ok(config)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./scenepath.toml",
        "~/.config/scenepath/config.toml",
        "/etc/scenepath/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    tracing::debug!("No config file found, using defaults");
    Ok(Config::default())
}

impl Config {
    /// Compile the configured rules with the built-in predicates.
    pub fn build_rule_set(&self) -> scenepath_common::Result<RuleSet> {
        self.build_rule_set_with(&PredicateRegistry::with_builtins())
    }

    /// Compile the configured rules with a custom predicate registry.
    pub fn build_rule_set_with(
        &self,
        predicates: &PredicateRegistry,
    ) -> scenepath_common::Result<RuleSet> {
        let ctx = BuildContext {
            patterns: &self.patterns,
            predicates,
        };
        build_rules(&self.rules, ctx).map(RuleSet::new)
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.page_size == 0 {
        anyhow::bail!("page_size cannot be 0");
    }

    if config.catalog.url.trim().is_empty() {
        anyhow::bail!("catalog url cannot be empty");
    }

    if config.tags.run.trim().is_empty() || config.tags.test.trim().is_empty() {
        anyhow::bail!("tag names cannot be empty");
    }

    for (name, regex) in &config.patterns {
        regex::Regex::new(regex)
            .with_context(|| format!("Named pattern '{}' is not a valid regex", name))?;
    }

    // Compiling the rules checks actions, regexes and name references
    config.build_rule_set()?;

    if config.rules.is_empty() {
        tracing::warn!("No rules configured; every scene will be reported as unmatched");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.catalog.url, "http://localhost:9999");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert_eq!(config.tags.run, "PathParser: Run");
        assert_eq!(config.tags.test, "PathParser: Test");
        assert_eq!(config.page_size, 20);
        assert!(config.library_roots.is_empty());
        assert!(config.build_rule_set().unwrap().is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r##"
library_roots = ["/lib"]
page_size = 50

[catalog]
url = "http://stash:9999"
api_key = "secret"

[patterns]
movie_title_and_year = '(.+) \(\d{4}\)'

[[rules]]
name = "Movies"
pattern = ["StudioA", { pattern = "movie_title_and_year" }, "*"]
fields = { studio = "#0", movie_title = "#1", title = "#2" }
"##,
        )
        .unwrap();

        assert_eq!(config.catalog.api_key.as_deref(), Some("secret"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.build_rule_set().unwrap().len(), 1);
    }

    #[test]
    fn test_rule_without_action_is_rejected() {
        let err = parse_config(
            r#"
[[rules]]
name = "Nothing"
pattern = ["*"]
"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("needs one of fields, scrape_with or skip"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(parse_config("page_size = 0").is_err());
        assert!(parse_config("[patterns]\nbroken = '(unclosed'").is_err());
        assert!(parse_config(
            "[[rules]]\nname = \"r\"\npattern = [{ pattern = \"missing\" }]\nskip = true"
        )
        .is_err());
    }
}
