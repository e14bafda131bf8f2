//! Serializable rule specifications, as written in configuration files.
//!
//! Pattern positions are written as:
//!
//! - `"*"` for a wildcard,
//! - any other string for a literal,
//! - an array for an alternation,
//! - a table with exactly one of `literal`, `regex`, `pattern` (a named
//!   regex), `predicate` (a named predicate) or `wildcard = true`.
//!
//! ```toml
//! [[rules]]
//! name = "Movie scenes"
//! pattern = [["One Studio", "Another Studio"], { pattern = "movie_title_and_year" }, "*"]
//! fields = { studio = "#0", movie_title = "#1", title = "#2" }
//! ```

use std::collections::BTreeMap;

use scenepath_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::pattern::PatternNode;
use crate::predicates::PredicateRegistry;
use crate::rule::{Rule, RuleAction, TokenScope};

/// Wildcard shorthand in the string form.
pub const WILDCARD: &str = "*";

/// One pattern position as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    /// `"*"` or a literal.
    Text(String),
    /// Alternation of nested specs.
    AnyOf(Vec<PatternSpec>),
    /// Explicit node table.
    Node(NodeSpec),
}

/// Table form of a pattern position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Name of an entry in the shared pattern table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Name of a registered predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wildcard: bool,
}

/// A rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,

    pub pattern: Vec<PatternSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_with: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,

    /// Match against the full path instead of the library-relative one.
    #[serde(default, alias = "includes_base_path", skip_serializing_if = "std::ops::Not::not")]
    pub match_full_path: bool,
}

/// Named regexes and predicates available while building rules.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub patterns: &'a BTreeMap<String, String>,
    pub predicates: &'a PredicateRegistry,
}

impl PatternSpec {
    /// Compile this spec into a pattern node.
    pub fn build(&self, ctx: BuildContext<'_>) -> Result<PatternNode> {
        match self {
            PatternSpec::Text(text) if text == WILDCARD => Ok(PatternNode::Wildcard),
            PatternSpec::Text(text) => Ok(PatternNode::literal(text.clone())),
            PatternSpec::AnyOf(children) => children
                .iter()
                .map(|child| child.build(ctx))
                .collect::<Result<Vec<_>>>()
                .map(PatternNode::Alternation),
            PatternSpec::Node(node) => node.build(ctx),
        }
    }
}

impl NodeSpec {
    fn build(&self, ctx: BuildContext<'_>) -> Result<PatternNode> {
        let set = [
            self.literal.is_some(),
            self.regex.is_some(),
            self.pattern.is_some(),
            self.predicate.is_some(),
            self.wildcard,
        ]
        .iter()
        .filter(|set| **set)
        .count();

        if set != 1 {
            return Err(Error::pattern(
                "a pattern table needs exactly one of literal, regex, pattern, predicate or wildcard",
            ));
        }

        if let Some(text) = &self.literal {
            return Ok(PatternNode::literal(text.clone()));
        }
        if let Some(regex) = &self.regex {
            return PatternNode::regex(regex);
        }
        if let Some(name) = &self.pattern {
            let regex = ctx
                .patterns
                .get(name)
                .ok_or_else(|| Error::pattern(format!("unknown named pattern '{}'", name)))?;
            return PatternNode::regex(regex);
        }
        if let Some(name) = &self.predicate {
            let predicate = ctx
                .predicates
                .get(name)
                .ok_or_else(|| {
                    Error::pattern(format!(
                        "unknown predicate '{}' (known: {})",
                        name,
                        ctx.predicates.names().join(", ")
                    ))
                })?;
            return Ok(PatternNode::predicate(predicate.clone()));
        }
        Ok(PatternNode::Wildcard)
    }
}

impl RuleSpec {
    /// Resolve the single action this rule declares.
    pub fn action(&self) -> Result<RuleAction> {
        match (&self.fields, &self.scrape_with, self.skip) {
            (Some(fields), None, false) => Ok(RuleAction::Fields(fields.clone())),
            (None, Some(scraper), false) => Ok(RuleAction::ScrapeWith(scraper.clone())),
            (None, None, true) => Ok(RuleAction::Skip),
            (None, None, false) => Err(Error::config(format!(
                "rule '{}' needs one of fields, scrape_with or skip",
                self.name
            ))),
            _ => Err(Error::config(format!(
                "rule '{}' declares more than one of fields, scrape_with and skip",
                self.name
            ))),
        }
    }

    /// Compile this spec into a rule.
    pub fn build(&self, ctx: BuildContext<'_>) -> Result<Rule> {
        if self.name.trim().is_empty() {
            return Err(Error::config("rule name cannot be empty"));
        }

        let action = self.action()?;
        let pattern = self
            .pattern
            .iter()
            .map(|spec| spec.build(ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::config(format!("rule '{}': {}", self.name, e)))?;

        let scope = if self.match_full_path {
            TokenScope::Full
        } else {
            TokenScope::Library
        };

        Ok(Rule::new(self.name.clone(), pattern, action).with_scope(scope))
    }
}

/// Compile a list of rule specs, preserving their order.
pub fn build_rules(specs: &[RuleSpec], ctx: BuildContext<'_>) -> Result<Vec<Rule>> {
    specs.iter().map(|spec| spec.build(ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Doc {
        #[serde(default)]
        patterns: BTreeMap<String, String>,
        rules: Vec<RuleSpec>,
    }

    const DOC: &str = r##"
[patterns]
movie_title_and_year = '(.+) \(\d{4}\)'

[[rules]]
name = "Rule 1"
pattern = ["Specific Studio", "*", { wildcard = true }]
fields = { studio = "#0", title = "#2" }

[[rules]]
name = "Rule 2"
pattern = [["One Studio", "Another Studio"], { pattern = "movie_title_and_year" }, { regex = '(.+) - ([A-zÀ-ú, ]+)' }]
scrape_with = "scraper-id"

[[rules]]
name = "Skip dated"
pattern = [{ predicate = "date" }, { literal = "*" }]
skip = true
includes_base_path = true
"##;

    fn parse() -> Doc {
        toml::from_str(DOC).unwrap()
    }

    #[test]
    fn test_parse_rule_specs() {
        let doc = parse();
        assert_eq!(doc.rules.len(), 3);
        assert_eq!(doc.rules[0].pattern[1], PatternSpec::Text("*".into()));
        assert!(matches!(doc.rules[1].pattern[0], PatternSpec::AnyOf(_)));
        assert!(doc.rules[2].match_full_path);
    }

    #[test]
    fn test_build_rules() {
        let doc = parse();
        let predicates = PredicateRegistry::with_builtins();
        let ctx = BuildContext {
            patterns: &doc.patterns,
            predicates: &predicates,
        };
        let rules = build_rules(&doc.rules, ctx).unwrap();

        assert!(matches!(rules[0].pattern[1], PatternNode::Wildcard));
        assert!(matches!(rules[0].pattern[2], PatternNode::Wildcard));
        assert!(matches!(rules[0].action, RuleAction::Fields(_)));
        assert!(matches!(rules[1].pattern[1], PatternNode::Regex(_)));
        assert_eq!(rules[1].action, RuleAction::ScrapeWith("scraper-id".into()));
        assert!(matches!(rules[2].pattern[0], PatternNode::Predicate(_)));
        assert!(matches!(&rules[2].pattern[1], PatternNode::Literal(s) if s == "*"));
        assert_eq!(rules[2].scope, TokenScope::Full);
    }

    fn spec(fields: bool, scrape: bool, skip: bool) -> RuleSpec {
        RuleSpec {
            name: "r".into(),
            pattern: vec![PatternSpec::Text("*".into())],
            fields: fields.then(BTreeMap::new),
            scrape_with: scrape.then(|| "s".to_string()),
            skip,
            match_full_path: false,
        }
    }

    #[test]
    fn test_exactly_one_action() {
        assert!(spec(true, false, false).action().is_ok());
        assert!(spec(false, true, false).action().is_ok());
        assert!(spec(false, false, true).action().is_ok());
        assert!(spec(false, false, false).action().is_err());
        assert!(spec(true, false, true).action().is_err());
        assert!(spec(true, true, false).action().is_err());
    }

    #[test]
    fn test_unknown_predicate_lists_known_names() {
        let patterns = BTreeMap::new();
        let predicates = PredicateRegistry::with_builtins();
        let ctx = BuildContext {
            patterns: &patterns,
            predicates: &predicates,
        };

        let spec = PatternSpec::Node(NodeSpec {
            predicate: Some("weekday".into()),
            ..Default::default()
        });
        let err = spec.build(ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Pattern error: unknown predicate 'weekday' (known: date, number, year)"
        );
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let patterns = BTreeMap::new();
        let predicates = PredicateRegistry::new();
        let ctx = BuildContext {
            patterns: &patterns,
            predicates: &predicates,
        };

        let named = PatternSpec::Node(NodeSpec {
            pattern: Some("missing".into()),
            ..Default::default()
        });
        assert!(named.build(ctx).is_err());

        let predicate = PatternSpec::Node(NodeSpec {
            predicate: Some("missing".into()),
            ..Default::default()
        });
        assert!(predicate.build(ctx).is_err());

        let empty = PatternSpec::Node(NodeSpec::default());
        assert!(empty.build(ctx).is_err());
    }
}
