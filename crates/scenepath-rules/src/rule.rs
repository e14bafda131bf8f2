//! A [`Rule`] binds a positional pattern to the action taken when it matches.

use std::collections::BTreeMap;

use crate::pattern::{PatternNode, PredicateFailure};
use crate::template::Captures;

/// Which token sequence a rule is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenScope {
    /// Tokens below the library root.
    #[default]
    Library,
    /// Tokens from the filesystem root, including the library root itself.
    Full,
}

/// What happens to a scene whose path matches the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Resolve the field templates and update the scene.
    Fields(BTreeMap<String, String>),
    /// Hand the scene to an identification scraper.
    ScrapeWith(String),
    /// Leave the scene alone.
    Skip,
}

/// An ordered pattern plus an action.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Human-readable name used in logs and previews.
    pub name: String,
    /// One node per path token; the rule only applies to paths of this length.
    pub pattern: Vec<PatternNode>,
    /// Action taken on match.
    pub action: RuleAction,
    /// Token sequence the pattern is tested against.
    pub scope: TokenScope,
}

impl Rule {
    /// Create a rule matched against library-relative tokens.
    pub fn new(name: impl Into<String>, pattern: Vec<PatternNode>, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            pattern,
            action,
            scope: TokenScope::Library,
        }
    }

    /// Set the token scope.
    pub fn with_scope(mut self, scope: TokenScope) -> Self {
        self.scope = scope;
        self
    }

    /// Match the rule against a token sequence.
    ///
    /// Returns `Ok(None)` when the length differs or any position fails to
    /// match. A failing predicate aborts the attempt with an error.
    pub fn match_tokens(&self, tokens: &[String]) -> Result<Option<Captures>, PredicateFailure> {
        if self.pattern.len() != tokens.len() {
            return Ok(None);
        }

        let mut captures = Captures::default();
        for (node, token) in self.pattern.iter().zip(tokens) {
            match node.matches(token)? {
                Some(values) => captures.extend(values),
                None => return Ok(None),
            }
        }

        Ok(Some(captures))
    }
}
