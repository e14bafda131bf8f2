//! Pattern nodes and the per-token matcher.
//!
//! A [`PatternNode`] tests exactly one path token. A successful match
//! always yields a flat list of captured strings, whatever the variant.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use scenepath_common::{Error, Result};

/// Signature of a predicate: `Ok(Some(captures))` on match, `Ok(None)` on no
/// match, `Err(message)` when the predicate itself fails.
pub type PredicateFn = dyn Fn(&str) -> std::result::Result<Option<Vec<String>>, String> + Send + Sync;

/// A named matching function.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Wrap a function as a predicate.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Option<Vec<String>>, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Registered name of the predicate.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the predicate on a token.
    pub fn call(&self, token: &str) -> std::result::Result<Option<Vec<String>>, String> {
        (self.func)(token)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

/// Failure raised by a predicate node while matching.
///
/// This is distinct from "no match": it aborts the whole rule attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateFailure {
    /// Predicate name.
    pub name: String,
    /// Token being evaluated.
    pub token: String,
    /// Message returned by the predicate.
    pub message: String,
}

/// One position of a rule pattern.
#[derive(Debug, Clone)]
pub enum PatternNode {
    /// Matches any token and captures it.
    Wildcard,
    /// Matches a token equal to the string and captures it.
    Literal(String),
    /// Matches if any child matches; the first matching child's captures win.
    Alternation(Vec<PatternNode>),
    /// Matches when the whole token matches; captures the sub-groups only.
    Regex(Regex),
    /// Delegates to a function.
    Predicate(Predicate),
}

impl PatternNode {
    /// Build a literal node.
    pub fn literal(text: impl Into<String>) -> Self {
        PatternNode::Literal(text.into())
    }

    /// Build an alternation of literals.
    pub fn one_of<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PatternNode::Alternation(items.into_iter().map(PatternNode::literal).collect())
    }

    /// Compile a regex node. The expression is anchored so it has to cover
    /// the entire token.
    pub fn regex(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{})$", pattern);
        Regex::new(&anchored)
            .map(PatternNode::Regex)
            .map_err(|e| Error::pattern(format!("invalid regex '{}': {}", pattern, e)))
    }

    /// Build a predicate node.
    pub fn predicate(predicate: Predicate) -> Self {
        PatternNode::Predicate(predicate)
    }

    /// Match this node against one token.
    ///
    /// Returns `Ok(None)` when the token does not match and
    /// `Err(PredicateFailure)` when a predicate node fails.
    pub fn matches(&self, token: &str) -> std::result::Result<Option<Vec<String>>, PredicateFailure> {
        match self {
            PatternNode::Wildcard => Ok(Some(vec![token.to_string()])),
            PatternNode::Literal(text) => Ok((text == token).then(|| vec![token.to_string()])),
            PatternNode::Alternation(children) => {
                for child in children {
                    if let Some(captures) = child.matches(token)? {
                        return Ok(Some(captures));
                    }
                }
                Ok(None)
            }
            PatternNode::Regex(re) => Ok(re.captures(token).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            })),
            PatternNode::Predicate(predicate) => {
                predicate.call(token).map_err(|message| PredicateFailure {
                    name: predicate.name().to_string(),
                    token: token.to_string(),
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_captures_token() {
        assert_eq!(
            PatternNode::Wildcard.matches("anything").unwrap(),
            Some(vec!["anything".to_string()])
        );
    }

    #[test]
    fn test_literal() {
        let node = PatternNode::literal("StudioA");
        assert_eq!(node.matches("StudioA").unwrap(), Some(vec!["StudioA".to_string()]));
        assert_eq!(node.matches("studioa").unwrap(), None);
    }

    #[test]
    fn test_alternation_first_match_wins() {
        let node = PatternNode::Alternation(vec![
            PatternNode::regex("(St)udio").unwrap(),
            PatternNode::Wildcard,
        ]);
        assert_eq!(node.matches("Studio").unwrap(), Some(vec!["St".to_string()]));
        assert_eq!(node.matches("Other").unwrap(), Some(vec!["Other".to_string()]));

        let literals = PatternNode::one_of(["One Studio", "Another Studio"]);
        assert!(literals.matches("Another Studio").unwrap().is_some());
        assert!(literals.matches("Third Studio").unwrap().is_none());
    }

    #[test]
    fn test_regex_captures_groups_only() {
        let node = PatternNode::regex(r"(.+) \(\d{4}\)").unwrap();
        assert_eq!(
            node.matches("Title One (2020)").unwrap(),
            Some(vec!["Title One".to_string()])
        );
    }

    #[test]
    fn test_regex_without_groups_captures_nothing() {
        let node = PatternNode::regex(r"\d{4}").unwrap();
        assert_eq!(node.matches("2020").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_regex_must_match_whole_token() {
        let node = PatternNode::regex(r"\d{4}").unwrap();
        assert_eq!(node.matches("x2020y").unwrap(), None);
    }

    #[test]
    fn test_regex_unmatched_optional_group_is_empty() {
        let node = PatternNode::regex(r"(\w+)(?: - (\w+))?").unwrap();
        assert_eq!(
            node.matches("Alone").unwrap(),
            Some(vec!["Alone".to_string(), String::new()])
        );
    }

    #[test]
    fn test_invalid_regex() {
        let err = PatternNode::regex("(unclosed").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }

    #[test]
    fn test_predicate_results() {
        let node = PatternNode::predicate(Predicate::new("upper", |t: &str| {
            Ok((t.chars().all(|c| c.is_ascii_uppercase())).then(|| vec![t.to_lowercase()]))
        }));
        assert_eq!(node.matches("ABC").unwrap(), Some(vec!["abc".to_string()]));
        assert_eq!(node.matches("Abc").unwrap(), None);
    }

    #[test]
    fn test_predicate_failure_propagates_through_alternation() {
        let node = PatternNode::Alternation(vec![
            PatternNode::predicate(Predicate::new("boom", |_: &str| Err("exploded".into()))),
            PatternNode::Wildcard,
        ]);
        let err = node.matches("x").unwrap_err();
        assert_eq!(err.name, "boom");
        assert_eq!(err.token, "x");
        assert_eq!(err.message, "exploded");
    }
}
