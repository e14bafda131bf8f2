//! The [`RuleSet`] picks the first rule that matches a tokenized path.
//!
//! Rules are tried strictly in authored order and the first full match
//! wins. There is no ranking and no indexing by pattern length, so a later
//! rule can never take precedence over an earlier one.

use scenepath_common::paths::PathTokens;
use scenepath_common::{Error, Result};

use crate::rule::{Rule, TokenScope};
use crate::template::Captures;

/// A rule together with the data its pattern captured.
#[derive(Debug, Clone)]
pub struct RuleMatch<'a> {
    /// The matched rule.
    pub rule: &'a Rule,
    /// Captured values, concatenated in pattern order.
    pub captures: Captures,
}

/// Return the first rule whose pattern matches `tokens`.
///
/// Every rule sees the token sequence selected by its [`TokenScope`].
/// `Ok(None)` means no rule matched. A predicate failure is returned as
/// [`Error::Predicate`] and stops the scan.
pub fn select_rule<'a>(rules: &'a [Rule], tokens: &PathTokens) -> Result<Option<RuleMatch<'a>>> {
    for rule in rules {
        let candidate = match rule.scope {
            TokenScope::Library => &tokens.library,
            TokenScope::Full => &tokens.full,
        };

        let captures = rule
            .match_tokens(candidate)
            .map_err(|failure| Error::Predicate {
                rule: rule.name.clone(),
                name: failure.name,
                token: failure.token,
                message: failure.message,
            })?;

        if let Some(captures) = captures {
            tracing::trace!(rule = %rule.name, captures = captures.len(), "rule matched");
            return Ok(Some(RuleMatch { rule, captures }));
        }
    }

    Ok(None)
}

/// Ordered, read-only collection of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set. The given order is the matching order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Return the first rule matching the tokens, if any.
    pub fn select(&self, tokens: &PathTokens) -> Result<Option<RuleMatch<'_>>> {
        select_rule(&self.rules, tokens)
    }

    /// The rules in matching order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternNode, Predicate};
    use crate::rule::RuleAction;

    fn library_tokens(list: &[&str]) -> PathTokens {
        let tokens: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        PathTokens {
            full: tokens.clone(),
            library: tokens,
            library_path: list.join("/"),
            root: None,
        }
    }

    fn skip_rule(name: &str, pattern: Vec<PatternNode>) -> Rule {
        Rule::new(name, pattern, RuleAction::Skip)
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            skip_rule("first", vec![PatternNode::Wildcard, PatternNode::Wildcard]),
            skip_rule("second", vec![PatternNode::literal("a"), PatternNode::literal("b")]),
        ];
        let matched = select_rule(&rules, &library_tokens(&["a", "b"])).unwrap().unwrap();
        assert_eq!(matched.rule.name, "first");
    }

    #[test]
    fn test_length_filters_candidates() {
        let rules = vec![
            skip_rule("three", vec![PatternNode::Wildcard; 3]),
            skip_rule("two", vec![PatternNode::Wildcard; 2]),
        ];
        let matched = select_rule(&rules, &library_tokens(&["a", "b"])).unwrap().unwrap();
        assert_eq!(matched.rule.name, "two");
    }

    #[test]
    fn test_no_rule_matches() {
        let rules = vec![skip_rule("lit", vec![PatternNode::literal("x")])];
        assert!(select_rule(&rules, &library_tokens(&["y"])).unwrap().is_none());
        assert!(select_rule(&[], &library_tokens(&["y"])).unwrap().is_none());
    }

    #[test]
    fn test_full_scope_uses_full_tokens() {
        let rules = vec![skip_rule(
            "share",
            vec![PatternNode::Wildcard, PatternNode::literal("NetworkShare"), PatternNode::Wildcard],
        )
        .with_scope(TokenScope::Full)];

        let tokens = PathTokens {
            full: vec!["".into(), "NetworkShare".into(), "Scene".into()],
            library: vec!["Scene".into()],
            library_path: "Scene".into(),
            root: Some("/NetworkShare".into()),
        };

        let matched = select_rule(&rules, &tokens).unwrap().unwrap();
        assert_eq!(matched.captures.iter().collect::<Vec<_>>(), vec!["", "NetworkShare", "Scene"]);
    }

    #[test]
    fn test_predicate_error_stops_scan() {
        let rules = vec![
            skip_rule(
                "fails",
                vec![PatternNode::predicate(Predicate::new("boom", |_: &str| {
                    Err("bad token".to_string())
                }))],
            ),
            skip_rule("never", vec![PatternNode::Wildcard]),
        ];

        let err = select_rule(&rules, &library_tokens(&["x"])).unwrap_err();
        match err {
            Error::Predicate { rule, name, token, message } => {
                assert_eq!(rule, "fails");
                assert_eq!(name, "boom");
                assert_eq!(token, "x");
                assert_eq!(message, "bad token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rule_set_preserves_order() {
        let set = RuleSet::new(vec![
            skip_rule("b", vec![PatternNode::Wildcard]),
            skip_rule("a", vec![PatternNode::Wildcard]),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.select(&library_tokens(&["t"])).unwrap().unwrap().rule.name, "b");
    }
}
