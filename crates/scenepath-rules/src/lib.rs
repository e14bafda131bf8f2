//! # scenepath-rules
//!
//! Positional path rules for media files.
//!
//! A rule is an ordered list of pattern nodes, one per path token, plus an
//! action. The first rule whose pattern matches every token of a path wins,
//! and the strings its nodes captured feed `#N` placeholders in the rule's
//! field templates.
//!
//! ## Overview
//!
//! - [`PatternNode`] -- wildcard, literal, alternation, regex or predicate.
//! - [`Rule`] -- binds a pattern to a [`RuleAction`].
//! - [`RuleSet`] / [`select_rule`] -- first-match rule selection.
//! - [`Captures`] -- captured data and placeholder substitution.
//! - [`RuleSpec`] -- the serializable form used in configuration files.
//!
//! ```
//! use scenepath_common::paths::tokenize;
//! use scenepath_rules::{PatternNode, Rule, RuleAction, RuleSet};
//!
//! let rules = RuleSet::new(vec![Rule::new(
//!     "studio folders",
//!     vec![PatternNode::literal("StudioA"), PatternNode::Wildcard],
//!     RuleAction::Skip,
//! )]);
//!
//! let tokens = tokenize("/lib/StudioA/scene.mp4", &["/lib".to_string()]).unwrap();
//! let matched = rules.select(&tokens).unwrap().unwrap();
//! assert_eq!(matched.captures.substitute("#0 - #1"), "StudioA - scene");
//! ```

pub mod pattern;
pub mod predicates;
pub mod rule;
pub mod selector;
pub mod spec;
pub mod template;

pub use pattern::{PatternNode, Predicate, PredicateFailure};
pub use predicates::PredicateRegistry;
pub use rule::{Rule, RuleAction, TokenScope};
pub use selector::{select_rule, RuleMatch, RuleSet};
pub use spec::{build_rules, BuildContext, NodeSpec, PatternSpec, RuleSpec};
pub use template::Captures;
