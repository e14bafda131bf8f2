//! Matching single scenes and tagged batches of scenes.

use scenepath_common::{EntityId, Error, Result, SceneId};

use super::Engine;
use crate::context::{Invocation, RunContext, RunMode, Trace};
use crate::dispatch::ActionOutcome;

/// What happened to one scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutcome {
    /// A rule matched one of the scene's files and its action ran.
    Applied {
        path: String,
        rule: String,
        action: ActionOutcome,
        trace: Trace,
    },
    /// None of the scene's files matched a rule.
    NoMatch {
        first_path: Option<String>,
        trace: Trace,
    },
}

impl SceneOutcome {
    pub fn trace(&self) -> &Trace {
        match self {
            SceneOutcome::Applied { trace, .. } | SceneOutcome::NoMatch { trace, .. } => trace,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, SceneOutcome::Applied { .. })
    }
}

/// Counters for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Scenes the catalog reported for the tag.
    pub found: u64,
    /// Scenes processed.
    pub processed: u64,
    /// Processed scenes that matched a rule.
    pub matched: u64,
    /// Processed scenes that matched no rule.
    pub unmatched: u64,
    /// Matched scenes whose action changed the catalog.
    pub updated: u64,
}

impl BatchSummary {
    fn record(&mut self, outcome: &SceneOutcome) {
        self.processed += 1;
        match outcome {
            SceneOutcome::Applied { action, .. } => {
                self.matched += 1;
                if action.is_committed() {
                    self.updated += 1;
                }
            }
            SceneOutcome::NoMatch { .. } => self.unmatched += 1,
        }
    }

    fn fraction(&self) -> f64 {
        if self.found == 0 {
            return 1.0;
        }
        (self.processed as f64 / self.found as f64).min(1.0)
    }
}

impl Engine<'_> {
    /// Match a scene against the rules and run the action of the first
    /// matching rule.
    ///
    /// Every file of the scene is tried in order until one matches. A
    /// predicate failure moves on to the next file; any other error is
    /// returned.
    pub fn match_scene(&self, ctx: &RunContext, scene: &SceneId) -> Result<SceneOutcome> {
        let paths = self.catalog.record_paths(scene)?;
        if paths.is_empty() {
            return Err(Error::not_found("scene", scene));
        }

        let mut trace = Trace::new();

        for path in &paths {
            let tokens = ctx.tokenize(path)?;
            trace.push(tokens.library_path.clone());

            let matched = match self.rules.select(&tokens) {
                Ok(Some(matched)) => matched,
                Ok(None) => {
                    trace.push("No matching rule!");
                    self.reporter
                        .debug(&format!("No matching rule for path: {}", path));
                    continue;
                }
                Err(e @ Error::Predicate { .. }) => {
                    self.reporter.debug(&e.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };

            trace.push(format!("Matched rule: {}", matched.rule.name));
            self.reporter.debug(&format!(
                "Matched rule: {}\nFor path: {}",
                matched.rule.name, path
            ));

            let action = self
                .dispatcher()
                .dispatch(ctx, scene, path, &matched, &mut trace)?;

            self.emit_trace(ctx, &trace);
            return Ok(SceneOutcome::Applied {
                path: path.clone(),
                rule: matched.rule.name.clone(),
                action,
                trace,
            });
        }

        self.emit_trace(ctx, &trace);

        let first_path = paths.first().cloned();
        let mut message = format!("No rule matches id: {}", scene);
        if let Some(path) = &first_path {
            message.push_str(&format!("\nPath: {}", path));
        }
        match ctx.invocation() {
            Invocation::Hook => self.reporter.debug(&message),
            Invocation::Batch => self.reporter.warn(&message),
        }

        Ok(SceneOutcome::NoMatch { first_path, trace })
    }

    fn emit_trace(&self, ctx: &RunContext, trace: &Trace) {
        if ctx.is_dry_run() && !trace.is_empty() {
            self.reporter.info(&trace.render());
        }
    }

    /// Process every scene carrying `tag`, page by page.
    ///
    /// The tag must exist and be on at least one scene. A failing scene
    /// stops the batch.
    pub fn run_rules(&self, tag: &str, mode: RunMode) -> Result<BatchSummary> {
        let tag_id = self
            .catalog
            .find_tag(tag)?
            .ok_or_else(|| Error::not_found("tag", tag))?;

        let ctx = self.context(mode, Invocation::Batch)?;
        self.reporter
            .info(&format!("Start processing scenes marked with tag: {}", tag));

        let tags = [tag_id];
        let summary = self.run_pages(&ctx, &tags, tag)?;

        if summary.processed > 0 {
            self.reporter.info(&format!(
                "Processed: {} scenes out of {} found.",
                summary.processed, summary.found
            ));
            self.reporter.debug(&format!(
                "Matched: {}, updated: {}, unmatched: {}",
                summary.matched, summary.updated, summary.unmatched
            ));
        }
        self.reporter
            .info(&format!("Done processing scenes marked with tag: {}", tag));

        Ok(summary)
    }

    fn run_pages(&self, ctx: &RunContext, tags: &[EntityId], tag: &str) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let mut page = 1;

        loop {
            let result = self
                .catalog
                .find_records_by_tags(tags, page, self.page_size)?;

            if page == 1 {
                if result.ids.is_empty() {
                    return Err(Error::not_found("scene tagged", tag));
                }
                summary.found = result.count;
            }

            if result.ids.is_empty() {
                break;
            }

            self.reporter
                .debug(&format!("Processing {} scenes", result.ids.len()));

            for scene in &result.ids {
                let outcome = self.match_scene(ctx, scene)?;
                summary.record(&outcome);
                self.reporter.progress(summary.fraction());
            }

            page += 1;
        }

        tracing::debug!(?summary, "batch finished");
        Ok(summary)
    }
}
