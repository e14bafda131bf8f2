//! Carries out the action of a matched rule.

use scenepath_common::{Error, Result, SceneId};
use scenepath_rules::{RuleAction, RuleMatch};

use crate::catalog::{Catalog, IdentifyOptions, Scraper};
use crate::context::{RunContext, Trace};
use crate::report::Reporter;
use crate::resolver::{FieldResolver, Resolution};

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The rule says to leave the scene alone.
    Skipped,
    /// The scene was handed to a scraper (`committed` is false in a dry run).
    Scraped { scraper: String, committed: bool },
    /// Resolved fields were written (`committed` is false in a dry run).
    Updated {
        resolution: Resolution,
        committed: bool,
    },
    /// A dry run resolved no fields at all.
    NothingToUpdate { resolution: Resolution },
}

impl ActionOutcome {
    /// Whether the catalog was changed.
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Scraped { committed: true, .. }
                | ActionOutcome::Updated { committed: true, .. }
        )
    }
}

/// Executes skip, scrape and field actions.
pub struct Dispatcher<'a> {
    catalog: &'a dyn Catalog,
    scraper: &'a dyn Scraper,
    reporter: &'a dyn Reporter,
    identify: &'a IdentifyOptions,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        scraper: &'a dyn Scraper,
        reporter: &'a dyn Reporter,
        identify: &'a IdentifyOptions,
    ) -> Self {
        Self {
            catalog,
            scraper,
            reporter,
            identify,
        }
    }

    /// Run the action of `matched` for `scene`, whose file is at `path`.
    ///
    /// In a dry run nothing is mutated and the preview goes to `trace`.
    pub fn dispatch(
        &self,
        ctx: &RunContext,
        scene: &SceneId,
        path: &str,
        matched: &RuleMatch<'_>,
        trace: &mut Trace,
    ) -> Result<ActionOutcome> {
        let rule = matched.rule;

        match &rule.action {
            RuleAction::Skip => {
                trace.push(format!("Skipping scene: {}", scene));
                if !ctx.is_dry_run() {
                    self.reporter.info(&format!(
                        "Rule: {}\nPath: {}\nSkipping scene: {}",
                        rule.name, path, scene
                    ));
                }
                Ok(ActionOutcome::Skipped)
            }

            RuleAction::ScrapeWith(scraper) => {
                if ctx.is_dry_run() {
                    trace.push(format!(
                        "Would call scraper {} on scene {} ID {}",
                        scraper, path, scene
                    ));
                    return Ok(ActionOutcome::Scraped {
                        scraper: scraper.clone(),
                        committed: false,
                    });
                }

                if !self.scraper.identify(scene, scraper, self.identify)? {
                    return Err(Error::ScrapeRejected {
                        scraper: scraper.clone(),
                        scene: scene.to_string(),
                    });
                }

                self.reporter.info(&format!(
                    "Rule: {}\nPath: {}\nCalled scraper {} on scene: {}",
                    rule.name, path, scraper, scene
                ));
                Ok(ActionOutcome::Scraped {
                    scraper: scraper.clone(),
                    committed: true,
                })
            }

            RuleAction::Fields(fields) => {
                let resolver = FieldResolver::new(self.catalog, ctx.mode());
                let resolution = resolver.resolve(scene, fields, &matched.captures, trace)?;

                for dropped in &resolution.dropped {
                    tracing::debug!(
                        scene = %scene,
                        field = %dropped.field,
                        value = %dropped.value,
                        reason = ?dropped.reason,
                        "field dropped"
                    );
                }

                if !resolution.has_changes() {
                    if ctx.is_dry_run() {
                        trace.push("No fields to update!");
                        return Ok(ActionOutcome::NothingToUpdate { resolution });
                    }
                    return Err(Error::NoFieldsToUpdate(scene.to_string()));
                }

                if ctx.is_dry_run() {
                    return Ok(ActionOutcome::Updated {
                        resolution,
                        committed: false,
                    });
                }

                let updated = self.catalog.update_record(&resolution.update)?;
                tracing::debug!(scene = %updated, "scene update acknowledged");

                self.reporter.info(&format!(
                    "Rule: {}\nPath: {}\nUpdated scene: {}",
                    rule.name, path, scene
                ));
                Ok(ActionOutcome::Updated {
                    resolution,
                    committed: true,
                })
            }
        }
    }
}
