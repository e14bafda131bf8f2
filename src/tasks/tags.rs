//! Bookkeeping for the tags that mark scenes for processing.

use scenepath_common::{EntityId, Error, Result};

use super::Engine;
use crate::catalog::EntityKind;

/// Counters for a tag clean-up run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Scenes carrying any of the tags when the run started.
    pub found: u64,
    /// Scenes the tags were removed from.
    pub cleaned: u64,
}

fn pretty_list(names: &[String]) -> String {
    format!("['{}']", names.join("', '"))
}

impl Engine<'_> {
    /// Create each tag unless it already exists. Returns the ids of all
    /// named tags.
    pub fn create_tags(&self, names: &[String]) -> Result<Vec<EntityId>> {
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            if let Some(id) = self.catalog.find_tag(name)? {
                self.reporter
                    .info(&format!("Tag \"{}\" is already present.", name));
                ids.push(id);
                continue;
            }

            let id = self.catalog.create_entity(EntityKind::Tag, name)?;
            self.reporter
                .info(&format!("Created tag {} with ID: {}", name, id));
            ids.push(id);
        }

        Ok(ids)
    }

    /// Delete each tag that exists. Returns how many were deleted.
    pub fn remove_tags(&self, names: &[String]) -> Result<usize> {
        let mut removed = 0;

        for name in names {
            let Some(id) = self.catalog.find_tag(name)? else {
                continue;
            };

            if !self.catalog.destroy_tag(&id)? {
                return Err(Error::catalog(format!("Unable to remove tag {}", name)));
            }
            self.reporter
                .info(&format!("Removed tag {} with ID: {}", name, id));
            removed += 1;
        }

        Ok(removed)
    }

    /// Remove the tags from every scene carrying any of them.
    pub fn clean_scenes_tags(&self, names: &[String]) -> Result<CleanSummary> {
        let mut tag_ids = Vec::new();
        for name in names {
            if let Some(id) = self.catalog.find_tag(name)? {
                tag_ids.push(id);
            }
        }

        if tag_ids.is_empty() {
            self.reporter.info("No tags found.");
            return Ok(CleanSummary::default());
        }

        let pretty = pretty_list(names);
        let mut summary = CleanSummary::default();
        let mut first = true;

        // Cleaned scenes drop out of the result, so the first page is
        // always the next batch.
        loop {
            let result = self
                .catalog
                .find_records_by_tags(&tag_ids, 1, self.page_size)?;

            if first {
                summary.found = result.count;
                first = false;
                if result.ids.is_empty() {
                    self.reporter
                        .info(&format!("No scenes tagged with: {}", pretty));
                }
            }

            if result.ids.is_empty() {
                break;
            }

            let cleaned = self.catalog.remove_tags_from_records(&result.ids, &tag_ids)?;
            if cleaned == 0 {
                tracing::warn!("Catalog removed tags from no scenes, stopping");
                break;
            }

            summary.cleaned += cleaned as u64;
            if summary.found > 0 {
                self.reporter
                    .progress((summary.cleaned as f64 / summary.found as f64).min(1.0));
            }
        }

        if summary.found > 0 {
            self.reporter.info(&format!(
                "Removed tags {} from {} scenes out of {} found.",
                pretty, summary.cleaned, summary.found
            ));
        }

        Ok(summary)
    }
}
