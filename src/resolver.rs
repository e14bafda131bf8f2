//! Field resolution: turns a rule's field templates into a scene update.
//!
//! Every template is expanded with the captured data first. The expanded
//! value is then handled according to the field it targets:
//!
//! | field         | handling                                              |
//! |---------------|-------------------------------------------------------|
//! | `title`       | set verbatim                                          |
//! | `studio`      | exact-name lookup, created when absent                |
//! | `movie_title` | loose-whitespace regex lookup, never created          |
//! | `scene_index` | leading integer, kept only with a resolved movie      |
//! | `performers`  | comma list, name-or-alias lookup, created when absent |
//! | `tags`        | comma list, exact-name lookup, created when absent    |
//! | reserved name | dropped (`id`, `studio_id`, `movies` and the like)     |
//! | anything else | passed through verbatim                               |
//!
//! A value that cannot be resolved drops that field only. In a dry run
//! nothing is created; would-be creations are noted in the trace instead.

use std::collections::BTreeMap;

use scenepath_common::{EntityId, Result, SceneId};
use scenepath_rules::Captures;

use crate::catalog::{Catalog, EntityKind, MovieRef, NameMatcher, SceneUpdate};
use crate::context::{RunMode, Trace};

/// Regex fragment substituted for each space of a movie title.
pub const LOOSE_WHITESPACE: &str = "[\\W]*";

/// Why a field was left out of the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No entity matched the name and none was created.
    Unresolved,
    /// The value does not start with an integer.
    NotANumber,
    /// `scene_index` resolved but no movie did.
    NoMovie,
    /// The name belongs to a field the update sets itself.
    Reserved,
}

/// A field that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedField {
    pub field: String,
    pub value: String,
    pub reason: DropReason,
}

/// Outcome of resolving a rule's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub update: SceneUpdate,
    pub dropped: Vec<DroppedField>,
}

impl Resolution {
    /// Whether the update would change anything.
    pub fn has_changes(&self) -> bool {
        self.update.has_changes()
    }

    /// Whether `field` was dropped.
    pub fn was_dropped(&self, field: &str) -> bool {
        self.dropped.iter().any(|d| d.field == field)
    }
}

/// Build the regex used to look a movie up by title. Words are matched
/// literally.
///
/// ```
/// use scenepath::resolver::movie_title_pattern;
///
/// assert_eq!(movie_title_pattern("Title One"), "Title[\\W]*One");
/// assert_eq!(movie_title_pattern("Part (2)"), "Part[\\W]*\\(2\\)");
/// ```
pub fn movie_title_pattern(title: &str) -> String {
    title
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(LOOSE_WHITESPACE)
}

/// Parse the leading integer of `value`, ignoring leading whitespace.
///
/// `"03 - intro"` gives 3. A value with no leading digits gives `None`.
pub fn parse_scene_index(value: &str) -> Option<i32> {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i32>().ok().map(|n| sign * n)
}

/// Resolves field templates against a catalog.
pub struct FieldResolver<'a> {
    catalog: &'a dyn Catalog,
    mode: RunMode,
}

impl<'a> FieldResolver<'a> {
    pub fn new(catalog: &'a dyn Catalog, mode: RunMode) -> Self {
        Self { catalog, mode }
    }

    /// Resolve `fields` for `scene` using `captures`.
    ///
    /// Lookups always hit the catalog. Creations are skipped in a dry run.
    /// Catalog failures are returned as errors; unresolved values are listed
    /// in [`Resolution::dropped`].
    pub fn resolve(
        &self,
        scene: &SceneId,
        fields: &BTreeMap<String, String>,
        captures: &Captures,
        trace: &mut Trace,
    ) -> Result<Resolution> {
        let mut update = SceneUpdate::new(scene.clone());
        let mut dropped = Vec::new();
        let mut movie_id: Option<EntityId> = None;
        let mut scene_index: Option<(i32, String)> = None;

        for (i, value) in captures.iter().enumerate() {
            trace.push(format!("#{}: {}", i, value));
        }

        let mut drop_field = |field: &str, value: &str, reason| {
            dropped.push(DroppedField {
                field: field.to_string(),
                value: value.to_string(),
                reason,
            })
        };

        for (field, template) in fields {
            let value = captures.substitute(template);

            match field.as_str() {
                "title" => {
                    trace.push(format!("{}: {}", field, value));
                    update.title = Some(value);
                }
                "studio" => {
                    let matcher = NameMatcher::Exact(value.trim().to_string());
                    match self.get_or_create(EntityKind::Studio, field, &matcher, trace)? {
                        Some(id) => {
                            trace.push(format!("{}: {}", field, value));
                            trace.push(format!("studio_id: {}", id));
                            update.studio_id = Some(id);
                        }
                        None => drop_field(field, &value, DropReason::Unresolved),
                    }
                }
                "movie_title" => {
                    let matcher = NameMatcher::Regex(movie_title_pattern(value.trim()));
                    match self.catalog.find_entity(EntityKind::Movie, &matcher)? {
                        Some(id) => {
                            trace.push(format!("{}: {}", field, value));
                            trace.push(format!("movie_id: {}", id));
                            movie_id = Some(id);
                        }
                        None => drop_field(field, &value, DropReason::Unresolved),
                    }
                }
                "scene_index" => match parse_scene_index(&value) {
                    Some(index) => {
                        trace.push(format!("scene_index: {}", index));
                        scene_index = Some((index, value));
                    }
                    None => drop_field(field, &value, DropReason::NotANumber),
                },
                "performers" => {
                    let ids = self.resolve_list(EntityKind::Performer, field, &value, trace)?;
                    if ids.is_empty() {
                        drop_field(field, &value, DropReason::Unresolved);
                        continue;
                    }
                    trace.push(format!("{}: {}", field, value));
                    trace.push(format!("performer_ids: {}", join_ids(&ids)));
                    update.performer_ids = Some(ids);
                }
                "tags" => {
                    let ids = self.resolve_list(EntityKind::Tag, field, &value, trace)?;
                    if ids.is_empty() {
                        drop_field(field, &value, DropReason::Unresolved);
                        continue;
                    }
                    trace.push(format!("{}: {}", field, value));
                    trace.push(format!("tag_ids: {}", join_ids(&ids)));
                    update.tag_ids = Some(ids);
                }
                name if SceneUpdate::is_reserved(name) => {
                    drop_field(field, &value, DropReason::Reserved);
                }
                _ => {
                    trace.push(format!("{}: {}", field, value));
                    update.extra.insert(field.clone(), value);
                }
            }
        }

        // The movie link only exists when a movie resolved
        match movie_id {
            Some(movie_id) => {
                update.movies = Some(vec![MovieRef {
                    movie_id,
                    scene_index: scene_index.map(|(index, _)| index),
                }]);
            }
            None => {
                if let Some((_, value)) = scene_index {
                    drop_field("scene_index", &value, DropReason::NoMovie);
                }
            }
        }

        Ok(Resolution { update, dropped })
    }

    fn resolve_list(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
        trace: &mut Trace,
    ) -> Result<Vec<EntityId>> {
        let mut ids = Vec::new();
        for name in value.split(',') {
            let name = name.trim();
            let matcher = match kind {
                EntityKind::Performer => NameMatcher::ExactOrAlias(name.to_string()),
                _ => NameMatcher::Exact(name.to_string()),
            };
            if let Some(id) = self.get_or_create(kind, field, &matcher, trace)? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Look an entity up and create it when absent.
    ///
    /// Blank names resolve to nothing. In a dry run a missing entity is
    /// reported as `"<field>: <name> would be created"` and resolves to
    /// nothing.
    fn get_or_create(
        &self,
        kind: EntityKind,
        field: &str,
        matcher: &NameMatcher,
        trace: &mut Trace,
    ) -> Result<Option<EntityId>> {
        let name = matcher.value().trim();
        if name.is_empty() {
            return Ok(None);
        }

        if let Some(id) = self.catalog.find_entity(kind, matcher)? {
            return Ok(Some(id));
        }

        if self.mode == RunMode::DryRun {
            trace.push(format!("{}: {} would be created", field, name));
            return Ok(None);
        }

        tracing::info!("Creating {} {}", kind, name);
        self.catalog.create_entity(kind, name).map(Some)
    }
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter().map(EntityId::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_title_pattern() {
        assert_eq!(movie_title_pattern("A Movie Title"), "A[\\W]*Movie[\\W]*Title");
        assert_eq!(movie_title_pattern("Single"), "Single");
        assert_eq!(movie_title_pattern("Vol. 1"), "Vol\\.[\\W]*1");
        assert_eq!(movie_title_pattern("A+ (Cut"), "A\\+[\\W]*\\(Cut");
    }

    #[test]
    fn test_parse_scene_index() {
        assert_eq!(parse_scene_index("3"), Some(3));
        assert_eq!(parse_scene_index("  12abc"), Some(12));
        assert_eq!(parse_scene_index("-2"), Some(-2));
        assert_eq!(parse_scene_index("+7"), Some(7));
        assert_eq!(parse_scene_index("abc"), None);
        assert_eq!(parse_scene_index(""), None);
        assert_eq!(parse_scene_index("-"), None);
    }
}
