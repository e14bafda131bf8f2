//! Interface to the host media catalog.
//!
//! The engine never talks to the catalog service directly; everything goes
//! through the [`Catalog`] and [`Scraper`] traits. [`GraphqlCatalog`] is the
//! production implementation.

pub mod graphql;
pub mod identify;

pub use graphql::GraphqlCatalog;
pub use identify::{FieldOption, IdentifyOptions, MergeStrategy};

use std::collections::BTreeMap;
use std::fmt;

use scenepath_common::{EntityId, Result, SceneId};
use serde::Serialize;

/// Kinds of named entities a scene can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Studio,
    Performer,
    Tag,
    Movie,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Studio => "studio",
            EntityKind::Performer => "performer",
            EntityKind::Tag => "tag",
            EntityKind::Movie => "movie",
        };
        f.write_str(name)
    }
}

/// How an entity name is compared when looking it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatcher {
    /// Case-sensitive equality with the trimmed name.
    Exact(String),
    /// Equality with the name, or inclusion among the entity's aliases.
    ExactOrAlias(String),
    /// The name matches a regular expression.
    Regex(String),
}

impl NameMatcher {
    /// The value being matched.
    pub fn value(&self) -> &str {
        match self {
            NameMatcher::Exact(v) | NameMatcher::ExactOrAlias(v) | NameMatcher::Regex(v) => v,
        }
    }
}

/// Link between a scene and a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRef {
    pub movie_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_index: Option<i32>,
}

/// Partial update of a scene record. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneUpdate {
    pub id: SceneId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer_ids: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<Vec<MovieRef>>,
    /// Any other field, passed through verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SceneUpdate {
    /// Keys the typed fields serialize under. `extra` never carries these.
    pub const RESERVED_FIELDS: &'static [&'static str] =
        &["id", "title", "studio_id", "performer_ids", "tag_ids", "movies"];

    /// Whether `name` collides with a typed field.
    pub fn is_reserved(name: &str) -> bool {
        Self::RESERVED_FIELDS.contains(&name)
    }

    /// An update for `id` that changes nothing yet.
    pub fn new(id: SceneId) -> Self {
        Self {
            id,
            title: None,
            studio_id: None,
            performer_ids: None,
            tag_ids: None,
            movies: None,
            extra: BTreeMap::new(),
        }
    }

    /// Whether at least one field would be written.
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.studio_id.is_some()
            || self.performer_ids.is_some()
            || self.tag_ids.is_some()
            || self.movies.is_some()
            || !self.extra.is_empty()
    }
}

/// One page of scene ids plus the total number of matching scenes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPage {
    pub count: u64,
    pub ids: Vec<SceneId>,
}

/// Query and mutation operations of the host catalog.
///
/// Calls block until the catalog answers. A rejected mutation is an error.
pub trait Catalog {
    /// Library root directories configured in the catalog.
    fn library_roots(&self) -> Result<Vec<String>>;

    /// Ids of entities of `kind` matching `matcher`, best match first.
    fn find_entities(&self, kind: EntityKind, matcher: &NameMatcher) -> Result<Vec<EntityId>>;

    /// Create an entity and return its id.
    fn create_entity(&self, kind: EntityKind, name: &str) -> Result<EntityId>;

    /// Apply an update and return the acknowledged scene id.
    fn update_record(&self, update: &SceneUpdate) -> Result<SceneId>;

    /// Scenes carrying any of `tags`. Pages start at 1.
    fn find_records_by_tags(&self, tags: &[EntityId], page: u32, per_page: u32)
        -> Result<RecordPage>;

    /// Paths of the files backing a scene.
    fn record_paths(&self, scene: &SceneId) -> Result<Vec<String>>;

    /// Delete a tag. Returns whether the catalog acknowledged it.
    fn destroy_tag(&self, tag: &EntityId) -> Result<bool>;

    /// Remove `tags` from every scene in `scenes`; returns how many scenes
    /// were updated.
    fn remove_tags_from_records(&self, scenes: &[SceneId], tags: &[EntityId]) -> Result<usize>;

    /// First entity matching `matcher`, if any.
    fn find_entity(&self, kind: EntityKind, matcher: &NameMatcher) -> Result<Option<EntityId>> {
        Ok(self.find_entities(kind, matcher)?.into_iter().next())
    }

    /// Tag with exactly this (trimmed) name.
    fn find_tag(&self, name: &str) -> Result<Option<EntityId>> {
        self.find_entity(EntityKind::Tag, &NameMatcher::Exact(name.trim().to_string()))
    }
}

/// External identification scraper.
pub trait Scraper {
    /// Ask `scraper_id` to identify a scene. Returns whether the request was
    /// acknowledged.
    fn identify(&self, scene: &SceneId, scraper_id: &str, options: &IdentifyOptions)
        -> Result<bool>;
}
