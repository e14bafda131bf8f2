//! Shared test harness for integration tests.
//!
//! Provides [`MemoryCatalog`], an in-memory catalog and scraper that records
//! every mutating call, and [`RecordingReporter`], which keeps every message
//! the engine reports.

#![allow(dead_code)]

use std::cell::RefCell;

use regex::Regex;
use scenepath::catalog::{
    Catalog, EntityKind, IdentifyOptions, NameMatcher, RecordPage, SceneUpdate, Scraper,
};
use scenepath::Reporter;
use scenepath_common::{EntityId, Error, Result, SceneId};

/// A mutating call received by [`MemoryCatalog`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(EntityKind, String),
    Update(SceneUpdate),
    Identify(SceneId, String),
    DestroyTag(EntityId),
    RemoveTags(Vec<SceneId>, Vec<EntityId>),
}

#[derive(Debug, Clone)]
struct Entity {
    kind: EntityKind,
    id: EntityId,
    name: String,
    aliases: Vec<String>,
}

#[derive(Debug, Clone)]
struct Scene {
    id: SceneId,
    paths: Vec<String>,
    tags: Vec<EntityId>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    roots: Vec<String>,
    entities: Vec<Entity>,
    scenes: Vec<Scene>,
    calls: Vec<Call>,
    reject_updates: bool,
    reject_identify: bool,
    lookups: usize,
}

/// In-memory [`Catalog`] and [`Scraper`].
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RefCell<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog reporting `roots` as its library roots.
    pub fn with_roots(roots: &[&str]) -> Self {
        let catalog = Self::new();
        catalog.state.borrow_mut().roots = roots.iter().map(|r| r.to_string()).collect();
        catalog
    }

    fn next_id(state: &mut State) -> EntityId {
        state.next_id += 1;
        EntityId::from(format!("{}", 100 + state.next_id))
    }

    /// Add an entity and return its id.
    pub fn add(&self, kind: EntityKind, name: &str) -> EntityId {
        self.add_with_aliases(kind, name, &[])
    }

    pub fn add_with_aliases(&self, kind: EntityKind, name: &str, aliases: &[&str]) -> EntityId {
        let mut state = self.state.borrow_mut();
        let id = Self::next_id(&mut state);
        state.entities.push(Entity {
            kind,
            id: id.clone(),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        });
        id
    }

    /// Add a scene backed by `paths` and carrying `tags`.
    pub fn add_scene(&self, id: &str, paths: &[&str], tags: &[EntityId]) -> SceneId {
        let id = SceneId::from(id);
        self.state.borrow_mut().scenes.push(Scene {
            id: id.clone(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            tags: tags.to_vec(),
        });
        id
    }

    /// Make every scene update come back unacknowledged.
    pub fn reject_updates(&self) {
        self.state.borrow_mut().reject_updates = true;
    }

    /// Make every identify request come back unacknowledged.
    pub fn reject_identify(&self) {
        self.state.borrow_mut().reject_identify = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn updates(&self) -> Vec<SceneUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<(EntityKind, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(kind, name) => Some((kind, name)),
                _ => None,
            })
            .collect()
    }

    /// Number of lookup queries answered.
    pub fn lookups(&self) -> usize {
        self.state.borrow().lookups
    }

    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.state
            .borrow()
            .entities
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    pub fn scene_tags(&self, id: &str) -> Vec<EntityId> {
        self.state
            .borrow()
            .scenes
            .iter()
            .find(|s| s.id.as_str() == id)
            .map(|s| s.tags.clone())
            .unwrap_or_default()
    }
}

fn matches_name(entity: &Entity, matcher: &NameMatcher) -> bool {
    match matcher {
        NameMatcher::Exact(name) => entity.name == *name,
        NameMatcher::ExactOrAlias(name) => {
            entity.name == *name || entity.aliases.iter().any(|a| a.contains(name.as_str()))
        }
        NameMatcher::Regex(pattern) => Regex::new(pattern)
            .map(|re| re.is_match(&entity.name))
            .unwrap_or(false),
    }
}

impl Catalog for MemoryCatalog {
    fn library_roots(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().roots.clone())
    }

    fn find_entities(&self, kind: EntityKind, matcher: &NameMatcher) -> Result<Vec<EntityId>> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        Ok(state
            .entities
            .iter()
            .filter(|e| e.kind == kind && matches_name(e, matcher))
            .map(|e| e.id.clone())
            .collect())
    }

    fn create_entity(&self, kind: EntityKind, name: &str) -> Result<EntityId> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Create(kind, name.to_string()));
        let id = Self::next_id(&mut state);
        state.entities.push(Entity {
            kind,
            id: id.clone(),
            name: name.to_string(),
            aliases: Vec::new(),
        });
        Ok(id)
    }

    fn update_record(&self, update: &SceneUpdate) -> Result<SceneId> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Update(update.clone()));
        if state.reject_updates {
            return Err(Error::UpdateRejected(update.id.to_string()));
        }
        Ok(update.id.clone())
    }

    fn find_records_by_tags(
        &self,
        tags: &[EntityId],
        page: u32,
        per_page: u32,
    ) -> Result<RecordPage> {
        let state = self.state.borrow();
        let tagged: Vec<SceneId> = state
            .scenes
            .iter()
            .filter(|s| s.tags.iter().any(|t| tags.contains(t)))
            .map(|s| s.id.clone())
            .collect();

        let start = ((page.max(1) - 1) * per_page) as usize;
        let ids = tagged
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok(RecordPage {
            count: tagged.len() as u64,
            ids,
        })
    }

    fn record_paths(&self, scene: &SceneId) -> Result<Vec<String>> {
        self.state
            .borrow()
            .scenes
            .iter()
            .find(|s| s.id == *scene)
            .map(|s| s.paths.clone())
            .ok_or_else(|| Error::not_found("scene", scene))
    }

    fn destroy_tag(&self, tag: &EntityId) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DestroyTag(tag.clone()));
        let before = state.entities.len();
        state
            .entities
            .retain(|e| !(e.kind == EntityKind::Tag && e.id == *tag));
        for scene in &mut state.scenes {
            scene.tags.retain(|t| t != tag);
        }
        Ok(state.entities.len() < before)
    }

    fn remove_tags_from_records(&self, scenes: &[SceneId], tags: &[EntityId]) -> Result<usize> {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(Call::RemoveTags(scenes.to_vec(), tags.to_vec()));
        let mut updated = 0;
        for scene in state.scenes.iter_mut().filter(|s| scenes.contains(&s.id)) {
            scene.tags.retain(|t| !tags.contains(t));
            updated += 1;
        }
        Ok(updated)
    }
}

impl Scraper for MemoryCatalog {
    fn identify(
        &self,
        scene: &SceneId,
        scraper_id: &str,
        _options: &IdentifyOptions,
    ) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(Call::Identify(scene.clone(), scraper_id.to_string()));
        Ok(!state.reject_identify)
    }
}

/// Level of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Debug,
}

/// [`Reporter`] that keeps everything it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: RefCell<Vec<(Level, String)>>,
    progress: RefCell<Vec<f64>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    pub fn progress_updates(&self) -> Vec<f64> {
        self.progress.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.messages
            .borrow_mut()
            .push((Level::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.messages
            .borrow_mut()
            .push((Level::Warn, message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.messages
            .borrow_mut()
            .push((Level::Debug, message.to_string()));
    }

    fn progress(&self, fraction: f64) {
        self.progress.borrow_mut().push(fraction);
    }
}
