//! [`Catalog`] and [`Scraper`] over the host's GraphQL API.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use scenepath_common::{EntityId, Error, Result, SceneId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Catalog, EntityKind, IdentifyOptions, NameMatcher, RecordPage, SceneUpdate, Scraper};
use crate::config::CatalogConfig;
use crate::plugin::ServerConnection;

const CONFIGURATION: &str = "query Configuration { configuration { general { stashes { path } } } }";

const FIND_STUDIOS: &str = "query FindStudios($filter: StudioFilterType) { \
    findStudios(studio_filter: $filter) { count studios { id } } }";

const FIND_PERFORMERS: &str = "query FindPerformers($filter: PerformerFilterType) { \
    findPerformers(performer_filter: $filter) { count performers { id } } }";

const FIND_TAGS: &str = "query FindTags($filter: TagFilterType) { \
    findTags(tag_filter: $filter) { count tags { id } } }";

const FIND_MOVIES: &str = "query FindMovies($filter: MovieFilterType) { \
    findMovies(movie_filter: $filter) { count movies { id } } }";

const CREATE_STUDIO: &str = "mutation StudioCreate($input: StudioCreateInput!) { \
    studioCreate(input: $input) { id } }";

const CREATE_PERFORMER: &str = "mutation PerformerCreate($input: PerformerCreateInput!) { \
    performerCreate(input: $input) { id } }";

const CREATE_TAG: &str = "mutation TagCreate($input: TagCreateInput!) { \
    tagCreate(input: $input) { id } }";

const UPDATE_SCENE: &str = "mutation SceneUpdate($input: SceneUpdateInput!) { \
    sceneUpdate(input: $input) { id } }";

const FIND_SCENES: &str = "query FindScenes($scene_filter: SceneFilterType, $filter: FindFilterType) { \
    findScenes(scene_filter: $scene_filter, filter: $filter) { count scenes { id } } }";

const FIND_SCENE_FILES: &str = "query FindScene($id: ID) { findScene(id: $id) { files { path } } }";

const DESTROY_TAGS: &str = "mutation TagsDestroy($ids: [ID!]!) { tagsDestroy(ids: $ids) }";

const BULK_UPDATE_SCENES: &str = "mutation BulkSceneUpdate($input: BulkSceneUpdateInput!) { \
    bulkSceneUpdate(input: $input) { id } }";

const IDENTIFY: &str = "mutation Identify($input: IdentifyMetadataInput!) { \
    metadataIdentify(input: $input) }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FindResult {
    count: u64,
    #[serde(
        alias = "studios",
        alias = "performers",
        alias = "tags",
        alias = "movies",
        alias = "scenes"
    )]
    items: Vec<IdNode>,
}

#[derive(Debug, Deserialize)]
struct ConfigurationData {
    configuration: ConfigurationNode,
}

#[derive(Debug, Deserialize)]
struct ConfigurationNode {
    general: GeneralNode,
}

#[derive(Debug, Deserialize)]
struct GeneralNode {
    stashes: Vec<PathNode>,
}

#[derive(Debug, Deserialize)]
struct PathNode {
    path: String,
}

#[derive(Debug, Deserialize)]
struct SceneFilesData {
    #[serde(rename = "findScene")]
    scene: Option<SceneFiles>,
}

#[derive(Debug, Deserialize)]
struct SceneFiles {
    files: Vec<PathNode>,
}

enum Auth {
    None,
    ApiKey(String),
    Cookie(String),
}

/// GraphQL client for the host catalog.
pub struct GraphqlCatalog {
    client: Client,
    endpoint: String,
    auth: Auth,
}

impl GraphqlCatalog {
    /// Create a client for the catalog at `base_url`.
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        let auth = match api_key {
            Some(key) if !key.is_empty() => Auth::ApiKey(key.to_string()),
            _ => Auth::None,
        };

        Self {
            client,
            endpoint: format!("{}/graphql", base_url.trim_end_matches('/')),
            auth,
        }
    }

    /// Create a client from the `[catalog]` configuration section.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            &config.url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a client from the connection details the host passes to plugins.
    pub fn from_connection(connection: &ServerConnection, timeout: Duration) -> Self {
        let mut catalog = Self::new(&connection.base_url(), None, timeout);
        if let Some(cookie) = &connection.session_cookie {
            catalog.auth = Auth::Cookie(format!("{}={}", cookie.name, cookie.value));
        }
        catalog
    }

    /// The GraphQL endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));

        request = match &self.auth {
            Auth::None => request,
            Auth::ApiKey(key) => request.header("ApiKey", key),
            Auth::Cookie(cookie) => request.header("Cookie", cookie),
        };

        let response = request
            .send()
            .map_err(|e| Error::catalog(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::catalog(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::catalog(format!(
                "{} returned {}: {}",
                self.endpoint, status, body
            )));
        }

        decode(&body)
    }
}

/// Decode a GraphQL response body, turning reported errors into [`Error::Catalog`].
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: GraphqlResponse<T> = serde_json::from_str(body)
        .map_err(|e| Error::catalog(format!("invalid response: {}", e)))?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(Error::catalog(messages.join("; ")));
    }

    response
        .data
        .ok_or_else(|| Error::catalog("response carried no data"))
}

/// Take the only top-level field of a response.
fn single<T>(data: HashMap<String, T>) -> Result<T> {
    data.into_values()
        .next()
        .ok_or_else(|| Error::catalog("response carried no data"))
}

fn find_query(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Studio => FIND_STUDIOS,
        EntityKind::Performer => FIND_PERFORMERS,
        EntityKind::Tag => FIND_TAGS,
        EntityKind::Movie => FIND_MOVIES,
    }
}

/// Movies are looked up only, so there is no mutation for them.
fn create_query(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Studio => Some(CREATE_STUDIO),
        EntityKind::Performer => Some(CREATE_PERFORMER),
        EntityKind::Tag => Some(CREATE_TAG),
        EntityKind::Movie => None,
    }
}

fn name_filter(matcher: &NameMatcher) -> Value {
    match matcher {
        NameMatcher::Exact(name) => json!({
            "name": { "value": name.trim(), "modifier": "EQUALS" }
        }),
        NameMatcher::ExactOrAlias(name) => json!({
            "name": { "value": name.trim(), "modifier": "EQUALS" },
            "OR": { "aliases": { "value": name.trim(), "modifier": "INCLUDES" } }
        }),
        NameMatcher::Regex(pattern) => json!({
            "name": { "value": pattern.trim(), "modifier": "MATCHES_REGEX" }
        }),
    }
}

fn identify_input(scene: &SceneId, scraper_id: &str, options: &IdentifyOptions) -> Value {
    let field_options: Vec<Value> = options
        .field_options
        .iter()
        .map(|o| {
            json!({
                "field": o.field,
                "strategy": o.strategy,
                "createMissing": o.create_missing,
            })
        })
        .collect();

    json!({
        "sources": [{ "source": { "scraper_id": scraper_id } }],
        "options": {
            "fieldOptions": field_options,
            "setCoverImage": options.set_cover_image,
            "setOrganized": options.set_organized,
            "includeMalePerformers": options.include_male_performers,
        },
        "sceneIDs": [scene],
    })
}

impl Catalog for GraphqlCatalog {
    fn library_roots(&self) -> Result<Vec<String>> {
        let data: ConfigurationData = self.execute(CONFIGURATION, json!({}))?;
        Ok(data
            .configuration
            .general
            .stashes
            .into_iter()
            .map(|s| s.path)
            .collect())
    }

    fn find_entities(&self, kind: EntityKind, matcher: &NameMatcher) -> Result<Vec<EntityId>> {
        let data: HashMap<String, FindResult> =
            self.execute(find_query(kind), json!({ "filter": name_filter(matcher) }))?;
        let result = single(data)?;
        if result.count == 0 {
            return Ok(Vec::new());
        }
        Ok(result.items.into_iter().map(|n| EntityId::from(n.id)).collect())
    }

    fn create_entity(&self, kind: EntityKind, name: &str) -> Result<EntityId> {
        let query = create_query(kind).ok_or_else(|| Error::create_rejected(kind, name))?;
        let data: HashMap<String, Option<IdNode>> =
            self.execute(query, json!({ "input": { "name": name } }))?;
        single(data)?
            .map(|n| EntityId::from(n.id))
            .ok_or_else(|| Error::create_rejected(kind, name))
    }

    fn update_record(&self, update: &SceneUpdate) -> Result<SceneId> {
        let data: HashMap<String, Option<IdNode>> =
            self.execute(UPDATE_SCENE, json!({ "input": update }))?;
        single(data)?
            .map(|n| SceneId::from(n.id))
            .ok_or_else(|| Error::UpdateRejected(update.id.to_string()))
    }

    fn find_records_by_tags(
        &self,
        tags: &[EntityId],
        page: u32,
        per_page: u32,
    ) -> Result<RecordPage> {
        let variables = json!({
            "scene_filter": { "tags": { "value": tags, "modifier": "INCLUDES" } },
            "filter": { "page": page, "per_page": per_page },
        });
        let data: HashMap<String, FindResult> = self.execute(FIND_SCENES, variables)?;
        let result = single(data)?;
        Ok(RecordPage {
            count: result.count,
            ids: result.items.into_iter().map(|n| SceneId::from(n.id)).collect(),
        })
    }

    fn record_paths(&self, scene: &SceneId) -> Result<Vec<String>> {
        let data: SceneFilesData = self.execute(FIND_SCENE_FILES, json!({ "id": scene }))?;
        let files = data.scene.ok_or_else(|| Error::not_found("scene", scene))?;
        Ok(files.files.into_iter().map(|f| f.path).collect())
    }

    fn destroy_tag(&self, tag: &EntityId) -> Result<bool> {
        let data: HashMap<String, Option<bool>> =
            self.execute(DESTROY_TAGS, json!({ "ids": [tag] }))?;
        Ok(single(data)?.unwrap_or(false))
    }

    fn remove_tags_from_records(&self, scenes: &[SceneId], tags: &[EntityId]) -> Result<usize> {
        let variables = json!({
            "input": { "ids": scenes, "tag_ids": { "ids": tags, "mode": "REMOVE" } }
        });
        let data: HashMap<String, Option<Vec<IdNode>>> =
            self.execute(BULK_UPDATE_SCENES, variables)?;
        Ok(single(data)?.map(|updated| updated.len()).unwrap_or(0))
    }
}

impl Scraper for GraphqlCatalog {
    fn identify(
        &self,
        scene: &SceneId,
        scraper_id: &str,
        options: &IdentifyOptions,
    ) -> Result<bool> {
        let data: HashMap<String, Option<Value>> = self.execute(
            IDENTIFY,
            json!({ "input": identify_input(scene, scraper_id, options) }),
        )?;
        Ok(matches!(single(data)?, Some(v) if !v.is_null()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        let catalog = GraphqlCatalog::new("http://localhost:9999/", None, Duration::from_secs(1));
        assert_eq!(catalog.endpoint(), "http://localhost:9999/graphql");
    }

    #[test]
    fn test_decode_data() {
        let body = r#"{"data":{"findTags":{"count":1,"tags":[{"id":"7"}]}}}"#;
        let data: HashMap<String, FindResult> = decode(body).unwrap();
        let result = single(data).unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.items[0].id, "7");
    }

    #[test]
    fn test_decode_errors() {
        let body = r#"{"data":null,"errors":[{"message":"first"},{"message":"second"}]}"#;
        let err = decode::<HashMap<String, FindResult>>(body).unwrap_err();
        assert_eq!(err.to_string(), "Catalog error: first; second");
    }

    #[test]
    fn test_decode_rejected_create() {
        let body = r#"{"data":{"studioCreate":null}}"#;
        let data: HashMap<String, Option<IdNode>> = decode(body).unwrap();
        assert!(single(data).unwrap().is_none());
    }

    #[test]
    fn test_movies_have_no_create_mutation() {
        assert!(create_query(EntityKind::Movie).is_none());
        assert!(create_query(EntityKind::Studio).unwrap().contains("studioCreate"));
        assert!(create_query(EntityKind::Tag).unwrap().contains("tagCreate"));
    }

    #[test]
    fn test_create_movie_is_rejected_without_request() {
        let catalog = GraphqlCatalog::new("http://127.0.0.1:9", None, Duration::from_millis(50));
        let err = catalog.create_entity(EntityKind::Movie, "Title One").unwrap_err();
        assert!(matches!(err, Error::CreateRejected { .. }));
    }

    #[test]
    fn test_decode_scene_files() {
        let body = r#"{"data":{"findScene":{"files":[{"path":"/lib/a.mp4"},{"path":"/lib/b.mp4"}]}}}"#;
        let data: SceneFilesData = decode(body).unwrap();
        let paths: Vec<String> = data.scene.unwrap().files.into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["/lib/a.mp4", "/lib/b.mp4"]);

        let missing: SceneFilesData = decode(r#"{"data":{"findScene":null}}"#).unwrap();
        assert!(missing.scene.is_none());
    }

    #[test]
    fn test_performer_filter_includes_aliases() {
        let filter = name_filter(&NameMatcher::ExactOrAlias(" Alice ".into()));
        assert_eq!(filter["name"]["value"], "Alice");
        assert_eq!(filter["name"]["modifier"], "EQUALS");
        assert_eq!(filter["OR"]["aliases"]["modifier"], "INCLUDES");
    }

    #[test]
    fn test_movie_filter_is_regex() {
        let filter = name_filter(&NameMatcher::Regex("Title[\\W]*One".into()));
        assert_eq!(filter["name"]["modifier"], "MATCHES_REGEX");
        assert_eq!(filter["name"]["value"], "Title[\\W]*One");
    }

    #[test]
    fn test_identify_input() {
        let input = identify_input(&SceneId::from("12"), "builtin", &IdentifyOptions::default());
        assert_eq!(input["sources"][0]["source"]["scraper_id"], "builtin");
        assert_eq!(input["sceneIDs"][0], "12");
        assert_eq!(input["options"]["setCoverImage"], true);
        assert_eq!(input["options"]["fieldOptions"][0]["field"], "title");
        assert_eq!(input["options"]["fieldOptions"][0]["strategy"], "OVERWRITE");
        assert!(input["options"]["fieldOptions"][0]["createMissing"].is_null());
        assert_eq!(input["options"]["fieldOptions"][1]["createMissing"], true);
    }
}
