//! Task selection and the engine that runs tasks.
//!
//! A task comes either from an explicit `task` argument or from the type of
//! the catalog hook that fired. Errors never escape [`Engine::run`]; they
//! are turned into a [`TaskResult`] instead.

mod batch;
mod tags;

pub use batch::{BatchSummary, SceneOutcome};
pub use tags::CleanSummary;

use scenepath_common::{Error, Result, SceneId};
use scenepath_rules::RuleSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Catalog, IdentifyOptions, Scraper};
use crate::context::{Invocation, RunContext, RunMode};
use crate::dispatch::Dispatcher;
use crate::report::Reporter;

/// Hook type fired after a scene is created.
pub const SCENE_CREATED: &str = "Scene.Create.Post";
/// Hook type fired after an image is created.
pub const IMAGE_CREATED: &str = "Image.Create.Post";

/// Default number of scenes fetched per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Catalog hook that triggered the invocation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HookContext {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<Value>,
}

/// Named arguments of a plugin invocation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArgs {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub run_tag: Option<String>,
    #[serde(default)]
    pub test_tag: Option<String>,
    #[serde(default)]
    pub hook_context: Option<HookContext>,
}

impl TaskArgs {
    fn require(value: &Option<String>, name: &str) -> Result<String> {
        value.clone().ok_or_else(|| Error::missing(name))
    }

    fn tag_pair(&self) -> Result<Vec<String>> {
        Ok(vec![
            Self::require(&self.run_tag, "runTag")?,
            Self::require(&self.test_tag, "testTag")?,
        ])
    }

    fn hook_id(&self) -> Result<SceneId> {
        let id = self.hook_context.as_ref().and_then(|h| h.id.as_ref());
        match id {
            Some(Value::String(s)) if !s.is_empty() => Ok(SceneId::from(s.as_str())),
            Some(Value::Number(n)) => Ok(SceneId::from(n.to_string())),
            _ => Err(Error::missing("id")),
        }
    }
}

/// A unit of work the engine can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    CreateTags { tags: Vec<String> },
    RemoveTags { tags: Vec<String> },
    CleanScenesTags { tags: Vec<String> },
    RunRules { tag: String },
    TestRules { tag: String },
    Scene { id: SceneId },
    Image { id: SceneId },
}

impl Task {
    /// Select the task described by `args`.
    pub fn from_args(args: &TaskArgs) -> Result<Self> {
        let name = match (&args.task, &args.hook_context) {
            (Some(task), _) => task.as_str(),
            (None, Some(hook)) => match hook.kind.as_str() {
                SCENE_CREATED => "scene",
                IMAGE_CREATED => "image",
                other => return Err(Error::UnsupportedTask(other.to_string())),
            },
            (None, None) => return Err(Error::UnsupportedTask("none given".to_string())),
        };

        match name {
            "createTags" => Ok(Task::CreateTags {
                tags: args.tag_pair()?,
            }),
            "removeTags" => Ok(Task::RemoveTags {
                tags: args.tag_pair()?,
            }),
            "cleanScenesTags" => Ok(Task::CleanScenesTags {
                tags: args.tag_pair()?,
            }),
            "runRules" => Ok(Task::RunRules {
                tag: TaskArgs::require(&args.run_tag, "runTag")?,
            }),
            "testRules" => Ok(Task::TestRules {
                tag: TaskArgs::require(&args.test_tag, "testTag")?,
            }),
            "scene" => Ok(Task::Scene { id: args.hook_id()? }),
            "image" => Ok(Task::Image { id: args.hook_id()? }),
            other => Err(Error::UnsupportedTask(other.to_string())),
        }
    }
}

/// Answer returned to the plugin host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn ok() -> Self {
        Self {
            output: "ok".to_string(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: "error".to_string(),
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs tasks against a catalog with a fixed rule set.
pub struct Engine<'a> {
    catalog: &'a dyn Catalog,
    scraper: &'a dyn Scraper,
    reporter: &'a dyn Reporter,
    rules: &'a RuleSet,
    identify: IdentifyOptions,
    library_roots: Vec<String>,
    page_size: u32,
}

impl<'a> Engine<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        scraper: &'a dyn Scraper,
        reporter: &'a dyn Reporter,
        rules: &'a RuleSet,
    ) -> Self {
        Self {
            catalog,
            scraper,
            reporter,
            rules,
            identify: IdentifyOptions::default(),
            library_roots: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Use these merge settings for scraper calls.
    pub fn with_identify(mut self, identify: IdentifyOptions) -> Self {
        self.identify = identify;
        self
    }

    /// Use these library roots instead of asking the catalog.
    pub fn with_library_roots(mut self, roots: Vec<String>) -> Self {
        self.library_roots = roots;
        self
    }

    /// Number of scenes fetched per page. Zero keeps the default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        if page_size > 0 {
            self.page_size = page_size;
        }
        self
    }

    /// Build the context for a run.
    pub fn context(&self, mode: RunMode, invocation: Invocation) -> Result<RunContext> {
        RunContext::resolve(&self.library_roots, self.catalog, mode, invocation)
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(self.catalog, self.scraper, self.reporter, &self.identify)
    }

    /// Run a task.
    pub fn execute(&self, task: &Task) -> Result<()> {
        tracing::debug!(?task, "executing task");

        match task {
            Task::CreateTags { tags } => self.create_tags(tags).map(|_| ()),
            Task::RemoveTags { tags } => self.remove_tags(tags).map(|_| ()),
            Task::CleanScenesTags { tags } => self.clean_scenes_tags(tags).map(|_| ()),
            Task::RunRules { tag } => self.run_rules(tag, RunMode::Live).map(|_| ()),
            Task::TestRules { tag } => self.run_rules(tag, RunMode::DryRun).map(|_| ()),
            Task::Scene { id } => {
                let ctx = self.context(RunMode::Live, Invocation::Hook)?;
                self.match_scene(&ctx, id).map(|_| ())
            }
            Task::Image { id } => {
                self.context(RunMode::Live, Invocation::Hook)?;
                tracing::debug!(image = %id, "image hook has nothing to do");
                Ok(())
            }
        }
    }

    /// Select and run the task described by `args`, reporting any failure
    /// in the returned [`TaskResult`].
    pub fn run(&self, args: &TaskArgs) -> TaskResult {
        match Task::from_args(args).and_then(|task| self.execute(&task)) {
            Ok(()) => TaskResult::ok(),
            Err(e) => {
                tracing::error!("Task failed: {}", e);
                TaskResult::error(e.to_string())
            }
        }
    }
}
