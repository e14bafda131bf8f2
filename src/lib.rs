//! Scenepath - path-based metadata rules for media catalogs
//!
//! Scene files are matched against an ordered list of positional rules. The
//! first matching rule either skips the scene, hands it to an identification
//! scraper, or resolves its field templates into a catalog update.
//!
//! The pattern language lives in `scenepath-rules`; this crate holds the
//! catalog client, field resolution, action dispatch and the task layer.

pub mod catalog;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod logging;
pub mod plugin;
pub mod report;
pub mod resolver;
pub mod tasks;

pub use context::{Invocation, RunContext, RunMode, Trace};
pub use dispatch::{ActionOutcome, Dispatcher};
pub use report::{Reporter, TracingReporter};
pub use resolver::{DropReason, DroppedField, FieldResolver, Resolution};
pub use tasks::{Engine, Task, TaskArgs, TaskResult};
