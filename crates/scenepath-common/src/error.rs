//! Common error types used throughout scenepath.
//!
//! Configuration problems, pattern faults and catalog rejections all funnel
//! into [`Error`]. A rule that simply does not match is never an error; the
//! selector reports it as `Ok(None)`.

use std::fmt;

/// Common error type for scenepath.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration is unusable (no library roots, invalid rule, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The invocation named a task that does not exist.
    #[error("Unsupported task: {0}")]
    UnsupportedTask(String),

    /// A required invocation parameter is absent.
    #[error("Input is missing {0}")]
    MissingParameter(String),

    /// A pattern could not be built (bad regex, unknown named pattern).
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// A predicate node failed while evaluating a token.
    #[error("Predicate '{name}' failed in rule '{rule}' on '{token}': {message}")]
    Predicate {
        /// Rule being evaluated.
        rule: String,
        /// Registered name of the predicate.
        name: String,
        /// Token the predicate was evaluating.
        token: String,
        /// Message returned by the predicate.
        message: String,
    },

    /// The catalog service failed or answered with an error.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The catalog refused to create an entity.
    #[error("Could not create {kind} {name}")]
    CreateRejected {
        /// Entity kind (studio, performer, tag, movie).
        kind: String,
        /// Name that was submitted.
        name: String,
    },

    /// The catalog did not acknowledge a scene update.
    #[error("Unable to update scene {0}")]
    UpdateRejected(String),

    /// A field rule resolved to nothing at all.
    #[error("No fields to update for scene {0}")]
    NoFieldsToUpdate(String),

    /// The identification scraper did not acknowledge the request.
    #[error("Unable to run scraper {scraper} for scene {scene}")]
    ScrapeRejected {
        /// Scraper identifier.
        scraper: String,
        /// Scene that was submitted.
        scene: String,
    },

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "scene", "tag").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },
}

impl Error {
    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new MissingParameter error.
    pub fn missing<S: Into<String>>(param: S) -> Self {
        Self::MissingParameter(param.into())
    }

    /// Create a new Pattern error.
    pub fn pattern<S: Into<String>>(msg: S) -> Self {
        Self::Pattern(msg.into())
    }

    /// Create a new Catalog error.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new CreateRejected error.
    pub fn create_rejected(kind: impl fmt::Display, name: impl Into<String>) -> Self {
        Self::CreateRejected {
            kind: kind.to_string(),
            name: name.into(),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
