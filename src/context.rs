//! Per-run settings threaded through matching and dispatch.

use std::fmt;

use scenepath_common::paths::{tokenize, PathTokens};
use scenepath_common::{Error, Result};

use crate::catalog::Catalog;

/// Whether actions touch the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Perform lookups and mutations.
    #[default]
    Live,
    /// Perform lookups only and record what would have happened.
    DryRun,
}

/// What triggered the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Invocation {
    /// A tagged batch or a direct command.
    #[default]
    Batch,
    /// A catalog event hook for a single record.
    Hook,
}

/// Read-only settings for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    library_roots: Vec<String>,
    mode: RunMode,
    invocation: Invocation,
}

impl RunContext {
    /// Create a context. Fails when no library roots are known.
    pub fn new(library_roots: Vec<String>, mode: RunMode, invocation: Invocation) -> Result<Self> {
        if library_roots.is_empty() {
            return Err(Error::config("Unable to get library paths"));
        }
        Ok(Self {
            library_roots,
            mode,
            invocation,
        })
    }

    /// Create a context using `configured` roots, or the catalog's own
    /// library roots when none are configured.
    pub fn resolve(
        configured: &[String],
        catalog: &dyn Catalog,
        mode: RunMode,
        invocation: Invocation,
    ) -> Result<Self> {
        let roots = if configured.is_empty() {
            catalog.library_roots()?
        } else {
            configured.to_vec()
        };
        Self::new(roots, mode, invocation)
    }

    pub fn library_roots(&self) -> &[String] {
        &self.library_roots
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn invocation(&self) -> Invocation {
        self.invocation
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::DryRun
    }

    /// Tokenize a file path against this run's library roots.
    pub fn tokenize(&self, path: &str) -> Result<PathTokens> {
        tokenize(path, &self.library_roots)
    }
}

/// Ordered, human-readable account of what happened to one record.
///
/// Dry runs surface it through the reporter instead of mutating anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    lines: Vec<String>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line equals `line`.
    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    /// All lines joined with newlines.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
