use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenepath")]
#[command(author, version, about = "Path-based metadata rules for media catalogs")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as a catalog plugin: read the invocation from stdin, answer on stdout
    Plugin,

    /// Apply rules to every scene carrying the run tag
    RunRules {
        /// Tag selecting the scenes (defaults to the configured run tag)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Preview rules on every scene carrying the test tag
    TestRules {
        /// Tag selecting the scenes (defaults to the configured test tag)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Apply rules to a single scene
    Scene {
        /// Scene id
        id: String,

        /// Show what would be done without executing
        #[arg(long)]
        dry_run: bool,
    },

    /// Create the run and test tags
    CreateTags,

    /// Delete the run and test tags
    RemoveTags,

    /// Remove the run and test tags from every scene
    CleanTags,

    /// Match paths against the rules without contacting the catalog
    Match {
        /// File paths to match
        #[arg(required = true)]
        paths: Vec<String>,

        /// Library root (repeatable; defaults to the configured roots)
        #[arg(short, long = "root")]
        roots: Vec<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        path: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
