mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use scenepath::catalog::GraphqlCatalog;
use scenepath::config::{self, Config};
use scenepath::{logging, plugin, Engine, Invocation, RunMode, TaskResult, TracingReporter};
use scenepath_common::paths::tokenize;
use scenepath_common::SceneId;
use scenepath_rules::RuleAction;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Plugin output on stdout must stay pure JSON; logs use the host framing
    let plugin_mode = matches!(cli.command, Commands::Plugin);
    logging::init(cli.verbose, plugin_mode);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Plugin => run_plugin(config_path),
        Commands::RunRules { tag } => {
            let config = config::load_config_or_default(config_path)?;
            let tag = tag.unwrap_or_else(|| config.tags.run.clone());
            with_engine(&config, |engine| engine.run_rules(&tag, RunMode::Live))?;
            Ok(())
        }
        Commands::TestRules { tag } => {
            let config = config::load_config_or_default(config_path)?;
            let tag = tag.unwrap_or_else(|| config.tags.test.clone());
            with_engine(&config, |engine| engine.run_rules(&tag, RunMode::DryRun))?;
            Ok(())
        }
        Commands::Scene { id, dry_run } => run_scene(config_path, &id, dry_run),
        Commands::CreateTags => {
            let config = config::load_config_or_default(config_path)?;
            with_engine(&config, |engine| engine.create_tags(&config.tags.both()))?;
            Ok(())
        }
        Commands::RemoveTags => {
            let config = config::load_config_or_default(config_path)?;
            let removed = with_engine(&config, |engine| engine.remove_tags(&config.tags.both()))?;
            println!("Removed {} tags", removed);
            Ok(())
        }
        Commands::CleanTags => {
            let config = config::load_config_or_default(config_path)?;
            let summary =
                with_engine(&config, |engine| engine.clean_scenes_tags(&config.tags.both()))?;
            println!(
                "Cleaned {} scenes out of {} found",
                summary.cleaned, summary.found
            );
            Ok(())
        }
        Commands::Match { paths, roots } => match_paths(config_path, &paths, roots),
        Commands::Validate { path } => {
            let path = path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("scenepath {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Run `f` with an engine talking to the configured catalog.
fn with_engine<T>(
    config: &Config,
    f: impl FnOnce(&Engine<'_>) -> scenepath_common::Result<T>,
) -> Result<T> {
    let catalog = GraphqlCatalog::from_config(&config.catalog);
    let rules = config.build_rule_set()?;
    let reporter = TracingReporter;

    tracing::debug!("Using catalog at {}", catalog.endpoint());

    let engine = Engine::new(&catalog, &catalog, &reporter, &rules)
        .with_identify(config.identify.clone())
        .with_library_roots(config.library_roots.clone())
        .with_page_size(config.page_size);

    Ok(f(&engine)?)
}

fn run_plugin(config_path: Option<&Path>) -> Result<()> {
    let result = plugin_result(config_path).unwrap_or_else(|e| {
        tracing::error!("{:#}", e);
        TaskResult::error(format!("{:#}", e))
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn plugin_result(config_path: Option<&Path>) -> Result<TaskResult> {
    let input = plugin::read_input(std::io::stdin().lock())?;
    let config = config::load_config_or_default(config_path)?;

    let timeout = Duration::from_secs(config.catalog.timeout_secs);
    let catalog = GraphqlCatalog::from_connection(&input.server_connection, timeout);
    let rules = config.build_rule_set()?;
    let reporter = TracingReporter;

    let engine = Engine::new(&catalog, &catalog, &reporter, &rules)
        .with_identify(config.identify.clone())
        .with_library_roots(config.library_roots.clone())
        .with_page_size(config.page_size);

    Ok(engine.run(&input.args))
}

fn run_scene(config_path: Option<&Path>, id: &str, dry_run: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mode = if dry_run { RunMode::DryRun } else { RunMode::Live };
    let scene = SceneId::from(id);

    let outcome = with_engine(&config, |engine| {
        let ctx = engine.context(mode, Invocation::Batch)?;
        engine.match_scene(&ctx, &scene)
    })?;

    if dry_run {
        println!("{}", outcome.trace());
    }
    if !outcome.is_match() {
        println!("No rule matched scene {}", id);
    }
    Ok(())
}

fn match_paths(config_path: Option<&Path>, paths: &[String], roots: Vec<String>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let rules = config.build_rule_set()?;

    let roots = if roots.is_empty() {
        config.library_roots.clone()
    } else {
        roots
    };
    if roots.is_empty() {
        anyhow::bail!("No library roots: pass --root or set library_roots in the config");
    }

    for path in paths {
        let tokens = tokenize(path, &roots).with_context(|| format!("Failed to tokenize {}", path))?;

        println!("Path: {}", path);
        println!("  Library path: {}", tokens.library_path);
        println!("  Tokens: {:?}", tokens.library);

        match rules.select(&tokens)? {
            Some(matched) => {
                println!("  Matched rule: {}", matched.rule.name);
                for (i, value) in matched.captures.iter().enumerate() {
                    println!("    #{}: {}", i, value);
                }
                match &matched.rule.action {
                    RuleAction::Skip => println!("  Action: skip"),
                    RuleAction::ScrapeWith(scraper) => println!("  Action: scrape with {}", scraper),
                    RuleAction::Fields(fields) => {
                        println!("  Fields:");
                        for (field, template) in fields {
                            println!("    {}: {}", field, matched.captures.substitute(template));
                        }
                    }
                }
            }
            None => println!("  No matching rule"),
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Catalog: {}", config.catalog.url);
            println!("  Run tag: {}", config.tags.run);
            println!("  Test tag: {}", config.tags.test);
            println!("  Library roots: {}", config.library_roots.len());
            println!("  Named patterns: {}", config.patterns.len());
            println!("  Rules: {}", config.rules.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Catalog: {}", config.catalog.url);
        }
    }

    Ok(())
}
