use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sitedb_core::config::{Config, Settings};
use sitedb_core::traits::{Embedder, Generator};
use sitedb_core::types::{CollectionKind, ScoredResult};
use sitedb_embed::get_default_embedder;
use sitedb_generate::OpenAiGenerator;
use sitedb_hybrid::{Agent, Outcome, RetrievalEngine, SearchScope};

mod sanitize;

use sanitize::sanitize;

const USAGE: &str = "Usage:
  sitedb rebuild
  sitedb search <query> [--type projects|awards|all] [--limit N] [--json]
  sitedb ask <projects|awards> <query> [--json]";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn load_embedder(settings: &Settings) -> Option<Arc<dyn Embedder>> {
    match get_default_embedder(&settings.embedding) {
        Ok(embedder) => Some(Arc::from(embedder)),
        Err(e) => {
            warn!(error = %e, "embedding model unavailable; vector search disabled");
            None
        }
    }
}

struct Flags {
    positional: Vec<String>,
    scope: SearchScope,
    limit: Option<usize>,
    json: bool,
}

fn parse_flags(args: &[String]) -> Result<Flags> {
    let mut flags = Flags { positional: Vec::new(), scope: SearchScope::All, limit: None, json: false };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--type" | "-t" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--type requires a value"))?;
                flags.scope = value.parse()?;
                i += 1;
            }
            "--limit" | "-n" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--limit requires a number"))?;
                flags.limit = Some(value.parse().map_err(|_| anyhow!("--limit requires a number, got '{value}'"))?);
                i += 1;
            }
            "--json" => flags.json = true,
            other if other.starts_with("--") => bail!("unknown flag {other}"),
            other => flags.positional.push(other.to_string()),
        }
        i += 1;
    }
    Ok(flags)
}

fn print_results(label: &str, results: &[ScoredResult]) {
    println!("\n{label} ({}):", results.len());
    for r in results {
        let detail = r.document.location.as_deref().or(r.document.organization.as_deref()).unwrap_or("");
        println!("  {:>2}. {} [{:.3}] {}", r.rank, r.document.title, r.score, detail);
    }
}

fn rebuild(mut settings: Settings) -> Result<()> {
    let pb = spinner("Loading embedding model");
    let embedder = load_embedder(&settings).ok_or_else(|| anyhow!("cannot rebuild embeddings without an embedding model"))?;
    pb.set_message("Generating embeddings");
    settings.data.use_cached_embeddings = false;
    let engine = RetrievalEngine::from_settings(&settings, Some(embedder));
    pb.finish_and_clear();
    if engine.state().snapshot.is_degraded() { bail!("embedding generation failed; see log"); }
    println!(
        "Rebuilt embeddings for {} projects and {} awards -> {}",
        engine.project_count(),
        engine.award_count(),
        settings.data.embeddings_path().display()
    );
    Ok(())
}

fn search(settings: &Settings, args: &[String]) -> Result<()> {
    let flags = parse_flags(args)?;
    if flags.positional.is_empty() { bail!("search needs a query\n{USAGE}"); }
    let cleaned = sanitize(&flags.positional.join(" "));
    if cleaned.is_injection { bail!("query rejected: it looks like an attempt to change the assistant's instructions"); }

    let pb = spinner("Loading search engine");
    let engine = RetrievalEngine::from_settings(settings, load_embedder(settings));
    pb.finish_and_clear();
    let response = engine.search_all(&cleaned.query, flags.scope, flags.limit.unwrap_or(settings.retrieval.result_limit))?;
    if flags.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    println!("Query: {}", response.query);
    if let Some(projects) = &response.projects { print_results("Projects", projects); }
    if let Some(awards) = &response.awards { print_results("Awards", awards); }
    println!("\nSearch took {:.3}s", response.execution_time);
    Ok(())
}

fn ask(settings: &Settings, args: &[String]) -> Result<()> {
    let flags = parse_flags(args)?;
    let Some((kind, words)) = flags.positional.split_first() else { bail!("ask needs a collection and a query\n{USAGE}") };
    let kind: CollectionKind = kind.parse()?;
    if words.is_empty() { bail!("ask needs a query\n{USAGE}"); }
    let cleaned = sanitize(&words.join(" "));
    if cleaned.is_injection {
        println!(
            "I can only provide information about {} {}. Please rephrase your query.",
            settings.generation.company, kind
        );
        return Ok(());
    }

    let generator: Arc<dyn Generator> = Arc::new(OpenAiGenerator::from_settings(&settings.generation)?);
    let pb = spinner("Loading search engine");
    let engine = Arc::new(RetrievalEngine::from_settings(settings, load_embedder(settings)));
    pb.set_message("Thinking");
    let agent = Agent::new(kind, engine, generator, settings);
    let response = tokio::runtime::Runtime::new()?.block_on(agent.run(&cleaned.query));
    pb.finish_and_clear();

    if flags.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.response);
        if let Outcome::Failed { reason } = &response.outcome { eprintln!("\n(failed: {reason})"); }
        println!("\n[{} records, {:.2}s]", response.records.len(), response.execution_time);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((cmd, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    match cmd.as_str() {
        "rebuild" => rebuild(settings),
        "search" => search(&settings, rest),
        "ask" => ask(&settings, rest),
        "-h" | "--help" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}\n{USAGE}");
            std::process::exit(1);
        }
    }
}
