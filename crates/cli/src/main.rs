//! FAQ index command-line entry point
//!
//! Builds the index artifact from a corpus file and runs ad-hoc queries
//! against it. Logs go to stderr; results go to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_faq_config::{load_settings, Settings};
use voice_faq_core::Language;
use voice_faq_rag::{
    create_embedder, load_corpus, FaqContextEnricher, FaqRetrievalEngine, IndexArtifact,
    IndexBuilder, IndexPaths,
};

#[derive(Parser, Debug)]
#[command(name = "faq-index", version, about = "Bilingual FAQ index builder and search")]
struct Cli {
    /// Configuration overlay: loads `config/<name>` over `config/default`
    #[arg(long, global = true, env = "VOICE_FAQ_ENV")]
    config_env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed a corpus and write the index artifact
    Build {
        /// JSON or YAML corpus file
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Output directory (defaults to `index.dir`)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print ranked matches as JSON
    Search {
        query: String,

        /// Restrict to one language (`en` or `hi`)
        #[arg(long, short)]
        language: Option<String>,

        #[arg(long, short = 'k')]
        top_k: Option<usize>,

        /// Index directory (defaults to `index.dir`)
        #[arg(long)]
        index: Option<PathBuf>,
    },

    /// Print the text injected into the chat context for a user turn
    Context {
        query: String,

        /// Language filter; detected from the query's script when omitted
        #[arg(long, short)]
        language: Option<String>,

        #[arg(long, short = 'k')]
        top_k: Option<usize>,

        #[arg(long)]
        index: Option<PathBuf>,
    },

    /// Summarise an existing index without loading an embedder
    Inspect {
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config_env.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration (env: {})",
            cli.config_env.as_deref().unwrap_or("default")
        )
    })?;

    init_tracing(&settings);

    tracing::debug!(
        environment = ?settings.environment,
        config_env = cli.config_env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    match cli.command {
        Command::Build { corpus, output } => build(&settings, corpus, output).await,
        Command::Search {
            query,
            language,
            top_k,
            index,
        } => search(&settings, &query, language, top_k, index).await,
        Command::Context {
            query,
            language,
            top_k,
            index,
        } => context(&settings, &query, language, top_k, index).await,
        Command::Inspect { index } => inspect(&settings, index),
    }
}

/// Initialize tracing (stderr, plain or JSON)
fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("voice_faq={},faq_index={}", level, level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}

async fn build(settings: &Settings, corpus: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let corpus_path = corpus.unwrap_or_else(|| PathBuf::from(&settings.index.corpus_path));
    let paths = IndexPaths::from_config(&settings.index, output.as_deref());

    let entries = load_corpus(&corpus_path)
        .with_context(|| format!("Failed to load corpus {}", corpus_path.display()))?;
    let embedder = create_embedder(&settings.embedding)?;

    let report = IndexBuilder::new(embedder.as_ref())
        .build(&entries, &paths)
        .await
        .context("Index build failed")?;

    println!(
        "Indexed {} FAQs as {} records ({}, dim {})",
        report.entries, report.records, report.provider, report.dimension
    );
    println!("  vectors:  {}", report.vectors_path.display());
    println!("  metadata: {}", report.metadata_path.display());
    Ok(())
}

fn load_engine(settings: &Settings, index: Option<&Path>) -> Result<FaqRetrievalEngine> {
    let paths = IndexPaths::from_config(&settings.index, index);
    let embedder = create_embedder(&settings.embedding)?;
    FaqRetrievalEngine::load(&paths, embedder, settings.retrieval.clone())
        .with_context(|| format!("Failed to load index from {}", paths.dir.display()))
}

async fn search(
    settings: &Settings,
    query: &str,
    language: Option<String>,
    top_k: Option<usize>,
    index: Option<PathBuf>,
) -> Result<()> {
    let engine = load_engine(settings, index.as_deref())?;
    let top_k = top_k.unwrap_or_else(|| engine.default_top_k());

    let matches = engine.search(query, language.as_deref(), top_k).await?;
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

async fn context(
    settings: &Settings,
    query: &str,
    language: Option<String>,
    top_k: Option<usize>,
    index: Option<PathBuf>,
) -> Result<()> {
    let engine = load_engine(settings, index.as_deref())?;
    let top_k = top_k.unwrap_or_else(|| engine.default_top_k());

    match language {
        Some(language) => {
            let text = engine
                .get_context_for_llm(query, Some(&language), top_k)
                .await?;
            println!("{}", text);
        },
        None => {
            let enricher = FaqContextEnricher::new(Arc::new(engine), top_k);
            let outcome = enricher.context_for_turn(query).await;
            tracing::info!(language = %outcome.language(), "Detected query language");
            println!("{}", outcome.prompt_note());
        },
    }
    Ok(())
}

fn inspect(settings: &Settings, index: Option<PathBuf>) -> Result<()> {
    let paths = IndexPaths::from_config(&settings.index, index.as_deref());
    let artifact = IndexArtifact::read(&paths)
        .with_context(|| format!("Failed to read index from {}", paths.dir.display()))?;

    println!("index:     {}", paths.dir.display());
    println!("provider:  {}", artifact.provider);
    println!("dimension: {}", artifact.dimension);
    println!("records:   {}", artifact.len());
    for language in Language::ALL {
        let count = artifact
            .records
            .iter()
            .filter(|r| r.language == language)
            .count();
        println!("  {} ({}): {}", language.code(), language.name(), count);
    }
    Ok(())
}
