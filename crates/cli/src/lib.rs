use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::{AppConfig, BackendMode};
use docqa_chunker::{Chunker, TextChunk};
use docqa_query::{list_models, ExtractiveGenerator, Ingestor, PlainTextExtractor, QueryEngine};
use docqa_vector_store::{vectors_path, VectorIndex};
use indicatif::{ProgressBar, ProgressStyle};
use output::{AskOutput, IngestOutput, ModelsOutput, Render, SearchOutput, StatsOutput};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod backends;
mod config;
mod output;
mod scanner;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your own documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print results as JSON (implies --quiet)
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ./docqa.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector store directory (overrides config and DOCQA_STORE_DIR)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Embedding backend (overrides config and DOCQA_EMBEDDING_MODE)
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<BackendMode>,

    /// Answer generation backend (overrides config and DOCQA_GENERATION_MODE)
    #[arg(long, global = true, value_enum)]
    generation_mode: Option<BackendMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, chunk, embed and store documents
    Ingest(IngestArgs),

    /// Show the stored chunks most similar to a query
    Search(SearchArgs),

    /// Answer a question from the stored documents
    Ask(AskArgs),

    /// Describe the vector store
    Stats,

    /// List chat models offered by the provider
    Models,
}

#[derive(Args)]
struct IngestArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Drop existing chunks before ingesting
    #[arg(long)]
    reset: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results (default: query.top_k)
    #[arg(long, short = 'k')]
    top_k: Option<usize>,
}

#[derive(Args)]
struct AskArgs {
    /// Question to answer
    question: String,

    /// Passages given to the generator (default: query.top_k)
    #[arg(long, short = 'k')]
    top_k: Option<usize>,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.store_dir.take() {
        config.store.dir = dir;
    }
    if let Some(mode) = cli.embed_mode {
        config.provider.embedding_mode = mode;
    }
    if let Some(mode) = cli.generation_mode {
        config.provider.generation_mode = mode;
    }

    match cli.command {
        Commands::Ingest(args) => run_ingest(args, &config, cli.json, cli.quiet).await,
        Commands::Search(args) => run_search(args, &config, cli.json).await,
        Commands::Ask(args) => run_ask(args, config, cli.json).await,
        Commands::Stats => run_stats(&config, cli.json),
        Commands::Models => run_models(&config, cli.json).await,
    }
}

fn emit<T: Serialize + Render>(output: &T, json: bool) -> Result<()> {
    if json {
        print_stdout(&serde_json::to_string_pretty(output)?)
    } else {
        print_stdout(&output.render_text())
    }
}

fn open_index(config: &AppConfig) -> Result<VectorIndex> {
    VectorIndex::open(config.store.dimension, &config.store.dir)
        .with_context(|| format!("Failed to open vector store {}", config.store.dir.display()))
}

fn embed_progress(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30}] {pos}/{len} chunks embedded")
    {
        bar.set_style(style);
    }
    bar
}

async fn run_ingest(args: IngestArgs, config: &AppConfig, json: bool, quiet: bool) -> Result<()> {
    let documents = scanner::collect_documents(&args.paths);
    anyhow::ensure!(!documents.is_empty(), "No documents to ingest");

    let embedder = backends::build_embedder(config)?;
    let chunker = Chunker::new(config.chunker).context("Invalid chunker config")?;
    let mut index = open_index(config)?;
    if args.reset {
        log::info!("Clearing {} existing chunks", index.len());
        index.clear();
    }

    let ingestor = Ingestor::new(
        chunker,
        embedder,
        Arc::new(PlainTextExtractor),
        config.query.clone(),
    );
    let progress = embed_progress(quiet);
    let result = ingestor
        .ingest_paths_with_progress(&documents, &mut index, |done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        })
        .await;
    progress.finish_and_clear();
    let report = result.context("Ingestion failed")?;

    if report.chunks > 0 || args.reset {
        index.save().context("Failed to save vector store")?;
        log::info!("Saved {} chunks to {}", index.len(), config.store.dir.display());
    } else {
        log::warn!("No text extracted; vector store left unchanged");
    }

    let output = IngestOutput {
        documents: report.documents,
        chunks: report.chunks,
        skipped: report
            .skipped
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        total_chunks: index.len(),
        store_dir: config.store.dir.display().to_string(),
    };
    emit(&output, json)
}

async fn run_search(args: SearchArgs, config: &AppConfig, json: bool) -> Result<()> {
    let embedder = backends::build_embedder(config)?;
    let engine = QueryEngine::new(
        embedder,
        Arc::new(ExtractiveGenerator),
        open_index(config)?,
        config.query.clone(),
    )?;
    let k = args.top_k.unwrap_or(config.query.top_k);
    let hits = engine.retrieve(&args.query, k).await?;
    emit(
        &SearchOutput {
            query: args.query,
            hits,
        },
        json,
    )
}

async fn run_ask(args: AskArgs, mut config: AppConfig, json: bool) -> Result<()> {
    anyhow::ensure!(!args.question.trim().is_empty(), "Question must not be empty");
    if let Some(k) = args.top_k {
        config.query.top_k = k;
    }
    let embedder = backends::build_embedder(&config)?;
    let generator = backends::build_generator(&config)?;
    let engine = QueryEngine::new(embedder, generator, open_index(&config)?, config.query)?;
    let answer = engine.ask(&args.question).await;
    emit(
        &AskOutput {
            question: args.question,
            answer,
        },
        json,
    )
}

fn run_stats(config: &AppConfig, json: bool) -> Result<()> {
    // Opening creates the directory; stats must not.
    let index = if config.store.dir.is_dir() {
        open_index(config)?
    } else {
        log::info!("No vector store at {}", config.store.dir.display());
        VectorIndex::in_memory(config.store.dimension)?
    };
    let chunks: Vec<TextChunk> = index
        .payloads()
        .iter()
        .enumerate()
        .map(|(i, payload)| TextChunk::new(i, 0, payload.clone()))
        .collect();
    let stats = Chunker::get_stats(&chunks);
    let output = StatsOutput::new(
        config.store.dir.display().to_string(),
        index.dimension(),
        vectors_path(&config.store.dir).is_file(),
        &stats,
    );
    emit(&output, json)
}

async fn run_models(config: &AppConfig, json: bool) -> Result<()> {
    let provider = &config.provider;
    let api_key = provider.api_key().unwrap_or_default();
    let models = list_models(&provider.base_url, &api_key).await;
    emit(
        &ModelsOutput {
            base_url: provider.base_url.clone(),
            models,
        },
        json,
    )
}
