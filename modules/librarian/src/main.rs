use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::{Claude, OpenAi};
use librarian::bookmarks::{read_bookmarks, BookmarkFormat};
use librarian::chat::Librarian;
use librarian::embedder::{Embedder, TextEmbedder};
use librarian::fetcher::HttpFetcher;
use librarian::pipeline::{IngestStatus, Ingestor};
use librarian::search_tool::KnowledgeGraphTool;
use librarian::stats::RunStats;
use librarian::traits::LanguageModel;
use librarian_common::{Config, LlmProvider, Outcome};
use librarian_graph::migrate::migrate;
use librarian_graph::{GraphClient, GraphReader, GraphWriter};

#[derive(Parser)]
#[command(name = "librarian", about = "Bookmark knowledge graph librarian")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create graph constraints and the page embedding index
    Migrate,
    /// Fetch, summarize and store a single page
    IngestUrl {
        url: String,
        /// Title to store instead of the page's <title>
        #[arg(long)]
        title: Option<String>,
    },
    /// Ingest every bookmark in an exported list
    IngestFile {
        path: PathBuf,
        /// html, text, markdown or json (guessed from the extension if omitted)
        #[arg(long)]
        format: Option<BookmarkFormat>,
    },
    /// Print raw knowledge graph search results
    Search { query: String },
    /// Answer a question from the knowledge graph
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(&config)?;

    info!("Librarian starting...");
    config.log_redacted();

    // Connect to Neo4j
    let client = GraphClient::from_config(&config).await?;

    tokio::select! {
        result = run(cli.command, &config, client) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(format!(
            "librarian={level},librarian_graph={level},ai_client={level}",
            level = config.log_level
        )),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

async fn run(command: Command, config: &Config, client: GraphClient) -> Result<()> {
    match command {
        Command::Migrate => {
            migrate(&client, config.embedding_dimensions).await?;
            info!("Migrations complete");
        }
        Command::IngestUrl { url, title } => {
            let ingestor = build_ingestor(config, &client)?;
            let report = ingestor.ingest_url(&url, title.as_deref()).await;

            let mut stats = RunStats::new();
            stats.record(&report);
            info!("{stats}");

            if let IngestStatus::Skipped { stage, reason } = report.status {
                println!("Not stored ({stage}): {reason}");
            } else {
                println!(
                    "Stored {url} with {} categories and {} keywords",
                    report.categories_written,
                    report.keywords.len()
                );
            }
        }
        Command::IngestFile { path, format } => {
            let format = match format {
                Some(f) => f,
                None => BookmarkFormat::from_path(&path).ok_or_else(|| {
                    anyhow!("cannot tell the format of {}; pass --format", path.display())
                })?,
            };
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;

            let bookmarks = match read_bookmarks(&bytes, format) {
                Outcome::Success(b) => b,
                Outcome::Empty(reason) => {
                    println!("Nothing to ingest: {reason}");
                    return Ok(());
                }
                Outcome::Failed(reason) => return Err(anyhow!(reason)),
            };

            let ingestor = build_ingestor(config, &client)?;
            let stats = ingestor.ingest_bookmarks(&bookmarks).await;
            println!("{stats}");
        }
        Command::Search { query } => {
            let tool = build_tool(config, &client);
            match tool.run(&query).await {
                Outcome::Success(text) => println!("{text}"),
                Outcome::Empty(reason) => println!("No results ({reason})"),
                Outcome::Failed(reason) => return Err(anyhow!(reason)),
            }
        }
        Command::Ask { question } => {
            let librarian = Librarian::new(build_tool(config, &client), build_model(config));
            println!("{}", librarian.answer(&question).await);
        }
    }
    Ok(())
}

fn build_model(config: &Config) -> Arc<dyn LanguageModel> {
    match config.llm_provider {
        LlmProvider::OpenAi => Arc::new(OpenAi::new(&config.openai_api_key, &config.chat_model)),
        LlmProvider::Anthropic => {
            Arc::new(Claude::new(&config.anthropic_api_key, &config.chat_model))
        }
    }
}

fn build_embedder(config: &Config) -> Arc<dyn TextEmbedder> {
    Arc::new(Embedder::new(&config.openai_api_key, &config.embedding_model))
}

fn build_ingestor(config: &Config, client: &GraphClient) -> Result<Ingestor> {
    Ok(Ingestor::new(
        Arc::new(HttpFetcher::new()?),
        build_model(config),
        build_embedder(config),
        Arc::new(GraphWriter::new(client.clone())),
    ))
}

fn build_tool(config: &Config, client: &GraphClient) -> KnowledgeGraphTool {
    KnowledgeGraphTool::new(
        Arc::new(GraphReader::new(client.clone())),
        build_embedder(config),
    )
    .with_limits(config.search_limit, config.vector_top_k)
}
