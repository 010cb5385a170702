//! RAG chat CLI
//!
//! Ingest PDF documents, search them semantically, and chat with answers
//! grounded in the retrieved context.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_chat::{
    chat::GroundedChat,
    config::{Config, DEFAULT_COLLECTION},
    embedding::EmbeddingClient,
    eval::LlmJudge,
    ingest::Ingestor,
    llm::{LlmClient, Prompts},
    search::SemanticSearch,
    store::VectorStore,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

/// RAG chat - grounded question answering over PDF documents
#[derive(Parser)]
#[command(name = "rag-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a PDF file (or a directory of PDFs) into the vector store
    Ingest {
        /// Path to a PDF file or a directory containing PDFs
        path: PathBuf,

        /// Collection to store chunks under
        #[arg(short, long, default_value = DEFAULT_COLLECTION)]
        collection: String,
    },

    /// Search a collection for chunks similar to a query
    Search {
        /// The search query
        query: String,

        /// Collection to search
        #[arg(short, long, default_value = DEFAULT_COLLECTION)]
        collection: String,

        /// Number of results to return (overrides SEARCH_K)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Interactive grounded chat over a collection
    Chat {
        /// Collection to answer from
        #[arg(short, long, default_value = DEFAULT_COLLECTION)]
        collection: String,

        /// Judge each answer and print its evaluation
        #[arg(long)]
        judge: bool,
    },

    /// Delete every chunk stored under a collection
    Reset {
        /// Collection to delete
        #[arg(short, long, default_value = DEFAULT_COLLECTION)]
        collection: String,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { path, collection } => cmd_ingest(path, collection).await,
        Commands::Search {
            query,
            collection,
            top_k,
        } => cmd_search(query, collection, top_k).await,
        Commands::Chat { collection, judge } => cmd_chat(collection, judge).await,
        Commands::Reset { collection } => cmd_reset(collection),
        Commands::Test => cmd_test().await,
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn cmd_ingest(path: PathBuf, collection: String) -> Result<()> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    println!("Ingesting: {}", path.display());
    println!(
        "Using embedding model: {} (chunk size {}, overlap {})",
        config.embedding.model, config.ingest.chunk_size, config.ingest.chunk_overlap
    );

    let start = Instant::now();

    let mut store =
        VectorStore::open(&config.store.db_path).context("Failed to open vector store")?;
    let embedder = EmbeddingClient::from_config(&config);
    let ingestor = Ingestor::new(embedder, config.ingest.clone());

    let report = ingestor
        .ingest_path(&mut store, &path, &collection)
        .await
        .context("Ingestion failed")?;

    println!("\nIngestion complete:");
    println!("  Files:      {}", report.files);
    println!("  Pages:      {}", report.pages);
    println!("  Chunks:     {}", report.chunks);
    println!("  Collection: {}", collection);
    println!("  Duration:   {:.2?}", start.elapsed());

    Ok(())
}

async fn cmd_search(query: String, collection: String, top_k: Option<usize>) -> Result<()> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let store =
        VectorStore::open(&config.store.db_path).context("Failed to open vector store")?;
    let embedder = EmbeddingClient::from_config(&config);
    let k = top_k.unwrap_or(config.search.k);
    let searcher = SemanticSearch::new(store, embedder, collection.as_str(), k);

    println!("Searching for: \"{}\"", query);
    println!();

    let start = Instant::now();
    let results = searcher.search(&query).await.context("Search failed")?;

    if results.is_empty() {
        println!("No results found. Ingest documents first.");
        return Ok(());
    }

    println!("Results:");
    println!("{}", "─".repeat(60));

    for (i, result) in results.iter().enumerate() {
        let page = result
            .chunk
            .page
            .map(|p| format!("p.{}", p))
            .unwrap_or_else(|| "p.?".to_string());

        println!(
            "{:>2}. {} [{}] (distance {:.4})",
            i + 1,
            result.chunk.source,
            page,
            result.distance
        );

        let preview: String = result.chunk.text.chars().take(200).collect();
        for line in preview.lines().take(3) {
            println!("      {}", line);
        }
        println!();
    }

    println!("{}", "─".repeat(60));
    println!("Found {} results in {:.2?}", results.len(), start.elapsed());

    Ok(())
}

async fn cmd_chat(collection: String, judge_answers: bool) -> Result<()> {
    println!("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let store =
        VectorStore::open(&config.store.db_path).context("Failed to open vector store")?;
    let embedder = EmbeddingClient::from_config(&config);
    let searcher = SemanticSearch::new(store, embedder, collection.as_str(), config.search.k);
    let chat = GroundedChat::new(LlmClient::new(config.llm.clone()));
    let judge = judge_answers.then(|| LlmJudge::from_config(config.llm.clone()));

    println!("Grounded chat over collection '{}'", collection);
    println!("{}", "=".repeat(50));
    println!("Type 'quit' or 'exit' to leave\n");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nAsk a question> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let question = line.context("Failed to read input")?;
        let question = question.trim();

        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if question.is_empty() {
            println!("Empty question. Try again.");
            continue;
        }

        println!("\nRetrieving context...");
        let context = match searcher.get_context(question).await {
            Ok(context) => context,
            Err(e) => {
                eprintln!("Failed to retrieve context: {}", e);
                continue;
            }
        };

        if context.is_empty() {
            println!("No context found in the collection.");
            println!("Make sure documents were ingested first.");
            continue;
        }

        println!("Generating answer...");
        let answer = match chat.ask(question, &context).await {
            Ok(answer) => answer,
            Err(e) => {
                eprintln!("Failed to generate answer: {}", e);
                continue;
            }
        };

        println!("\nANSWER:");
        println!("{}", "─".repeat(50));
        println!("{}", answer);
        println!("{}", "─".repeat(50));

        if let Some(judge) = &judge {
            match judge
                .evaluate(
                    question,
                    &context,
                    &answer,
                    Some(Prompts::grounded_assistant()),
                )
                .await
            {
                Ok(result) => {
                    println!(
                        "Judge: score {}/100 ({})",
                        result.score,
                        if result.passed { "passed" } else { "failed" }
                    );
                    if !result.passed {
                        println!("{}", judge.failing_criterion_guidance(&result));
                    }
                }
                Err(e) => eprintln!("Judge evaluation failed: {}", e),
            }
        }
    }

    Ok(())
}

fn cmd_reset(collection: String) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let store =
        VectorStore::open(&config.store.db_path).context("Failed to open vector store")?;
    let deleted = store
        .delete_collection(&collection)
        .context("Failed to delete collection")?;

    println!("Deleted {} chunks from collection '{}'", deleted, collection);

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        &config.llm.api_key[..config.llm.api_key.len().min(8)]
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
