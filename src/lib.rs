//! RAG chat - grounded question answering over PDF documents.
//!
//! A small retrieval-augmented-generation pipeline: PDFs are chunked,
//! embedded, and stored in SQLite (sqlite-vec); questions retrieve the
//! closest chunks; the assistant answers exclusively from that context.
//! An LLM-as-a-judge framework scores answers against weighted criteria.
//!
//! # Quick Start
//!
//! ```no_run
//! use rag_chat::{
//!     chat::GroundedChat,
//!     config::Config,
//!     embedding::EmbeddingClient,
//!     eval::LlmJudge,
//!     ingest::Ingestor,
//!     llm::LlmClient,
//!     search::SemanticSearch,
//!     store::VectorStore,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     // Ingest a PDF into a collection
//!     let mut store = VectorStore::open(&config.store.db_path)?;
//!     let embedder = EmbeddingClient::from_config(&config);
//!     let ingestor = Ingestor::new(embedder.clone(), config.ingest.clone());
//!     ingestor
//!         .ingest_path(&mut store, Path::new("report.pdf"), "rag_documents")
//!         .await?;
//!
//!     // Retrieve context and answer a question
//!     let searcher = SemanticSearch::new(store, embedder, "rag_documents", config.search.k);
//!     let context = searcher.get_context("What was the revenue?").await?;
//!
//!     let chat = GroundedChat::new(LlmClient::new(config.llm.clone()));
//!     let answer = chat.ask("What was the revenue?", &context).await?;
//!
//!     // Judge the answer against the retrieved context
//!     let judge = LlmJudge::from_config(config.llm.clone());
//!     let result = judge
//!         .evaluate("What was the revenue?", &context, &answer, None)
//!         .await?;
//!
//!     println!("{} (score {})", answer, result.score);
//!     if !result.passed {
//!         println!("{}", judge.failing_criterion_guidance(&result));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Document / chunk**: page-based PDF extraction and overlapping
//!   text chunks
//! - **EmbeddingClient**: OpenAI-compatible embeddings API client
//! - **VectorStore**: SQLite + sqlite-vec persistence and similarity search
//! - **SemanticSearch**: query embedding and context assembly
//! - **GroundedChat**: context-constrained answer generation
//! - **eval**: LLM-as-a-judge scoring of answers against weighted criteria

pub mod chat;
pub mod chunk;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod eval;
pub mod ingest;
pub mod llm;
pub mod search;
pub mod store;

// Re-export commonly used types
pub use chat::GroundedChat;
pub use config::Config;
pub use document::Document;
pub use embedding::EmbeddingClient;
pub use error::{RagChatError, Result};
pub use eval::{CriteriaRegistry, EvaluationResult, LlmJudge};
pub use ingest::Ingestor;
pub use llm::LlmClient;
pub use search::SemanticSearch;
pub use store::VectorStore;
