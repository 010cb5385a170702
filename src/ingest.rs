//! Document ingestion pipeline.
//!
//! Loads PDF documents, splits each page into overlapping chunks, embeds
//! the chunks in batches, and stores them under a collection:
//! load → split → embed → store.

use crate::chunk::{ChunkConfig, split_text};
use crate::config::IngestConfig;
use crate::document::{Document, is_pdf_path};
use crate::embedding::EmbeddingClient;
use crate::error::{RagChatError, Result};
use crate::store::{ChunkRecord, EmbeddedChunk, VectorStore};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Number of chunks embedded per API request.
const EMBED_BATCH_SIZE: usize = 32;

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// PDF files processed.
    pub files: usize,
    /// Pages extracted.
    pub pages: usize,
    /// Chunks embedded and stored.
    pub chunks: usize,
}

/// Ingestion pipeline over an embedding client.
pub struct Ingestor {
    embedder: EmbeddingClient,
    config: IngestConfig,
}

impl Ingestor {
    /// Create a new ingestor.
    pub fn new(embedder: EmbeddingClient, config: IngestConfig) -> Self {
        Self { embedder, config }
    }

    /// Ingest a PDF file, or every PDF under a directory.
    pub async fn ingest_path(
        &self,
        store: &mut VectorStore,
        path: &Path,
        collection: &str,
    ) -> Result<IngestReport> {
        if path.is_dir() {
            let files = find_pdfs(path)?;
            let mut report = IngestReport::default();
            for file in files {
                let file_report = self.ingest_file(store, &file, collection).await?;
                report.files += file_report.files;
                report.pages += file_report.pages;
                report.chunks += file_report.chunks;
            }
            Ok(report)
        } else {
            self.ingest_file(store, path, collection).await
        }
    }

    /// Ingest a single PDF file.
    pub async fn ingest_file(
        &self,
        store: &mut VectorStore,
        path: &Path,
        collection: &str,
    ) -> Result<IngestReport> {
        let document = Document::from_pdf_file(path)?;
        tracing::info!(
            document = %document.name,
            pages = document.page_count(),
            "ingesting document"
        );

        let records = chunk_document(&document, &self.config);

        let mut embedded = Vec::with_capacity(records.len());
        for batch in records.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|r| r.text.as_str()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            for (record, embedding) in batch.iter().zip(embeddings) {
                embedded.push(EmbeddedChunk {
                    record: record.clone(),
                    embedding,
                });
            }
        }

        let stored = store.add(collection, &embedded)?;

        Ok(IngestReport {
            files: 1,
            pages: document.page_count(),
            chunks: stored,
        })
    }
}

/// Split every page of a document into chunk records carrying source and
/// page metadata.
pub fn chunk_document(document: &Document, config: &IngestConfig) -> Vec<ChunkRecord> {
    let chunk_config = ChunkConfig {
        chunk_size: config.chunk_size,
        chunk_overlap: config.chunk_overlap,
    };

    let mut records = Vec::new();
    for page in &document.pages {
        for chunk in split_text(&page.content, &chunk_config) {
            records.push(ChunkRecord {
                text: chunk.text,
                source: document.name.clone(),
                page: Some(page.number),
                chunk_index: chunk.index,
            });
        }
    }
    records
}

/// Collect every PDF file under a directory, in stable path order.
fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_pdf_path(path))
        .collect();

    files.sort();

    if files.is_empty() {
        return Err(RagChatError::EmptyCorpus(dir.to_path_buf()));
    }

    Ok(files)
}
