//! Semantic search over the vector store.
//!
//! Embeds the query, runs a similarity search against a collection, and
//! renders the retrieved chunks as a context block for the assistant.

use crate::embedding::EmbeddingClient;
use crate::error::{RagChatError, Result};
use crate::store::{ScoredChunk, VectorStore};

/// Semantic searcher over a single collection.
pub struct SemanticSearch {
    store: VectorStore,
    embedder: EmbeddingClient,
    collection: String,
    k: usize,
}

impl SemanticSearch {
    /// Create a new searcher.
    pub fn new(
        store: VectorStore,
        embedder: EmbeddingClient,
        collection: impl Into<String>,
        k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            k,
        }
    }

    /// Find the chunks most similar to the query.
    ///
    /// Results are ordered ascending by distance (closest first).
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        if query.trim().is_empty() {
            return Err(RagChatError::EmptyQuery);
        }

        let query_embedding = self.embedder.embed(query).await?;
        self.store
            .similarity_search(&self.collection, &query_embedding, self.k)
    }

    /// Search and return the retrieved chunks as one concatenated context
    /// string. Empty when nothing is stored under the collection.
    pub async fn get_context(&self, query: &str) -> Result<String> {
        let results = self.search(query).await?;
        Ok(format_context(&results))
    }
}

/// Render retrieved chunks as numbered context blocks.
pub fn format_context(results: &[ScoredChunk]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[Chunk {}] {}", i + 1, r.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChunkRecord, EmbeddedChunk};

    fn scored(text: &str, distance: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: ChunkRecord {
                text: text.to_string(),
                source: "test.pdf".to_string(),
                page: Some(1),
                chunk_index: 0,
            },
            distance,
        }
    }

    #[test]
    fn test_format_context_numbers_chunks() {
        let context = format_context(&[scored("alpha", 0.1), scored("beta", 0.2)]);
        assert_eq!(context, "[Chunk 1] alpha\n\n[Chunk 2] beta");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[tokio::test]
    async fn test_search_rejects_empty_query() {
        let store = VectorStore::open_in_memory().unwrap();
        let embedder = EmbeddingClient::new("https://unused.example.com", "key", "model");
        let searcher = SemanticSearch::new(store, embedder, "docs", 10);

        let err = searcher.search("   ").await.unwrap_err();
        assert!(matches!(err, RagChatError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_search_returns_closest_first() {
        let mut store = VectorStore::open_in_memory().unwrap();
        store
            .add(
                "docs",
                &[
                    EmbeddedChunk {
                        record: ChunkRecord {
                            text: "far".to_string(),
                            source: "test.pdf".to_string(),
                            page: Some(1),
                            chunk_index: 0,
                        },
                        embedding: vec![0.0, 1.0],
                    },
                    EmbeddedChunk {
                        record: ChunkRecord {
                            text: "near".to_string(),
                            source: "test.pdf".to_string(),
                            page: Some(2),
                            chunk_index: 1,
                        },
                        embedding: vec![1.0, 0.0],
                    },
                ],
            )
            .unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"embedding": [1.0, 0.0], "index": 0}]}"#)
            .create_async()
            .await;

        let embedder = EmbeddingClient::new(server.url(), "key", "model");
        let searcher = SemanticSearch::new(store, embedder, "docs", 10);

        let results = searcher.search("which chunk is near?").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "near");
        assert_eq!(results[1].chunk.text, "far");

        let context = searcher.get_context("which chunk is near?").await.unwrap();
        assert!(context.starts_with("[Chunk 1] near"));
    }
}
