//! Vector store backed by SQLite with the sqlite-vec extension.
//!
//! Persists (text, metadata, embedding) rows under a named collection and
//! answers similarity queries ordered ascending by cosine distance, so the
//! first result is the closest match.

use crate::error::{RagChatError, Result};
use rusqlite::ffi::sqlite3_auto_extension;
use rusqlite::{Connection, params};
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;

static VEC_INIT: Once = Once::new();

/// Register sqlite-vec so every subsequently opened connection has the
/// `vec_distance_cosine` function available.
fn register_vec_extension() {
    VEC_INIT.call_once(|| unsafe {
        sqlite3_auto_extension(Some(std::mem::transmute(sqlite3_vec_init as *const ())));
    });
}

/// A stored chunk with its source metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// Chunk text content.
    pub text: String,
    /// Source document name.
    pub source: String,
    /// 1-indexed page number within the source (if known).
    pub page: Option<usize>,
    /// Chunk index within the page.
    pub chunk_index: usize,
}

/// A chunk record paired with its embedding, ready for storage.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub record: ChunkRecord,
    pub embedding: Vec<f32>,
}

/// A search hit: the stored chunk and its cosine distance to the query.
/// Smaller distance means more similar.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: ChunkRecord,
    pub distance: f32,
}

/// SQLite-backed vector store.
pub struct VectorStore {
    conn: Connection,
}

impl VectorStore {
    /// Open (or create) a store at the given path.
    ///
    /// Creates parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        register_vec_extension();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| RagChatError::io(parent, e))?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (used in tests).
    pub fn open_in_memory() -> Result<Self> {
        register_vec_extension();
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chunks (
                 id INTEGER PRIMARY KEY,
                 collection TEXT NOT NULL,
                 source TEXT NOT NULL,
                 page INTEGER,
                 chunk_index INTEGER NOT NULL,
                 text TEXT NOT NULL,
                 embedding BLOB NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);",
        )?;
        Ok(())
    }

    /// Store a batch of embedded chunks under a collection.
    ///
    /// Returns the number of rows written.
    pub fn add(&mut self, collection: &str, chunks: &[EmbeddedChunk]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (collection, source, page, chunk_index, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for chunk in chunks {
                stmt.execute(params![
                    collection,
                    chunk.record.source,
                    chunk.record.page.map(|p| p as i64),
                    chunk.record.chunk_index as i64,
                    chunk.record.text,
                    embedding_to_blob(&chunk.embedding),
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(collection, rows = chunks.len(), "stored embedded chunks");
        Ok(chunks.len())
    }

    /// Find the `k` chunks closest to the query embedding, ordered
    /// ascending by cosine distance.
    pub fn similarity_search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let mut stmt = self.conn.prepare(
            "SELECT text, source, page, chunk_index,
                    vec_distance_cosine(embedding, ?1) AS distance
             FROM chunks
             WHERE collection = ?2
             ORDER BY distance ASC
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(
            params![
                embedding_to_blob(query_embedding),
                collection,
                k as i64
            ],
            |row| {
                Ok(ScoredChunk {
                    chunk: ChunkRecord {
                        text: row.get(0)?,
                        source: row.get(1)?,
                        page: row.get::<_, Option<i64>>(2)?.map(|p| p as usize),
                        chunk_index: row.get::<_, i64>(3)? as usize,
                    },
                    distance: row.get::<_, f64>(4)? as f32,
                })
            },
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Delete every chunk stored under a collection.
    ///
    /// Returns the number of rows removed.
    pub fn delete_collection(&self, collection: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM chunks WHERE collection = ?1", params![collection])?;
        tracing::debug!(collection, deleted, "deleted collection");
        Ok(deleted)
    }

    /// Number of chunks stored under a collection.
    pub fn count(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Serialize an embedding as a little-endian float32 blob, the layout
/// sqlite-vec expects.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}
