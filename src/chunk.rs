//! Text splitting for document ingestion.
//!
//! Splits page text into overlapping character chunks, preferring sentence
//! boundaries so chunks do not cut statements in half.

use serde::{Deserialize, Serialize};

/// Configuration for text chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// A chunk of text produced by the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text content.
    pub text: String,
    /// Start character position in the original text.
    pub start_pos: usize,
    /// End character position in the original text.
    pub end_pos: usize,
    /// Chunk index within the original text.
    pub index: usize,
}

/// Split text into overlapping chunks no longer than `config.chunk_size`.
///
/// Each chunk ends at a sentence boundary when one falls within the last
/// 100 characters of the window. Whitespace-only chunks are dropped.
pub fn split_text(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let text_len = chars.len();

    if text_len == 0 {
        return chunks;
    }

    let mut start = 0;
    let mut index = 0;

    while start < text_len {
        let end = (start + config.chunk_size).min(text_len);

        // Try to break at sentence boundary if possible
        let adjusted_end = if end < text_len && end > start {
            let search_start = end.saturating_sub(100).max(start);
            if search_start < end {
                let search_text: String = chars[search_start..end].iter().collect();

                if let Some(pos) = search_text.rfind(|c| c == '.' || c == '!' || c == '?') {
                    let candidate = search_start + pos + 1;
                    if candidate > start { candidate } else { end }
                } else {
                    end
                }
            } else {
                end
            }
        } else {
            end
        };

        let final_end = adjusted_end.max(start + 1).min(text_len);

        let final_text: String = chars[start..final_end].iter().collect();

        if !final_text.trim().is_empty() {
            chunks.push(Chunk {
                text: final_text.trim().to_string(),
                start_pos: start,
                end_pos: final_end,
                index,
            });
            index += 1;
        }

        if final_end >= text_len {
            break;
        }

        // Calculate next start with overlap, always moving forward
        let next_start = if config.chunk_overlap > 0 && final_end > config.chunk_overlap {
            final_end - config.chunk_overlap
        } else {
            final_end
        };

        start = if next_start <= start {
            start + 1
        } else {
            next_start
        };
    }

    chunks
}
