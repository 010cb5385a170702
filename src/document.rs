//! Document representation for the ingestion pipeline.
//!
//! Documents are represented as a collection of pages, where each page has
//! content and a 1-indexed page number. PDFs are extracted page by page so
//! the page number survives as chunk metadata.

use crate::error::{RagChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single page in a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number.
    pub number: usize,
    /// Text content of the page.
    pub content: String,
}

impl Page {
    /// Create a new page.
    pub fn new(number: usize, content: String) -> Self {
        Self { number, content }
    }
}

/// A document consisting of one or more pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document name/title.
    pub name: String,
    /// Original file path (if loaded from file).
    pub path: Option<PathBuf>,
    /// Pages in the document.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new document with given name and pages.
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            path: None,
            pages,
        }
    }

    /// Load a PDF file, extracting text page by page.
    ///
    /// Fails when the path does not exist or does not carry a `.pdf`
    /// extension.
    pub fn from_pdf_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagChatError::DocumentNotFound(path.to_path_buf()));
        }

        if !is_pdf_path(path) {
            return Err(RagChatError::InvalidDocumentType(path.to_path_buf()));
        }

        let pdf = lopdf::Document::load(path).map_err(|e| RagChatError::pdf(path, e.to_string()))?;

        let mut pages = Vec::new();
        for page_number in pdf.get_pages().keys() {
            let content = pdf
                .extract_text(&[*page_number])
                .map_err(|e| RagChatError::pdf(path, e.to_string()))?;
            pages.push(Page::new(*page_number as usize, content));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            pages,
        })
    }

    /// Create a document from raw text content (single page).
    pub fn from_text(name: impl Into<String>, content: String) -> Self {
        let pages = vec![Page::new(1, content)];
        Self {
            name: name.into(),
            path: None,
            pages,
        }
    }

    /// Get total number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a specific page by number (1-indexed).
    pub fn get_page(&self, number: usize) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == number)
    }
}

/// Check whether a path has a `.pdf` extension (case-insensitive).
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
