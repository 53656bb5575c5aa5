//! Study documents: loading text from PDFs and plain-text files.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// A document whose text is sent to the model provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Display name (usually the file name).
    pub name: String,
    /// Extracted text.
    pub content: String,
    fingerprint: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            fingerprint: content_fingerprint(&content),
            content,
        }
    }

    /// Load a document from disk. `.pdf` files go through text extraction,
    /// everything else is read as UTF-8.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let content = if is_pdf {
            extract_text_from_pdf(path)?
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read document: {}", path.display()))?
        };

        if content.trim().is_empty() {
            tracing::warn!("{name}: no text extracted");
        }

        Ok(Self::new(name, content))
    }

    /// SHA-256 of the content, hex encoded.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Extract the text of every page of a PDF, concatenated in page order.
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    // pdf_extract can panic on malformed PDFs
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text(path));
    match result {
        Ok(Ok(text)) => {
            tracing::debug!("{}: extracted {} chars", path.display(), text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(anyhow::anyhow!(
            "failed to extract text from PDF {}: {e}",
            path.display()
        )),
        Err(_) => Err(anyhow::anyhow!(
            "PDF extraction panicked (malformed PDF): {}",
            path.display()
        )),
    }
}

/// Compute SHA-256 hash of content
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
