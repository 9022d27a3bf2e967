//! Document text extraction and input discovery.
//!
//! Extraction yields one raw text string per page. Pages without extractable text are kept as
//! empty strings so that page numbers stay aligned with the source document.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

const PAGE_BREAK: char = '\x0C';

/// Errors raised while reading text out of a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document could not be opened.
    #[error("Failed to read document {path}: {source}")]
    Io {
        /// Path of the unreadable document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The PDF parser rejected the document.
    #[error("Failed to parse PDF {path}: {message}")]
    Pdf {
        /// Path of the rejected document.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Source of raw per-page text for one document.
pub trait DocumentExtractor {
    /// Return the raw text of every page of `path`, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// PDF extractor backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Construct a new PDF extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // pdf-extract panics on some malformed inputs; that must only fail this document.
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|_| ExtractionError::Pdf {
                path: path.to_path_buf(),
                message: "parser panicked".to_string(),
            })?
            .map_err(|err| ExtractionError::Pdf {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        Ok(split_pages(&text))
    }
}

/// Split extracted text on form-feed page breaks.
///
/// A single trailing break (emitted after the last page) does not produce an extra page.
pub fn split_pages(text: &str) -> Vec<String> {
    let body = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    body.split(PAGE_BREAK).map(str::to_string).collect()
}

/// Document identifier used in blocks and reports: the file name of `path`.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// List PDF file names directly inside `dir`, sorted by name.
///
/// The extension match is case-insensitive. Unreadable entries are skipped.
pub fn discover_documents(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.to_lowercase().ends_with(".pdf").then_some(name)
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pages_keeps_empty_pages() {
        let pages = split_pages("first page\x0C\x0Cthird page\x0C");
        assert_eq!(pages, vec!["first page", "", "third page"]);
    }

    #[test]
    fn split_pages_without_breaks_is_single_page() {
        assert_eq!(split_pages("only page"), vec!["only page"]);
    }

    #[test]
    fn document_id_uses_file_name() {
        assert_eq!(document_id(Path::new("data/input/Guide.pdf")), "Guide.pdf");
    }

    #[test]
    fn discover_documents_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("persona-digest-discover-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).expect("create dir");
        for name in ["b.pdf", "A.PDF", "notes.txt", "nested/c.pdf"] {
            std::fs::write(dir.join(name), b"").expect("write file");
        }

        let found = discover_documents(&dir);
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(found, vec!["A.PDF".to_string(), "b.pdf".to_string()]);
    }

    #[test]
    fn pdf_extractor_reports_missing_file() {
        let error = PdfExtractor::new()
            .extract_pages(Path::new("/no/such/file.pdf"))
            .expect_err("missing file");
        assert!(matches!(error, ExtractionError::Io { .. }));
    }
}
