// src/source.rs

use crate::error::SourceError;
use lopdf::Document;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// What a PDF turned out to contain.
#[derive(Debug)]
pub enum PdfContent {
    /// Extractable text, with its count of non-whitespace characters.
    Text { text: String, chars: usize },
    /// Image-only pages; the stock report has to go through OCR first.
    ScannedImage { pages: usize },
    /// The bytes could not be read as a PDF.
    Error(String),
}

/// Fewer non-whitespace characters than this and the text layer is noise.
const MIN_TEXT_CHARS: usize = 30;

/// Pages with images and no fonts, as a share of all pages, at which the
/// whole document counts as scanned.
const SCANNED_PAGE_RATIO: f64 = 0.8;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Read a report file, refusing anything over `max_file_mb` before the
/// contents are touched.
pub fn load_document(path: impl AsRef<Path>, max_file_mb: u64) -> Result<Vec<u8>, SourceError> {
    let path = path.as_ref();
    let size_mb = fs::metadata(path)?.len() as f64 / BYTES_PER_MB;
    info!(path = %path.display(), size_mb = format!("{size_mb:.2}"), "Loading report file");

    if size_mb > max_file_mb as f64 {
        return Err(SourceError::TooLarge {
            size_mb,
            limit_mb: max_file_mb,
        });
    }
    Ok(fs::read(path)?)
}

/// Classify a PDF by its page resources first, then by how much text
/// `pdf-extract` gets out of it.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> PdfContent {
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };
    let pages = doc.get_pages().len();

    if looks_like_scanned(&doc) {
        return PdfContent::ScannedImage { pages };
    }

    match pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => classify_text(text, pages),
        Err(e) => {
            warn!(error = %e, pages, "No text layer could be read");
            PdfContent::ScannedImage { pages }
        }
    }
}

fn classify_text(text: String, pages: usize) -> PdfContent {
    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
    info!(chars, pages, "PDF text layer read");
    if chars < MIN_TEXT_CHARS {
        PdfContent::ScannedImage { pages }
    } else {
        PdfContent::Text { text, chars }
    }
}

/// A page with XObject images but no Font resources is taken to be a scan.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false;
    }

    let resource = |page: &lopdf::Dictionary, key: &[u8]| {
        page.get(b"Resources")
            .ok()
            .and_then(|r| doc.dereference(r).ok())
            .and_then(|(_, resolved)| resolved.as_dict().ok())
            .and_then(|res| res.get(key).ok())
            .and_then(|o| doc.dereference(o).ok())
            .and_then(|(_, resolved)| resolved.as_dict().ok())
            .is_some_and(|d| !d.is_empty())
    };

    let image_only_pages = pages
        .values()
        .filter_map(|id| doc.get_object(*id).ok())
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|page| {
            resource(*page, b"XObject".as_slice()) && !resource(*page, b"Font".as_slice())
        })
        .count();

    let total = pages.len();
    let ratio = image_only_pages as f64 / total as f64;
    let scanned = ratio >= SCANNED_PAGE_RATIO;
    info!(
        pages = total,
        image_only = image_only_pages,
        ratio = format!("{ratio:.2}"),
        scanned,
        "Page resources checked"
    );
    scanned
}

// ---------------------------------------------------------------------------
// Extraction methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Markdown,
    Text,
    Html,
    Structured,
}

impl ExtractionMethod {
    pub const ORDER: [ExtractionMethod; 4] =
        [Self::Markdown, Self::Text, Self::Html, Self::Structured];
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::Text => "text",
            Self::Html => "html",
            Self::Structured => "structured",
        })
    }
}

/// A document that can render itself in several ways. Renderings a source
/// does not offer come back empty.
pub trait DocumentExtraction {
    fn markdown(&self) -> Result<String, SourceError> {
        Ok(String::new())
    }

    fn text(&self) -> Result<String, SourceError> {
        Ok(String::new())
    }

    fn html(&self) -> Result<String, SourceError> {
        Ok(String::new())
    }

    /// Field-level data, if the source can produce any.
    fn structured(&self) -> Result<Option<Value>, SourceError> {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedContent {
    pub method: ExtractionMethod,
    pub content: String,
}

fn run_method(
    doc: &dyn DocumentExtraction,
    method: ExtractionMethod,
) -> Result<String, SourceError> {
    match method {
        ExtractionMethod::Markdown => doc.markdown(),
        ExtractionMethod::Text => doc.text(),
        ExtractionMethod::Html => doc.html(),
        ExtractionMethod::Structured => match doc.structured()? {
            Some(Value::Null) | None => Ok(String::new()),
            Some(data) => Ok(serde_json::to_string_pretty(&data)?),
        },
    }
}

/// Try each rendering in [`ExtractionMethod::ORDER`] and keep the first one
/// with more than `min_chars` characters once trimmed.
pub fn select_content(
    doc: &dyn DocumentExtraction,
    min_chars: usize,
) -> Result<SelectedContent, SourceError> {
    for method in ExtractionMethod::ORDER {
        info!(method = %method, "Trying extraction method");
        match run_method(doc, method) {
            Ok(content) if content.trim().chars().count() > min_chars => {
                info!(method = %method, chars = content.len(), "Extraction method succeeded");
                return Ok(SelectedContent { method, content });
            }
            Ok(_) => warn!(method = %method, "Extraction returned insufficient data"),
            Err(e) => warn!(method = %method, error = %e, "Extraction method failed"),
        }
    }
    Err(SourceError::NoUsableExtraction)
}

/// A local PDF, read through [`extract_text_from_pdf`]. Only offers plain text.
#[derive(Debug)]
pub struct PdfDocument {
    content: PdfContent,
}

impl PdfDocument {
    pub fn from_bytes(pdf_bytes: &[u8]) -> Self {
        Self {
            content: extract_text_from_pdf(pdf_bytes),
        }
    }

    pub fn content(&self) -> &PdfContent {
        &self.content
    }
}

impl DocumentExtraction for PdfDocument {
    fn text(&self) -> Result<String, SourceError> {
        match &self.content {
            PdfContent::Text { text, .. } => Ok(text.clone()),
            PdfContent::ScannedImage { pages } => Err(SourceError::Pdf(format!(
                "scanned PDF ({pages} pages) needs external OCR"
            ))),
            PdfContent::Error(e) => Err(SourceError::Pdf(e.clone())),
        }
    }
}
