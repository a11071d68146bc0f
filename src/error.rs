// src/error.rs

use thiserror::Error;

/// The one error `format_stock_report` can return.
///
/// Everything short of a structurally unusable extraction degrades to
/// defaults instead; callers are expected to build a minimal report from
/// this (see [`crate::formatter::format_or_fallback`]).
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("extraction is not a JSON object (got {kind})")]
    NotAnObject { kind: &'static str },

    #[error("extraction is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown division: {0}")]
    UnknownDivision(String),

    #[error("division already registered: {0}")]
    DuplicateDivision(String),

    #[error("brand {brand} already registered in division {division}")]
    DuplicateBrand { division: String, brand: String },

    #[error("brand catalog lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large ({size_mb:.2} MB), maximum is {limit_mb} MB")]
    TooLarge { size_mb: f64, limit_mb: u64 },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("all extraction methods failed to return sufficient data")]
    NoUsableExtraction,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
