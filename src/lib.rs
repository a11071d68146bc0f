//! Normalization and brand analytics for pharmaceutical stock reports.
//!
//! OCR output arrives either as loose text ([`heuristics`]) or as a flat,
//! inconsistently keyed JSON record ([`formatter`]); both end up as a
//! [`report::FormattedStockReport`], which [`analytics`] groups by brand
//! using the [`catalog`].

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formatter;
pub mod heuristics;
pub mod record;
pub mod report;
pub mod source;
