// src/report.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub qty: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityWithFree {
    pub qty: f64,
    pub free: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityWithValue {
    pub qty: f64,
    pub value: f64,
}

/// One product's movement for the reporting period.
///
/// Quantities are never negative; anything missing or unreadable is 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub name: String,
    pub opening: Quantity,
    pub purchase: QuantityWithFree,
    pub purchase_return: Quantity,
    pub sales: QuantityWithValue,
    pub sales_return: QuantityWithFree,
    pub closing: QuantityWithValue,
}

impl StockItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub title: String,
    pub date_range: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_items: usize,
    pub total_opening_qty: f64,
    pub total_purchase_qty: f64,
    pub total_sales_qty: f64,
    pub total_closing_qty: f64,
    pub total_sales_value: f64,
    pub total_closing_value: f64,
}

/// Typed stock report built once per extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedStockReport {
    pub company: CompanyInfo,
    pub report: ReportMeta,
    pub items: Vec<StockItem>,
    pub summary: ReportSummary,
}

impl FormattedStockReport {
    /// Metadata-only report with no items, for when formatting failed outright.
    pub fn minimal(company: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            company: CompanyInfo {
                name: company.into(),
            },
            report: ReportMeta {
                title: title.into(),
                date_range: crate::formatter::DEFAULT_DATE_RANGE.to_string(),
                generated_at: now_rfc3339(),
            },
            items: Vec::new(),
            summary: ReportSummary::default(),
        }
    }
}

/// Current UTC time as RFC 3339, or an empty string if formatting fails.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
