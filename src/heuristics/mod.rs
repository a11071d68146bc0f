// src/heuristics/mod.rs

mod generic;
pub mod inventory;
mod rows;

pub use generic::{extract_company, extract_date_range, extract_report_title};
pub use inventory::{InventoryLine, extract_inventory_lines};
pub use rows::{PlaceholderRows, SectionScanRows, SuffixedRows};

use crate::record::{FlatRecord, sanitize_key};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Dosage-form and variant tokens that end a product name on a report row.
pub const DOSAGE_SUFFIXES: &[&str] = &[
    "TABLETS", "TABLET", "TABS", "TAB", "CAPSULES", "CAPSULE", "CAPS", "CAP", "SYRUP", "SYP",
    "SUSPENSION", "SUSP", "GEL", "CREAM", "OINTMENT", "OINT", "LOTION", "DROPS", "DROP", "INJ",
    "SPRAY", "SACHET", "POWDER", "SOAP", "OD", "D3", "PM", "SL", "CD3", "MAX", "LITE", "OZ", "SR",
    "XR", "ER", "MR", "DS", "FORTE", "PLUS", "KID",
];

/// Flat-key codes for the nine report columns, in column order:
/// opening, purchase qty, purchase free, purchase return, sales qty,
/// sales value, sales return, closing qty, closing value.
pub const ITEM_CODES: [&str; 9] = ["op", "pur", "sp", "cr", "sale", "sval", "ss", "c_stk", "c_val"];

/// One product row recovered from report text.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub name: String,
    /// Values in [`ITEM_CODES`] order.
    pub values: [f64; 9],
}

impl ItemRow {
    /// Build a row from the first nine numbers; missing columns are 0.
    pub fn from_numbers(name: impl Into<String>, numbers: &[f64]) -> Self {
        let mut values = [0.0; 9];
        for (slot, n) in values.iter_mut().zip(numbers) {
            *slot = *n;
        }
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A way of recovering item rows from report text.
///
/// Strategies are tried in order; the first one that returns a non-empty
/// list wins.
pub trait RowStrategy {
    fn name(&self) -> &'static str;
    fn attempt(&self, text: &str) -> Option<Vec<ItemRow>>;
}

/// Row-per-line, then sectioned scan, then placeholders.
pub fn default_strategies() -> Vec<Box<dyn RowStrategy>> {
    vec![
        Box::new(SuffixedRows),
        Box::new(SectionScanRows),
        Box::new(PlaceholderRows),
    ]
}

/// Parse raw OCR text of a stock & sales statement into a flat record.
///
/// Never fails: text without anything recognisable still yields company,
/// title and date keys plus placeholder items.
pub fn parse_stock_report_text(text: &str) -> FlatRecord {
    parse_with(text, &default_strategies())
}

/// Same as [`parse_stock_report_text`] with an explicit strategy chain.
pub fn parse_with(text: &str, strategies: &[Box<dyn RowStrategy>]) -> FlatRecord {
    let mut record = FlatRecord::new();

    let company = extract_company(text).unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
    record.insert("company_name".into(), Value::from(company));
    if let Some(title) = extract_report_title(text) {
        record.insert("report_title".into(), Value::from(title));
    }
    if let Some(range) = extract_date_range(text) {
        record.insert("date_range".into(), Value::from(range));
    }

    let rows = run_strategies(text, strategies);
    for row in &rows {
        let key_name = sanitize_key(&row.name);
        for (code, value) in ITEM_CODES.iter().zip(row.values) {
            record.insert(format!("item_{key_name}_{code}"), Value::from(value));
        }
    }

    let totals = generic::extract_totals(text).unwrap_or_else(|| {
        debug!("No totals line found, summing parsed rows");
        sum_rows(&rows)
    });
    for (key, value) in totals {
        record.insert(key.to_string(), Value::from(value));
    }

    info!(
        items = rows.len(),
        keys = record.len(),
        "Parsed stock report text"
    );
    record
}

fn run_strategies(text: &str, strategies: &[Box<dyn RowStrategy>]) -> Vec<ItemRow> {
    for strategy in strategies {
        match strategy.attempt(text) {
            Some(rows) if !rows.is_empty() => {
                let rows = dedup_rows(rows);
                info!(strategy = strategy.name(), rows = rows.len(), "Item rows found");
                return rows;
            }
            _ => debug!(strategy = strategy.name(), "No item rows"),
        }
    }
    warn!("Every row strategy came back empty");
    Vec::new()
}

/// Rows sharing a key name would overwrite each other in the record; keep the first.
fn dedup_rows(rows: Vec<ItemRow>) -> Vec<ItemRow> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(sanitize_key(&row.name)))
        .collect()
}

fn sum_rows(rows: &[ItemRow]) -> Vec<(&'static str, f64)> {
    let column = |i: usize| rows.iter().map(|r| r.values[i]).sum::<f64>();
    vec![
        ("summary_opening_qty", column(0)),
        ("summary_purchase_qty", column(1)),
        ("summary_purchase_free", column(2)),
        ("summary_sales_qty", column(4)),
        ("summary_sales_value", column(5)),
        ("summary_closing_qty", column(7)),
        ("summary_closing_value", column(8)),
    ]
}
