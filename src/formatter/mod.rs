// src/formatter/mod.rs

mod items;
pub mod keys;

pub use items::{ItemDiscovery, Numbered, PatternKeyed, default_discoveries};

use crate::error::FormatError;
use crate::heuristics::{self, UNKNOWN_COMPANY};
use crate::record::{FlatRecord, first_present, to_number, to_text};
use crate::report::{
    CompanyInfo, FormattedStockReport, ReportMeta, ReportSummary, StockItem, now_rfc3339,
};
use keys::{
    COMPANY_KEYS, DATE_RANGE_KEYS, SUMMARY_CLOSING_VALUE_KEYS, SUMMARY_OPENING_KEYS,
    SUMMARY_PURCHASE_KEYS, SUMMARY_SALES_VALUE_KEYS, TITLE_KEYS,
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const DEFAULT_TITLE: &str = "Stock Report";
pub const DEFAULT_DATE_RANGE: &str = "Unknown Period";

/// Build a typed report from an OCR extraction.
///
/// `extraction` is either the flat record itself or an envelope whose
/// `content` holds it (as an object or as a JSON string). Malformed JSON is
/// sanitised and retried, then the envelope itself is used. Only an
/// extraction that is not an object at all is an error.
pub fn format_stock_report(extraction: &Value) -> Result<FormattedStockReport, FormatError> {
    let record = decode(extraction)?;
    Ok(format_record(&record))
}

/// [`format_stock_report`], degrading to a metadata-only report on error.
pub fn format_or_fallback(extraction: &Value) -> FormattedStockReport {
    format_stock_report(extraction).unwrap_or_else(|e| {
        warn!(error = %e, "Formatting failed, returning minimal report");
        FormattedStockReport::minimal(UNKNOWN_COMPANY, DEFAULT_TITLE)
    })
}

/// Text path: parse raw OCR text, then format the resulting record.
pub fn format_text(text: &str) -> FormattedStockReport {
    format_record(&heuristics::parse_stock_report_text(text))
}

/// Format an already flat record. Cannot fail.
pub fn format_record(record: &FlatRecord) -> FormattedStockReport {
    format_record_with(record, &default_discoveries())
}

pub fn format_record_with(
    record: &FlatRecord,
    discoveries: &[Box<dyn ItemDiscovery>],
) -> FormattedStockReport {
    let items = discover_items(record, discoveries);
    let summary = summarize(record, &items);

    let report = FormattedStockReport {
        company: CompanyInfo {
            name: metadata(record, COMPANY_KEYS, UNKNOWN_COMPANY),
        },
        report: ReportMeta {
            title: metadata(record, TITLE_KEYS, DEFAULT_TITLE),
            date_range: metadata(record, DATE_RANGE_KEYS, DEFAULT_DATE_RANGE),
            generated_at: now_rfc3339(),
        },
        items,
        summary,
    };

    info!(
        company = %report.company.name,
        items = report.summary.total_items,
        sales_value = report.summary.total_sales_value,
        "Formatted stock report"
    );
    report
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Reduce an extraction to the flat record it carries.
pub fn decode(extraction: &Value) -> Result<FlatRecord, FormatError> {
    match extraction {
        Value::Object(outer) => match outer.get("content") {
            Some(Value::String(content)) => match parse_lenient(content) {
                Ok(Value::Object(inner)) => Ok(inner),
                Ok(other) => {
                    debug!(kind = kind_of(&other), "Content is not an object, using envelope");
                    Ok(outer.clone())
                }
                Err(e) => {
                    warn!(error = %e, "Content is not JSON, using envelope");
                    Ok(outer.clone())
                }
            },
            Some(Value::Object(inner)) => Ok(inner.clone()),
            _ => Ok(outer.clone()),
        },
        Value::String(raw) => match parse_lenient(raw)? {
            Value::Object(inner) => Ok(inner),
            other => Err(FormatError::NotAnObject {
                kind: kind_of(&other),
            }),
        },
        other => Err(FormatError::NotAnObject {
            kind: kind_of(other),
        }),
    }
}

/// Parse as-is; failing that, sanitise and try once more.
fn parse_lenient(raw: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(raw) {
        Ok(v) => Ok(v),
        Err(first) => {
            debug!(error = %first, "JSON decode failed, retrying sanitised");
            serde_json::from_str(&sanitize_json(raw)).map_err(|_| first)
        }
    }
}

static TRAILING_COMMA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").ok());

/// Drop control characters (NUL noise included), markdown fences, text
/// around the outermost object, and trailing commas.
pub fn sanitize_json(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let trimmed = cleaned
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let object = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    };

    match TRAILING_COMMA.as_ref() {
        Some(re) => re.replace_all(object, "$1").into_owned(),
        None => object.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Metadata, items, summary
// ---------------------------------------------------------------------------

/// First synonym holding usable text; booleans, arrays and objects are skipped.
fn metadata(record: &FlatRecord, keys: &[&str], default: &str) -> String {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(to_text)
        .unwrap_or_else(|| default.to_string())
}

fn discover_items(record: &FlatRecord, discoveries: &[Box<dyn ItemDiscovery>]) -> Vec<StockItem> {
    for discovery in discoveries {
        match discovery.discover(record) {
            Some(items) if !items.is_empty() => {
                debug!(strategy = discovery.name(), items = items.len(), "Items discovered");
                return items;
            }
            _ => debug!(strategy = discovery.name(), "No items"),
        }
    }
    warn!(keys = record.len(), "No items found in record");
    Vec::new()
}

/// Sales and closing quantities are summed from items; the opening,
/// purchase and value totals only come from `summary_*` keys.
fn summarize(record: &FlatRecord, items: &[StockItem]) -> ReportSummary {
    let explicit = |keys: &[&str]| first_present(record, keys).map_or(0.0, to_number);
    ReportSummary {
        total_items: items.len(),
        total_opening_qty: explicit(SUMMARY_OPENING_KEYS),
        total_purchase_qty: explicit(SUMMARY_PURCHASE_KEYS),
        total_sales_qty: items.iter().map(|i| i.sales.qty).sum(),
        total_closing_qty: items.iter().map(|i| i.closing.qty).sum(),
        total_sales_value: explicit(SUMMARY_SALES_VALUE_KEYS),
        total_closing_value: explicit(SUMMARY_CLOSING_VALUE_KEYS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn flat_record_round_trip() {
        let report = format_stock_report(&json!({
            "item_ABC_sale": 10,
            "item_ABC_sval": 500,
            "item_ABC_op": 20,
            "item_ABC_c_stk": 12,
            "item_ABC_c_val": 300,
        }))
        .unwrap();

        assert_eq!(report.items.len(), 1);
        let item = &report.items[0];
        assert_eq!(item.name, "ABC");
        assert_eq!(item.sales.qty, 10.0);
        assert_eq!(item.sales.value, 500.0);
        assert_eq!(item.opening.qty, 20.0);
        assert_eq!(item.closing.qty, 12.0);
        assert_eq!(item.closing.value, 300.0);
        assert_eq!(item.purchase.qty, 0.0);
        assert_eq!(item.purchase.free, 0.0);
        assert_eq!(item.purchase_return.qty, 0.0);
        assert_eq!(item.sales_return.qty, 0.0);
        assert_eq!(item.sales_return.free, 0.0);
    }

    #[test]
    fn numbered_only_when_pattern_keys_find_nothing() {
        let report = format_stock_report(&json!({
            "item_1_name": "X",
            "item_1_sales_qty": "5",
        }))
        .unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].name, "X");
        assert_eq!(report.items[0].sales.qty, 5.0);

        let report = format_stock_report(&json!({
            "item_1_name": "X",
            "item_ABC_sale": 1,
        }))
        .unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].name, "ABC");
    }

    #[test]
    fn metadata_synonyms_and_defaults() {
        let report = format_stock_report(&json!({
            "Company": "",
            "COMPANY_NAME": "RAJ MEDICINES",
            "period": "01-Apr-2024 TO 30-Apr-2024",
        }))
        .unwrap();
        assert_eq!(report.company.name, "RAJ MEDICINES");
        assert_eq!(report.report.title, DEFAULT_TITLE);
        assert_eq!(report.report.date_range, "01-Apr-2024 TO 30-Apr-2024");
        assert!(report.items.is_empty());
    }

    #[test]
    fn metadata_skips_non_text_synonyms() {
        let report = format_stock_report(&json!({
            "company_name": true,
            "store_name": "REAL MEDICINES",
            "title": ["STOCK"],
            "report_name": "Monthly Stock",
        }))
        .unwrap();
        assert_eq!(report.company.name, "REAL MEDICINES");
        assert_eq!(report.report.title, "Monthly Stock");
    }

    #[test]
    fn summary_reads_explicit_totals_and_sums_the_rest() {
        let report = format_stock_report(&json!({
            "item_A_sale": 2, "item_A_c_stk": 3, "item_A_op": 100, "item_A_sval": 40,
            "item_B_sale": 5, "item_B_c_stk": 1,
            "summary_sales_value": "1,000",
            "summary_closing_value": 250.5,
        }))
        .unwrap();
        let s = &report.summary;
        assert_eq!(s.total_items, 2);
        assert_eq!(s.total_sales_qty, 7.0);
        assert_eq!(s.total_closing_qty, 4.0);
        assert_eq!(s.total_sales_value, 1000.0);
        assert_eq!(s.total_closing_value, 250.5);
        // not derived from items even though item A has an opening figure
        assert_eq!(s.total_opening_qty, 0.0);
        assert_eq!(s.total_purchase_qty, 0.0);
    }

    #[test]
    fn content_string_is_decoded() {
        let report = format_stock_report(&json!({
            "content": "{\"company_name\": \"A MEDICINES\", \"item_X_sale\": 3}"
        }))
        .unwrap();
        assert_eq!(report.company.name, "A MEDICINES");
        assert_eq!(report.items[0].sales.qty, 3.0);
    }

    #[test]
    fn malformed_content_is_sanitised() {
        let content = "```json\n{\"item_X_sale\": 3,\u{0}\n \"item_X_sval\": \"90\",}\n```";
        let report = format_stock_report(&json!({ "content": content })).unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].sales.value, 90.0);
    }

    #[test]
    fn hopeless_content_falls_back_to_envelope() {
        let report = format_stock_report(&json!({
            "content": "not json at all",
            "company_name": "OUTER MEDICINES",
        }))
        .unwrap();
        assert_eq!(report.company.name, "OUTER MEDICINES");
        assert!(report.items.is_empty());
    }

    #[test]
    fn non_objects_are_the_only_errors() {
        assert!(matches!(
            format_stock_report(&json!([1, 2])),
            Err(FormatError::NotAnObject { kind: "array" })
        ));
        assert!(matches!(
            format_stock_report(&json!("{{{")),
            Err(FormatError::Decode(_))
        ));
        assert!(format_stock_report(&json!("{\"item_Q_op\": 1}")).is_ok());

        let fallback = format_or_fallback(&json!(42));
        assert!(fallback.items.is_empty());
        assert_eq!(fallback.company.name, UNKNOWN_COMPANY);
    }

    #[test]
    fn text_path_end_to_end() {
        let report = format_text(
            "PATEL MEDICINES\n\
             STOCK & SALES STATEMENT (01-Apr-2024 TO 30-Apr-2024)\n\
             ACKNOTIN 10 TAB 20 30 3 0 25 2500 1 26 2600\n\
             TOTAL 20 30 3 25 2500 26 2600\n",
        );
        assert_eq!(report.company.name, "PATEL MEDICINES");
        assert_eq!(report.report.title, "STOCK & SALES STATEMENT");
        assert_eq!(report.items[0].name, "ACKNOTIN 10 TAB");
        assert_eq!(report.items[0].sales_return.qty, 1.0);
        assert_eq!(report.summary.total_opening_qty, 20.0);
        assert_eq!(report.summary.total_sales_value, 2500.0);
    }

    fn flat_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i32>().prop_map(Value::from),
            "[0-9,.]{0,8}".prop_map(Value::from),
            "[a-zA-Z ]{0,8}".prop_map(Value::from),
        ]
    }

    fn flat_key() -> impl Strategy<Value = String> {
        prop_oneof![
            ("[A-Z]{1,4}", prop::sample::select(vec!["sale", "sval", "op", "c_stk", "pur"]))
                .prop_map(|(n, s)| format!("item_{n}_{s}")),
            (1usize..4, prop::sample::select(vec!["name", "sales_qty", "closing_qty"]))
                .prop_map(|(i, s)| format!("item_{i}_{s}")),
            "[a-z_]{1,12}",
        ]
    }

    fn flat_entries() -> impl Strategy<Value = Vec<(String, Value)>> {
        prop::collection::vec((flat_key(), flat_value()), 0..16)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Any object formats, with a summary count matching the items.
        #[test]
        fn total_items_matches_items(entries in flat_entries()) {
            let record: FlatRecord = entries.into_iter().collect();
            let report = format_stock_report(&Value::Object(record)).unwrap();
            prop_assert_eq!(report.summary.total_items, report.items.len());
            prop_assert!(report.items.iter().all(|i| i.sales.qty >= 0.0 && i.closing.qty >= 0.0));
        }

        /// Formatting twice gives the same items and summary.
        #[test]
        fn formatting_is_idempotent(entries in flat_entries()) {
            let extraction = Value::Object(entries.into_iter().collect());
            let first = format_stock_report(&extraction).unwrap();
            let second = format_stock_report(&extraction).unwrap();
            prop_assert_eq!(first.items, second.items);
            prop_assert_eq!(first.summary, second.summary);
        }
    }
}
