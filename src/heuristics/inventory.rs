// src/heuristics/inventory.rs

//! Loose inventory-line scanner.
//!
//! Reads "name followed by a run of numbers" lines without requiring a dosage
//! suffix or a full set of columns. Coarser than the row strategies, useful
//! as a preview of what a document contains.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::info;

pub const DEFAULT_MAX_LINES: usize = 50;

const HEADER_WORDS: &[&str] = &[
    "ITEM", "NAME", "MEDICINE", "DRUG", "S.NO", "SR.NO", "OPENING", "PURCHASE", "SALES", "CLOSING",
    "QTY", "QUANTITY",
];

/// One inventory line; zero figures are reported as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLine {
    pub item_name: String,
    pub opening_qty: Option<u32>,
    pub purchase_qty: Option<u32>,
    pub purchase_free: Option<u32>,
    pub sales_qty: Option<u32>,
    pub sales_value: Option<f64>,
    pub closing_qty: Option<u32>,
    pub closing_value: Option<f64>,
}

const NAME: &str = r"([A-Z][A-Z\s\d\-\.\(\)/]{3,50}?)";
const NUM: &str = r"(\d+(?:\.\d+)?)";

/// Row shapes, tried in order: six or seven space separated columns, a name
/// and a number run split by a wide gap, tab separated. Names are matched
/// shortest-first so a strength ("ZEDOX 200") only joins the name when the
/// columns can do without it.
static LINE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let six = std::iter::repeat_n(format!(r"\s+{NUM}"), 6).collect::<String>();
    [
        format!(r"^{NAME}{six}(?:\s+{NUM})?\s*$"),
        format!(r"^{NAME}\s{{2,}}([\d\s\.]+)$"),
        format!(r"^{NAME}\t+([\d\t\.]+)$"),
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(NUM).ok());

/// Scan `text` for inventory lines, de-duplicated by name, at most `max_lines`.
pub fn extract_inventory_lines(text: &str, max_lines: usize) -> Vec<InventoryLine> {
    let lines: Vec<&str> = text.lines().collect();
    info!(lines = lines.len(), "Scanning for inventory lines");

    let mut seen = HashSet::new();
    let items: Vec<InventoryLine> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.len() >= 5 && !is_header(l))
        .filter_map(parse_line)
        .filter(|item| {
            let key = item.item_name.trim().to_uppercase();
            !key.is_empty() && seen.insert(key)
        })
        .take(max_lines)
        .collect();

    info!(items = items.len(), "Inventory lines extracted");
    items
}

fn is_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    HEADER_WORDS.iter().any(|w| upper.contains(w))
}

fn parse_line(line: &str) -> Option<InventoryLine> {
    for (i, re) in LINE_PATTERNS.iter().enumerate() {
        let Some(cap) = re.captures(line) else {
            continue;
        };
        let name = cap[1].trim();
        if !is_valid_medicine_name(name) {
            continue;
        }

        let mut numbers: Vec<f64> = if i == 0 {
            (2..=8)
                .map(|g| cap.get(g).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0))
                .collect()
        } else {
            let run = cap.get(2).map_or("", |m| m.as_str());
            NUMBER
                .as_ref()
                .map(|re| {
                    re.find_iter(run)
                        .filter_map(|m| m.as_str().parse().ok())
                        .collect()
                })
                .unwrap_or_default()
        };
        numbers.resize(numbers.len().max(7), 0.0);

        let qty = |v: f64| (v != 0.0).then_some(v as u32);
        let value = |v: f64| (v != 0.0).then_some((v * 100.0).round() / 100.0);
        return Some(InventoryLine {
            item_name: name.to_string(),
            opening_qty: qty(numbers[0]),
            purchase_qty: qty(numbers[1]),
            purchase_free: qty(numbers[2]),
            sales_qty: qty(numbers[3]),
            sales_value: value(numbers[4]),
            closing_qty: qty(numbers[5]),
            closing_value: value(numbers[6]),
        });
    }
    None
}

/// 3..=60 chars, has a letter, is not just a number, at most 30% odd characters.
fn is_valid_medicine_name(name: &str) -> bool {
    let len = name.chars().count();
    if !(3..=60).contains(&len) {
        return false;
    }
    if !name.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if name.trim().parse::<f64>().is_ok() {
        return false;
    }
    let special = name
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || c.is_whitespace() || "-.()/".contains(*c)))
        .count();
    special as f64 <= len as f64 * 0.3
}
