use super::generic::{TITLE_MARKER, numeric_tokens};
use super::{DOSAGE_SUFFIXES, ITEM_CODES, ItemRow, RowStrategy};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// How far below an item header the sectioned scan looks for its numbers.
const LOOKAHEAD_LINES: usize = 10;

fn suffix_alternation() -> String {
    DOSAGE_SUFFIXES.join("|")
}

/// `<NAME><suffix> n n n ...` with nothing but numbers after the suffix.
static ROW_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let pattern = format!(
        r"^\s*(?P<name>[A-Z][A-Z0-9 .\-/+&()']*?\b(?:{}))\s+(?P<nums>(?:{num}\s+)*{num})\s*$",
        suffix_alternation(),
        num = r"-?[\d,]*\.?\d+"
    );
    Regex::new(&pattern).ok()
});

/// `<NAME><suffix>` at the start of a line, up to the last suffix on it.
static ITEM_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let pattern = format!(
        r"^\s*(?P<name>[A-Z][A-Z0-9 .\-/+&()']*\b(?:{}))\b",
        suffix_alternation()
    );
    Regex::new(&pattern).ok()
});

// ---------------------------------------------------------------------------
// Primary: one complete row per line
// ---------------------------------------------------------------------------

/// Lines that carry a product name ending in a dosage suffix followed by at
/// least nine numbers, mapped positionally onto the report columns.
pub struct SuffixedRows;

impl RowStrategy for SuffixedRows {
    fn name(&self) -> &'static str {
        "suffixed_rows"
    }

    fn attempt(&self, text: &str) -> Option<Vec<ItemRow>> {
        let re = ROW_LINE.as_ref()?;
        let rows: Vec<ItemRow> = text
            .lines()
            .filter_map(|line| {
                let cap = re.captures(line)?;
                let numbers = numeric_tokens(&cap["nums"]);
                if numbers.len() < ITEM_CODES.len() {
                    return None;
                }
                Some(ItemRow::from_numbers(cap["name"].trim(), &numbers))
            })
            .collect();
        Some(rows)
    }
}

// ---------------------------------------------------------------------------
// Secondary: item headers with numbers spread over following lines
// ---------------------------------------------------------------------------

/// For layouts where OCR wrapped a row: find item headers section by
/// section and gather numbers from the header line and the lines below it.
pub struct SectionScanRows;

impl SectionScanRows {
    fn sections(text: &str) -> Vec<&str> {
        let Some(marker) = TITLE_MARKER.as_ref() else {
            return vec![text];
        };
        let sections: Vec<&str> = marker
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .collect();
        if sections.is_empty() { vec![text] } else { sections }
    }

    fn scan_section(header: &Regex, section: &str) -> Vec<ItemRow> {
        let lines: Vec<&str> = section.lines().collect();
        let mut rows = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let Some(m) = header.captures(line).and_then(|c| c.name("name")) else {
                continue;
            };

            let mut numbers = numeric_tokens(&line[m.end()..]);
            for next in lines.iter().skip(i + 1).take(LOOKAHEAD_LINES) {
                if numbers.len() >= ITEM_CODES.len() || header.is_match(next) {
                    break;
                }
                numbers.extend(numeric_tokens(next));
            }

            if numbers.is_empty() {
                debug!(name = m.as_str(), "Item header without numbers");
                continue;
            }
            rows.push(ItemRow::from_numbers(m.as_str().trim(), &numbers));
        }
        rows
    }
}

impl RowStrategy for SectionScanRows {
    fn name(&self) -> &'static str {
        "section_scan"
    }

    fn attempt(&self, text: &str) -> Option<Vec<ItemRow>> {
        let header = ITEM_HEADER.as_ref()?;
        Some(
            Self::sections(text)
                .into_iter()
                .flat_map(|section| Self::scan_section(header, section))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Last resort: placeholders
// ---------------------------------------------------------------------------

/// Two zero-valued items, so a report never comes back with no items at all.
pub struct PlaceholderRows;

impl RowStrategy for PlaceholderRows {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn attempt(&self, _text: &str) -> Option<Vec<ItemRow>> {
        warn!("No item rows recognised, emitting placeholder items");
        Some(vec![
            ItemRow::from_numbers("UNPARSED ITEM 1", &[]),
            ItemRow::from_numbers("UNPARSED ITEM 2", &[]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_needs_nine_numbers() {
        let text = "\
ACKNOTIN 10 TAB 1 2 3 4 5 6 7 8 9
SHORT CAP 1 2 3
no suffix here 1 2 3 4 5 6 7 8 9
";
        let rows = SuffixedRows.attempt(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "ACKNOTIN 10 TAB");
        assert_eq!(rows[0].values, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn name_runs_to_the_last_suffix_before_numbers() {
        let rows = SuffixedRows
            .attempt("ESCNX PLUS 10 TAB 5 5 0 0 5 450.00 0 5 1,450.00")
            .unwrap();
        assert_eq!(rows[0].name, "ESCNX PLUS 10 TAB");
        assert_eq!(rows[0].values[8], 1450.0);
    }

    #[test]
    fn section_scan_collects_wrapped_numbers() {
        let text = "\
STOCK & SALES STATEMENT
FOLITRAX D3 CAP 12 4
0 0 3
300.00 0 13 1300.00
ZEDOX GEL
5 0 0 0 1 90 0 4 360
STOCK & SALES STATEMENT
LONELY SYRUP
";
        let rows = SectionScanRows.attempt(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "FOLITRAX D3 CAP");
        assert_eq!(
            rows[0].values,
            [12.0, 4.0, 0.0, 0.0, 3.0, 300.0, 0.0, 13.0, 1300.0]
        );
        assert_eq!(rows[1].name, "ZEDOX GEL");
        assert_eq!(rows[1].values[5], 90.0);
    }

    #[test]
    fn section_scan_stops_at_next_header() {
        let text = "ALPHA TAB 1\nBETA TAB 2 3\n";
        let rows = SectionScanRows.attempt(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values[..2], [1.0, 0.0]);
        assert_eq!(rows[1].values[..2], [2.0, 3.0]);
    }

    #[test]
    fn placeholders_are_never_empty() {
        let rows = PlaceholderRows.attempt("").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.values.iter().all(|v| *v == 0.0)));
    }
}
