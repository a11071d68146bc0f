use crate::record::parse_number;
use regex::Regex;
use std::sync::LazyLock;

/// Section heading of a stock & sales statement; repeats on every page.
pub(super) static TITLE_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)STOCK\s*(?:&|AND)?\s*SALES?\s+(?:STATEMENT|REPORT|ANALYSIS)").ok()
});

// ---------------------------------------------------------------------------
// Scalar field extractors
// ---------------------------------------------------------------------------

/// First upper-case line naming a "... MEDICINE(S)" business.
pub fn extract_company(text: &str) -> Option<String> {
    let re = Regex::new(r"^[A-Z0-9][A-Z0-9&.,'()\-\s]*\bMEDICINES?\b").ok()?;
    text.lines()
        .map(str::trim)
        .find(|line| re.is_match(line) && *line == line.to_uppercase())
        .map(str::to_string)
}

/// "(01-Apr-2024 TO 30-Apr-2024)" → "01-Apr-2024 TO 30-Apr-2024".
pub fn extract_date_range(text: &str) -> Option<String> {
    let date = r"(\d{1,2}-[A-Z]{3}-\d{4})";
    let re = Regex::new(&format!(r"(?i)\(\s*{date}\s+TO\s+{date}\s*\)")).ok()?;
    re.captures(text)
        .map(|c| format!("{} TO {}", &c[1], &c[2]))
}

/// The title heading, without any trailing date range.
pub fn extract_report_title(text: &str) -> Option<String> {
    let m = TITLE_MARKER.as_ref()?.find(text)?;
    Some(m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Lines read together as one totals block: the TOTAL line and what follows.
const TOTALS_BLOCK_LINES: usize = 3;

/// A line starting the report's totals block ("TOTAL", "GRAND TOTAL",
/// "TOTAL:"). Page totals and products named TOTAL-something do not count.
static TOTAL_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:GRAND\s+)?TOTAL\b").ok());

/// Labels, each followed directly by its figure, within one block.
static LABELLED_TOTALS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let num = r"\s*[:=\-]?\s*(\d[\d,]*(?:\.\d+)?)\b";
    Regex::new(&format!(
        r"(?i)\bOpening\b{num}[^\n]*?\bPurch\b\.?{num}[^\n]*?\bSales\b{num}[^\n]*?\bClosing\b{num}"
    ))
    .ok()
});

/// Report totals as `summary_*` keys.
///
/// Tries the labelled "TOTAL Opening .. Purch. .. Sales .. Closing .." form
/// first, then a bare "TOTAL" line with at least seven numbers. Either one
/// only looks at a totals block, never across the whole text.
pub(super) fn extract_totals(text: &str) -> Option<Vec<(&'static str, f64)>> {
    labelled_totals(text).or_else(|| numeric_totals(text))
}

fn totals_blocks(text: &str) -> impl Iterator<Item = String> + '_ {
    let lines: Vec<&str> = text.lines().collect();
    let starts: Vec<usize> = match TOTAL_LINE.as_ref() {
        Some(re) => (0..lines.len()).filter(|&i| re.is_match(lines[i])).collect(),
        None => Vec::new(),
    };
    starts.into_iter().map(move |i| {
        lines
            .iter()
            .skip(i)
            .take(TOTALS_BLOCK_LINES)
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(" ")
    })
}

fn labelled_totals(text: &str) -> Option<Vec<(&'static str, f64)>> {
    let re = LABELLED_TOTALS.as_ref()?;
    totals_blocks(text).find_map(|block| {
        let cap = re.captures(&block)?;
        let value = |i: usize| parse_number(&cap[i]).unwrap_or(0.0);
        Some(vec![
            ("summary_opening_qty", value(1)),
            ("summary_purchase_qty", value(2)),
            ("summary_sales_value", value(3)),
            ("summary_closing_value", value(4)),
        ])
    })
}

fn numeric_totals(text: &str) -> Option<Vec<(&'static str, f64)>> {
    const KEYS: [&str; 7] = [
        "summary_opening_qty",
        "summary_purchase_qty",
        "summary_purchase_free",
        "summary_sales_qty",
        "summary_sales_value",
        "summary_closing_qty",
        "summary_closing_value",
    ];

    let re = TOTAL_LINE.as_ref()?;
    text.lines()
        .map(str::trim)
        .filter(|line| re.is_match(line))
        .find_map(|line| {
            let numbers = numeric_tokens(line);
            (numbers.len() >= KEYS.len()).then(|| KEYS.iter().copied().zip(numbers).collect())
        })
}

/// Every whitespace-separated token of `s` that reads as a number.
pub(super) fn numeric_tokens(s: &str) -> Vec<f64> {
    s.split_whitespace()
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .filter_map(parse_number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_needs_upper_case_medicine_line() {
        let text = "page 1\nKrishna medicines\nKRISHNA MEDICINES & SURGICALS\nMORE MEDICINE";
        assert_eq!(
            extract_company(text).as_deref(),
            Some("KRISHNA MEDICINES & SURGICALS")
        );
        assert_eq!(extract_company("no company here"), None);
    }

    #[test]
    fn date_range_inside_parentheses() {
        let text = "Stock & Sales Statement ( 01-APR-2024 to 30-APR-2024 )";
        assert_eq!(
            extract_date_range(text).as_deref(),
            Some("01-APR-2024 TO 30-APR-2024")
        );
        assert_eq!(extract_date_range("01-APR-2024 TO 30-APR-2024"), None);
    }

    #[test]
    fn title_is_normalised() {
        let text = "X MEDICINES\nSTOCK  &  SALES   STATEMENT (01-Apr-2024 TO 30-Apr-2024)";
        assert_eq!(
            extract_report_title(text).as_deref(),
            Some("STOCK & SALES STATEMENT")
        );
    }

    #[test]
    fn labelled_totals_win() {
        let text = "TOTAL Opening: 1,200 Purch. 300 Sales 45,000.50 Closing 9,999\n\
                    TOTAL 1 2 3 4 5 6 7";
        let totals = extract_totals(text).unwrap();
        assert_eq!(totals[0], ("summary_opening_qty", 1200.0));
        assert_eq!(totals[1], ("summary_purchase_qty", 300.0));
        assert_eq!(totals[2], ("summary_sales_value", 45000.5));
        assert_eq!(totals[3], ("summary_closing_value", 9999.0));
    }

    #[test]
    fn bare_total_line_needs_seven_numbers() {
        assert!(extract_totals("TOTAL 1 2 3").is_none());

        let totals = extract_totals("Grand\nTOTAL 10 20 2 15 1500.00 15 1800.00").unwrap();
        assert_eq!(totals.len(), 7);
        assert_eq!(totals[3], ("summary_sales_qty", 15.0));
        assert_eq!(totals[6], ("summary_closing_value", 1800.0));
    }

    fn multi_page_statement() -> String {
        (1..=4)
            .map(|p| {
                format!(
                    "STOCK & SALES STATEMENT (01-Apr-2024 TO 30-Apr-2024)\n\
                     ITEM NAME OPENING PURCH. FREE RET SALES VALUE RET CLOSING VALUE\n\
                     ITEM{p} TAB 100 0 0 0 10 1000 0 90 9000\n\
                     PAGE TOTAL\n"
                )
            })
            .collect()
    }

    #[test]
    fn headings_on_later_pages_are_not_totals() {
        assert!(extract_totals(&multi_page_statement()).is_none());
    }

    #[test]
    fn labelled_totals_stay_within_the_total_block() {
        let text = "GRAND TOTAL\nOpening 10 Purch. 2\nSales 300 Closing: 40\n";
        let totals = extract_totals(text).unwrap();
        assert_eq!(totals[0], ("summary_opening_qty", 10.0));
        assert_eq!(totals[3], ("summary_closing_value", 40.0));

        // labels past the block belong to something else
        let far = "TOTAL\n\n\nOpening 10 Purch. 2 Sales 300 Closing 40";
        assert!(extract_totals(far).is_none());
    }

    #[test]
    fn product_named_total_is_not_a_totals_line() {
        let text = "TOTALCARE LOTION 1 2 3 4 5 6 7 8 9\nBETA TAB 1 1 1 1 1 1 1 1 1";
        assert!(extract_totals(text).is_none());

        let totals = extract_totals("Total: 1 2 3 4 5 6 7").unwrap();
        assert_eq!(totals[0], ("summary_opening_qty", 1.0));
    }
}
