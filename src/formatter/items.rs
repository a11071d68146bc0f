use super::keys::{DISCOVERY_SUFFIXES, EVIDENCE_SUFFIXES, ITEM_FIELDS};
use crate::record::{FlatRecord, first_present, is_defined, to_number, to_text};
use crate::report::StockItem;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// A way of finding stock items in a flat record.
///
/// Discoveries are tried in order; the first non-empty result wins.
pub trait ItemDiscovery {
    fn name(&self) -> &'static str;
    fn discover(&self, record: &FlatRecord) -> Option<Vec<StockItem>>;
}

pub fn default_discoveries() -> Vec<Box<dyn ItemDiscovery>> {
    vec![Box::new(PatternKeyed), Box::new(Numbered)]
}

fn resolve_fields(
    record: &FlatRecord,
    item: &mut StockItem,
    keys_for: impl Fn(usize) -> Vec<String>,
) {
    for (i, field) in ITEM_FIELDS.iter().enumerate() {
        let value = first_present(record, &keys_for(i)).map_or(0.0, to_number);
        field.slot.apply(item, value);
    }
}

// ---------------------------------------------------------------------------
// item_<NAME>_<suffix>
// ---------------------------------------------------------------------------

static PATTERN_KEY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"^item_(.+)_({})$", DISCOVERY_SUFFIXES.join("|"))).ok()
});

/// Products named inside the key: `item_ACKNOTIN_10_TAB_sale` and so on.
pub struct PatternKeyed;

impl PatternKeyed {
    /// Candidate names in first-seen key order.
    fn candidate_names(record: &FlatRecord) -> Vec<String> {
        let Some(re) = PATTERN_KEY.as_ref() else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for key in record.keys() {
            if let Some(cap) = re.captures(key) {
                let name = &cap[1];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// OCR noise tends to come as a name with every field null.
    fn has_evidence(record: &FlatRecord, name: &str) -> bool {
        EVIDENCE_SUFFIXES
            .iter()
            .filter_map(|s| record.get(&format!("item_{name}_{s}")))
            .any(is_defined)
    }
}

impl ItemDiscovery for PatternKeyed {
    fn name(&self) -> &'static str {
        "pattern_keyed"
    }

    fn discover(&self, record: &FlatRecord) -> Option<Vec<StockItem>> {
        let items = Self::candidate_names(record)
            .into_iter()
            .filter(|name| {
                let keep = Self::has_evidence(record, name);
                if !keep {
                    debug!(name = %name, "Dropping item with no values");
                }
                keep
            })
            .map(|name| {
                let mut item = StockItem::named(name.replace('_', " ").trim());
                resolve_fields(record, &mut item, |i| ITEM_FIELDS[i].pattern_keys(&name));
                item
            })
            .collect();
        Some(items)
    }
}

// ---------------------------------------------------------------------------
// item_<i>_name, item_<i>_sales_qty, ...
// ---------------------------------------------------------------------------

/// Products listed by position, counting from 1 until a name is missing.
pub struct Numbered;

impl Numbered {
    fn name_at(record: &FlatRecord, index: usize) -> Option<String> {
        let probes = [
            format!("item_{index}_name"),
            format!("item_name_{index}"),
            format!("item{index}_name"),
        ];
        if let Some(name) = first_present(record, &probes).and_then(to_text) {
            return Some(name);
        }

        record
            .iter()
            .filter(|(key, _)| Self::mentions_index(key, index))
            .find_map(|(_, value)| to_text(value))
    }

    /// Key contains "item", "name" and `index` as a whole number.
    fn mentions_index(key: &str, index: usize) -> bool {
        let lower = key.to_lowercase();
        if !(lower.contains("item") && lower.contains("name")) {
            return false;
        }
        let wanted = index.to_string();
        lower
            .split(|c: char| !c.is_ascii_digit())
            .any(|run| run == wanted)
    }
}

impl ItemDiscovery for Numbered {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn discover(&self, record: &FlatRecord) -> Option<Vec<StockItem>> {
        let mut items = Vec::new();
        for index in 1.. {
            let Some(name) = Self::name_at(record, index) else {
                break;
            };
            let mut item = StockItem::named(name);
            resolve_fields(record, &mut item, |i| ITEM_FIELDS[i].numbered_keys(index).to_vec());
            items.push(item);
        }
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(v: Value) -> FlatRecord {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn pattern_keyed_resolves_codes_and_synonyms() {
        let r = record(json!({
            "item_ABC_sale": 10,
            "item_ABC_sval": "500",
            "item_ABC_op": 20,
            "item_ABC_c_stk": 12,
            "item_ABC_closing_value": 300.5,
            "item_ZEDOX_GEL_op": "4",
        }));
        let items = PatternKeyed.discover(&r).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "ABC");
        assert_eq!(items[0].sales.value, 500.0);
        assert_eq!(items[0].closing.value, 300.5);
        assert_eq!(items[0].purchase.qty, 0.0);
        assert_eq!(items[1].name, "ZEDOX GEL");
        assert_eq!(items[1].opening.qty, 4.0);
    }

    #[test]
    fn pattern_keyed_drops_all_null_names() {
        let r = record(json!({
            "item_NOISE_sale": null,
            "item_NOISE_sval": "",
            "item_REAL_c_val": 5,
            "item_REAL_op": null,
        }));
        let items = PatternKeyed.discover(&r).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "REAL");
        assert_eq!(items[0].closing.value, 5.0);
    }

    #[test]
    fn numbered_probes_every_key_shape() {
        let r = record(json!({
            "item_1_name": "FIRST",
            "item_1_sales_qty": "5",
            "item_name_2": "SECOND",
            "item_closing_qty_2": 7,
            "item3_name": "THIRD",
            "item3_opening_qty": 1,
            "Item 4 Name": "FOURTH",
            "sales_value_4": "1,200.00",
            "item_6_name": "UNREACHABLE",
        }));
        let items = Numbered.discover(&r).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["FIRST", "SECOND", "THIRD", "FOURTH"]);
        assert_eq!(items[0].sales.qty, 5.0);
        assert_eq!(items[1].closing.qty, 7.0);
        assert_eq!(items[2].opening.qty, 1.0);
        assert_eq!(items[3].sales.value, 1200.0);
    }

    #[test]
    fn index_must_be_a_whole_number() {
        assert!(Numbered::mentions_index("item_12_name", 12));
        assert!(!Numbered::mentions_index("item_12_name", 1));
        assert!(!Numbered::mentions_index("product_1", 1));
    }
}
