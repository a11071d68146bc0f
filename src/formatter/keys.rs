// src/formatter/keys.rs

//! Synonym tables: every logical field and the key names OCR output has been
//! seen to use for it, most common first.

use crate::report::StockItem;

pub const COMPANY_KEYS: &[&str] = &[
    "company_name",
    "Company_Name",
    "company",
    "Company",
    "COMPANY_NAME",
    "store_name",
];

pub const TITLE_KEYS: &[&str] = &[
    "report_title",
    "Report_Title",
    "title",
    "Title",
    "REPORT_TITLE",
    "report_name",
];

pub const DATE_RANGE_KEYS: &[&str] = &[
    "date_range",
    "Date_Range",
    "dateRange",
    "period",
    "DATE_RANGE",
    "report_period",
];

// Report-level totals. These are only ever read, never derived from items.
pub const SUMMARY_OPENING_KEYS: &[&str] = &[
    "summary_opening_qty",
    "summary_total_opening_qty",
    "summary_opening",
];
pub const SUMMARY_PURCHASE_KEYS: &[&str] = &[
    "summary_purchase_qty",
    "summary_total_purchase_qty",
    "summary_purchase",
];
pub const SUMMARY_SALES_VALUE_KEYS: &[&str] = &[
    "summary_sales_value",
    "summary_total_sales_value",
    "summary_sales_amount",
];
pub const SUMMARY_CLOSING_VALUE_KEYS: &[&str] = &[
    "summary_closing_value",
    "summary_total_closing_value",
    "summary_closing_val",
];

/// Suffixes whose presence makes an `item_<NAME>_<suffix>` key name a product.
pub const DISCOVERY_SUFFIXES: &[&str] = &["sale", "sval", "op"];

/// Suffixes of which at least one must carry a value for a product to be kept.
pub const EVIDENCE_SUFFIXES: &[&str] = &["sale", "sval", "op", "c_stk", "c_val", "pur", "sp"];

/// Where a resolved number lands on a [`StockItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Opening,
    PurchaseQty,
    PurchaseFree,
    PurchaseReturn,
    SalesQty,
    SalesValue,
    SalesReturn,
    SalesReturnFree,
    ClosingQty,
    ClosingValue,
}

impl Slot {
    /// Store `value`; quantities below zero are stored as 0.
    pub fn apply(self, item: &mut StockItem, value: f64) {
        let qty = value.max(0.0);
        match self {
            Slot::Opening => item.opening.qty = qty,
            Slot::PurchaseQty => item.purchase.qty = qty,
            Slot::PurchaseFree => item.purchase.free = qty,
            Slot::PurchaseReturn => item.purchase_return.qty = qty,
            Slot::SalesQty => item.sales.qty = qty,
            Slot::SalesValue => item.sales.value = value,
            Slot::SalesReturn => item.sales_return.qty = qty,
            Slot::SalesReturnFree => item.sales_return.free = qty,
            Slot::ClosingQty => item.closing.qty = qty,
            Slot::ClosingValue => item.closing.value = value,
        }
    }
}

/// One logical item field.
pub struct ItemField {
    pub slot: Slot,
    /// Tails of pattern keys: `item_<NAME>_<suffix>`.
    pub suffixes: &'static [&'static str],
    /// Stem of numbered keys: `item_<i>_<stem>` and friends.
    pub stem: &'static str,
}

pub const ITEM_FIELDS: &[ItemField] = &[
    ItemField {
        slot: Slot::Opening,
        suffixes: &["op", "opening", "opening_qty", "open"],
        stem: "opening_qty",
    },
    ItemField {
        slot: Slot::PurchaseQty,
        suffixes: &["pur", "purchase", "purchase_qty"],
        stem: "purchase_qty",
    },
    ItemField {
        slot: Slot::PurchaseFree,
        suffixes: &["sp", "pur_free", "purchase_free", "free"],
        stem: "purchase_free",
    },
    ItemField {
        slot: Slot::PurchaseReturn,
        suffixes: &["cr", "pr", "purchase_return"],
        stem: "purchase_return",
    },
    ItemField {
        slot: Slot::SalesQty,
        suffixes: &["sale", "sales", "sales_qty"],
        stem: "sales_qty",
    },
    ItemField {
        slot: Slot::SalesValue,
        suffixes: &["sval", "sales_value", "sales_amount"],
        stem: "sales_value",
    },
    ItemField {
        slot: Slot::SalesReturn,
        suffixes: &["ss", "sr", "sales_return"],
        stem: "sales_return",
    },
    ItemField {
        slot: Slot::SalesReturnFree,
        suffixes: &["ss_free", "sales_return_free"],
        stem: "sales_return_free",
    },
    ItemField {
        slot: Slot::ClosingQty,
        suffixes: &["c_stk", "closing", "closing_qty", "closing_stock"],
        stem: "closing_qty",
    },
    ItemField {
        slot: Slot::ClosingValue,
        suffixes: &["c_val", "closing_value"],
        stem: "closing_value",
    },
];

impl ItemField {
    pub fn pattern_keys(&self, name: &str) -> Vec<String> {
        self.suffixes
            .iter()
            .map(|s| format!("item_{name}_{s}"))
            .collect()
    }

    pub fn numbered_keys(&self, index: usize) -> [String; 4] {
        let s = self.stem;
        [
            format!("item_{index}_{s}"),
            format!("item_{s}_{index}"),
            format!("item{index}_{s}"),
            format!("{s}_{index}"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_quantities_clamp_but_values_do_not() {
        let mut item = StockItem::named("X");
        Slot::SalesQty.apply(&mut item, -3.0);
        Slot::SalesValue.apply(&mut item, -12.5);
        assert_eq!(item.sales.qty, 0.0);
        assert_eq!(item.sales.value, -12.5);
    }

    #[test]
    fn every_slot_has_one_field() {
        for slot in [
            Slot::Opening,
            Slot::PurchaseQty,
            Slot::PurchaseFree,
            Slot::PurchaseReturn,
            Slot::SalesQty,
            Slot::SalesValue,
            Slot::SalesReturn,
            Slot::SalesReturnFree,
            Slot::ClosingQty,
            Slot::ClosingValue,
        ] {
            assert_eq!(ITEM_FIELDS.iter().filter(|f| f.slot == slot).count(), 1);
        }
    }

    #[test]
    fn key_shapes() {
        let sales = ITEM_FIELDS.iter().find(|f| f.slot == Slot::SalesQty).unwrap();
        assert_eq!(sales.pattern_keys("ABC")[0], "item_ABC_sale");
        assert_eq!(
            sales.numbered_keys(3),
            [
                "item_3_sales_qty".to_string(),
                "item_sales_qty_3".to_string(),
                "item3_sales_qty".to_string(),
                "sales_qty_3".to_string(),
            ]
        );
    }
}
