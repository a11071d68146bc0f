// src/analytics.rs

use crate::catalog::BrandMatcher;
use crate::report::{FormattedStockReport, StockItem};
use serde::Serialize;
use std::fmt::{self, Write};
use tracing::debug;

pub const SUMMARY_FAILED: &str = "Failed to generate summary";
pub const BRAND_REPORT_FAILED: &str = "Failed to generate brand report";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandMetrics {
    pub total_sale_strips: f64,
    pub total_free_strips: f64,
    pub total_sales_amount: f64,
    pub total_closing_value: f64,
    pub total_purchase_qty: f64,
    pub total_closing_qty: f64,
    pub average_sale_price: f64,
}

/// Items sharing a brand, with their combined movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPerformance {
    pub brand: String,
    pub item_count: usize,
    pub items: Vec<StockItem>,
    pub metrics: BrandMetrics,
}

impl BrandPerformance {
    fn new(brand: String) -> Self {
        Self {
            brand,
            item_count: 0,
            items: Vec::new(),
            metrics: BrandMetrics::default(),
        }
    }

    fn push(&mut self, item: &StockItem) {
        let m = &mut self.metrics;
        m.total_sale_strips += item.sales.qty;
        m.total_free_strips += item.purchase.free;
        m.total_sales_amount += item.sales.value;
        m.total_closing_value += item.closing.value;
        m.total_purchase_qty += item.purchase.qty;
        m.total_closing_qty += item.closing.qty;
        self.item_count += 1;
        self.items.push(item.clone());
    }

    fn finish(&mut self) {
        let m = &mut self.metrics;
        m.average_sale_price = if m.total_sale_strips > 0.0 {
            m.total_sales_amount / m.total_sale_strips
        } else {
            0.0
        };
    }
}

/// Group the report's items by brand, best sellers first.
///
/// Groups with equal sales amounts keep the order in which their first item
/// appeared.
pub fn generate_brand_wise_analysis(
    report: &FormattedStockReport,
    matcher: &BrandMatcher,
) -> Vec<BrandPerformance> {
    let mut groups: Vec<BrandPerformance> = Vec::new();
    for item in &report.items {
        let brand = matcher.brand_for(&item.name);
        match groups.iter_mut().find(|g| g.brand == brand) {
            Some(group) => group.push(item),
            None => {
                let mut group = BrandPerformance::new(brand);
                group.push(item);
                groups.push(group);
            }
        }
    }
    groups.iter_mut().for_each(BrandPerformance::finish);

    groups.sort_by(|a, b| {
        b.metrics
            .total_sales_amount
            .total_cmp(&a.metrics.total_sales_amount)
    });
    debug!(items = report.items.len(), brands = groups.len(), "Brand analysis built");
    groups
}

// ---------------------------------------------------------------------------
// Text reports
// ---------------------------------------------------------------------------

/// One-screen overview of the report.
pub fn generate_summary(report: &FormattedStockReport) -> String {
    render_summary(report).unwrap_or_else(|_| SUMMARY_FAILED.to_string())
}

fn render_summary(report: &FormattedStockReport) -> Result<String, fmt::Error> {
    let s = &report.summary;
    let mut out = String::new();
    writeln!(out, "STOCK REPORT SUMMARY")?;
    writeln!(out, "====================")?;
    writeln!(out, "Company: {}", report.company.name)?;
    writeln!(out, "Report: {}", report.report.title)?;
    writeln!(out, "Period: {}", report.report.date_range)?;
    writeln!(out)?;
    writeln!(out, "Total Items: {}", s.total_items)?;
    writeln!(out, "Opening Qty: {:.0}", s.total_opening_qty)?;
    writeln!(out, "Purchase Qty: {:.0}", s.total_purchase_qty)?;
    writeln!(out, "Sales Qty: {:.0}", s.total_sales_qty)?;
    writeln!(out, "Sales Value: {:.2}", s.total_sales_value)?;
    writeln!(out, "Closing Qty: {:.0}", s.total_closing_qty)?;
    writeln!(out, "Closing Value: {:.2}", s.total_closing_value)?;

    if let Some(top) = report
        .items
        .iter()
        .filter(|i| i.sales.value > 0.0)
        .max_by(|a, b| a.sales.value.total_cmp(&b.sales.value))
    {
        writeln!(out)?;
        writeln!(out, "Top Seller: {} ({:.2})", top.name, top.sales.value)?;
    }
    Ok(out)
}

/// Per-brand breakdown, in the order produced by
/// [`generate_brand_wise_analysis`].
pub fn generate_detailed_brand_report(
    report: &FormattedStockReport,
    matcher: &BrandMatcher,
) -> String {
    let brands = generate_brand_wise_analysis(report, matcher);
    render_brand_report(report, &brands).unwrap_or_else(|_| BRAND_REPORT_FAILED.to_string())
}

fn render_brand_report(
    report: &FormattedStockReport,
    brands: &[BrandPerformance],
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "DETAILED BRAND REPORT")?;
    writeln!(out, "=====================")?;
    writeln!(out, "Company: {}", report.company.name)?;
    writeln!(out, "Period: {}", report.report.date_range)?;
    writeln!(out, "Brands: {}", brands.len())?;

    for (rank, b) in brands.iter().enumerate() {
        let m = &b.metrics;
        writeln!(out)?;
        writeln!(out, "{}. {} ({} items)", rank + 1, b.brand, b.item_count)?;
        writeln!(out, "   Sales: {:.0} strips, {:.2}", m.total_sale_strips, m.total_sales_amount)?;
        writeln!(out, "   Free: {:.0} strips", m.total_free_strips)?;
        writeln!(out, "   Avg Price: {:.2}", m.average_sale_price)?;
        writeln!(out, "   Purchase Qty: {:.0}", m.total_purchase_qty)?;
        writeln!(
            out,
            "   Closing: {:.0} strips, {:.2}",
            m.total_closing_qty, m.total_closing_value
        )?;
        for item in &b.items {
            writeln!(
                out,
                "   - {}: sold {:.0} for {:.2}, closing {:.0}",
                item.name, item.sales.qty, item.sales.value, item.closing.qty
            )?;
        }
    }
    Ok(out)
}
