use super::{Brand, BrandMatch, Division, SharedCatalog};
use crate::error::CatalogError;
use crate::heuristics::DOSAGE_SUFFIXES;
use tracing::{debug, warn};

/// Maps product names to brands through an injected catalog.
#[derive(Debug, Clone, Default)]
pub struct BrandMatcher {
    catalog: SharedCatalog,
}

impl BrandMatcher {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Catalog lookup only; `None` on a miss or an unreadable catalog.
    pub fn find_brand(&self, product_name: &str) -> Option<BrandMatch> {
        match self.catalog.read(|c| c.find_brand(product_name)) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Brand catalog unavailable");
                None
            }
        }
    }

    /// Brand to group a product under: the catalog's answer if it has one,
    /// otherwise the name's leading token.
    pub fn brand_for(&self, product_name: &str) -> String {
        self.find_brand(product_name)
            .map(|m| m.brand)
            .unwrap_or_else(|| {
                let brand = fallback_brand(product_name);
                debug!(product = product_name, brand = %brand, "Brand not in catalog");
                brand
            })
    }

    pub fn add_brand(&self, division_id: &str, brand: Brand) -> Result<(), CatalogError> {
        self.catalog.add_brand(division_id, brand)
    }

    pub fn add_division(&self, division: Division) -> Result<(), CatalogError> {
        self.catalog.add_division(division)
    }
}

/// Guess a brand from the name alone: drop trailing dosage-form tokens,
/// then keep the first word (words split on whitespace and hyphens).
pub fn fallback_brand(product_name: &str) -> String {
    let upper = product_name.trim().to_uppercase();
    let mut tokens: Vec<&str> = upper
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .collect();

    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|t| DOSAGE_SUFFIXES.contains(t))
    {
        tokens.pop();
    }

    tokens
        .first()
        .map_or_else(|| "UNKNOWN".to_string(), |t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_takes_leading_token() {
        assert_eq!(fallback_brand("zyxo 500 tab"), "ZYXO");
        assert_eq!(fallback_brand("MEGAFOL-D3"), "MEGAFOL");
        assert_eq!(fallback_brand("GEL"), "GEL");
        assert_eq!(fallback_brand("  "), "UNKNOWN");
    }

    #[test]
    fn catalog_first_then_fallback() {
        let matcher = BrandMatcher::new(SharedCatalog::seeded());
        assert_eq!(matcher.brand_for("ESCNX PLUS 10"), "ESCNX");
        assert_eq!(matcher.find_brand("ESCNX PLUS 10").unwrap().division_id, "neuro");
        assert_eq!(matcher.brand_for("MEGAFOL-D3 TAB"), "MEGAFOL");
        assert!(matcher.find_brand("MEGAFOL-D3 TAB").is_none());
    }

    #[test]
    fn additions_apply_immediately() {
        let matcher = BrandMatcher::new(SharedCatalog::seeded());
        matcher
            .add_brand("general", Brand::new("MEGAFOL").with_aliases(&["MGF"]))
            .unwrap();
        assert_eq!(matcher.find_brand("MGF 5").unwrap().brand, "MEGAFOL");
    }
}
