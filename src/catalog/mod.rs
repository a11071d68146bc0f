// src/catalog/mod.rs

mod matcher;
mod seed;

pub use matcher::{BrandMatcher, fallback_brand};

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::info;

/// A product family and the names its variants show up under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            aliases: Vec::new(),
            category: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub brands: Vec<Brand>,
}

/// Where a product name landed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandMatch {
    pub brand: String,
    pub division_id: String,
    pub division: String,
}

/// Divisions and their brands, in registration order.
#[derive(Debug, Clone, Default)]
pub struct BrandCatalog {
    divisions: Vec<Division>,
}

impl BrandCatalog {
    pub fn new(divisions: Vec<Division>) -> Self {
        Self { divisions }
    }

    /// The built-in reference catalog.
    pub fn seeded() -> Self {
        Self::new(seed::divisions())
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn brand_count(&self) -> usize {
        self.divisions.iter().map(|d| d.brands.len()).sum()
    }

    pub fn add_division(&mut self, division: Division) -> Result<(), CatalogError> {
        if self.divisions.iter().any(|d| d.id == division.id) {
            return Err(CatalogError::DuplicateDivision(division.id));
        }
        info!(id = %division.id, brands = division.brands.len(), "Division added");
        self.divisions.push(division);
        Ok(())
    }

    pub fn add_brand(&mut self, division_id: &str, brand: Brand) -> Result<(), CatalogError> {
        let division = self
            .divisions
            .iter_mut()
            .find(|d| d.id == division_id)
            .ok_or_else(|| CatalogError::UnknownDivision(division_id.to_string()))?;
        if division
            .brands
            .iter()
            .any(|b| b.name.eq_ignore_ascii_case(&brand.name))
        {
            return Err(CatalogError::DuplicateBrand {
                division: division_id.to_string(),
                brand: brand.name,
            });
        }
        info!(division = %division_id, brand = %brand.name, "Brand added");
        division.brands.push(brand);
        Ok(())
    }

    /// Look up a product name. First hit wins, trying in turn: exact brand
    /// name, brand name prefix, exact alias, alias prefix. Comparisons ignore
    /// case; within each rule divisions and brands are walked in
    /// registration order.
    pub fn find_brand(&self, product_name: &str) -> Option<BrandMatch> {
        let product = product_name.trim().to_uppercase();
        if product.is_empty() {
            return None;
        }

        let exact = |candidate: &str| {
            let c = candidate.trim();
            !c.is_empty() && product == c.to_uppercase()
        };
        let prefix = |candidate: &str| {
            let c = candidate.trim();
            !c.is_empty() && product.starts_with(&c.to_uppercase())
        };

        self.first_match(|b| exact(b.name.as_str()))
            .or_else(|| self.first_match(|b| prefix(b.name.as_str())))
            .or_else(|| self.first_match(|b| b.aliases.iter().any(|a| exact(a.as_str()))))
            .or_else(|| self.first_match(|b| b.aliases.iter().any(|a| prefix(a.as_str()))))
    }

    fn first_match(&self, hit: impl Fn(&Brand) -> bool) -> Option<BrandMatch> {
        self.divisions.iter().find_map(|division| {
            division
                .brands
                .iter()
                .find(|brand| hit(*brand))
                .map(|brand| BrandMatch {
                    brand: brand.name.clone(),
                    division_id: division.id.clone(),
                    division: division.name.clone(),
                })
        })
    }
}

/// The catalog shared between readers and the add-brand/add-division
/// mutators. Reads run concurrently; a mutation waits for them.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<BrandCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: BrandCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(BrandCatalog::seeded())
    }

    /// Run `f` against the current catalog.
    pub fn read<T>(&self, f: impl FnOnce(&BrandCatalog) -> T) -> Result<T, CatalogError> {
        let guard = self.inner.read().map_err(|_| CatalogError::Poisoned)?;
        Ok(f(&guard))
    }

    pub fn add_division(&self, division: Division) -> Result<(), CatalogError> {
        let mut guard = self.inner.write().map_err(|_| CatalogError::Poisoned)?;
        guard.add_division(division)
    }

    pub fn add_brand(&self, division_id: &str, brand: Brand) -> Result<(), CatalogError> {
        let mut guard = self.inner.write().map_err(|_| CatalogError::Poisoned)?;
        guard.add_brand(division_id, brand)
    }

    /// Copy of the catalog as it is right now.
    pub fn snapshot(&self) -> Result<BrandCatalog, CatalogError> {
        self.read(BrandCatalog::clone)
    }
}
