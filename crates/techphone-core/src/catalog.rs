//! Seed-catalog configuration.
//!
//! The storefront ships with a YAML catalog of sample products
//! (`config/catalog.yaml`); on startup the server upserts it so a fresh
//! database renders a populated shop.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub discount: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_best_seller: bool,
}

fn default_condition() -> String {
    "new".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductConfig>,
}

/// Load and validate the seed catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for product in &catalog.products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(product.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product name: '{}'",
                product.name
            )));
        }

        if product.category.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty category",
                product.name
            )));
        }

        if product.price < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "product '{}' has negative price {}",
                product.name, product.price
            )));
        }

        if product.stock < 0 {
            return Err(ConfigError::Validation(format!(
                "product '{}' has negative stock {}",
                product.name, product.stock
            )));
        }

        if !(0..=100).contains(&product.discount) {
            return Err(ConfigError::Validation(format!(
                "product '{}' has discount {} outside 0–100",
                product.name, product.discount
            )));
        }

        if let Some(rating) = product.rating {
            if rating < Decimal::ZERO || rating > Decimal::from(5) {
                return Err(ConfigError::Validation(format!(
                    "product '{}' has rating {} outside 0–5",
                    product.name, rating
                )));
            }
        }
    }

    Ok(())
}
