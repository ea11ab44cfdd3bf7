use anyhow::{bail, Context};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::errors::AppError;
use crate::models::{AnnuityProduct, IndexDefinition};

/// Read-only product registry, built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Vec<AnnuityProduct>,
}

const SP500: (&str, &str, Option<&str>) = ("sp500", "S&P 500", Some("^GSPC"));

fn product(id: &str, name: &str, carrier: &str, indexes: &[(&str, &str, Option<&str>)]) -> AnnuityProduct {
    AnnuityProduct {
        id: id.to_string(),
        name: name.to_string(),
        carrier: carrier.to_string(),
        indexes: indexes
            .iter()
            .map(|(id, name, ticker)| IndexDefinition::new(id, name, *ticker))
            .collect(),
    }
}

impl ProductCatalog {
    pub fn builtin() -> Self {
        let silac_indexes = [
            SP500,
            ("bloom_versa10", "Bloomberg Versa 10", None),
            ("barc_atlas5", "Barclays Atlas 5", None),
            ("sp500_raven", "S&P 500 RavenPack AI", None),
            ("ndx_gen5", "NDX Generations 5", None),
        ];

        Self {
            products: vec![
                product(
                    "accelerator_plus_10",
                    "Accelerator Plus 10",
                    "Fidelity & Guaranty Life",
                    &[
                        SP500,
                        ("ba10", "Balanced Asset 10 Index", None),
                        ("ba5", "Balanced Asset 5 Index", None),
                        ("bts5", "Barclays Trailblazer Sectors 5", None),
                        ("brk_ma", "BlackRock Market Advantage Index", None),
                        ("gs_global", "GS Global Factor Index", None),
                        ("ms_eq", "Morgan Stanley US Equity Allocator", None),
                    ],
                ),
                product("silac_denali_14", "SILAC Denali 14 Elevation Plus", "SILAC", &silac_indexes),
                product("silac_teton_10", "SILAC Teton 10 Elevation Plus", "SILAC", &silac_indexes),
                product("silac_vega_14", "SILAC Vega Bonus 14", "SILAC", &silac_indexes),
            ],
        }
    }

    /// Build from an explicit product list, rejecting duplicate product ids and duplicate
    /// index ids within a product.
    pub fn from_products(products: Vec<AnnuityProduct>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for p in &products {
            if !seen.insert(p.id.as_str()) {
                bail!("duplicate product id '{}'", p.id);
            }
            let mut index_ids = HashSet::new();
            for idx in &p.indexes {
                if !index_ids.insert(idx.id.as_str()) {
                    bail!("duplicate index id '{}' in product '{}'", idx.id, p.id);
                }
            }
        }
        Ok(Self { products })
    }

    /// Load a JSON array of products.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading product catalog {}", path.display()))?;
        let products: Vec<AnnuityProduct> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing product catalog {}", path.display()))?;
        let catalog = Self::from_products(products)?;
        info!("Loaded {} products from {}", catalog.products.len(), path.display());
        Ok(catalog)
    }

    pub fn all(&self) -> &[AnnuityProduct] {
        &self.products
    }

    pub fn get(&self, product_id: &str) -> Option<&AnnuityProduct> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Market ticker for a product's index. Proprietary indexes have none and need a
    /// manually entered return.
    pub fn resolve_ticker(&self, product_id: &str, index_id: &str) -> Result<String, AppError> {
        let product = self
            .get(product_id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown product '{}'", product_id)))?;
        let index = product.index(index_id).ok_or_else(|| {
            AppError::NotFound(format!("Unknown index '{}' for product '{}'", index_id, product_id))
        })?;

        match index.ticker.as_deref().map(str::trim) {
            Some(ticker) if index.is_fetchable() => Ok(ticker.to_string()),
            _ => Err(AppError::Validation(format!(
                "{} is a proprietary index with no market ticker; enter its return manually",
                index.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order_and_tickers() {
        let catalog = ProductCatalog::builtin();
        let ids: Vec<&str> = catalog.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["accelerator_plus_10", "silac_denali_14", "silac_teton_10", "silac_vega_14"]
        );

        for p in catalog.all() {
            let fetchable: Vec<&str> = p.indexes.iter().filter(|i| i.is_fetchable()).map(|i| i.id.as_str()).collect();
            assert_eq!(fetchable, vec!["sp500"]);
        }
        assert!(ProductCatalog::from_products(catalog.all().to_vec()).is_ok());
    }

    #[test]
    fn test_resolve_ticker() {
        let catalog = ProductCatalog::builtin();
        assert_eq!(catalog.resolve_ticker("silac_vega_14", "sp500").unwrap(), "^GSPC");
        assert!(matches!(
            catalog.resolve_ticker("silac_vega_14", "ndx_gen5"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(catalog.resolve_ticker("nope", "sp500"), Err(AppError::NotFound(_))));
        assert!(matches!(
            catalog.resolve_ticker("silac_vega_14", "nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let p = product("x", "X", "C", &[SP500, SP500]);
        assert!(ProductCatalog::from_products(vec![p]).is_err());

        let a = product("x", "X", "C", &[SP500]);
        assert!(ProductCatalog::from_products(vec![a.clone(), a]).is_err());
    }
}
