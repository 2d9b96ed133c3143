//! Markets and products: registration and identifier resolution.

use cesta_core::identity::{canonical_product_id, lookup_keys, normalize_barcode, IdOrigin};
use cesta_core::{new_market_id, CestaError, Market, Product};
use cesta_store::Store;

pub struct Catalog<'a> {
    store: &'a mut Store,
}

fn origin_of(product: &Product) -> IdOrigin {
    if product.barcode.as_deref() == Some(product.id.as_str()) {
        IdOrigin::Barcode
    } else {
        IdOrigin::Name
    }
}

impl<'a> Catalog<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    // ── Markets ──

    pub fn markets(&self) -> &[Market] {
        self.store.markets()
    }

    /// Register a market, or return the existing one with the same name.
    pub fn add_market(&mut self, name: &str) -> Result<Market, CestaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CestaError::EmptyName("market"));
        }
        if let Some(existing) = self.find_market_by_name(name) {
            return Ok(existing.clone());
        }
        let market = Market {
            id: new_market_id(),
            name: name.to_string(),
        };
        self.store.update_markets(|markets| markets.push(market.clone()));
        tracing::debug!(market_id = %market.id, name = %market.name, "market added");
        Ok(market)
    }

    pub fn find_market_by_name(&self, name: &str) -> Option<&Market> {
        self.store.markets().iter().find(|m| m.name_matches(name))
    }

    pub fn market_by_id(&self, id: &str) -> Option<&Market> {
        self.store.markets().iter().find(|m| m.id == id)
    }

    /// Look a market up by id, then by name.
    pub fn find_market(&self, id_or_name: &str) -> Option<&Market> {
        self.market_by_id(id_or_name.trim())
            .or_else(|| self.find_market_by_name(id_or_name))
    }

    // ── Products ──

    pub fn products(&self) -> &[Product] {
        self.store.products()
    }

    /// Register a product under its canonical id.
    ///
    /// An existing product with the same id takes the new name and keeps its
    /// barcode unless a new one is given. Nothing is written when the stored
    /// record would not change.
    pub fn add_product(&mut self, name: &str, barcode: Option<&str>) -> Result<Product, CestaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CestaError::EmptyName("product"));
        }
        let barcode = normalize_barcode(barcode);
        let (id, origin) = canonical_product_id(name, barcode.as_deref());

        let existing = self.store.products().iter().find(|p| p.id == id).cloned();
        let Some(existing) = existing else {
            let product = Product {
                id,
                name: name.to_string(),
                barcode,
            };
            self.store.update_products(|products| products.push(product.clone()));
            tracing::debug!(product_id = %product.id, "product added");
            return Ok(product);
        };

        if origin_of(&existing) != origin {
            tracing::warn!(
                product_id = %id,
                existing_name = %existing.name,
                new_name = %name,
                "barcode and product name map to the same id; overwriting"
            );
        }
        let updated = Product {
            id,
            name: name.to_string(),
            barcode: barcode.or(existing.barcode.clone()),
        };
        if updated != existing {
            self.store.update_products(|products| {
                if let Some(p) = products.iter_mut().find(|p| p.id == updated.id) {
                    *p = updated.clone();
                }
            });
            tracing::debug!(product_id = %updated.id, "product updated");
        }
        Ok(updated)
    }

    /// Find the product a scanned or typed identifier refers to.
    ///
    /// Tries the trimmed input as an id, then its lower-cased form, then any
    /// product whose barcode equals the trimmed input.
    pub fn resolve(&self, identifier: &str) -> Option<&Product> {
        let keys = lookup_keys(identifier);
        let trimmed = keys.first()?;
        let products = self.store.products();
        keys.iter()
            .find_map(|key| products.iter().find(|p| &p.id == key))
            .or_else(|| {
                products
                    .iter()
                    .find(|p| p.barcode.as_deref() == Some(trimmed.as_str()))
            })
    }

    /// Id to query prices with for an identifier: the resolved product's id,
    /// or the id a not-yet-registered name would get.
    pub fn price_key(&self, identifier: &str) -> Option<String> {
        if let Some(product) = self.resolve(identifier) {
            return Some(product.id.clone());
        }
        let trimmed = identifier.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}
