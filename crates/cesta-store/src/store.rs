//! The four persisted collections.
//!
//! Each collection is a flat JSON array in its own file under `data/`. The
//! whole store is read once when opened and each collection is rewritten in
//! full after every mutation. An unreadable or corrupt file loads as an empty
//! collection; a failed write is logged and the in-memory state is kept.

use crate::config::StoreConfig;
use crate::paths::StorePaths;
use cesta_core::{DayBoundary, Market, PriceRecord, Product, ShoppingSession};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Markets,
    Products,
    PriceHistory,
    Sessions,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Markets,
        Collection::Products,
        Collection::PriceHistory,
        Collection::Sessions,
    ];

    pub fn path(self, paths: &StorePaths) -> &Path {
        match self {
            Collection::Markets => &paths.markets_json,
            Collection::Products => &paths.products_json,
            Collection::PriceHistory => &paths.price_history_json,
            Collection::Sessions => &paths.sessions_json,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Markets => write!(f, "markets"),
            Collection::Products => write!(f, "products"),
            Collection::PriceHistory => write!(f, "price_history"),
            Collection::Sessions => write!(f, "sessions"),
        }
    }
}

/// In-memory copy of every collection plus the settings that shape them.
#[derive(Debug)]
pub struct Store {
    paths: StorePaths,
    day_boundary: DayBoundary,
    markets: Vec<Market>,
    products: Vec<Product>,
    price_history: Vec<PriceRecord>,
    sessions: Vec<ShoppingSession>,
}

/// Read a collection file. A missing file is an empty collection.
fn read_collection<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

fn load_collection<T: DeserializeOwned>(paths: &StorePaths, collection: Collection) -> Vec<T> {
    let path = collection.path(paths);
    match read_collection(path) {
        Ok(items) => {
            tracing::debug!(%collection, count = items.len(), "loaded collection");
            items
        }
        Err(e) => {
            tracing::warn!(
                %collection,
                path = %path.display(),
                error = %e,
                "collection unreadable, starting empty"
            );
            Vec::new()
        }
    }
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    crate::write_atomic(path, json.as_bytes())
}

impl Store {
    /// Open the store at `paths`, reading config and all four collections.
    /// Never fails: anything unreadable starts empty.
    pub fn open(paths: StorePaths) -> Self {
        let config = StoreConfig::load_or_default(&paths.config_json);
        let day_boundary = config.day_boundary().unwrap_or_default();
        Self::open_with(paths, day_boundary)
    }

    /// Open with an explicit day boundary, ignoring `config.json`.
    pub fn open_with(paths: StorePaths, day_boundary: DayBoundary) -> Self {
        Self {
            markets: load_collection(&paths, Collection::Markets),
            products: load_collection(&paths, Collection::Products),
            price_history: load_collection(&paths, Collection::PriceHistory),
            sessions: load_collection(&paths, Collection::Sessions),
            day_boundary,
            paths,
        }
    }

    /// Open the store under `root`.
    pub fn open_at(root: impl Into<PathBuf>) -> Self {
        Self::open(StorePaths::discover(root))
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn day_boundary(&self) -> DayBoundary {
        self.day_boundary
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn price_history(&self) -> &[PriceRecord] {
        &self.price_history
    }

    pub fn sessions(&self) -> &[ShoppingSession] {
        &self.sessions
    }

    /// Mutate the markets collection, then write it out.
    pub fn update_markets<R>(&mut self, f: impl FnOnce(&mut Vec<Market>) -> R) -> R {
        let out = f(&mut self.markets);
        self.persist(Collection::Markets);
        out
    }

    /// Mutate the products collection, then write it out.
    pub fn update_products<R>(&mut self, f: impl FnOnce(&mut Vec<Product>) -> R) -> R {
        let out = f(&mut self.products);
        self.persist(Collection::Products);
        out
    }

    /// Mutate the price history, then write it out.
    pub fn update_price_history<R>(&mut self, f: impl FnOnce(&mut Vec<PriceRecord>) -> R) -> R {
        let out = f(&mut self.price_history);
        self.persist(Collection::PriceHistory);
        out
    }

    /// Mutate the sessions collection, then write it out.
    pub fn update_sessions<R>(&mut self, f: impl FnOnce(&mut Vec<ShoppingSession>) -> R) -> R {
        let out = f(&mut self.sessions);
        self.persist(Collection::Sessions);
        out
    }

    /// Write one collection in full.
    pub fn save(&self, collection: Collection) -> anyhow::Result<()> {
        let path = collection.path(&self.paths);
        match collection {
            Collection::Markets => write_collection(path, &self.markets),
            Collection::Products => write_collection(path, &self.products),
            Collection::PriceHistory => write_collection(path, &self.price_history),
            Collection::Sessions => write_collection(path, &self.sessions),
        }
    }

    fn persist(&self, collection: Collection) {
        if let Err(e) = self.save(collection) {
            tracing::error!(
                %collection,
                path = %collection.path(&self.paths).display(),
                error = %e,
                "failed to write collection, keeping in-memory state"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn milk() -> Product {
        Product {
            id: "111".into(),
            name: "Milk".into(),
            barcode: Some("111".into()),
        }
    }

    #[test]
    fn fresh_store_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open_at(tmp.path());
        assert!(store.markets().is_empty());
        assert!(store.products().is_empty());
        assert!(store.price_history().is_empty());
        assert!(store.sessions().is_empty());
        assert_eq!(store.day_boundary(), DayBoundary::UTC);
    }

    #[test]
    fn mutations_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_at(tmp.path());
        store.update_products(|p| p.push(milk()));
        store.update_price_history(|h| {
            h.push(PriceRecord {
                product_id: "111".into(),
                market_id: "mkt_a".into(),
                market_name: "A".into(),
                price: Decimal::new(450, 2),
                date: "2026-03-01T10:00:00Z".into(),
            })
        });

        let reopened = Store::open_at(tmp.path());
        assert_eq!(reopened.products(), &[milk()]);
        assert_eq!(reopened.price_history().len(), 1);
        assert_eq!(reopened.price_history()[0].price, Decimal::new(450, 2));
        assert!(reopened.markets().is_empty());
    }

    #[test]
    fn update_returns_closure_value() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_at(tmp.path());
        let len = store.update_markets(|m| {
            m.push(Market {
                id: "mkt_1".into(),
                name: "A".into(),
            });
            m.len()
        });
        assert_eq!(len, 1);
        assert!(store.paths().markets_json.exists());
    }

    #[test]
    fn corrupt_collection_loads_empty_others_intact() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_at(tmp.path());
        store.update_products(|p| p.push(milk()));
        std::fs::write(&store.paths().markets_json, "{not json").unwrap();

        let reopened = Store::open_at(tmp.path());
        assert!(reopened.markets().is_empty());
        assert_eq!(reopened.products().len(), 1);
    }

    #[test]
    fn blank_file_is_empty_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::discover(tmp.path());
        paths.ensure_layout().unwrap();
        std::fs::write(&paths.sessions_json, "\n").unwrap();
        let store = Store::open(paths);
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn day_boundary_comes_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::discover(tmp.path());
        let mut config = StoreConfig::default();
        config.set("utc_offset", "-03:00").unwrap();
        config.save(&paths.config_json).unwrap();

        let store = Store::open(paths);
        assert_eq!(store.day_boundary().to_string(), "-03:00");
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::discover(tmp.path());
        // A regular file where the data directory should be makes every write fail.
        std::fs::write(&paths.data_dir, b"").unwrap();
        let mut store = Store::open(paths);
        store.update_products(|p| p.push(milk()));
        assert_eq!(store.products().len(), 1);
        assert!(store.save(Collection::Products).is_err());
    }
}
