use crate::error::CestaError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market ID format: `mkt_<ulid>`
pub type MarketId = String;

/// Session ID format: `ses_<ulid>`
pub type SessionId = String;

/// Canonical product id: trimmed barcode, or lower-cased trimmed name.
pub type ProductId = String;

/// A product known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// A store where prices are observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub name: String,
}

impl Market {
    /// Case-insensitive name comparison on trimmed input.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// One observed price for a product in a market (one JSON object in price_history.json).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub product_id: ProductId,
    pub market_id: MarketId,
    /// Denormalized for display.
    pub market_name: String,
    pub price: Decimal,
    /// RFC 3339, UTC.
    pub date: String,
}

/// A staged or carted line. Staging and cart items share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItem {
    /// `quantity * unit_price`.
    pub fn line_total(&self) -> Result<Decimal, CestaError> {
        self.quantity
            .checked_mul(self.unit_price)
            .ok_or(CestaError::AmountOverflow)
    }
}

/// Sum of line totals, rejecting amounts that overflow.
pub fn total_of(items: &[LineItem]) -> Result<Decimal, CestaError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.line_total()?)
            .ok_or(CestaError::AmountOverflow)
    })
}

pub type StagingItem = LineItem;
pub type CartItem = LineItem;

/// An immutable record of one finalized purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingSession {
    pub id: SessionId,
    pub market_id: MarketId,
    pub market_name: String,
    pub budget: Decimal,
    pub finalized_items: Vec<CartItem>,
    pub total_spent: Decimal,
    pub date: String,
}

/// Cheapest observed price for a product across all markets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheapestPrice {
    pub price: Decimal,
    pub market_name: String,
}

/// Price summary for one product as seen from the current market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPriceInfo {
    pub last_price_in_current_market: Option<Decimal>,
    pub last_price_date_in_current_market: Option<String>,
    pub cheapest_price_overall: Option<CheapestPrice>,
}

impl ProductPriceInfo {
    pub fn has_history(&self) -> bool {
        self.last_price_in_current_market.is_some() || self.cheapest_price_overall.is_some()
    }

    /// The cheapest-overall entry when it is worth pointing at another market:
    /// it must come from a differently named market and beat the last price
    /// seen here (or there must be no price here yet).
    pub fn cheaper_elsewhere(&self, current_market_name: &str) -> Option<&CheapestPrice> {
        let cheapest = self.cheapest_price_overall.as_ref()?;
        if cheapest.market_name.to_lowercase() == current_market_name.to_lowercase() {
            return None;
        }
        match self.last_price_in_current_market {
            Some(here) if cheapest.price >= here => None,
            _ => Some(cheapest),
        }
    }
}

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", ulid::Ulid::new().to_string().to_lowercase())
}

/// Fresh time-ordered market id.
pub fn new_market_id() -> MarketId {
    new_id("mkt")
}

/// Fresh time-ordered session id.
pub fn new_session_id() -> SessionId {
    new_id("ses")
}
