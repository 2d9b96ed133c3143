use crate::prices::PriceLedger;
use cesta_core::day::format_rfc3339;
use cesta_core::error::{ensure_positive_price, ensure_positive_quantity};
use cesta_core::{
    new_session_id, total_of, CartItem, CestaError, Market, ShoppingSession, ShoppingTrip,
};
use cesta_store::Store;
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Turns a finished cart into a stored session and its price records.
pub struct SessionRecorder<'a> {
    store: &'a mut Store,
}

/// Check a purchase and return its total.
fn validate(market: &Market, budget: Decimal, items: &[CartItem]) -> Result<Decimal, CestaError> {
    if items.is_empty() {
        return Err(CestaError::EmptyCart);
    }
    if market.id.trim().is_empty() {
        return Err(CestaError::EmptyIdentifier("market id"));
    }
    if budget <= Decimal::ZERO {
        return Err(CestaError::NonPositiveBudget(budget));
    }
    for item in items {
        if item.product_id.trim().is_empty() {
            return Err(CestaError::EmptyIdentifier("product id"));
        }
        ensure_positive_quantity(item.quantity)?;
        ensure_positive_price(item.unit_price)?;
    }
    total_of(items)
}

impl<'a> SessionRecorder<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn sessions(&self) -> &[ShoppingSession] {
        self.store.sessions()
    }

    /// Store a purchase made now at `market`.
    pub fn finalize(
        &mut self,
        market: &Market,
        budget: Decimal,
        items: &[CartItem],
    ) -> Result<ShoppingSession, CestaError> {
        self.finalize_at(market, budget, items, OffsetDateTime::now_utc())
    }

    /// Store a purchase made at `at`, then record every item's unit price
    /// for `market`. Spending over budget is allowed.
    pub fn finalize_at(
        &mut self,
        market: &Market,
        budget: Decimal,
        items: &[CartItem],
        at: OffsetDateTime,
    ) -> Result<ShoppingSession, CestaError> {
        let total_spent = validate(market, budget, items)?;

        let session = ShoppingSession {
            id: new_session_id(),
            market_id: market.id.clone(),
            market_name: market.name.clone(),
            budget,
            finalized_items: items.to_vec(),
            total_spent,
            date: format_rfc3339(at),
        };
        self.store
            .update_sessions(|sessions| sessions.push(session.clone()));

        let mut ledger = PriceLedger::new(self.store);
        for item in &session.finalized_items {
            ledger.record_at(
                &item.product_id,
                &session.market_id,
                &session.market_name,
                item.unit_price,
                at,
            )?;
        }

        if session.total_spent > budget {
            tracing::info!(
                session_id = %session.id,
                total = %session.total_spent,
                %budget,
                "session finalized over budget"
            );
        } else {
            tracing::debug!(session_id = %session.id, total = %session.total_spent, "session finalized");
        }
        Ok(session)
    }

    /// Finalize a trip's cart and clear the trip. The trip is left untouched
    /// when finalizing fails.
    pub fn checkout(&mut self, trip: &mut ShoppingTrip) -> Result<ShoppingSession, CestaError> {
        let session = self.finalize(trip.market(), trip.budget(), trip.cart())?;
        trip.clear();
        Ok(session)
    }
}
