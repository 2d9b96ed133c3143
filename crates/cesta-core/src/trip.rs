//! Staging list and cart for one shopping trip.
//!
//! Nothing here is persisted. Items are keyed by product id; moving an item
//! onto a list that already holds that product adds the quantities and keeps
//! the incoming unit price.

use crate::error::{ensure_positive_price, ensure_positive_quantity, CestaError};
use crate::types::{total_of, CartItem, LineItem, Market, StagingItem};
use rust_decimal::Decimal;
use serde::Serialize;

/// Spending against the trip budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    pub total: Decimal,
    pub budget: Decimal,
    /// Budget left, never negative.
    pub remaining: Decimal,
    /// Amount over budget, never negative.
    pub overage: Decimal,
    pub over_budget: bool,
}

impl BudgetStatus {
    pub fn new(total: Decimal, budget: Decimal) -> Self {
        Self {
            total,
            budget,
            remaining: (budget - total).max(Decimal::ZERO),
            overage: (total - budget).max(Decimal::ZERO),
            over_budget: total > budget,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShoppingTrip {
    market: Market,
    budget: Decimal,
    staging: Vec<StagingItem>,
    cart: Vec<CartItem>,
}

/// `list` with `items` merged in. Fails without touching `list` when a
/// quantity or the resulting total overflows.
fn merged(
    list: &[LineItem],
    items: impl IntoIterator<Item = LineItem>,
) -> Result<Vec<LineItem>, CestaError> {
    let mut out = list.to_vec();
    for item in items {
        match out.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CestaError::AmountOverflow)?;
                existing.unit_price = item.unit_price;
            }
            None => out.push(item),
        }
    }
    total_of(&out)?;
    Ok(out)
}

fn position(list: &[LineItem], product_id: &str) -> Option<usize> {
    list.iter().position(|i| i.product_id == product_id)
}

impl ShoppingTrip {
    /// Start a trip at `market`. The budget must be positive.
    pub fn new(market: Market, budget: Decimal) -> Result<Self, CestaError> {
        if budget <= Decimal::ZERO {
            return Err(CestaError::NonPositiveBudget(budget));
        }
        Ok(Self {
            market,
            budget,
            staging: Vec::new(),
            cart: Vec::new(),
        })
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    pub fn staging(&self) -> &[StagingItem] {
        &self.staging
    }

    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    pub fn is_empty(&self) -> bool {
        self.staging.is_empty() && self.cart.is_empty()
    }

    /// Add an item to staging, merging with an existing line for the same product.
    pub fn stage(&mut self, item: StagingItem) -> Result<(), CestaError> {
        if item.product_id.trim().is_empty() {
            return Err(CestaError::EmptyIdentifier("product id"));
        }
        ensure_positive_quantity(item.quantity)?;
        ensure_positive_price(item.unit_price)?;
        self.staging = merged(&self.staging, [item])?;
        Ok(())
    }

    /// Set a staged quantity. Zero or less drops the line.
    pub fn set_staged_quantity(
        &mut self,
        product_id: &str,
        quantity: Decimal,
    ) -> Result<(), CestaError> {
        let idx = position(&self.staging, product_id)
            .ok_or_else(|| CestaError::NotStaged(product_id.to_string()))?;
        if quantity <= Decimal::ZERO {
            self.staging.remove(idx);
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.staging[idx].quantity, quantity);
        if let Err(e) = total_of(&self.staging) {
            self.staging[idx].quantity = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_staged_price(&mut self, product_id: &str, price: Decimal) -> Result<(), CestaError> {
        ensure_positive_price(price)?;
        let idx = position(&self.staging, product_id)
            .ok_or_else(|| CestaError::NotStaged(product_id.to_string()))?;
        let previous = std::mem::replace(&mut self.staging[idx].unit_price, price);
        if let Err(e) = total_of(&self.staging) {
            self.staging[idx].unit_price = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn unstage(&mut self, product_id: &str) -> Option<StagingItem> {
        let idx = position(&self.staging, product_id)?;
        Some(self.staging.remove(idx))
    }

    pub fn move_to_cart(&mut self, product_id: &str) -> Result<(), CestaError> {
        let idx = position(&self.staging, product_id)
            .ok_or_else(|| CestaError::NotStaged(product_id.to_string()))?;
        self.cart = merged(&self.cart, [self.staging[idx].clone()])?;
        self.staging.remove(idx);
        Ok(())
    }

    /// Move every staged line into the cart. Nothing moves if the merged
    /// cart would overflow.
    pub fn move_all_to_cart(&mut self) -> Result<(), CestaError> {
        self.cart = merged(&self.cart, self.staging.iter().cloned())?;
        self.staging.clear();
        Ok(())
    }

    /// Put a cart line back on the staging list.
    pub fn return_to_staging(&mut self, product_id: &str) -> Result<(), CestaError> {
        let idx = position(&self.cart, product_id)
            .ok_or_else(|| CestaError::NotInCart(product_id.to_string()))?;
        self.staging = merged(&self.staging, [self.cart[idx].clone()])?;
        self.cart.remove(idx);
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> Option<CartItem> {
        let idx = position(&self.cart, product_id)?;
        Some(self.cart.remove(idx))
    }

    pub fn staged_total(&self) -> Result<Decimal, CestaError> {
        total_of(&self.staging)
    }

    pub fn cart_total(&self) -> Result<Decimal, CestaError> {
        total_of(&self.cart)
    }

    pub fn staged_budget(&self) -> Result<BudgetStatus, CestaError> {
        Ok(BudgetStatus::new(self.staged_total()?, self.budget))
    }

    pub fn cart_budget(&self) -> Result<BudgetStatus, CestaError> {
        Ok(BudgetStatus::new(self.cart_total()?, self.budget))
    }

    /// Drop both lists after a successful checkout.
    pub fn clear(&mut self) {
        self.staging.clear();
        self.cart.clear();
    }
}
