use rust_decimal::Decimal;

/// Rejected operations. Every variant is raised before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CestaError {
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("budget must be positive, got {0}")]
    NonPositiveBudget(Decimal),

    #[error("cannot finalize an empty cart")]
    EmptyCart,

    #[error("product {0} is not staged")]
    NotStaged(String),

    #[error("product {0} is not in the cart")]
    NotInCart(String),

    #[error("amount too large: a line or cart total does not fit")]
    AmountOverflow,

    #[error("invalid UTC offset: {0:?} (expected Z, +HH:MM or -HH:MM)")]
    InvalidUtcOffset(String),
}

/// Reject zero and negative prices.
pub fn ensure_positive_price(price: Decimal) -> Result<(), CestaError> {
    if price <= Decimal::ZERO {
        return Err(CestaError::NonPositivePrice(price));
    }
    Ok(())
}

/// Reject zero and negative quantities.
pub fn ensure_positive_quantity(quantity: Decimal) -> Result<(), CestaError> {
    if quantity <= Decimal::ZERO {
        return Err(CestaError::NonPositiveQuantity(quantity));
    }
    Ok(())
}
