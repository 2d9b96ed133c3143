use cesta_core::day::parse_rfc3339;
use cesta_core::{BudgetStatus, DayBoundary};
use rust_decimal::Decimal;

/// `$4.50`
pub fn money(currency: &str, amount: Decimal) -> String {
    format!("{currency}{:.2}", amount.round_dp(2))
}

/// Calendar date of a stored timestamp on the configured day boundary,
/// or the raw string when it does not parse.
pub fn day(boundary: DayBoundary, ts: &str) -> String {
    match parse_rfc3339(ts) {
        Some(t) => boundary.day_of(t).to_string(),
        None => ts.to_string(),
    }
}

/// One-line budget summary.
pub fn budget_line(currency: &str, status: &BudgetStatus) -> String {
    if status.over_budget {
        format!(
            "{} of {} budget, OVER by {}",
            money(currency, status.total),
            money(currency, status.budget),
            money(currency, status.overage)
        )
    } else {
        format!(
            "{} of {} budget, {} left",
            money(currency, status.total),
            money(currency, status.budget),
            money(currency, status.remaining)
        )
    }
}
