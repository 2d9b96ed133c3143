use crate::display;
use cesta_core::day::parse_rfc3339;
use cesta_core::{BudgetStatus, ShoppingSession};
use cesta_ledger::SessionRecorder;
use cesta_store::{StoreConfig, StorePaths};
use std::cmp::Reverse;

/// Sessions newest first, at most `limit` of them (0 = all).
fn newest_first(sessions: &[ShoppingSession], limit: usize) -> Vec<&ShoppingSession> {
    let mut sorted: Vec<&ShoppingSession> = sessions.iter().collect();
    sorted.sort_by_cached_key(|s| Reverse(parse_rfc3339(&s.date)));
    if limit > 0 {
        sorted.truncate(limit);
    }
    sorted
}

/// `cesta sessions [--limit N] [--json]`
pub fn execute(paths: &StorePaths, limit: usize, json: bool) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let config = StoreConfig::load_or_default(&paths.config_json);
    let boundary = store.day_boundary();
    let recorder = SessionRecorder::new(&mut store);
    let sessions = newest_first(recorder.sessions(), limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }
    if sessions.is_empty() {
        println!("(no sessions)");
        return Ok(());
    }
    for session in sessions {
        let status = BudgetStatus::new(session.total_spent, session.budget);
        println!(
            "{}  {}  {}",
            display::day(boundary, &session.date),
            session.market_name,
            display::budget_line(&config.currency, &status)
        );
        for item in &session.finalized_items {
            println!(
                "    {} x {} @ {}",
                item.quantity.normalize(),
                item.product_name,
                display::money(&config.currency, item.unit_price)
            );
        }
    }
    Ok(())
}
