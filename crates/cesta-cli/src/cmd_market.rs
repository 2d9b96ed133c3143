use cesta_ledger::Catalog;
use cesta_store::{Store, StorePaths};
use clap::Subcommand;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum MarketCmd {
    /// Register a market (returns the existing one if the name is taken)
    Add {
        /// Market name
        name: String,
    },
    /// List markets
    List,
    /// Show one market by id or name
    Show {
        /// Market id or name
        market: String,
    },
}

// ── Dispatch ──

pub fn run(cmd: MarketCmd, paths: &StorePaths) -> anyhow::Result<()> {
    match cmd {
        MarketCmd::Add { name } => add(paths, &name),
        MarketCmd::List => list(paths),
        MarketCmd::Show { market } => show(paths, &market),
    }
}

// ── Command Implementations ──

/// `cesta market add <name>`
pub fn add(paths: &StorePaths, name: &str) -> anyhow::Result<()> {
    let (_lock, mut store) = crate::open_store_locked(paths)?;
    let mut catalog = Catalog::new(&mut store);
    let known = catalog.find_market_by_name(name).is_some();
    let market = catalog.add_market(name)?;
    if known {
        println!("Market exists: {} ({})", market.name, market.id);
    } else {
        println!("Added market {} ({})", market.name, market.id);
    }
    Ok(())
}

/// `cesta market list`
pub fn list(paths: &StorePaths) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let catalog = Catalog::new(&mut store);
    if catalog.markets().is_empty() {
        println!("(no markets)");
        return Ok(());
    }
    for market in catalog.markets() {
        println!("{}  {}", market.id, market.name);
    }
    Ok(())
}

/// `cesta market show <market>`
pub fn show(paths: &StorePaths, key: &str) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let catalog = Catalog::new(&mut store);
    let Some(market) = catalog.find_market(key) else {
        anyhow::bail!("no market matches {key:?}");
    };
    let market = market.clone();
    let (visits, prices) = activity(&store, &market.id);
    println!("{}  {}", market.id, market.name);
    println!("  sessions: {visits}");
    println!("  price records: {prices}");
    Ok(())
}

/// Sessions and price records stored for one market.
fn activity(store: &Store, market_id: &str) -> (usize, usize) {
    let visits = store
        .sessions()
        .iter()
        .filter(|s| s.market_id == market_id)
        .count();
    let prices = store
        .price_history()
        .iter()
        .filter(|r| r.market_id == market_id)
        .count();
    (visits, prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cesta_core::day::parse_rfc3339;
    use cesta_core::LineItem;
    use cesta_ledger::SessionRecorder;
    use rust_decimal::Decimal;

    fn init() -> (tempfile::TempDir, StorePaths) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::discover(tmp.path().join("store"));
        crate::cmd_init::execute(&paths).unwrap();
        (tmp, paths)
    }

    fn bread(price: i64) -> LineItem {
        LineItem {
            product_id: "bread".into(),
            product_name: "Bread".into(),
            quantity: Decimal::ONE,
            unit_price: Decimal::new(price, 2),
        }
    }

    #[test]
    fn add_twice_keeps_one_market() {
        let (_tmp, paths) = init();
        add(&paths, "Feira").unwrap();
        add(&paths, "  feira ").unwrap();
        let store = Store::open(paths.clone());
        assert_eq!(store.markets().len(), 1);
        assert_eq!(store.markets()[0].name, "Feira");
        assert!(add(&paths, "   ").is_err());
        assert!(list(&paths).is_ok());
    }

    #[test]
    fn show_counts_sessions_and_prices_per_market() {
        let (_tmp, paths) = init();
        add(&paths, "Feira").unwrap();
        add(&paths, "Corner Store").unwrap();

        let mut store = Store::open(paths.clone());
        let catalog = Catalog::new(&mut store);
        let feira = catalog.find_market("Feira").cloned().unwrap();
        let corner = catalog.find_market("Corner Store").cloned().unwrap();
        let mut recorder = SessionRecorder::new(&mut store);
        let morning = parse_rfc3339("2026-03-01T09:00:00Z").unwrap();
        let evening = parse_rfc3339("2026-03-01T19:00:00Z").unwrap();
        let next_day = parse_rfc3339("2026-03-02T09:00:00Z").unwrap();
        recorder.finalize_at(&feira, Decimal::TEN, &[bread(350)], morning).unwrap();
        recorder.finalize_at(&feira, Decimal::TEN, &[bread(325)], evening).unwrap();
        recorder.finalize_at(&feira, Decimal::TEN, &[bread(300)], next_day).unwrap();
        recorder.finalize_at(&corner, Decimal::TEN, &[bread(400)], morning).unwrap();

        // Same-day visits collapse to one price record.
        assert_eq!(activity(&store, &feira.id), (3, 2));
        assert_eq!(activity(&store, &corner.id), (1, 1));
        assert_eq!(activity(&store, "mkt_missing"), (0, 0));

        assert!(show(&paths, &feira.id).is_ok());
        assert!(show(&paths, "corner store").is_ok());
        let err = show(&paths, "Extra").unwrap_err();
        assert!(err.to_string().contains("no market matches"));
    }

    #[test]
    fn commands_need_an_initialized_store() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::discover(tmp.path().join("missing"));
        assert!(add(&paths, "Feira").is_err());
        assert!(!paths.lock_file.exists());
        assert!(list(&paths).is_err());
    }
}
