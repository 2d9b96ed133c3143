use crate::display;
use cesta_core::{DayBoundary, Market, PriceRecord, ProductPriceInfo};
use cesta_ledger::{Catalog, PriceLedger};
use cesta_store::{Store, StoreConfig, StorePaths};
use clap::Subcommand;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum PriceCmd {
    /// Last price at a market and the cheapest price seen anywhere
    Info {
        /// Barcode, product id, or name
        identifier: String,
        /// Market id or name
        #[arg(long)]
        market: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Every recorded price for a product, newest first
    History {
        /// Barcode, product id, or name
        identifier: String,
    },
}

// ── Dispatch ──

pub fn run(cmd: PriceCmd, paths: &StorePaths) -> anyhow::Result<()> {
    match cmd {
        PriceCmd::Info {
            identifier,
            market,
            json,
        } => info(paths, &identifier, &market, json),
        PriceCmd::History { identifier } => history(paths, &identifier),
    }
}

// ── Command Implementations ──

/// What `price info` knows about one product at one market.
struct PriceReport {
    name: String,
    market: Market,
    info: ProductPriceInfo,
}

/// Look the product and market up. An identifier the catalog does not know
/// is still queried under the id its name would get.
fn report(store: &mut Store, identifier: &str, market: &str) -> anyhow::Result<PriceReport> {
    let catalog = Catalog::new(store);
    let Some(key) = catalog.price_key(identifier) else {
        anyhow::bail!("identifier must not be empty");
    };
    let Some(market) = catalog.find_market(market).cloned() else {
        anyhow::bail!("no market matches {market:?}");
    };
    let name = catalog
        .resolve(identifier)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| identifier.trim().to_string());

    let info = PriceLedger::new(store).price_info(&key, &market.id);
    Ok(PriceReport { name, market, info })
}

fn render_report(report: &PriceReport, boundary: DayBoundary, currency: &str) -> Vec<String> {
    let info = &report.info;
    let mut out = vec![format!("{} at {}", report.name, report.market.name)];
    if !info.has_history() {
        out.push("  no price history for this item".to_string());
        return out;
    }
    if let Some(price) = info.last_price_in_current_market {
        let when = info
            .last_price_date_in_current_market
            .as_deref()
            .map(|d| format!(" on {}", display::day(boundary, d)))
            .unwrap_or_default();
        out.push(format!(
            "  last price here: {}{when}",
            display::money(currency, price)
        ));
    }
    if let Some(cheapest) = &info.cheapest_price_overall {
        out.push(format!(
            "  cheapest seen:   {} at {}",
            display::money(currency, cheapest.price),
            cheapest.market_name
        ));
    }
    if let Some(better) = info.cheaper_elsewhere(&report.market.name) {
        out.push(format!(
            "  cheaper at {} ({})",
            better.market_name,
            display::money(currency, better.price)
        ));
    }
    out
}

fn render_history(records: &[&PriceRecord], boundary: DayBoundary, currency: &str) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            format!(
                "{}  {:>10}  {}",
                display::day(boundary, &record.date),
                display::money(currency, record.price),
                record.market_name
            )
        })
        .collect()
}

/// `cesta price info <identifier> --market M`
pub fn info(paths: &StorePaths, identifier: &str, market: &str, json: bool) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let config = StoreConfig::load_or_default(&paths.config_json);
    let boundary = store.day_boundary();

    let report = report(&mut store, identifier, market)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report.info)?);
        return Ok(());
    }
    for line in render_report(&report, boundary, &config.currency) {
        println!("{line}");
    }
    Ok(())
}

/// `cesta price history <identifier>`
pub fn history(paths: &StorePaths, identifier: &str) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let config = StoreConfig::load_or_default(&paths.config_json);
    let boundary = store.day_boundary();

    let Some(key) = Catalog::new(&mut store).price_key(identifier) else {
        anyhow::bail!("identifier must not be empty");
    };
    let ledger = PriceLedger::new(&mut store);
    let records = ledger.history(&key);
    if records.is_empty() {
        println!("(no prices recorded for {key})");
        return Ok(());
    }
    for line in render_history(&records, boundary, &config.currency) {
        println!("{line}");
    }
    Ok(())
}
