use crate::display;
use cesta_core::error::{ensure_positive_price, ensure_positive_quantity};
use cesta_core::identity::{canonical_product_id, normalize_barcode};
use cesta_core::{CestaError, LineItem, Market, Product, ProductPriceInfo, ShoppingTrip};
use cesta_ledger::{Catalog, PriceLedger, SessionRecorder};
use cesta_store::{Store, StoreConfig, StorePaths};
use rust_decimal::Decimal;
use std::collections::HashMap;

pub struct CheckoutParams<'a> {
    pub paths: &'a StorePaths,
    pub market: &'a str,
    pub budget: Option<Decimal>,
    pub items: &'a [String],
    pub names: &'a [String],
    pub dry_run: bool,
}

/// One `--item` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ItemSpec {
    identifier: String,
    quantity: Decimal,
    unit_price: Decimal,
}

/// `<identifier>=<qty>x<price>` or `<identifier>=<price>`.
fn parse_item(raw: &str) -> anyhow::Result<ItemSpec> {
    let Some((identifier, rhs)) = raw.rsplit_once('=') else {
        anyhow::bail!("invalid --item {raw:?}: expected <identifier>=<qty>x<price>");
    };
    let identifier = identifier.trim();
    if identifier.is_empty() {
        anyhow::bail!("invalid --item {raw:?}: identifier is empty");
    }
    let (quantity, unit_price) = match rhs.split_once(['x', 'X']) {
        Some((qty, price)) => (parse_decimal(raw, qty)?, parse_decimal(raw, price)?),
        None => (Decimal::ONE, parse_decimal(raw, rhs)?),
    };
    ensure_positive_quantity(quantity)?;
    ensure_positive_price(unit_price)?;
    Ok(ItemSpec {
        identifier: identifier.to_string(),
        quantity,
        unit_price,
    })
}

fn parse_decimal(raw: &str, field: &str) -> anyhow::Result<Decimal> {
    field
        .trim()
        .parse::<Decimal>()
        .map_err(|e| anyhow::anyhow!("invalid --item {raw:?}: {:?} is not a number ({e})", field.trim()))
}

/// `<identifier>=<name>`
fn parse_name(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((id, name)) if !id.trim().is_empty() && !name.trim().is_empty() => {
            Ok((id.trim().to_string(), name.trim().to_string()))
        }
        _ => anyhow::bail!("invalid --name {raw:?}: expected <identifier>=<name>"),
    }
}

pub fn execute(params: &CheckoutParams) -> anyhow::Result<()> {
    let specs = params
        .items
        .iter()
        .map(|raw| parse_item(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let names = params
        .names
        .iter()
        .map(|raw| parse_name(raw))
        .collect::<anyhow::Result<HashMap<_, _>>>()?;

    let config = StoreConfig::load_or_default(&params.paths.config_json);
    let budget = params.budget.unwrap_or(config.default_budget);

    if params.dry_run {
        let mut store = crate::open_store(params.paths)?;
        run(&mut store, params, &specs, &names, budget, &config.currency)
    } else {
        let (_lock, mut store) = crate::open_store_locked(params.paths)?;
        run(&mut store, params, &specs, &names, budget, &config.currency)
    }
}

fn run(
    store: &mut Store,
    params: &CheckoutParams,
    specs: &[ItemSpec],
    names: &HashMap<String, String>,
    budget: Decimal,
    currency: &str,
) -> anyhow::Result<()> {
    if params.market.trim().is_empty() {
        return Err(CestaError::EmptyName("market").into());
    }

    // Decide every line and check the whole trip before the first write.
    let catalog = Catalog::new(store);
    let known_market = catalog.find_market(params.market).cloned();
    let mut unknown: Vec<Product> = Vec::new();
    let mut lines = Vec::with_capacity(specs.len());
    for spec in specs {
        let product = match catalog.resolve(&spec.identifier).cloned() {
            Some(product) => product,
            None => {
                let name = names.get(&spec.identifier).map(String::as_str);
                let draft = draft_product(&spec.identifier, name);
                if !unknown.iter().any(|p| p.id == draft.id) {
                    unknown.push(draft.clone());
                }
                draft
            }
        };
        lines.push(LineItem {
            product_id: product.id,
            product_name: product.name,
            quantity: spec.quantity,
            unit_price: spec.unit_price,
        });
    }
    let draft_market = known_market.clone().unwrap_or_else(|| Market {
        id: String::new(),
        name: params.market.trim().to_string(),
    });
    let mut trip = build_trip(draft_market, budget, &lines)?;

    if !params.dry_run {
        let mut catalog = Catalog::new(store);
        let market = match known_market {
            Some(market) => market,
            None => {
                let market = catalog.add_market(params.market)?;
                println!("Added market {} ({})", market.name, market.id);
                market
            }
        };
        for draft in &unknown {
            let product = catalog.add_product(&draft.name, draft.barcode.as_deref())?;
            println!("Added product {} [{}]", product.name, product.id);
        }
        trip = build_trip(market, budget, &lines)?;
    }

    println!("Checkout at {}", trip.market().name);
    let ledger = PriceLedger::new(store);
    for line in trip.cart() {
        println!(
            "  {} x {} @ {} = {}",
            line.quantity.normalize(),
            line.product_name,
            display::money(currency, line.unit_price),
            display::money(currency, line.line_total()?)
        );
        let info = ledger.price_info(&line.product_id, &trip.market().id);
        for hint in price_hints(&info, line, &trip.market().name, currency) {
            println!("      {hint}");
        }
    }
    println!("  {}", display::budget_line(currency, &trip.cart_budget()?));

    if params.dry_run {
        println!("(dry run, nothing written)");
        return Ok(());
    }

    let session = SessionRecorder::new(store).checkout(&mut trip)?;
    println!(
        "Saved session {} ({} items)",
        session.id,
        session.finalized_items.len()
    );
    Ok(())
}

/// The product an unknown identifier will be registered as. A supplied name
/// makes the identifier a barcode; otherwise the identifier is the name.
fn draft_product(identifier: &str, name: Option<&str>) -> Product {
    let (name, barcode) = match name {
        Some(name) => (name, Some(identifier)),
        None => (identifier, None),
    };
    let (id, _) = canonical_product_id(name, barcode);
    Product {
        id,
        name: name.trim().to_string(),
        barcode: normalize_barcode(barcode),
    }
}

/// Stage every line and move it to the cart, rejecting anything the
/// recorder would refuse.
fn build_trip(
    market: Market,
    budget: Decimal,
    lines: &[LineItem],
) -> Result<ShoppingTrip, CestaError> {
    let mut trip = ShoppingTrip::new(market, budget)?;
    for line in lines {
        trip.stage(line.clone())?;
    }
    if trip.staging().is_empty() {
        return Err(CestaError::EmptyCart);
    }
    trip.move_all_to_cart()?;
    trip.cart_budget()?;
    Ok(trip)
}

/// Notes printed under a cart line: the previous price here, and a cheaper
/// market when one is known.
fn price_hints(
    info: &ProductPriceInfo,
    line: &LineItem,
    market_name: &str,
    currency: &str,
) -> Vec<String> {
    let mut hints = Vec::new();
    if let Some(last) = info.last_price_in_current_market {
        if last != line.unit_price {
            hints.push(format!("was {} here", display::money(currency, last)));
        }
    }
    if let Some(better) = info.cheaper_elsewhere(market_name) {
        hints.push(format!(
            "cheaper at {} ({})",
            better.market_name,
            display::money(currency, better.price)
        ));
    }
    hints
}
