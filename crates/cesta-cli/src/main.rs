mod cmd_checkout;
mod cmd_config;
mod cmd_init;
mod cmd_market;
mod cmd_price;
mod cmd_product;
mod cmd_sessions;
mod display;

use cesta_store::{Store, StoreLock, StorePaths};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cesta", version, about = "Grocery price memory and budgeted checkouts")]
struct Cli {
    /// Store directory (defaults to $CESTA_HOME, then the platform data dir)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the store layout and a default config.json
    Init,
    /// Market operations (add, list, show)
    Market {
        #[command(subcommand)]
        cmd: cmd_market::MarketCmd,
    },
    /// Product catalog operations (add, list, resolve)
    Product {
        #[command(subcommand)]
        cmd: cmd_product::ProductCmd,
    },
    /// Price lookups (info, history)
    Price {
        #[command(subcommand)]
        cmd: cmd_price::PriceCmd,
    },
    /// Buy a list of items at a market and record their prices
    Checkout {
        /// Market id or name (added if unknown)
        #[arg(long)]
        market: String,
        /// Trip budget (defaults to config default_budget)
        #[arg(long)]
        budget: Option<rust_decimal::Decimal>,
        /// Line item: <identifier>=<qty>x<unit price>, or <identifier>=<unit price> for one unit (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        /// Name for an unregistered barcode: <identifier>=<name> (repeatable)
        #[arg(long = "name")]
        names: Vec<String>,
        /// Show the cart and budget without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List finalized shopping sessions, newest first
    Sessions {
        /// Maximum number of sessions to show (0 = unlimited)
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration (set, get, list)
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Fail unless `cesta init` has created the store.
pub(crate) fn require_store(paths: &StorePaths) -> anyhow::Result<()> {
    if !paths.is_initialized() {
        anyhow::bail!(
            "no cesta store at {}. Run `cesta init` first.",
            paths.root.display()
        );
    }
    Ok(())
}

/// Open an initialized store for reading.
pub(crate) fn open_store(paths: &StorePaths) -> anyhow::Result<Store> {
    require_store(paths)?;
    Ok(Store::open(paths.clone()))
}

/// Open an initialized store and hold the lock for the duration of a write.
pub(crate) fn open_store_locked(paths: &StorePaths) -> anyhow::Result<(StoreLock, Store)> {
    require_store(paths)?;
    let lock = StoreLock::acquire(paths)?;
    Ok((lock, Store::open(paths.clone())))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let paths = match cli.home {
        Some(home) => StorePaths::discover(home),
        None => StorePaths::user_default(),
    };
    tracing::debug!(root = %paths.root.display(), "store root");

    match cli.cmd {
        Command::Init => cmd_init::execute(&paths),
        Command::Market { cmd } => cmd_market::run(cmd, &paths),
        Command::Product { cmd } => cmd_product::run(cmd, &paths),
        Command::Price { cmd } => cmd_price::run(cmd, &paths),
        Command::Checkout {
            market,
            budget,
            items,
            names,
            dry_run,
        } => cmd_checkout::execute(&cmd_checkout::CheckoutParams {
            paths: &paths,
            market: &market,
            budget,
            items: &items,
            names: &names,
            dry_run,
        }),
        Command::Sessions { limit, json } => cmd_sessions::execute(&paths, limit, json),
        Command::Config { cmd } => cmd_config::run(cmd, &paths),
    }
}
