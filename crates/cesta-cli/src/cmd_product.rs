use cesta_core::Product;
use cesta_ledger::Catalog;
use cesta_store::StorePaths;
use clap::Subcommand;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ProductCmd {
    /// Add or update a product (the barcode, when given, becomes its id)
    Add {
        /// Product name
        name: String,
        /// Barcode
        #[arg(long)]
        barcode: Option<String>,
    },
    /// List all products
    List,
    /// Find the product a barcode, id, or name refers to
    Resolve {
        /// Scanned or typed identifier
        identifier: String,
    },
}

// ── Dispatch ──

pub fn run(cmd: ProductCmd, paths: &StorePaths) -> anyhow::Result<()> {
    match cmd {
        ProductCmd::Add { name, barcode } => add(paths, &name, barcode.as_deref()),
        ProductCmd::List => list(paths),
        ProductCmd::Resolve { identifier } => resolve(paths, &identifier),
    }
}

// ── Command Implementations ──

/// `cesta product add <name> [--barcode B]`
pub fn add(paths: &StorePaths, name: &str, barcode: Option<&str>) -> anyhow::Result<()> {
    let (_lock, mut store) = crate::open_store_locked(paths)?;
    let product = Catalog::new(&mut store).add_product(name, barcode)?;
    match &product.barcode {
        Some(code) => println!("Saved {} [{}] (barcode {code})", product.name, product.id),
        None => println!("Saved {} [{}]", product.name, product.id),
    }
    Ok(())
}

/// `cesta product list`
pub fn list(paths: &StorePaths) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let catalog = Catalog::new(&mut store);
    if catalog.products().is_empty() {
        println!("(no products)");
        return Ok(());
    }
    for product in catalog.products() {
        println!("{}", product_line(product));
    }
    Ok(())
}

/// `cesta product resolve <identifier>`
pub fn resolve(paths: &StorePaths, identifier: &str) -> anyhow::Result<()> {
    let mut store = crate::open_store(paths)?;
    let catalog = Catalog::new(&mut store);
    match catalog.resolve(identifier) {
        Some(product) => println!("{}  {}", product.id, product.name),
        None => anyhow::bail!("no product matches {:?}", identifier.trim()),
    }
    Ok(())
}

fn product_line(product: &Product) -> String {
    match &product.barcode {
        Some(code) => format!("{}  {}  (barcode {code})", product.id, product.name),
        None => format!("{}  {}", product.id, product.name),
    }
}
