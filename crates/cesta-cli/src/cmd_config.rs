use cesta_store::{StoreConfig, StoreLock, StorePaths};
use clap::Subcommand;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (utc_offset, default_budget, currency)
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, paths: &StorePaths) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(paths, &key, &value),
        ConfigCmd::Get { key } => get(paths, &key),
        ConfigCmd::List => list(paths),
    }
}

// ── Command Implementations ──

/// `cesta config set <key> <value>`
pub fn set(paths: &StorePaths, key: &str, value: &str) -> anyhow::Result<()> {
    crate::require_store(paths)?;
    let _lock = StoreLock::acquire(paths)?;
    let mut config = StoreConfig::load(&paths.config_json)?;
    config.set(key, value)?;
    config.save(&paths.config_json)?;
    let shown = config.get(key).unwrap_or_default();
    println!("Set {key} = {shown}");
    Ok(())
}

/// `cesta config get <key>`
pub fn get(paths: &StorePaths, key: &str) -> anyhow::Result<()> {
    crate::require_store(paths)?;
    let config = StoreConfig::load(&paths.config_json)?;
    match config.get(key) {
        Some(value) => println!("{value}"),
        None => anyhow::bail!(
            "unknown config key: {key}. Expected one of: {}",
            StoreConfig::KEYS.join(", ")
        ),
    }
    Ok(())
}

/// `cesta config list`
pub fn list(paths: &StorePaths) -> anyhow::Result<()> {
    crate::require_store(paths)?;
    let config = StoreConfig::load(&paths.config_json)?;
    for key in StoreConfig::KEYS {
        println!("{key} = {}", config.get(key).unwrap_or_default());
    }
    Ok(())
}
