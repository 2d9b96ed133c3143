use std::path::PathBuf;

/// All well-known paths under the store root.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub markets_json: PathBuf,
    pub products_json: PathBuf,
    pub price_history_json: PathBuf,
    pub sessions_json: PathBuf,
    pub config_json: PathBuf,
    pub lock_file: PathBuf,
}

impl StorePaths {
    /// Derive all paths from a store root. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data_dir = root.join("data");
        Self {
            markets_json: data_dir.join("markets.json"),
            products_json: data_dir.join("products.json"),
            price_history_json: data_dir.join("price_history.json"),
            sessions_json: data_dir.join("sessions.json"),
            config_json: root.join("config.json"),
            lock_file: root.join("LOCK"),
            data_dir,
            root,
        }
    }

    /// Paths for the default per-user root.
    pub fn user_default() -> Self {
        Self::discover(crate::store_root())
    }

    /// Create all required directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Check whether the data directory exists.
    pub fn is_initialized(&self) -> bool {
        self.data_dir.is_dir()
    }
}
