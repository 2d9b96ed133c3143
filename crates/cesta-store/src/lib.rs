pub mod config;
pub mod lock;
pub mod paths;
pub mod store;

pub use config::StoreConfig;
pub use lock::StoreLock;
pub use paths::StorePaths;
pub use store::{Collection, Store};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the store root.
pub const HOME_ENV: &str = "CESTA_HOME";

/// Return the per-user store root.
/// `$CESTA_HOME` if set, else `<data dir>/cesta` (e.g. `~/.local/share/cesta`),
/// falling back to `~/.cesta`.
pub fn store_root() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        PathBuf::from(home)
    } else if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("cesta")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".cesta")
    } else {
        PathBuf::from(".cesta-store")
    }
}

/// Replace `path` with `data` in one step: the bytes go to a hidden temp file
/// next to it, are synced, and the temp file is renamed over `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut staged = tempfile::Builder::new()
        .prefix(".cesta-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged
        .persist(path)
        .map_err(|e| anyhow::anyhow!("cannot replace {}: {}", path.display(), e.error))?;
    Ok(())
}
