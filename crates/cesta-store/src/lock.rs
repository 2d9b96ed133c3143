use crate::paths::StorePaths;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Held by a command while it rewrites collections. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Take `<root>/LOCK` without waiting. Fails when another cesta process
    /// already holds it.
    pub fn acquire(paths: &StorePaths) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&paths.root)?;
        let path = paths.lock_file.clone();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| anyhow::anyhow!("cannot open {}: {e}", path.display()))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                anyhow::bail!(
                    "store is locked by another cesta process ({})",
                    path.display()
                );
            }
            anyhow::bail!("cannot lock {}: {e}", path.display());
        }
        tracing::trace!(path = %path.display(), "store lock taken");
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
