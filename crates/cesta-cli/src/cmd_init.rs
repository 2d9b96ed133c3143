use cesta_store::{Collection, Store, StoreConfig, StoreLock, StorePaths};

pub fn execute(paths: &StorePaths) -> anyhow::Result<()> {
    if paths.is_initialized() {
        // Fill in anything missing from a partially created store
        paths.ensure_layout()?;
        write_default_config(paths)?;
        println!("Already initialized at {}", paths.root.display());
        return Ok(());
    }

    paths.ensure_layout()?;
    let _lock = StoreLock::acquire(paths)?;
    write_default_config(paths)?;

    // Materialize empty collections so the layout is visible on disk
    let store = Store::open(paths.clone());
    for collection in Collection::ALL {
        if !collection.path(paths).exists() {
            store.save(collection)?;
        }
    }

    println!("Initialized cesta store at {}", paths.root.display());
    Ok(())
}

fn write_default_config(paths: &StorePaths) -> anyhow::Result<()> {
    if !paths.config_json.exists() {
        StoreConfig::default().save(&paths.config_json)?;
    }
    Ok(())
}
