//! CLI command implementations.

pub mod sweep;
pub mod token;

use anyhow::Context;
use pct_core::{PctConfig, StoreBackend};
use pct_service::PctService;
use pct_store::{DirectoryStore, Dn, FileDirectory, MemoryDirectory};
use std::path::Path;
use std::sync::Arc;

/// Load configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PctConfig> {
    match path {
        Some(path) => PctConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => PctConfig::load_default().context("Failed to load config"),
    }
}

/// Build the service over the configured store backend.
pub fn open_service(config: &PctConfig) -> anyhow::Result<PctService> {
    let base = Dn::new(config.base_dn.as_str());
    let store: Arc<dyn DirectoryStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; tokens are lost on exit");
            Arc::new(MemoryDirectory::new([base]))
        }
        StoreBackend::File => Arc::new(
            FileDirectory::open(&config.store.path, [base]).with_context(|| {
                format!("Failed to open store at {}", config.store.path.display())
            })?,
        ),
    };
    Ok(PctService::from_config(store, config))
}
