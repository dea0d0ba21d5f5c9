//! Configuration for the PCT service.
//!
//! Loaded from a TOML file. The path comes from the `PCT_CONFIG` environment
//! variable, falling back to `pct.toml`. Every section is optional.
//!
//! ```toml
//! base_dn = "ou=uma,o=gluu"
//!
//! [token]
//! lifetime_secs = 3600
//!
//! [cleanup]
//! batch_size = 100
//! interval_secs = 600
//!
//! [store]
//! backend = "file"
//! path = "data/pct.jsonl"
//! ```

use crate::token::{MAX_LIFETIME_SECS, effective_lifetime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Complete PCT configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PctConfig {
    /// Per-tenant base namespace the token branch lives under.
    #[serde(default = "default_base_dn")]
    pub base_dn: String,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for PctConfig {
    fn default() -> Self {
        Self {
            base_dn: default_base_dn(),
            token: TokenConfig::default(),
            cleanup: CleanupConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl PctConfig {
    /// Load configuration from `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::parse(&raw)
    }

    /// Parse configuration from TOML text.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let cfg: PctConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `PCT_CONFIG` or `pct.toml`; defaults when the file is missing.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would make every token unstorable.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.token.lifetime_secs <= MAX_LIFETIME_SECS,
            "token.lifetime_secs must be at most {} (got {})",
            MAX_LIFETIME_SECS,
            self.token.lifetime_secs
        );
        Ok(())
    }

    /// Token lifetime with the non-positive fallback applied.
    pub fn token_lifetime(&self) -> chrono::Duration {
        effective_lifetime(self.token.lifetime_secs)
    }
}

/// Token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Lifetime of new tokens in seconds. Non-positive means the built-in
    /// default; values above `i32::MAX` are rejected.
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: default_lifetime_secs(),
        }
    }
}

/// Periodic cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Records fetched per sweep chunk.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between sweeps when run periodically.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Store backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit.
    #[default]
    Memory,
    /// JSON Lines snapshot on disk.
    File,
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Snapshot path for the file backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn config_path() -> PathBuf {
    if let Ok(p) = env::var("PCT_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("pct.toml")
}

fn default_base_dn() -> String {
    "ou=uma,o=gluu".to_string()
}

fn default_lifetime_secs() -> i64 {
    crate::token::DEFAULT_LIFETIME_SECS
}

fn default_batch_size() -> usize {
    100
}

fn default_interval_secs() -> u64 {
    600
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/pct.jsonl")
}
