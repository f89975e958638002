//! Configuration loading and management

use crate::core::InventoryPolicy;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default listen address of the storefront server
pub const DEFAULT_BIND: &str = "127.0.0.1:8081";

/// Environment variable overriding [`ServerConfig::bind`]
pub const ENV_BIND: &str = "STOREFRONT_BIND";
/// Environment variable selecting the SQLite backend at the given path
pub const ENV_SQLITE_PATH: &str = "STOREFRONT_SQLITE_PATH";
/// Environment variable overriding [`ServerConfig::inventory_policy`]
pub const ENV_INVENTORY_POLICY: &str = "STOREFRONT_INVENTORY_POLICY";

/// Which persistence backend to open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local maps, lost on shutdown
    #[default]
    InMemory,

    /// A SQLite database file (requires the `sqlite` feature)
    Sqlite { path: String },
}

impl StorageConfig {
    /// Backend tag as written in YAML
    pub fn backend(&self) -> &'static str {
        match self {
            StorageConfig::InMemory => "in_memory",
            StorageConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// Complete configuration of a storefront server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub inventory_policy: InventoryPolicy,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            storage: StorageConfig::default(),
            inventory_policy: InventoryPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply the `STOREFRONT_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind;
        }

        if let Some(path) = lookup(ENV_SQLITE_PATH) {
            self.storage = StorageConfig::Sqlite { path };
        }

        if let Some(policy) = lookup(ENV_INVENTORY_POLICY) {
            self.inventory_policy = match policy.as_str() {
                "reserve" => InventoryPolicy::Reserve,
                "check_only" => InventoryPolicy::CheckOnly,
                other => {
                    return Err(anyhow!(
                        "Invalid {}: '{}' (expected 'reserve' or 'check_only')",
                        ENV_INVENTORY_POLICY,
                        other
                    ));
                }
            };
        }

        Ok(self)
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self::default()
    }
}
