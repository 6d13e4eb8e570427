//! TOML configuration for the wallet CLI.
//!
//! ```toml
//! store_path = "~/.wallet/store.json"
//! log_level = "info"
//! default_network = "11155111"
//!
//! [devnet]
//! faucet_amount = "25"
//! latency_ms = 150
//!
//! [[networks]]
//! chain_id = "31337"
//! name = "Local Anvil"
//! symbol = "ETH"
//! decimals = 18
//! family = "evm"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use wallet_core::{
    DevnetConfig, NativeCurrency, NetworkConfig, NetworkFamily, SessionError, StaticRegistry,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("network {chain_id}: {source}")]
    Network {
        chain_id: String,
        source: SessionError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Encrypted store file. A leading `~` is expanded to the home directory.
    pub store_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub default_network: Option<String>,
    pub devnet: DevnetSection,
    pub networks: Vec<NetworkEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DevnetSection {
    /// Whole units given to each new account.
    pub faucet_amount: String,
    pub latency_ms: u64,
}

impl Default for DevnetSection {
    fn default() -> Self {
        let defaults = DevnetConfig::default();
        Self {
            faucet_amount: defaults.faucet_amount,
            latency_ms: defaults.latency.as_millis() as u64,
        }
    }
}

impl DevnetSection {
    pub fn to_devnet_config(&self) -> DevnetConfig {
        DevnetConfig {
            faucet_amount: self.faucet_amount.clone(),
            latency: Duration::from_millis(self.latency_ms),
        }
    }
}

/// Extra network entry. `family` stays a string here so that an unknown
/// value is reported with the network it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEntry {
    pub chain_id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub family: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl NetworkEntry {
    pub fn to_network_config(&self) -> Result<NetworkConfig, SessionError> {
        let family: NetworkFamily = self.family.parse()?;
        Ok(NetworkConfig {
            chain_id: self.chain_id.clone(),
            name: self.name.clone(),
            native_currency: NativeCurrency {
                symbol: self.symbol.clone(),
                decimals: self.decimals,
            },
            family,
            logo: self.logo.clone(),
        })
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Store file to open: the command-line path, then the configured one,
    /// then [`default_store_path`].
    pub fn resolve_store_path(&self, cli_path: Option<PathBuf>) -> PathBuf {
        cli_path
            .or_else(|| self.store_path.clone())
            .map(|path| expand_home(&path))
            .unwrap_or_else(default_store_path)
    }

    /// Built-in networks plus the configured ones. A configured network with
    /// a built-in chain id replaces the preset.
    pub fn registry(&self) -> Result<StaticRegistry, ConfigError> {
        self.networks
            .iter()
            .try_fold(StaticRegistry::default(), |registry, entry| {
                let network = entry
                    .to_network_config()
                    .map_err(|source| ConfigError::Network {
                        chain_id: entry.chain_id.clone(),
                        source,
                    })?;
                Ok(registry.with_network(network))
            })
    }
}

/// `wallet/store.json` under the platform data directory.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wallet")
        .join("store.json")
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
