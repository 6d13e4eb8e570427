use chain_evm::networks::EvmNetwork;
use chain_substrate::networks::SubstrateNetwork;

use crate::types::{NativeCurrency, NetworkConfig, NetworkFamily};

/// Source of the networks a session may connect to.
pub trait NetworkRegistry: Send + Sync {
    /// All networks, in display order.
    fn networks(&self) -> Vec<NetworkConfig>;

    /// Looks up a network by its chain id.
    fn get(&self, chain_id: &str) -> Option<NetworkConfig> {
        self.networks().into_iter().find(|n| n.chain_id == chain_id)
    }
}

/// Fixed list of networks.
///
/// [`StaticRegistry::default`] holds the EVM presets followed by the
/// Substrate presets.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    networks: Vec<NetworkConfig>,
}

impl StaticRegistry {
    pub fn new(networks: Vec<NetworkConfig>) -> Self {
        Self { networks }
    }

    /// Adds `network`, replacing any entry with the same chain id in place.
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        match self
            .networks
            .iter_mut()
            .find(|n| n.chain_id == network.chain_id)
        {
            Some(existing) => *existing = network,
            None => self.networks.push(network),
        }
        self
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        let evm = chain_evm::networks::supported_networks()
            .into_iter()
            .map(NetworkConfig::from);
        let substrate = chain_substrate::networks::supported_networks()
            .into_iter()
            .map(NetworkConfig::from);
        Self::new(evm.chain(substrate).collect())
    }
}

impl NetworkRegistry for StaticRegistry {
    fn networks(&self) -> Vec<NetworkConfig> {
        self.networks.clone()
    }

    fn get(&self, chain_id: &str) -> Option<NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id).cloned()
    }
}

impl From<&EvmNetwork> for NetworkConfig {
    fn from(n: &EvmNetwork) -> Self {
        NetworkConfig {
            chain_id: n.chain_id.to_string(),
            name: n.name.to_string(),
            native_currency: NativeCurrency {
                symbol: n.symbol.to_string(),
                decimals: n.decimals,
            },
            family: NetworkFamily::Evm,
            logo: n.logo.map(str::to_string),
        }
    }
}

impl From<&SubstrateNetwork> for NetworkConfig {
    fn from(n: &SubstrateNetwork) -> Self {
        NetworkConfig {
            chain_id: n.chain_id.to_string(),
            name: n.name.to_string(),
            native_currency: NativeCurrency {
                symbol: n.symbol.to_string(),
                decimals: n.decimals,
            },
            family: NetworkFamily::Substrate,
            logo: n.logo.map(str::to_string),
        }
    }
}
