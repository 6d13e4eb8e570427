
/// Definition of an EVM-compatible network as shown in the network selector.
#[derive(Debug, Clone)]
pub struct EvmNetwork {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub logo: Option<&'static str>,
    pub is_testnet: bool,
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmNetwork = EvmNetwork {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    logo: Some("https://assets.coingecko.com/coins/images/279/small/ethereum.png"),
    is_testnet: false,
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: EvmNetwork = EvmNetwork {
    chain_id: 137,
    name: "Polygon",
    symbol: "MATIC",
    decimals: 18,
    logo: Some("https://assets.coingecko.com/coins/images/4713/small/polygon.png"),
    is_testnet: false,
};

/// BNB Smart Chain (chain ID 56).
pub const BSC: EvmNetwork = EvmNetwork {
    chain_id: 56,
    name: "BNB Smart Chain",
    symbol: "BNB",
    decimals: 18,
    logo: Some("https://assets.coingecko.com/coins/images/825/small/bnb-icon2_2x.png"),
    is_testnet: false,
};

/// Selendra EVM (chain ID 1961).
pub const SELENDRA_EVM: EvmNetwork = EvmNetwork {
    chain_id: 1961,
    name: "Selendra EVM",
    symbol: "SEL",
    decimals: 18,
    logo: None,
    is_testnet: false,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmNetwork = EvmNetwork {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    logo: None,
    is_testnet: true,
};

const ALL_NETWORKS: &[&EvmNetwork] = &[&ETHEREUM, &POLYGON, &BSC, &SELENDRA_EVM, &SEPOLIA];

/// Returns the preset for `chain_id`, or `None` if unknown.
pub fn get_network(chain_id: u64) -> Option<&'static EvmNetwork> {
    ALL_NETWORKS
        .iter()
        .find(|n| n.chain_id == chain_id)
        .copied()
}

/// All EVM presets in display order.
pub fn supported_networks() -> Vec<&'static EvmNetwork> {
    ALL_NETWORKS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_ethereum() {
        let network = get_network(1).expect("Ethereum should be supported");
        assert_eq!(network.name, "Ethereum");
        assert_eq!(network.symbol, "ETH");
        assert!(!network.is_testnet);
    }

    #[test]
    fn get_sepolia_is_testnet() {
        assert!(get_network(11155111).unwrap().is_testnet);
    }

    #[test]
    fn unknown_chain_is_none() {
        assert!(get_network(999_999).is_none());
    }

    #[test]
    fn chain_ids_are_unique() {
        let networks = supported_networks();
        for (i, a) in networks.iter().enumerate() {
            for b in &networks[i + 1..] {
                assert_ne!(a.chain_id, b.chain_id, "{} and {} share an id", a.name, b.name);
            }
        }
    }

    #[test]
    fn all_presets_use_18_decimals() {
        for network in supported_networks() {
            assert_eq!(network.decimals, 18, "{} should have 18 decimals", network.name);
        }
    }
}
