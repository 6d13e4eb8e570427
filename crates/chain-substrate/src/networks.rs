
/// Definition of a Substrate network as shown in the network selector.
#[derive(Debug, Clone)]
pub struct SubstrateNetwork {
    /// Registry identifier. Substrate chains have no numeric chain id, so the
    /// lowercase chain name is used.
    pub chain_id: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub logo: Option<&'static str>,
    pub is_testnet: bool,
}

pub const POLKADOT: SubstrateNetwork = SubstrateNetwork {
    chain_id: "polkadot",
    name: "Polkadot",
    symbol: "DOT",
    decimals: 10,
    logo: Some("https://assets.coingecko.com/coins/images/12171/small/polkadot.png"),
    is_testnet: false,
};

pub const KUSAMA: SubstrateNetwork = SubstrateNetwork {
    chain_id: "kusama",
    name: "Kusama",
    symbol: "KSM",
    decimals: 12,
    logo: Some("https://assets.coingecko.com/coins/images/9568/small/m4zRhP5e_400x400.jpg"),
    is_testnet: false,
};

pub const SELENDRA: SubstrateNetwork = SubstrateNetwork {
    chain_id: "selendra",
    name: "Selendra",
    symbol: "SEL",
    decimals: 18,
    logo: None,
    is_testnet: false,
};

pub const WESTEND: SubstrateNetwork = SubstrateNetwork {
    chain_id: "westend",
    name: "Westend",
    symbol: "WND",
    decimals: 12,
    logo: None,
    is_testnet: true,
};

const ALL_NETWORKS: &[&SubstrateNetwork] = &[&POLKADOT, &KUSAMA, &SELENDRA, &WESTEND];

/// Returns the preset for `chain_id`, or `None` if unknown.
pub fn get_network(chain_id: &str) -> Option<&'static SubstrateNetwork> {
    ALL_NETWORKS
        .iter()
        .find(|n| n.chain_id == chain_id)
        .copied()
}

/// All Substrate presets in display order.
pub fn supported_networks() -> Vec<&'static SubstrateNetwork> {
    ALL_NETWORKS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_polkadot() {
        let network = get_network("polkadot").unwrap();
        assert_eq!(network.symbol, "DOT");
        assert_eq!(network.decimals, 10);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(get_network("Polkadot").is_none());
    }

    #[test]
    fn ids_are_lowercase_names() {
        for network in supported_networks() {
            assert_eq!(network.chain_id, network.name.to_lowercase());
        }
    }

    #[test]
    fn one_testnet() {
        let testnets = supported_networks().into_iter().filter(|n| n.is_testnet).count();
        assert_eq!(testnets, 1);
    }
}
