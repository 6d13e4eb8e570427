use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Transaction model of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum NetworkFamily {
    /// Account-based EVM chains.
    Evm,
    /// Extrinsic-based Substrate chains.
    Substrate,
}

impl NetworkFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkFamily::Evm => "evm",
            NetworkFamily::Substrate => "substrate",
        }
    }
}

impl fmt::Display for NetworkFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkFamily {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evm" => Ok(NetworkFamily::Evm),
            "substrate" => Ok(NetworkFamily::Substrate),
            _ => Err(SessionError::UnsupportedNetworkFamily(s.to_string())),
        }
    }
}

impl TryFrom<String> for NetworkFamily {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub symbol: String,
    pub decimals: u8,
}

/// A network the wallet can connect to, as listed by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: String,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub family: NetworkFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    /// Not every backend reports token decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token: TokenInfo,
    /// Smallest-unit integer as decimal digits.
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    /// Smallest-unit integer as decimal digits.
    pub native: String,
    pub tokens: Vec<TokenBalance>,
}

/// Snapshot of the wallet on one network. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub address: String,
    pub network: NetworkConfig,
    pub balances: Balances,
}

/// Chain-specific transfer payload.
///
/// Serialized untagged: `{"to", "value"}` for EVM and `{"method", "params"}`
/// for Substrate. Only [`builder::build`](crate::builder::build) constructs
/// these inside the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionRequest {
    EvmTransfer { to: String, value: String },
    SubstrateCall { method: String, params: Vec<String> },
}

impl TransactionRequest {
    /// The family whose endpoint accepts this payload shape.
    pub fn family(&self) -> NetworkFamily {
        match self {
            TransactionRequest::EvmTransfer { .. } => NetworkFamily::Evm,
            TransactionRequest::SubstrateCall { .. } => NetworkFamily::Substrate,
        }
    }
}

/// Fee quote for display. Not used for balance arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub formatted: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub tx_hash: String,
    pub fee: FeeEstimate,
}
