//! In-process [`WalletFacade`] backed by a per-network in-memory ledger.
//!
//! Accounts are derived from the credential exactly as a real wallet would
//! (BIP-32 secp256k1 for EVM, SLIP-10 ed25519 for Substrate), are funded from
//! a faucet the first time they are seen, and transfers move balances between
//! ledger entries with a flat fee.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use tokio::sync::Mutex;

use crate::builder::{SUBSTRATE_TRANSFER_CALL, SUBSTRATE_TRANSFER_PALLET};
use crate::error::FacadeError;
use crate::facade::WalletFacade;
use crate::hd_derivation;
use crate::mnemonic::{self, Credential};
use crate::registry::NetworkRegistry;
use crate::types::{
    Balances, FeeEstimate, NetworkConfig, NetworkFamily, TokenBalance, TokenInfo,
    TransactionRequest, WalletState,
};
use crate::units;

/// Gas used by a plain value transfer.
pub const EVM_TRANSFER_GAS: u64 = 21_000;

/// Fixed gas price (1 gwei).
pub const EVM_GAS_PRICE_WEI: u64 = 1_000_000_000;

/// Flat Substrate transfer fee in whole units.
pub const SUBSTRATE_TRANSFER_FEE: &str = "0.01";

#[derive(Debug, Clone)]
pub struct DevnetConfig {
    /// Whole units credited to an account the first time it connects.
    pub faucet_amount: String,
    /// Artificial delay applied to every I/O call.
    pub latency: Duration,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            faucet_amount: "10".to_string(),
            latency: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<String, U256>,
    tokens: HashMap<String, Vec<TokenBalance>>,
    nonce: u64,
}

struct Connection {
    network: NetworkConfig,
    address: String,
}

#[derive(Default)]
struct DevnetInner {
    ledgers: HashMap<String, Ledger>,
    connection: Option<Connection>,
}

pub struct DevnetFacade {
    registry: Arc<dyn NetworkRegistry>,
    config: DevnetConfig,
    inner: Mutex<DevnetInner>,
}

impl DevnetFacade {
    pub fn new(registry: Arc<dyn NetworkRegistry>, config: DevnetConfig) -> Self {
        Self {
            registry,
            config,
            inner: Mutex::new(DevnetInner::default()),
        }
    }

    /// Gives `address` a token balance on `chain_id`, reported alongside the
    /// native balance.
    pub async fn mint_token(&self, chain_id: &str, address: &str, token: TokenInfo, balance: &str) {
        let mut inner = self.inner.lock().await;
        let ledger = inner.ledgers.entry(chain_id.to_string()).or_default();
        ledger
            .tokens
            .entry(ledger_key(address))
            .or_default()
            .push(TokenBalance {
                token,
                balance: balance.to_string(),
            });
    }

    /// Native balance of `address` on `chain_id`, in smallest units.
    pub async fn balance_of(&self, chain_id: &str, address: &str) -> Option<String> {
        let inner = self.inner.lock().await;
        inner
            .ledgers
            .get(chain_id)
            .and_then(|ledger| ledger.balances.get(&ledger_key(address)))
            .map(U256::to_string)
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }

    fn faucet_amount(&self, decimals: u8) -> Result<U256, FacadeError> {
        let scaled = units::parse_amount(&self.config.faucet_amount, decimals)
            .map_err(|e| FacadeError::Rejected(format!("faucet: {e}")))?;
        parse_u256(&scaled)
    }
}

#[async_trait]
impl WalletFacade for DevnetFacade {
    fn create_credential(&self) -> Result<Credential, FacadeError> {
        Ok(mnemonic::generate_credential()?)
    }

    async fn connect(
        &self,
        credential: &Credential,
        chain_id: &str,
    ) -> Result<WalletState, FacadeError> {
        self.simulate_latency().await;

        let network = self
            .registry
            .get(chain_id)
            .ok_or_else(|| FacadeError::UnknownChain(chain_id.to_string()))?;
        let address = derive_address(credential, network.family)?;
        let faucet = self.faucet_amount(network.native_currency.decimals)?;

        let mut inner = self.inner.lock().await;
        let ledger = inner.ledgers.entry(network.chain_id.clone()).or_default();
        ledger
            .balances
            .entry(ledger_key(&address))
            .or_insert_with(|| {
                tracing::info!(chain_id = %network.chain_id, %address, "devnet faucet funded account");
                faucet
            });

        let state = snapshot(ledger, &network, &address);
        inner.connection = Some(Connection { network, address });
        Ok(state)
    }

    async fn wallet_state(&self) -> Result<WalletState, FacadeError> {
        self.simulate_latency().await;

        let inner = self.inner.lock().await;
        let connection = inner.connection.as_ref().ok_or(FacadeError::NotConnected)?;
        let ledger = inner
            .ledgers
            .get(&connection.network.chain_id)
            .ok_or(FacadeError::NotConnected)?;
        Ok(snapshot(ledger, &connection.network, &connection.address))
    }

    async fn estimate_fee(&self, request: &TransactionRequest) -> Result<FeeEstimate, FacadeError> {
        self.simulate_latency().await;

        let inner = self.inner.lock().await;
        let connection = inner.connection.as_ref().ok_or(FacadeError::NotConnected)?;
        check_family(request, &connection.network)?;
        let fee = transfer_fee(&connection.network)?;
        fee_estimate(fee, &connection.network)
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, FacadeError> {
        self.simulate_latency().await;

        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let connection = inner.connection.as_ref().ok_or(FacadeError::NotConnected)?;
        check_family(request, &connection.network)?;

        let (recipient, value) = transfer_parts(request)?;
        let value = parse_u256(value)?;
        let fee = transfer_fee(&connection.network)?;
        let decimals = connection.network.native_currency.decimals;

        let ledger = inner
            .ledgers
            .get_mut(&connection.network.chain_id)
            .ok_or(FacadeError::NotConnected)?;
        let sender = ledger_key(&connection.address);
        let available = ledger.balances.get(&sender).copied().unwrap_or_default();
        let needed = value
            .checked_add(fee)
            .ok_or_else(|| FacadeError::Rejected("amount overflows".into()))?;
        if available < needed {
            return Err(FacadeError::InsufficientFunds {
                needed: display_units(needed, decimals),
                available: display_units(available, decimals),
            });
        }

        ledger.balances.insert(sender.clone(), available - needed);
        let credited = ledger.balances.entry(ledger_key(recipient)).or_default();
        *credited = credited.saturating_add(value);
        ledger.nonce += 1;

        let tx_hash = tx_hash(request, &sender, ledger.nonce)?;
        tracing::info!(
            chain_id = %connection.network.chain_id,
            %tx_hash,
            nonce = ledger.nonce,
            "devnet transfer applied"
        );
        Ok(tx_hash)
    }

    async fn disconnect(&self) -> Result<(), FacadeError> {
        self.simulate_latency().await;
        self.inner.lock().await.connection = None;
        Ok(())
    }
}

/// Derives the account address `credential` controls on a `family` network.
pub fn derive_address(credential: &Credential, family: NetworkFamily) -> Result<String, FacadeError> {
    let seed = mnemonic::credential_to_seed(credential)?;
    let path = hd_derivation::path_for_family(family);
    match family {
        NetworkFamily::Evm => {
            let key = hd_derivation::derive_secp256k1_key(seed.as_slice(), path)?;
            chain_evm::address::pubkey_to_address(&key.public_key_compressed)
                .map_err(|e| FacadeError::InvalidCredential(e.to_string()))
        }
        NetworkFamily::Substrate => {
            let key = hd_derivation::derive_ed25519_key(seed.as_slice(), path)?;
            chain_substrate::address::encode_address(
                &key.public_key,
                chain_substrate::address::GENERIC_PREFIX,
            )
            .map_err(|e| FacadeError::InvalidCredential(e.to_string()))
        }
    }
}

/// EVM addresses are case-insensitive; Substrate addresses are not.
fn ledger_key(address: &str) -> String {
    if address.starts_with("0x") {
        address.to_ascii_lowercase()
    } else {
        address.to_string()
    }
}

fn snapshot(ledger: &Ledger, network: &NetworkConfig, address: &str) -> WalletState {
    let key = ledger_key(address);
    WalletState {
        address: address.to_string(),
        network: network.clone(),
        balances: Balances {
            native: ledger
                .balances
                .get(&key)
                .copied()
                .unwrap_or_default()
                .to_string(),
            tokens: ledger.tokens.get(&key).cloned().unwrap_or_default(),
        },
    }
}

fn check_family(request: &TransactionRequest, network: &NetworkConfig) -> Result<(), FacadeError> {
    if request.family() != network.family {
        return Err(FacadeError::Rejected(format!(
            "{} payload sent to {} network {}",
            request.family(),
            network.family,
            network.chain_id
        )));
    }
    Ok(())
}

fn transfer_parts(request: &TransactionRequest) -> Result<(&str, &str), FacadeError> {
    match request {
        TransactionRequest::EvmTransfer { to, value } => Ok((to.as_str(), value.as_str())),
        TransactionRequest::SubstrateCall { method, params } => match params.as_slice() {
            [call, to, value]
                if method == SUBSTRATE_TRANSFER_PALLET && call == SUBSTRATE_TRANSFER_CALL =>
            {
                Ok((to.as_str(), value.as_str()))
            }
            _ => Err(FacadeError::Rejected(format!(
                "unsupported call {method}({})",
                params.len()
            ))),
        },
    }
}

fn transfer_fee(network: &NetworkConfig) -> Result<U256, FacadeError> {
    match network.family {
        NetworkFamily::Evm => Ok(U256::from(EVM_TRANSFER_GAS) * U256::from(EVM_GAS_PRICE_WEI)),
        NetworkFamily::Substrate => {
            let scaled =
                units::parse_amount(SUBSTRATE_TRANSFER_FEE, network.native_currency.decimals)
                    .map_err(|e| FacadeError::Rejected(e.to_string()))?;
            parse_u256(&scaled)
        }
    }
}

fn fee_estimate(fee: U256, network: &NetworkConfig) -> Result<FeeEstimate, FacadeError> {
    let formatted = units::format_units(&fee.to_string(), network.native_currency.decimals)
        .map_err(|e| FacadeError::Rejected(e.to_string()))?;
    Ok(FeeEstimate {
        formatted,
        currency: network.native_currency.symbol.clone(),
    })
}

fn display_units(amount: U256, decimals: u8) -> String {
    let raw = amount.to_string();
    units::format_units(&raw, decimals).unwrap_or(raw)
}

fn parse_u256(digits: &str) -> Result<U256, FacadeError> {
    U256::from_str_radix(digits, 10)
        .map_err(|e| FacadeError::Rejected(format!("invalid amount {digits}: {e}")))
}

fn tx_hash(request: &TransactionRequest, sender: &str, nonce: u64) -> Result<String, FacadeError> {
    let payload =
        serde_json::to_vec(request).map_err(|e| FacadeError::Rejected(e.to_string()))?;
    let mut hasher = Keccak256::new();
    hasher.update(&payload);
    hasher.update(sender.as_bytes());
    hasher.update(nonce.to_be_bytes());
    Ok(format!("0x{}", hex::encode(hasher.finalize())))
}
