//! Multi-chain wallet session core.
//!
//! [`WalletSession`] is the entry point: it holds the wallet credential,
//! connects to one EVM or Substrate network at a time through a
//! [`WalletFacade`], and publishes its [`SessionState`] for observers.

pub mod address;
pub mod builder;
pub mod devnet;
pub mod error;
pub mod facade;
pub mod hd_derivation;
pub mod mnemonic;
pub mod registry;
pub mod session;
pub mod types;
pub mod units;

pub use address::is_valid_address;
pub use devnet::{DevnetConfig, DevnetFacade};
pub use error::{FacadeError, SessionError, WalletError};
pub use facade::WalletFacade;
pub use mnemonic::Credential;
pub use registry::{NetworkRegistry, StaticRegistry};
pub use session::{SessionPhase, SessionState, WalletSession};
pub use types::{
    Balances, FeeEstimate, NativeCurrency, NetworkConfig, NetworkFamily, TokenBalance, TokenInfo,
    TransactionReceipt, TransactionRequest, WalletState,
};
pub use units::{format_balance, parse_amount, DEFAULT_DISPLAY_PRECISION};
