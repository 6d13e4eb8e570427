use thiserror::Error;

/// Errors returned by [`WalletSession`](crate::session::WalletSession)
/// operations. The `Display` text is what lands in `SessionState::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Wallet not initialized")]
    NotInitialized,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported network type: {0}")]
    UnsupportedNetworkFamily(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Secure storage failure: {0}")]
    StorageFailure(String),

    #[error("Network request failed: {0}")]
    RemoteFailure(String),
}

/// Errors reported by a [`WalletFacade`](crate::facade::WalletFacade).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacadeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unknown chain: {0}")]
    UnknownChain(String),

    #[error("not connected")]
    NotConnected,

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: String, available: String },

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

/// Key and mnemonic handling errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),
}

impl From<FacadeError> for SessionError {
    fn from(e: FacadeError) -> Self {
        SessionError::RemoteFailure(e.to_string())
    }
}

impl From<credential_store::StoreError> for SessionError {
    fn from(e: credential_store::StoreError) -> Self {
        SessionError::StorageFailure(e.to_string())
    }
}

impl From<WalletError> for FacadeError {
    fn from(e: WalletError) -> Self {
        FacadeError::InvalidCredential(e.to_string())
    }
}
