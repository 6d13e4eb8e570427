use async_trait::async_trait;

use crate::error::FacadeError;
use crate::mnemonic::Credential;
use crate::types::{FeeEstimate, TransactionRequest, WalletState};

/// Backend that owns keys and talks to chains.
///
/// The session holds exactly one facade and drives it through these calls.
/// Every method except [`create_credential`](WalletFacade::create_credential)
/// may perform I/O.
#[async_trait]
pub trait WalletFacade: Send + Sync {
    /// Produces a fresh credential. No I/O; the caller persists it.
    fn create_credential(&self) -> Result<Credential, FacadeError>;

    /// Opens a connection to `chain_id` for the account derived from
    /// `credential` and returns its state.
    async fn connect(
        &self,
        credential: &Credential,
        chain_id: &str,
    ) -> Result<WalletState, FacadeError>;

    /// Fetches the state of the connected account.
    async fn wallet_state(&self) -> Result<WalletState, FacadeError>;

    async fn estimate_fee(&self, request: &TransactionRequest) -> Result<FeeEstimate, FacadeError>;

    /// Submits `request` and returns the transaction hash.
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, FacadeError>;

    /// Tears down the connection. Best-effort.
    async fn disconnect(&self) -> Result<(), FacadeError>;
}
