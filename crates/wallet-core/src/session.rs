//! The wallet session controller.
//!
//! A [`WalletSession`] owns the credential and the observable
//! [`SessionState`], and drives a [`WalletFacade`], a [`CredentialStore`] and
//! a [`NetworkRegistry`] injected at construction. Operations are serialized
//! behind a fair async lock, so a call made while another is in flight waits
//! its turn instead of failing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use credential_store::{CredentialStore, LAST_NETWORK_KEY, MNEMONIC_KEY};
use secrecy::ExposeSecret;
use tokio::sync::{watch, Mutex};

use crate::address;
use crate::builder;
use crate::error::SessionError;
use crate::facade::WalletFacade;
use crate::mnemonic::{self, Credential};
use crate::registry::NetworkRegistry;
use crate::types::{FeeEstimate, NetworkConfig, TransactionReceipt, TransactionRequest, WalletState};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Initializing,
    Disconnected,
    Connecting,
    Connected,
    Refreshing,
    Sending,
    EstimatingFee,
    Disconnecting,
    /// The last operation failed; `SessionState::error` holds the message.
    Error,
}

/// Observable session state. Every change is published as a whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// A credential is loaded.
    pub initialized: bool,
    pub current_network: Option<NetworkConfig>,
    pub wallet_state: Option<WalletState>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// The phase the session rests in when nothing is running.
    fn settled_phase(&self) -> SessionPhase {
        if !self.initialized {
            SessionPhase::Uninitialized
        } else if self.current_network.is_some() {
            SessionPhase::Connected
        } else {
            SessionPhase::Disconnected
        }
    }
}

#[derive(Default)]
struct Inner {
    credential: Option<Credential>,
}

pub struct WalletSession {
    facade: Arc<dyn WalletFacade>,
    store: Arc<dyn CredentialStore>,
    registry: Arc<dyn NetworkRegistry>,
    /// Operation lock. Holding it means owning the credential.
    inner: Mutex<Inner>,
    state: watch::Sender<SessionState>,
    next_seq: AtomicU64,
    /// Sequence number of the last disconnect or purge.
    reset_seq: AtomicU64,
}

impl WalletSession {
    pub fn new(
        facade: Arc<dyn WalletFacade>,
        store: Arc<dyn CredentialStore>,
        registry: Arc<dyn NetworkRegistry>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            facade,
            store,
            registry,
            inner: Mutex::new(Inner::default()),
            state,
            next_seq: AtomicU64::new(1),
            reset_seq: AtomicU64::new(0),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Networks available for connection, in display order.
    pub fn networks(&self) -> Vec<NetworkConfig> {
        self.registry.networks()
    }

    /// Clears the recorded error without touching anything else.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| {
            if s.error.is_none() && s.phase != SessionPhase::Error {
                return false;
            }
            s.error = None;
            if s.phase == SessionPhase::Error {
                s.phase = s.settled_phase();
            }
            true
        });
    }

    /// Loads the stored credential, or creates and persists a new one, then
    /// reconnects to the last used network if one is on record.
    ///
    /// A failed reconnect is recorded in the state's `error` but does not
    /// fail initialization. Calling this on an initialized session is a no-op.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        let seq = self.next_seq();
        if inner.credential.is_some() {
            return Ok(());
        }

        let mut op = Operation::begin(self, seq, SessionPhase::Initializing);
        let result = self.initialize_locked(&mut inner, &mut op).await;
        op.finish(result)
    }

    async fn initialize_locked(
        &self,
        inner: &mut Inner,
        op: &mut Operation<'_>,
    ) -> Result<(), SessionError> {
        let credential = match self.store.get(MNEMONIC_KEY).await? {
            Some(secret) => {
                if !mnemonic::validate_mnemonic(secret.expose_secret()) {
                    return Err(SessionError::StorageFailure(
                        "stored wallet credential is not a valid mnemonic".into(),
                    ));
                }
                tracing::info!("loaded wallet credential from store");
                Credential::new(secret)
            }
            None => {
                let credential = self.facade.create_credential()?;
                // Persist before use so a credential is never held that the
                // store does not have.
                self.store.set(MNEMONIC_KEY, credential.expose()).await?;
                tracing::info!("generated and stored new wallet credential");
                credential
            }
        };

        let credential = inner.credential.insert(credential);
        op.commit(|s| s.initialized = true);

        let last_network = match self.store.get(LAST_NETWORK_KEY).await {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last used network");
                op.note(e.into());
                None
            }
        };

        if let Some(chain_id) = last_network {
            let chain_id = chain_id.expose_secret();
            op.set_phase(SessionPhase::Connecting);
            if let Err(e) = self.connect_locked(credential, chain_id, op).await {
                tracing::warn!(chain_id, error = %e, "failed to reconnect to last used network");
                op.note(e);
            }
        }

        Ok(())
    }

    /// Connects to `chain_id`, replacing the current network and wallet
    /// state together, and records it as the last used network.
    pub async fn connect_to_network(&self, chain_id: &str) -> Result<(), SessionError> {
        let inner = self.inner.lock().await;
        let seq = self.next_seq();
        let mut op = Operation::begin(self, seq, SessionPhase::Connecting);

        let result = match inner.credential.as_ref() {
            Some(credential) => self.connect_locked(credential, chain_id, &mut op).await,
            None => Err(SessionError::NotInitialized),
        };
        op.finish(result)
    }

    async fn connect_locked(
        &self,
        credential: &Credential,
        chain_id: &str,
        op: &mut Operation<'_>,
    ) -> Result<(), SessionError> {
        if self.registry.get(chain_id).is_none() {
            return Err(SessionError::UnknownNetwork(chain_id.to_string()));
        }

        let wallet_state = self.facade.connect(credential, chain_id).await?;
        expect_network(&wallet_state, chain_id)?;

        let network = wallet_state.network.clone();
        if !op.commit(|s| {
            s.current_network = Some(network);
            s.wallet_state = Some(wallet_state);
        }) {
            if let Err(e) = self.facade.disconnect().await {
                tracing::warn!(chain_id, error = %e, "failed to tear down discarded connection");
            }
            return Ok(());
        }
        tracing::info!(chain_id, "connected to network");

        if let Err(e) = self.store.set(LAST_NETWORK_KEY, chain_id).await {
            tracing::warn!(chain_id, error = %e, "failed to persist last used network");
            op.note(e.into());
        }
        Ok(())
    }

    /// Re-fetches the wallet state of the connected network. Does nothing
    /// when not connected.
    pub async fn refresh_wallet_state(&self) -> Result<(), SessionError> {
        let inner = self.inner.lock().await;
        let seq = self.next_seq();
        let Some(network) = self.state.borrow().current_network.clone() else {
            return Ok(());
        };
        if inner.credential.is_none() {
            return Ok(());
        }

        let op = Operation::begin(self, seq, SessionPhase::Refreshing);
        let result = self.refresh_locked(&network, &op).await;
        op.finish(result)
    }

    async fn refresh_locked(
        &self,
        network: &NetworkConfig,
        op: &Operation<'_>,
    ) -> Result<(), SessionError> {
        let wallet_state = self.facade.wallet_state().await?;
        expect_network(&wallet_state, &network.chain_id)?;
        op.commit(|s| s.wallet_state = Some(wallet_state));
        Ok(())
    }

    /// Sends `amount` (human decimal) of the native currency to `recipient`
    /// on the connected network.
    ///
    /// The wallet state is re-fetched after submission. If that refresh
    /// fails the error is recorded, but the receipt is still returned since
    /// the transfer went through.
    pub async fn send_transaction(
        &self,
        recipient: &str,
        amount: &str,
    ) -> Result<TransactionReceipt, SessionError> {
        let _inner = self.inner.lock().await;
        let seq = self.next_seq();
        let mut op = Operation::begin(self, seq, SessionPhase::Sending);
        let result = self.send_locked(recipient, amount, &mut op).await;
        op.finish(result)
    }

    async fn send_locked(
        &self,
        recipient: &str,
        amount: &str,
        op: &mut Operation<'_>,
    ) -> Result<TransactionReceipt, SessionError> {
        let network = self.connected_network()?;
        let request = prepare_transfer(&network, recipient, amount)?;

        let fee = self.facade.estimate_fee(&request).await?;
        let tx_hash = self.facade.send_transaction(&request).await?;
        tracing::info!(chain_id = %network.chain_id, %tx_hash, "transaction submitted");

        if let Err(e) = self.refresh_locked(&network, op).await {
            tracing::warn!(%tx_hash, error = %e, "failed to refresh wallet state after send");
            op.note(e);
        }

        Ok(TransactionReceipt { tx_hash, fee })
    }

    /// Quotes the fee for sending `amount` to `recipient` without sending.
    pub async fn estimate_fee(
        &self,
        recipient: &str,
        amount: &str,
    ) -> Result<FeeEstimate, SessionError> {
        let _inner = self.inner.lock().await;
        let seq = self.next_seq();
        let op = Operation::begin(self, seq, SessionPhase::EstimatingFee);

        let result = async {
            let network = self.connected_network()?;
            let request = prepare_transfer(&network, recipient, amount)?;
            let fee = self.facade.estimate_fee(&request).await?;
            tracing::debug!(chain_id = %network.chain_id, fee = %fee.formatted, "fee estimated");
            Ok::<_, SessionError>(fee)
        }
        .await;
        op.finish(result)
    }

    /// Tears down the connection and clears the current network and wallet
    /// state. The state is cleared even if the facade fails to tear down; that
    /// failure is only recorded. The credential stays loaded.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let inner = self.inner.lock().await;
        let seq = self.next_seq();
        let mut op = Operation::begin(self, seq, SessionPhase::Disconnecting);

        let result = if inner.credential.is_none() {
            Err(SessionError::NotInitialized)
        } else {
            self.reset_connection(seq, &mut op).await;
            tracing::info!("disconnected");
            Ok(())
        };
        op.finish(result)
    }

    /// Deletes the stored credential and last used network and returns the
    /// session to its initial, uninitialized state.
    pub async fn purge(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        let seq = self.next_seq();
        let mut op = Operation::begin(self, seq, SessionPhase::Disconnecting);

        self.reset_connection(seq, &mut op).await;
        let result = async {
            self.store.delete(LAST_NETWORK_KEY).await?;
            self.store.delete(MNEMONIC_KEY).await?;
            inner.credential = None;
            op.commit(|s| s.initialized = false);
            tracing::info!("wallet storage purged");
            Ok::<_, SessionError>(())
        }
        .await;
        op.finish(result)
    }

    async fn reset_connection(&self, seq: u64, op: &mut Operation<'_>) {
        self.reset_seq.store(seq, Ordering::SeqCst);
        if let Err(e) = self.facade.disconnect().await {
            tracing::warn!(error = %e, "facade teardown failed");
            op.note(e.into());
        }
        op.commit(|s| {
            s.current_network = None;
            s.wallet_state = None;
        });
    }

    fn connected_network(&self) -> Result<NetworkConfig, SessionError> {
        self.state
            .borrow()
            .current_network
            .clone()
            .ok_or(SessionError::NotConnected)
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }
}

/// Validates the recipient for the network's family and builds the payload.
fn prepare_transfer(
    network: &NetworkConfig,
    recipient: &str,
    amount: &str,
) -> Result<TransactionRequest, SessionError> {
    address::validate_recipient(recipient, network.family)?;
    builder::build(
        network.family,
        recipient,
        amount,
        network.native_currency.decimals,
    )
}

fn expect_network(wallet_state: &WalletState, chain_id: &str) -> Result<(), SessionError> {
    if wallet_state.network.chain_id != chain_id {
        return Err(SessionError::RemoteFailure(format!(
            "expected state for {chain_id}, got {}",
            wallet_state.network.chain_id
        )));
    }
    Ok(())
}

/// One running session operation.
///
/// Marks the session loading while alive. [`finish`](Operation::finish)
/// publishes the outcome; dropping an unfinished operation (a cancelled
/// future) only clears the loading flag.
struct Operation<'a> {
    session: &'a WalletSession,
    seq: u64,
    /// Non-fatal failure to surface once the operation completes.
    noted: Option<SessionError>,
    finished: bool,
}

impl<'a> Operation<'a> {
    fn begin(session: &'a WalletSession, seq: u64, phase: SessionPhase) -> Self {
        session.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
            s.phase = phase;
        });
        tracing::debug!(seq, ?phase, "operation started");
        Self {
            session,
            seq,
            noted: None,
            finished: false,
        }
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.session.state.send_modify(|s| s.phase = phase);
    }

    /// Applies `update` unless a disconnect or purge started after this
    /// operation did. Returns whether it was applied.
    fn commit(&self, update: impl FnOnce(&mut SessionState)) -> bool {
        if self.session.reset_seq.load(Ordering::SeqCst) > self.seq {
            tracing::debug!(seq = self.seq, "discarding stale operation result");
            return false;
        }
        self.session.state.send_modify(update);
        true
    }

    fn note(&mut self, error: SessionError) {
        self.noted = Some(error);
    }

    fn finish<T>(mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        self.finished = true;
        let noted = self.noted.take();
        self.session.state.send_modify(|s| {
            s.is_loading = false;
            match &result {
                Ok(_) => {
                    s.error = noted.as_ref().map(ToString::to_string);
                    s.phase = s.settled_phase();
                }
                Err(e) => {
                    s.error = Some(e.to_string());
                    s.phase = SessionPhase::Error;
                }
            }
        });
        if let Err(e) = &result {
            tracing::warn!(seq = self.seq, error = %e, "operation failed");
        }
        result
    }
}

impl Drop for Operation<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(seq = self.seq, "operation cancelled");
            self.session.state.send_modify(|s| {
                s.is_loading = false;
                s.phase = s.settled_phase();
            });
        }
    }
}
