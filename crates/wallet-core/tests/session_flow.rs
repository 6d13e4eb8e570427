//! Session controller behaviour against scripted collaborators.
//!
//! The facade and store here are test doubles whose failures and timing are
//! controlled by each test, so ordering and failure paths can be exercised
//! deterministically.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use credential_store::{CredentialStore, MemoryStore, StoreError, LAST_NETWORK_KEY, MNEMONIC_KEY};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Notify;
use wallet_core::{
    Balances, Credential, FacadeError, FeeEstimate, NetworkFamily, NetworkRegistry, SessionError,
    SessionPhase, StaticRegistry, TransactionRequest, WalletFacade, WalletSession, WalletState,
};

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const EVM_ACCOUNT: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";
const SUBSTRATE_ACCOUNT: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
const EVM_RECIPIENT: &str = "0x000000000000000000000000000000000000dEaD";

// ─── Test doubles ───────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedFacade {
    registry: StaticRegistry,
    connected: Mutex<Option<WalletState>>,
    failing_chains: Mutex<HashSet<String>>,
    fail_teardown: AtomicBool,
    fail_wallet_state: AtomicBool,
    fail_send: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    connect_entered: Notify,
    created: AtomicUsize,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl ScriptedFacade {
    fn fail_chain(&self, chain_id: &str) {
        self.failing_chains.lock().unwrap().insert(chain_id.to_string());
    }

    /// Makes the next connect calls wait until the returned gate is notified.
    fn hold_connect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletFacade for ScriptedFacade {
    fn create_credential(&self) -> Result<Credential, FacadeError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Credential::from(TEST_MNEMONIC.to_string()))
    }

    async fn connect(
        &self,
        _credential: &Credential,
        chain_id: &str,
    ) -> Result<WalletState, FacadeError> {
        self.connect_entered.notify_one();
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing_chains.lock().unwrap().contains(chain_id) {
            return Err(FacadeError::Network("connection refused".into()));
        }
        let network = self
            .registry
            .get(chain_id)
            .ok_or_else(|| FacadeError::UnknownChain(chain_id.to_string()))?;
        let address = match network.family {
            NetworkFamily::Evm => EVM_ACCOUNT,
            NetworkFamily::Substrate => SUBSTRATE_ACCOUNT,
        };
        let state = WalletState {
            address: address.to_string(),
            network,
            balances: Balances {
                native: "5000000000000000000".into(),
                tokens: vec![],
            },
        };
        *self.connected.lock().unwrap() = Some(state.clone());
        Ok(state)
    }

    async fn wallet_state(&self) -> Result<WalletState, FacadeError> {
        if self.fail_wallet_state.load(Ordering::SeqCst) {
            return Err(FacadeError::Network("state unavailable".into()));
        }
        self.connected
            .lock()
            .unwrap()
            .clone()
            .ok_or(FacadeError::NotConnected)
    }

    async fn estimate_fee(&self, _request: &TransactionRequest) -> Result<FeeEstimate, FacadeError> {
        Ok(FeeEstimate {
            formatted: "0.000021".into(),
            currency: "ETH".into(),
        })
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, FacadeError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(FacadeError::Rejected("nonce too low".into()));
        }
        self.sent.lock().unwrap().push(request.clone());
        if let Some(state) = self.connected.lock().unwrap().as_mut() {
            state.balances.native = "3499979000000000000".into();
        }
        Ok("0xfeed".into())
    }

    async fn disconnect(&self) -> Result<(), FacadeError> {
        *self.connected.lock().unwrap() = None;
        if self.fail_teardown.load(Ordering::SeqCst) {
            return Err(FacadeError::Network("teardown failed".into()));
        }
        Ok(())
    }
}

/// Memory store whose writes to selected keys fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing_writes: Mutex<HashSet<&'static str>>,
}

impl FlakyStore {
    fn fail_writes_to(&self, key: &'static str) {
        self.failing_writes.lock().unwrap().insert(key);
    }
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing_writes.lock().unwrap().contains(key) {
            return Err(StoreError::Io("device locked".into()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }
}

struct Harness {
    session: Arc<WalletSession>,
    facade: Arc<ScriptedFacade>,
    store: Arc<FlakyStore>,
}

fn harness() -> Harness {
    let facade = Arc::new(ScriptedFacade::default());
    let store = Arc::new(FlakyStore::default());
    let session = Arc::new(WalletSession::new(
        facade.clone(),
        store.clone(),
        Arc::new(StaticRegistry::default()),
    ));
    Harness {
        session,
        facade,
        store,
    }
}

async fn connected_harness(chain_id: &str) -> Harness {
    let h = harness();
    h.session.initialize().await.unwrap();
    h.session.connect_to_network(chain_id).await.unwrap();
    h
}

// ─── Initialization ─────────────────────────────────────────────────

#[tokio::test]
async fn new_credential_is_persisted_before_use() {
    let h = harness();
    h.session.initialize().await.unwrap();

    let stored = h.store.get(MNEMONIC_KEY).await.unwrap().unwrap();
    assert_eq!(stored.expose_secret(), TEST_MNEMONIC);
    assert_eq!(h.facade.created.load(Ordering::SeqCst), 1);
    assert!(h.session.state().initialized);
}

#[tokio::test]
async fn failed_credential_write_leaves_session_uninitialized() {
    let h = harness();
    h.store.fail_writes_to(MNEMONIC_KEY);

    let err = h.session.initialize().await.unwrap_err();
    assert!(matches!(err, SessionError::StorageFailure(_)));

    let state = h.session.state();
    assert!(!state.initialized);
    assert_eq!(state.phase, SessionPhase::Error);
    assert_eq!(
        h.session.connect_to_network("1").await,
        Err(SessionError::NotInitialized)
    );
}

#[tokio::test]
async fn reconnect_failure_does_not_fail_initialize() {
    let h = harness();
    h.store.set(LAST_NETWORK_KEY, "1").await.unwrap();
    h.facade.fail_chain("1");

    h.session.initialize().await.unwrap();

    let state = h.session.state();
    assert!(state.initialized);
    assert!(state.current_network.is_none());
    assert_eq!(
        state.error.as_deref(),
        Some("Network request failed: network error: connection refused")
    );
}

// ─── Connect / disconnect ───────────────────────────────────────────

#[tokio::test]
async fn switching_networks_replaces_network_and_state_together() {
    let h = connected_harness("1").await;

    let mut rx = h.session.subscribe();
    let watcher = tokio::spawn(async move {
        let mut seen = 0;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if let (Some(network), Some(wallet)) = (&state.current_network, &state.wallet_state) {
                assert_eq!(network.chain_id, wallet.network.chain_id);
            }
            seen += 1;
        }
        seen
    });

    h.session.connect_to_network("polkadot").await.unwrap();

    let state = h.session.state();
    assert_eq!(state.current_network.as_ref().unwrap().chain_id, "polkadot");
    let wallet = state.wallet_state.unwrap();
    assert_eq!(wallet.network.chain_id, "polkadot");
    assert_eq!(wallet.address, SUBSTRATE_ACCOUNT);

    drop(h.session);
    assert!(watcher.await.unwrap() > 0);
}

#[tokio::test]
async fn failed_connect_leaves_state_unchanged() {
    let h = connected_harness("1").await;
    let before = h.session.state();
    h.facade.fail_chain("polkadot");

    let err = h.session.connect_to_network("polkadot").await.unwrap_err();
    assert!(matches!(err, SessionError::RemoteFailure(_)));

    let after = h.session.state();
    assert_eq!(after.current_network, before.current_network);
    assert_eq!(after.wallet_state, before.wallet_state);
    assert!(after.error.is_some());
    assert!(!after.is_loading);
}

#[tokio::test]
async fn unknown_network_is_rejected_before_the_facade() {
    let h = connected_harness("1").await;
    assert_eq!(
        h.session.connect_to_network("bitcoin").await,
        Err(SessionError::UnknownNetwork("bitcoin".into()))
    );
    assert_eq!(
        h.session.state().current_network.unwrap().chain_id,
        "1"
    );
}

#[tokio::test]
async fn last_network_write_failure_is_recorded_not_fatal() {
    let h = harness();
    h.session.initialize().await.unwrap();
    h.store.fail_writes_to(LAST_NETWORK_KEY);

    h.session.connect_to_network("1").await.unwrap();

    let state = h.session.state();
    assert_eq!(state.phase, SessionPhase::Connected);
    assert!(state.error.unwrap().starts_with("Secure storage failure"));
}

#[tokio::test]
async fn disconnect_clears_state_even_when_teardown_fails() {
    let h = connected_harness("1").await;
    h.facade.fail_teardown.store(true, Ordering::SeqCst);

    h.session.disconnect().await.unwrap();

    let state = h.session.state();
    assert!(state.current_network.is_none());
    assert!(state.wallet_state.is_none());
    assert!(state.initialized);
    assert_eq!(state.phase, SessionPhase::Disconnected);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn disconnect_keeps_stored_entries() {
    let h = connected_harness("1").await;
    h.session.disconnect().await.unwrap();

    assert!(h.store.get(MNEMONIC_KEY).await.unwrap().is_some());
    assert!(h.store.get(LAST_NETWORK_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn disconnect_requested_during_connect_wins() {
    let h = harness();
    h.session.initialize().await.unwrap();
    let gate = h.facade.hold_connect();

    let session = h.session.clone();
    let connect = tokio::spawn(async move { session.connect_to_network("1").await });
    h.facade.connect_entered.notified().await;
    assert!(h.session.state().is_loading);

    let session = h.session.clone();
    let disconnect = tokio::spawn(async move { session.disconnect().await });
    tokio::task::yield_now().await;

    gate.notify_one();
    connect.await.unwrap().unwrap();
    disconnect.await.unwrap().unwrap();

    let state = h.session.state();
    assert!(state.current_network.is_none());
    assert!(state.wallet_state.is_none());
    assert!(!state.is_loading);
    assert!(h.facade.connected.lock().unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_connects_and_disconnects_keep_facade_and_session_in_step() {
    let h = harness();
    h.session.initialize().await.unwrap();

    for round in 0..50 {
        let mut tasks = Vec::new();
        for i in 0..4 {
            let session = h.session.clone();
            tasks.push(tokio::spawn(async move {
                if (round + i) % 2 == 0 {
                    session.connect_to_network("1").await
                } else {
                    session.disconnect().await
                }
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let session_connected = h.session.state().current_network.is_some();
        let facade_connected = h.facade.connected.lock().unwrap().is_some();
        assert_eq!(session_connected, facade_connected, "round {round}");
    }
}

#[tokio::test]
async fn cancelled_operation_clears_loading_flag() {
    let h = harness();
    h.session.initialize().await.unwrap();
    let _gate = h.facade.hold_connect();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), h.session.connect_to_network("1")).await;
    assert!(timed_out.is_err());

    let state = h.session.state();
    assert!(!state.is_loading);
    assert!(state.current_network.is_none());

    // The lock was released with the dropped future.
    *h.facade.gate.lock().unwrap() = None;
    h.session.connect_to_network("1").await.unwrap();
    assert_eq!(h.session.state().phase, SessionPhase::Connected);
}

// ─── Transactions ───────────────────────────────────────────────────

#[tokio::test]
async fn evm_send_scales_amount_by_decimals() {
    let h = connected_harness("1").await;

    let receipt = h.session.send_transaction(EVM_RECIPIENT, "1.5").await.unwrap();
    assert_eq!(receipt.tx_hash, "0xfeed");
    assert_eq!(receipt.fee.formatted, "0.000021");

    assert_eq!(
        h.facade.sent(),
        vec![TransactionRequest::EvmTransfer {
            to: EVM_RECIPIENT.into(),
            value: "1500000000000000000".into(),
        }]
    );
    let wallet = h.session.state().wallet_state.unwrap();
    assert_eq!(wallet.balances.native, "3499979000000000000");
}

#[tokio::test]
async fn substrate_send_builds_balances_transfer() {
    let h = connected_harness("polkadot").await;

    h.session.send_transaction(SUBSTRATE_ACCOUNT, "0.5").await.unwrap();

    assert_eq!(
        h.facade.sent(),
        vec![TransactionRequest::SubstrateCall {
            method: "balances".into(),
            params: vec![
                "transfer".into(),
                SUBSTRATE_ACCOUNT.into(),
                "5000000000".into(),
            ],
        }]
    );
}

#[tokio::test]
async fn invalid_recipient_never_reaches_the_facade() {
    let h = connected_harness("1").await;

    let err = h.session.send_transaction("0x1234", "1").await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidAddress(_)));
    assert!(h.facade.sent().is_empty());
    assert_eq!(
        h.session.state().error.as_deref(),
        Some("Invalid recipient address: expected 40 hex characters, got 4")
    );
}

#[tokio::test]
async fn invalid_amount_is_rejected() {
    let h = connected_harness("1").await;
    let err = h.session.estimate_fee(EVM_RECIPIENT, "1e18").await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidAmount(_)));
}

#[tokio::test]
async fn failed_send_leaves_wallet_state_untouched() {
    let h = connected_harness("1").await;
    let before = h.session.state().wallet_state;
    h.facade.fail_send.store(true, Ordering::SeqCst);

    let err = h.session.send_transaction(EVM_RECIPIENT, "1").await.unwrap_err();
    assert_eq!(
        err,
        SessionError::RemoteFailure("transaction rejected: nonce too low".into())
    );
    assert_eq!(h.session.state().wallet_state, before);
}

#[tokio::test]
async fn refresh_failure_after_send_still_returns_receipt() {
    let h = connected_harness("1").await;
    h.facade.fail_wallet_state.store(true, Ordering::SeqCst);

    let receipt = h.session.send_transaction(EVM_RECIPIENT, "1").await.unwrap();
    assert_eq!(receipt.tx_hash, "0xfeed");

    let state = h.session.state();
    assert_eq!(
        state.error.as_deref(),
        Some("Network request failed: network error: state unavailable")
    );
    assert_eq!(state.wallet_state.unwrap().balances.native, "5000000000000000000");
}

#[tokio::test]
async fn refresh_replaces_wallet_state() {
    let h = connected_harness("1").await;
    h.facade.connected.lock().unwrap().as_mut().unwrap().balances.native = "42".into();

    h.session.refresh_wallet_state().await.unwrap();
    assert_eq!(h.session.state().wallet_state.unwrap().balances.native, "42");
}

#[tokio::test]
async fn queued_operations_run_in_order() {
    let h = connected_harness("1").await;

    let (a, b) = tokio::join!(
        h.session.send_transaction(EVM_RECIPIENT, "1"),
        h.session.send_transaction(EVM_RECIPIENT, "2"),
    );
    a.unwrap();
    b.unwrap();

    let values: Vec<_> = h
        .facade
        .sent()
        .into_iter()
        .map(|request| match request {
            TransactionRequest::EvmTransfer { value, .. } => value,
            other => panic!("unexpected request {other:?}"),
        })
        .collect();
    assert_eq!(values, ["1000000000000000000", "2000000000000000000"]);
}

#[tokio::test]
async fn purge_removes_stored_entries() {
    let h = connected_harness("1").await;

    h.session.purge().await.unwrap();

    assert!(h.store.get(MNEMONIC_KEY).await.unwrap().is_none());
    assert!(h.store.get(LAST_NETWORK_KEY).await.unwrap().is_none());
    let state = h.session.state();
    assert!(!state.initialized);
    assert_eq!(state.phase, SessionPhase::Uninitialized);

    // A fresh initialize creates a new credential.
    h.session.initialize().await.unwrap();
    assert_eq!(h.facade.created.load(Ordering::SeqCst), 2);
}
