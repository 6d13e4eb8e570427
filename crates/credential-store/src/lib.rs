//! # credential-store
//!
//! Scoped secure key-value storage for the wallet session.
//!
//! The session only ever talks to the [`CredentialStore`] trait. Two
//! implementations ship with the crate:
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions
//! - [`EncryptedFileStore`]: Argon2id + AES-256-GCM sealed entries in a JSON file

pub mod cipher;
pub mod error;
pub mod memory;
pub mod vault;

use async_trait::async_trait;
use secrecy::SecretString;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use vault::EncryptedFileStore;

/// Key under which the wallet mnemonic is stored.
pub const MNEMONIC_KEY: &str = "wallet_mnemonic";

/// Key under which the last connected network id is stored.
pub const LAST_NETWORK_KEY: &str = "last_network";

/// Secure key-value storage.
///
/// Values come back wrapped in [`SecretString`] so they are zeroized when the
/// caller drops them. Implementations must never put stored values into error
/// messages.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` if the key was never set or has been deleted.
    async fn get(&self, key: &str) -> Result<Option<SecretString>, StoreError>;

    /// Durably store `value` under `key`, replacing any previous value.
    ///
    /// When this returns `Err`, the previously stored value (if any) is still
    /// the one a subsequent `get` returns.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
