use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::cipher::{self, SALT_SIZE};
use crate::error::StoreError;
use crate::CredentialStore;

/// On-disk format version.
const STORE_VERSION: u32 = 1;

/// Label and plaintext of the sealed value used to check the passphrase on open.
const VERIFIER_LABEL: &str = "__verifier";
const VERIFIER_PLAINTEXT: &[u8] = b"credential-store/v1";

/// Serialized store file. Every value is hex(nonce | ciphertext | tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultFile {
    version: u32,
    salt: String,
    verifier: String,
    entries: BTreeMap<String, String>,
}

/// Credential store persisted as a JSON file of AES-256-GCM sealed entries.
///
/// The file key is derived once at open time with Argon2id from the
/// passphrase and the per-file salt. Writes go to a sibling temp file that is
/// renamed over the original, so a failed write leaves the previous contents
/// (and the in-memory view) intact.
pub struct EncryptedFileStore {
    path: PathBuf,
    key: Zeroizing<[u8; 32]>,
    file: Mutex<VaultFile>,
}

impl EncryptedFileStore {
    /// Opens the store at `path`, creating an empty one if the file does not exist.
    ///
    /// Fails with [`StoreError::WrongPassphrase`] if the file was created with a
    /// different passphrase.
    pub async fn open(
        path: impl Into<PathBuf>,
        passphrase: &SecretString,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        match tokio::fs::read(&path).await {
            Ok(bytes) => Self::unlock(path, &bytes, passphrase).await,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::create(path, passphrase).await,
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn create(path: PathBuf, passphrase: &SecretString) -> Result<Self, StoreError> {
        let salt = cipher::generate_salt();
        let key = derive_key_blocking(passphrase, salt).await?;
        let verifier = cipher::seal(VERIFIER_PLAINTEXT, VERIFIER_LABEL, &key)?;

        let file = VaultFile {
            version: STORE_VERSION,
            salt: hex::encode(salt),
            verifier: hex::encode(verifier),
            entries: BTreeMap::new(),
        };
        persist(&path, &file).await?;
        tracing::info!(path = %path.display(), "created credential store");

        Ok(Self {
            path,
            key,
            file: Mutex::new(file),
        })
    }

    async fn unlock(
        path: PathBuf,
        bytes: &[u8],
        passphrase: &SecretString,
    ) -> Result<Self, StoreError> {
        let file: VaultFile = serde_json::from_slice(bytes)
            .map_err(|e| StoreError::Corrupt(format!("invalid store json: {e}")))?;

        if file.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }

        let salt: [u8; SALT_SIZE] = hex::decode(&file.salt)
            .map_err(|e| StoreError::Corrupt(format!("invalid salt hex: {e}")))?
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Corrupt("invalid salt length".into()))?;

        let key = derive_key_blocking(passphrase, salt).await?;

        let verifier = hex::decode(&file.verifier)
            .map_err(|e| StoreError::Corrupt(format!("invalid verifier hex: {e}")))?;
        match cipher::open(&verifier, VERIFIER_LABEL, &key) {
            Ok(plain) if plain.as_slice() == VERIFIER_PLAINTEXT => {}
            Ok(_) | Err(StoreError::DecryptionFailed(_)) => return Err(StoreError::WrongPassphrase),
            Err(e) => return Err(e),
        }

        tracing::debug!(
            path = %path.display(),
            entries = file.entries.len(),
            "unlocked credential store"
        );

        Ok(Self {
            path,
            key,
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl CredentialStore for EncryptedFileStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>, StoreError> {
        let file = self.file.lock().await;
        let Some(sealed_hex) = file.entries.get(key) else {
            return Ok(None);
        };

        let sealed = hex::decode(sealed_hex)
            .map_err(|e| StoreError::Corrupt(format!("entry {key} is not hex: {e}")))?;
        let plain = cipher::open(&sealed, key, &self.key)?;
        let value = String::from_utf8(plain.to_vec())
            .map_err(|_| StoreError::Corrupt(format!("entry {key} is not utf-8")))?;

        Ok(Some(SecretString::from(value)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let sealed = cipher::seal(value.as_bytes(), key, &self.key)?;

        let mut file = self.file.lock().await;
        let mut next = file.clone();
        next.entries.insert(key.to_string(), hex::encode(sealed));
        persist(&self.path, &next).await?;
        *file = next;

        tracing::debug!(key, "stored credential entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut file = self.file.lock().await;
        if !file.entries.contains_key(key) {
            return Ok(());
        }

        let mut next = file.clone();
        next.entries.remove(key);
        persist(&self.path, &next).await?;
        *file = next;

        tracing::debug!(key, "deleted credential entry");
        Ok(())
    }
}

/// Argon2id at 64 MiB is too heavy for a runtime worker thread.
async fn derive_key_blocking(
    passphrase: &SecretString,
    salt: [u8; SALT_SIZE],
) -> Result<Zeroizing<[u8; 32]>, StoreError> {
    let passphrase = Zeroizing::new(passphrase.expose_secret().as_bytes().to_vec());
    tokio::task::spawn_blocking(move || cipher::derive_key(&passphrase, &salt))
        .await
        .map_err(|e| StoreError::KdfFailed(format!("kdf task failed: {e}")))?
}

async fn persist(path: &Path, file: &VaultFile) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(file)
        .map_err(|e| StoreError::Io(format!("failed to serialize store: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    restrict_permissions(&tmp).await?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| io_error(path, e))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {e}", path.display()))
}
