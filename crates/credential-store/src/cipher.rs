use aes_gcm::aead::{Aead, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::RngCore;
use zeroize::Zeroizing;

use crate::error::StoreError;

/// AES-256-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// Argon2id salt size in bytes.
pub const SALT_SIZE: usize = 16;

/// Derives the 32-byte store key from `passphrase` and `salt` using Argon2id
/// (64 MiB, 3 iterations, 4 lanes).
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_SIZE],
) -> Result<Zeroizing<[u8; 32]>, StoreError> {
    let params = Params::new(65536, 3, 4, Some(32))
        .map_err(|e| StoreError::KdfFailed(format!("invalid argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut_slice())
        .map_err(|e| StoreError::KdfFailed(format!("argon2 hash failed: {e}")))?;

    Ok(output)
}

/// Generates a random salt for a new store file.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand_core::OsRng.fill_bytes(&mut salt);
    salt
}

/// Seals `plaintext` for the entry named `label`.
///
/// The label is bound as associated data, so a ciphertext moved under another
/// entry name fails to open. Output layout: `[nonce (12 bytes) | ciphertext + tag]`.
pub fn seal(plaintext: &[u8], label: &str, key: &[u8; 32]) -> Result<Vec<u8>, StoreError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: label.as_bytes(),
            },
        )
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Opens a value produced by [`seal`] with the same `label` and key.
pub fn open(sealed: &[u8], label: &str, key: &[u8; 32]) -> Result<Zeroizing<Vec<u8>>, StoreError> {
    if sealed.len() < NONCE_SIZE {
        return Err(StoreError::Corrupt(format!(
            "entry {label} is {} bytes, shorter than the nonce",
            sealed.len()
        )));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: label.as_bytes(),
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| StoreError::DecryptionFailed(label.to_string()))
}
