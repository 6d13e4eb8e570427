use thiserror::Error;

/// Credential store errors.
///
/// Variants carry key names and OS error text only, never stored values.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed: {0}")]
    Io(String),

    #[error("store file is corrupt: {0}")]
    Corrupt(String),

    #[error("unsupported store version: {0}")]
    UnsupportedVersion(u32),

    #[error("wrong passphrase for credential store")]
    WrongPassphrase,

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed for entry {0}")]
    DecryptionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = StoreError::Io("disk full".into());
        assert_eq!(err.to_string(), "storage i/o failed: disk full");
    }

    #[test]
    fn display_wrong_passphrase() {
        assert_eq!(
            StoreError::WrongPassphrase.to_string(),
            "wrong passphrase for credential store"
        );
    }

    #[test]
    fn display_decryption_names_key_only() {
        let err = StoreError::DecryptionFailed("wallet_mnemonic".into());
        assert_eq!(err.to_string(), "decryption failed for entry wallet_mnemonic");
    }

    #[test]
    fn display_unsupported_version() {
        let err = StoreError::UnsupportedVersion(7);
        assert_eq!(err.to_string(), "unsupported store version: 7");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(StoreError::Corrupt("bad json".into()));
        assert!(err.to_string().contains("bad json"));
    }
}
