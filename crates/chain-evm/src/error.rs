use thiserror::Error;

/// EVM chain operation errors.
#[derive(Debug, Error)]
pub enum EvmError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = EvmError::InvalidAddress("expected 40 hex characters, got 8".into());
        assert_eq!(
            err.to_string(),
            "invalid address: expected 40 hex characters, got 8"
        );
    }

    #[test]
    fn display_invalid_public_key() {
        let err = EvmError::InvalidPublicKey("not on curve".into());
        assert_eq!(err.to_string(), "invalid public key: not on curve");
    }
}
