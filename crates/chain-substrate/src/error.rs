use thiserror::Error;

/// Substrate chain operation errors.
#[derive(Debug, Error)]
pub enum SubstrateError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported ss58 prefix: {0}")]
    UnsupportedPrefix(u16),
}
