use crate::error::SubstrateError;

/// Length of a generic-format SS58 address for a 32-byte account id.
const ADDRESS_LEN: usize = 48;

/// SS58 address type of the generic Substrate format. Addresses in this
/// format start with `5`.
pub const GENERIC_PREFIX: u16 = 42;

/// Checksum domain separator defined by the SS58 format.
const SS58_CONTEXT: &[u8] = b"SS58PRE";

/// Number of checksum bytes appended for 32-byte account ids.
const CHECKSUM_LEN: usize = 2;

/// Surface check for a recipient address: exactly 48 characters, starting
/// with `5`.
///
/// This does not decode base58 or verify the SS58 checksum. A string with the
/// right length and first character passes even if it is not a real account.
pub fn is_valid_address(address: &str) -> bool {
    validate_address(address).is_ok()
}

/// Same rule as [`is_valid_address`], reporting why an address was rejected.
pub fn validate_address(address: &str) -> Result<(), SubstrateError> {
    let len = address.chars().count();
    if len != ADDRESS_LEN {
        return Err(SubstrateError::InvalidAddress(format!(
            "expected {ADDRESS_LEN} characters, got {len}"
        )));
    }
    if !address.starts_with('5') {
        return Err(SubstrateError::InvalidAddress(
            "address must start with 5".into(),
        ));
    }
    Ok(())
}

/// Encodes a 32-byte account id as an SS58 address with the given prefix.
///
/// Only simple (single byte) prefixes below 64 are supported.
pub fn encode_address(account_id: &[u8; 32], prefix: u16) -> Result<String, SubstrateError> {
    if prefix >= 64 {
        return Err(SubstrateError::UnsupportedPrefix(prefix));
    }

    let mut payload = Vec::with_capacity(1 + account_id.len() + CHECKSUM_LEN);
    payload.push(prefix as u8);
    payload.extend_from_slice(account_id);

    let hash = blake2b_simd::Params::new()
        .hash_length(64)
        .to_state()
        .update(SS58_CONTEXT)
        .update(&payload)
        .finalize();
    payload.extend_from_slice(&hash.as_bytes()[..CHECKSUM_LEN]);

    Ok(bs58::encode(payload).into_string())
}
