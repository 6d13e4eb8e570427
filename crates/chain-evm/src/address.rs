use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{EncodedPoint, PublicKey};
use sha3::{Digest, Keccak256};

use crate::error::EvmError;

/// Number of hex characters after the `0x` prefix.
const ADDRESS_HEX_LEN: usize = 40;

/// Surface check for a recipient address: `0x` followed by exactly 40 hex
/// characters.
///
/// Case is not checked against EIP-55, so all-lowercase, all-uppercase and
/// mixed-case addresses are accepted alike. The prefix must be a lowercase `0x`.
pub fn is_valid_address(address: &str) -> bool {
    validate_address(address).is_ok()
}

/// Same rule as [`is_valid_address`], reporting why an address was rejected.
pub fn validate_address(address: &str) -> Result<(), EvmError> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| EvmError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != ADDRESS_HEX_LEN {
        return Err(EvmError::InvalidAddress(format!(
            "expected {ADDRESS_HEX_LEN} hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EvmError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    Ok(())
}

/// Applies EIP-55 mixed-case checksum encoding to a valid address.
pub fn checksum_address(address: &str) -> Result<String, EvmError> {
    validate_address(address)?;
    let hex_part = address[2..].to_ascii_lowercase();

    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(2 + ADDRESS_HEX_LEN);
    checksummed.push_str("0x");
    for (i, c) in hex_part.chars().enumerate() {
        // Nibble i of the hash decides the case of character i.
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}

/// Derives the checksummed address of a compressed secp256k1 public key.
///
/// The address is the last 20 bytes of the Keccak-256 hash of the 64-byte
/// uncompressed key (without its 0x04 prefix).
pub fn pubkey_to_address(compressed: &[u8; 33]) -> Result<String, EvmError> {
    let encoded = EncodedPoint::from_bytes(compressed)
        .map_err(|e| EvmError::InvalidPublicKey(format!("invalid key encoding: {e}")))?;

    let pubkey: Option<PublicKey> = PublicKey::from_encoded_point(&encoded).into();
    let pubkey = pubkey
        .ok_or_else(|| EvmError::InvalidPublicKey("point is not on the secp256k1 curve".into()))?;

    let uncompressed = pubkey.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);

    checksum_address(&format!("0x{}", hex::encode(&hash[12..])))
}
