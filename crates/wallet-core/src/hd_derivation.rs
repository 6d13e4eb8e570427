use bip32::{DerivationPath, XPrv};
use hmac::{Hmac, Mac};
use k256::ecdsa::SigningKey;
use sha2::Sha512;
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::types::NetworkFamily;

type HmacSha512 = Hmac<Sha512>;

/// BIP-44 path used for EVM accounts (same key on every EVM chain).
pub const EVM_PATH: &str = "m/44'/60'/0'/0/0";

/// SLIP-0010 path used for Substrate accounts (coin type 354, all hardened).
pub const SUBSTRATE_PATH: &str = "m/44'/354'/0'/0'/0'";

/// Derivation path of the single account a family uses.
pub fn path_for_family(family: NetworkFamily) -> &'static str {
    match family {
        NetworkFamily::Evm => EVM_PATH,
        NetworkFamily::Substrate => SUBSTRATE_PATH,
    }
}

/// Derived secp256k1 key (EVM)
pub struct DerivedKey {
    pub private_key: [u8; 32],
    pub public_key_compressed: [u8; 33],
    pub derivation_path: String,
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Derived Ed25519 key (Substrate)
pub struct DerivedEd25519Key {
    pub private_key: [u8; 32],
    pub public_key: [u8; 32],
    pub derivation_path: String,
}

impl Drop for DerivedEd25519Key {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Derive a secp256k1 key from seed using BIP-32
pub fn derive_secp256k1_key(seed: &[u8], path: &str) -> Result<DerivedKey, WalletError> {
    let derivation_path: DerivationPath = path
        .parse()
        .map_err(|e: bip32::Error| WalletError::DerivationFailed(e.to_string()))?;

    let xprv = XPrv::derive_from_path(seed, &derivation_path)
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;

    let mut private_key: [u8; 32] = xprv.to_bytes().into();
    let signing_key = SigningKey::from_bytes(&private_key.into());
    let signing_key = match signing_key {
        Ok(key) => key,
        Err(e) => {
            private_key.zeroize();
            return Err(WalletError::DerivationFailed(e.to_string()));
        }
    };

    let public_key_compressed: [u8; 33] = signing_key
        .verifying_key()
        .to_sec1_bytes()
        .as_ref()
        .try_into()
        .map_err(|_| WalletError::DerivationFailed("Invalid public key length".into()))?;

    Ok(DerivedKey {
        private_key,
        public_key_compressed,
        derivation_path: path.to_string(),
    })
}

/// Derive an Ed25519 key from seed using SLIP-0010 (hardened steps only)
pub fn derive_ed25519_key(seed: &[u8], path: &str) -> Result<DerivedEd25519Key, WalletError> {
    let components = parse_derivation_path(path)?;

    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
    mac.update(seed);
    let result = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for child_index in components {
        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        // Hardened child: 0x00 || key || index (with hardened bit set)
        mac.update(&[0x00]);
        mac.update(&key);
        mac.update(&(child_index | 0x8000_0000).to_be_bytes());
        let result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    let signing_key = ed25519_dalek::SigningKey::from_bytes(&key);
    let derived = DerivedEd25519Key {
        private_key: key,
        public_key: signing_key.verifying_key().to_bytes(),
        derivation_path: path.to_string(),
    };

    key.zeroize();
    chain_code.zeroize();

    Ok(derived)
}

/// Parse "m/44'/354'/0'/0'/0'" into [44, 354, 0, 0, 0].
///
/// Ed25519 only supports hardened derivation, so every component must be
/// marked hardened.
fn parse_derivation_path(path: &str) -> Result<Vec<u32>, WalletError> {
    let path = path
        .strip_prefix("m/")
        .ok_or_else(|| WalletError::DerivationFailed("Path must start with m/".into()))?;

    path.split('/')
        .map(|component| {
            let num_str = component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
                .ok_or_else(|| {
                    WalletError::DerivationFailed(format!(
                        "Ed25519 path component {component} must be hardened"
                    ))
                })?;
            num_str
                .parse::<u32>()
                .map_err(|e| WalletError::DerivationFailed(format!("Invalid path component: {e}")))
        })
        .collect()
}
