use std::fmt;

use bip39::{Language, Mnemonic};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;

/// The wallet's secret phrase.
///
/// Zeroized on drop and redacted in `Debug`. The only way to read it is
/// [`Credential::expose`], which callers use to hand the phrase to the
/// credential store or to key derivation.
pub struct Credential(SecretString);

impl Credential {
    pub fn new(phrase: SecretString) -> Self {
        Self(phrase)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Credential {
    fn from(phrase: String) -> Self {
        Self(SecretString::from(phrase))
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::from(self.expose().to_owned())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Generate a new 24-word BIP-39 mnemonic (256 bits of entropy)
pub fn generate_credential() -> Result<Credential, WalletError> {
    let mut entropy = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(Credential::from(mnemonic?.to_string()))
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Derive the 64-byte BIP-39 seed (empty passphrase) from a credential.
pub fn credential_to_seed(credential: &Credential) -> Result<Zeroizing<[u8; 64]>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, credential.expose())
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}
