use crate::error::SessionError;
use crate::types::NetworkFamily;

/// Checks that `address` has the recipient shape required by `family`.
///
/// EVM: `0x` followed by 40 hex characters. Substrate: 48 characters
/// starting with `5` (no SS58 checksum verification).
pub fn is_valid_address(address: &str, family: NetworkFamily) -> bool {
    validate_recipient(address, family).is_ok()
}

/// Same check as [`is_valid_address`], failing with
/// [`SessionError::InvalidAddress`] and the reason.
pub fn validate_recipient(address: &str, family: NetworkFamily) -> Result<(), SessionError> {
    match family {
        NetworkFamily::Evm => chain_evm::address::validate_address(address).map_err(|e| match e {
            chain_evm::error::EvmError::InvalidAddress(reason) => {
                SessionError::InvalidAddress(reason)
            }
            other => SessionError::InvalidAddress(other.to_string()),
        }),
        NetworkFamily::Substrate => {
            chain_substrate::address::validate_address(address).map_err(|e| match e {
                chain_substrate::error::SubstrateError::InvalidAddress(reason) => {
                    SessionError::InvalidAddress(reason)
                }
                other => SessionError::InvalidAddress(other.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVM: &str = "0x000000000000000000000000000000000000dEaD";
    const SUBSTRATE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[test]
    fn evm_address_valid_only_for_evm() {
        assert!(is_valid_address(EVM, NetworkFamily::Evm));
        assert!(!is_valid_address(EVM, NetworkFamily::Substrate));
    }

    #[test]
    fn substrate_address_valid_only_for_substrate() {
        assert!(is_valid_address(SUBSTRATE, NetworkFamily::Substrate));
        assert!(!is_valid_address(SUBSTRATE, NetworkFamily::Evm));
    }

    #[test]
    fn empty_rejected_for_both() {
        assert!(!is_valid_address("", NetworkFamily::Evm));
        assert!(!is_valid_address("", NetworkFamily::Substrate));
    }

    #[test]
    fn reason_is_carried() {
        assert_eq!(
            validate_recipient("0x1234", NetworkFamily::Evm),
            Err(SessionError::InvalidAddress(
                "expected 40 hex characters, got 4".into()
            ))
        );
        assert_eq!(
            validate_recipient("4abc", NetworkFamily::Substrate),
            Err(SessionError::InvalidAddress("expected 48 characters, got 4".into()))
        );
    }
}
